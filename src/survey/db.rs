//! Survey database operations
//!
//! Handles all database interactions for majors, responses, and the visit
//! counter. Responses are append-only: the service inserts and reads them,
//! nothing here updates or deletes a stored response.

use crate::error::AppError;
use crate::survey::models::{Major, SurveyResponse, MAJORS};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info};

/// Database connection pool for survey operations
pub struct SurveyDb {
    pool: SqlitePool,
}

impl SurveyDb {
    /// Initialize database connection pool
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file
    ///
    /// # Returns
    /// * `Ok(SurveyDb)` if successful
    /// * `Err(AppError)` if connection failed
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        // Ensure parent directory exists
        if let Some(parent) = PathBuf::from(db_path).parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Internal(anyhow::anyhow!("Failed to create db directory: {}", e))
            })?;
        }

        // SQLite connection string format: sqlite://path/to/db.db
        let connection_string = if db_path.starts_with("sqlite:") {
            db_path.to_string()
        } else {
            format!("sqlite:{}", db_path)
        };

        let options = SqliteConnectOptions::from_str(&connection_string)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid database path: {}", e)))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        info!("Connected to SQLite database at: {}", db_path);

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    /// Run database migrations
    async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations...");

        let migration_sql = include_str!("../../migrations/001_create_survey.sql");

        // Remove comments (lines starting with --) and normalize whitespace
        let mut cleaned_sql = String::new();
        for line in migration_sql.lines() {
            let trimmed = line.trim();
            // Skip empty lines and comment-only lines
            if trimmed.is_empty() || trimmed.starts_with("--") {
                continue;
            }
            // Remove inline comments (everything after --)
            let without_comments = if let Some(comment_pos) = trimmed.find("--") {
                &trimmed[..comment_pos]
            } else {
                trimmed
            };
            cleaned_sql.push_str(without_comments.trim());
            cleaned_sql.push(' ');
        }

        // Split by semicolon and filter out empty statements
        let statements: Vec<&str> = cleaned_sql
            .split(';')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();

        for statement in statements {
            sqlx::query(statement).execute(&self.pool).await?;
        }

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Seed the fixed major set if the majors table is empty
    ///
    /// Idempotent: a second call is a no-op. Returns the number of majors
    /// inserted.
    pub async fn seed_majors(&self) -> Result<usize, AppError> {
        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM majors")
            .fetch_one(&self.pool)
            .await?;

        if existing > 0 {
            debug!("Majors already seeded ({} present)", existing);
            return Ok(0);
        }

        for (name, description) in MAJORS {
            sqlx::query("INSERT INTO majors (name, description) VALUES (?, ?)")
                .bind(name)
                .bind(description)
                .execute(&self.pool)
                .await?;
        }

        info!("Seeded {} majors", MAJORS.len());
        Ok(MAJORS.len())
    }

    /// Get all majors with their descriptions
    pub async fn list_majors(&self) -> Result<Vec<Major>, AppError> {
        let majors = sqlx::query_as::<_, Major>("SELECT name, description FROM majors")
            .fetch_all(&self.pool)
            .await?;

        Ok(majors)
    }

    /// Append a validated response; the one and only write to the table
    pub async fn insert_response(&self, response: &SurveyResponse) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO responses \
             (has_decided, confirmed_major, first_choice, second_choice, third_choice, name, submitted_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(response.decision.has_decided())
        .bind(response.decision.confirmed_major())
        .bind(&response.preferences.first_choice)
        .bind(&response.preferences.second_choice)
        .bind(&response.preferences.third_choice)
        .bind(&response.name)
        .bind(response.submitted_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        debug!("Stored survey response");
        Ok(())
    }

    /// Total number of stored responses
    pub async fn count_responses(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM responses")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Number of responses where the respondent has decided
    pub async fn count_decided(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM responses WHERE has_decided = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Confirmed-major counts over decided responses only
    pub async fn confirmed_major_counts(&self) -> Result<Vec<(String, i64)>, AppError> {
        let counts = sqlx::query_as::<_, (String, i64)>(
            "SELECT confirmed_major, COUNT(*) AS count FROM responses \
             WHERE has_decided = 1 GROUP BY confirmed_major ORDER BY count DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }

    /// First-choice counts over undecided responses only
    ///
    /// Merged with [`Self::confirmed_major_counts`] to form the effective
    /// first-choice histogram: a decided respondent's true first choice is
    /// their confirmed major.
    pub async fn undecided_first_choice_counts(&self) -> Result<Vec<(String, i64)>, AppError> {
        let counts = sqlx::query_as::<_, (String, i64)>(
            "SELECT first_choice, COUNT(*) AS count FROM responses \
             WHERE has_decided = 0 GROUP BY first_choice ORDER BY count DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }

    /// Second-choice counts over all responses
    pub async fn second_choice_counts(&self) -> Result<Vec<(String, i64)>, AppError> {
        let counts = sqlx::query_as::<_, (String, i64)>(
            "SELECT second_choice, COUNT(*) AS count FROM responses \
             GROUP BY second_choice ORDER BY count DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }

    /// Third-choice counts over all responses
    pub async fn third_choice_counts(&self) -> Result<Vec<(String, i64)>, AppError> {
        let counts = sqlx::query_as::<_, (String, i64)>(
            "SELECT third_choice, COUNT(*) AS count FROM responses \
             GROUP BY third_choice ORDER BY count DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }

    /// Get all responses, most recent first
    pub async fn all_responses(&self) -> Result<Vec<SurveyResponse>, AppError> {
        let rows = sqlx::query_as::<_, ResponseRow>(
            "SELECT has_decided, confirmed_major, first_choice, second_choice, third_choice, name, submitted_at \
             FROM responses ORDER BY submitted_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SurveyResponse::from).collect())
    }

    /// Atomically increment the visit counter and return the new value
    ///
    /// Creates the counter row at 1 if it does not exist yet. The upsert is a
    /// single statement, so concurrent callers cannot lose an update or
    /// create a second row.
    pub async fn increment_visits(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar(
            "INSERT INTO visits (id, count, last_reset) VALUES (1, 1, ?) \
             ON CONFLICT(id) DO UPDATE SET count = count + 1 \
             RETURNING count",
        )
        .bind(chrono::Utc::now().timestamp_millis())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Current visit count, zero if the counter was never incremented
    pub async fn visit_count(&self) -> Result<i64, AppError> {
        let count: Option<i64> = sqlx::query_scalar("SELECT count FROM visits WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;

        Ok(count.unwrap_or(0))
    }

    /// Delete every stored response, returning how many were removed
    ///
    /// Administrative operation only; nothing on the HTTP surface reaches it.
    pub async fn delete_all_responses(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM responses")
            .execute(&self.pool)
            .await?;

        info!("{} responses have been deleted", result.rows_affected());
        Ok(result.rows_affected())
    }

    /// Get the database pool (for advanced operations if needed)
    #[allow(dead_code)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Flat row shape for `responses`; converted into the domain model on read
#[derive(Debug, sqlx::FromRow)]
struct ResponseRow {
    has_decided: bool,
    confirmed_major: Option<String>,
    first_choice: String,
    second_choice: String,
    third_choice: String,
    name: Option<String>,
    submitted_at: i64,
}

impl From<ResponseRow> for SurveyResponse {
    fn from(row: ResponseRow) -> Self {
        use crate::survey::models::{Decision, Preferences};

        let decision = if row.has_decided {
            Decision::Decided {
                confirmed_major: row.confirmed_major.unwrap_or_default(),
            }
        } else {
            Decision::Undecided
        };

        Self {
            preferences: Preferences {
                first_choice: row.first_choice,
                second_choice: row.second_choice,
                third_choice: row.third_choice,
            },
            decision,
            name: row.name,
            submitted_at: chrono::DateTime::from_timestamp_millis(row.submitted_at)
                .unwrap_or_else(chrono::Utc::now),
        }
    }
}
