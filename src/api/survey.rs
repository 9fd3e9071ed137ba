//! Survey API endpoints
//!
//! Handles HTTP requests for survey submission, statistics, the majors
//! list, and the visit counter.

use crate::error::AppError;
use crate::survey::{compute_statistics, Major, Statistics, Submission, SurveyDb};
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Acknowledgment message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable message
    pub message: String,
}

/// Visit counter response
#[derive(Debug, Serialize)]
pub struct VisitResponse {
    /// Current visit count after the increment
    pub visits: i64,
}

/// POST /api/survey/submit - Validate and store a new survey response
///
/// Validation runs entirely before the write; a rejected submission
/// persists nothing.
pub async fn submit_response(
    State(db): State<Arc<SurveyDb>>,
    Json(submission): Json<Submission>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let response = submission.validate()?;
    db.insert_response(&response).await?;

    info!(
        has_decided = response.decision.has_decided(),
        "Survey response submitted"
    );

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Survey response submitted successfully".to_string(),
        }),
    ))
}

/// GET /api/survey/stats - Aggregated survey statistics
pub async fn survey_stats(
    State(db): State<Arc<SurveyDb>>,
) -> Result<Json<Statistics>, AppError> {
    let statistics = compute_statistics(&db).await?;
    Ok(Json(statistics))
}

/// GET /api/survey/majors - The fixed list of majors
pub async fn list_majors(State(db): State<Arc<SurveyDb>>) -> Result<Json<Vec<Major>>, AppError> {
    let majors = db.list_majors().await?;
    Ok(Json(majors))
}

/// POST /api/survey/visit - Increment the site visit counter
///
/// The once-per-browser restriction lives client-side (localStorage); the
/// server counts every call it receives.
pub async fn record_visit(State(db): State<Arc<SurveyDb>>) -> Result<Json<VisitResponse>, AppError> {
    let visits = db.increment_visits().await?;
    Ok(Json(VisitResponse { visits }))
}

/// Fallback for unmatched routes
pub async fn route_not_found() -> AppError {
    AppError::RouteNotFound
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survey::models::{RawPreferences, ValidationError};
    use tempfile::TempDir;

    async fn create_test_db() -> (Arc<SurveyDb>, TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("survey.db");
        let db = SurveyDb::new(path.to_str().unwrap())
            .await
            .expect("db should open");
        db.seed_majors().await.expect("seeding should succeed");
        (Arc::new(db), dir)
    }

    fn valid_submission() -> Submission {
        Submission {
            has_decided: false,
            confirmed_major: None,
            preferences: Some(RawPreferences {
                first_choice: Some("Robotics".to_string()),
                second_choice: Some("Aerospace".to_string()),
                third_choice: Some("Energy Systems".to_string()),
            }),
            name: None,
        }
    }

    #[tokio::test]
    async fn submit_valid_response_returns_created() {
        let (db, _dir) = create_test_db().await;

        let result = submit_response(State(db.clone()), Json(valid_submission())).await;
        let (status, body) = result.expect("submission should succeed");
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.message, "Survey response submitted successfully");

        assert_eq!(db.count_responses().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn submit_invalid_response_persists_nothing() {
        let (db, _dir) = create_test_db().await;

        let mut submission = valid_submission();
        submission.has_decided = true;
        submission.confirmed_major = Some("Aerospace".to_string());

        let result = submit_response(State(db.clone()), Json(submission)).await;
        match result.unwrap_err() {
            AppError::Validation(ValidationError::ConfirmedMajorMismatch) => {}
            other => panic!("Expected ConfirmedMajorMismatch, got: {:?}", other),
        }

        assert_eq!(db.count_responses().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn stats_reflect_submitted_responses() {
        let (db, _dir) = create_test_db().await;

        submit_response(State(db.clone()), Json(valid_submission()))
            .await
            .expect("submission should succeed");

        let stats = survey_stats(State(db)).await.expect("stats should succeed");
        assert_eq!(stats.total_responses, 1);
        assert_eq!(stats.undecided_count, 1);
        assert_eq!(stats.first_choice_stats[0].major, "Robotics");
        assert_eq!(stats.first_choice_stats[0].count, 1);
    }

    #[tokio::test]
    async fn majors_endpoint_returns_seeded_set() {
        let (db, _dir) = create_test_db().await;

        let majors = list_majors(State(db)).await.expect("majors should load");
        assert_eq!(majors.len(), 8);
    }

    #[tokio::test]
    async fn visit_endpoint_increments() {
        let (db, _dir) = create_test_db().await;

        let first = record_visit(State(db.clone())).await.unwrap();
        let second = record_visit(State(db)).await.unwrap();
        assert_eq!(first.visits, 1);
        assert_eq!(second.visits, 2);
    }
}
