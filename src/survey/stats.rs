//! Survey aggregation
//!
//! Computes the grouped counts served by the stats endpoint. All figures are
//! derived in one pass from the store; if the store is unreachable the whole
//! computation fails, there is no partial result.

use crate::error::AppError;
use crate::survey::db::SurveyDb;
use crate::survey::models::{Preferences, SurveyResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// One entry of a group-by histogram
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MajorCount {
    /// Major name
    pub major: String,
    /// Number of responses counted for it
    pub count: i64,
}

/// A stored response as exposed by the stats endpoint
///
/// Internal identifiers are excluded; the decision sum type is flattened to
/// the wire shape clients expect.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    /// Ranked top-three majors
    pub preferences: Preferences,
    /// Whether the respondent has decided
    pub has_decided: bool,
    /// Confirmed major, present only when decided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed_major: Option<String>,
    /// Optional respondent name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Submission time
    pub submitted_at: DateTime<Utc>,
}

impl From<SurveyResponse> for ResponseRecord {
    fn from(response: SurveyResponse) -> Self {
        Self {
            has_decided: response.decision.has_decided(),
            confirmed_major: response.decision.confirmed_major().map(str::to_string),
            preferences: response.preferences,
            name: response.name,
            submitted_at: response.submitted_at,
        }
    }
}

/// Aggregated survey statistics
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// Count of all stored responses
    pub total_responses: i64,
    /// Current visit counter value
    pub total_visits: i64,
    /// Responses with a confirmed decision
    pub decided_count: i64,
    /// Responses still undecided
    pub undecided_count: i64,
    /// Effective first choice: confirmed major for decided respondents,
    /// first-ranked preference for undecided ones
    pub first_choice_stats: Vec<MajorCount>,
    /// Second-ranked preference across all responses
    pub second_choice_stats: Vec<MajorCount>,
    /// Third-ranked preference across all responses
    pub third_choice_stats: Vec<MajorCount>,
    /// Confirmed majors across decided responses
    pub confirmed_major_stats: Vec<MajorCount>,
    /// Every stored response, most recent first
    pub responses: Vec<ResponseRecord>,
}

/// Sum two name-to-count mappings key-wise (multiset union)
pub fn merge_counts<L, R>(left: L, right: R) -> HashMap<String, i64>
where
    L: IntoIterator<Item = (String, i64)>,
    R: IntoIterator<Item = (String, i64)>,
{
    let mut merged: HashMap<String, i64> = HashMap::new();
    for (name, count) in left.into_iter().chain(right) {
        *merged.entry(name).or_insert(0) += count;
    }
    merged
}

/// Order a histogram by count descending; tie order is not significant
fn ranked(counts: impl IntoIterator<Item = (String, i64)>) -> Vec<MajorCount> {
    let mut entries: Vec<MajorCount> = counts
        .into_iter()
        .map(|(major, count)| MajorCount { major, count })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries
}

/// Compute the full statistics payload from the store
///
/// A decided respondent's confirmed major may reflect a final decision made
/// after the initial ranking, so the first-choice histogram merges the
/// decided-by-confirmed-major and undecided-by-first-choice group-bys.
pub async fn compute_statistics(db: &SurveyDb) -> Result<Statistics, AppError> {
    let total_responses = db.count_responses().await?;
    let decided_count = db.count_decided().await?;
    let undecided_count = total_responses - decided_count;

    let confirmed_major_counts = db.confirmed_major_counts().await?;
    let first_choice_stats = ranked(merge_counts(
        confirmed_major_counts.clone(),
        db.undecided_first_choice_counts().await?,
    ));
    let second_choice_stats = ranked(db.second_choice_counts().await?);
    let third_choice_stats = ranked(db.third_choice_counts().await?);
    let confirmed_major_stats = ranked(confirmed_major_counts);

    let responses = db
        .all_responses()
        .await?
        .into_iter()
        .map(ResponseRecord::from)
        .collect();

    Ok(Statistics {
        total_responses,
        total_visits: db.visit_count().await?,
        decided_count,
        undecided_count,
        first_choice_stats,
        second_choice_stats,
        third_choice_stats,
        confirmed_major_stats,
        responses,
    })
}
