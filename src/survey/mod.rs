//! Survey module
//!
//! Domain models, validation, persistence, and aggregation for survey
//! responses, backed by a SQLite database.

pub mod db;
pub mod models;
pub mod stats;

pub use db::SurveyDb;
pub use models::{
    is_valid_major, Decision, Major, Preferences, Submission, SurveyResponse, ValidationError,
    MAJORS,
};
pub use stats::{compute_statistics, MajorCount, ResponseRecord, Statistics};
