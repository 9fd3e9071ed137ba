//! API module
//!
//! Contains HTTP request handlers for the survey endpoints and the router
//! wiring shared by the binary and the integration tests.

pub mod survey;

use crate::survey::SurveyDb;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Build the application router
///
/// Route table only; middleware and CORS layers are applied by the caller.
pub fn router(db: Arc<SurveyDb>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/survey/submit", post(survey::submit_response))
        .route("/api/survey/stats", get(survey::survey_stats))
        .route("/api/survey/majors", get(survey::list_majors))
        .route("/api/survey/visit", post(survey::record_visit))
        .fallback(survey::route_not_found)
        .with_state(db)
}

/// Health check response
#[derive(serde::Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    message: String,
}

/// GET /api/health - Liveness probe
async fn health_check() -> axum::Json<HealthResponse> {
    axum::Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        message: "Backend is healthy".to_string(),
    })
}
