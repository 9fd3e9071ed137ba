//! Error types and error handling for the application
//!
//! This module defines custom error types that can be converted to HTTP responses.
//! All errors implement `IntoResponse` to provide consistent error formatting.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::survey::ValidationError;

/// Application-level error types
///
/// All errors that can occur in the application are represented by this enum.
/// Each variant implements automatic conversion to HTTP responses via `IntoResponse`.
#[derive(Error, Debug)]
pub enum AppError {
    /// A submission violated a domain rule; reported back verbatim
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The survey store could not be reached or the query failed
    #[error("Survey store unavailable")]
    Store(#[from] sqlx::Error),

    /// No route matched the request path
    #[error("Route not found")]
    RouteNotFound,

    /// Internal server error (catch-all for unexpected errors)
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Store(e) => {
                // Driver details go to the log, never to the client.
                tracing::error!(error = %e, "survey store failure");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::RouteNotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_bad_request() {
        let err = AppError::Validation(ValidationError::DuplicatePreferences);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn store_errors_map_to_internal_server_error() {
        let err = AppError::Store(sqlx::Error::PoolClosed);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unmatched_route_maps_to_not_found() {
        let response = AppError::RouteNotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
