//! Caller-facing error types for `GeoScan`
//!
//! Upstream provider failures never show up here; they are absorbed by the
//! scan aggregator and surface only as absent fields in the response.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

/// Main error type for the `GeoScan` service
#[derive(Error, Debug)]
pub enum GeoScanError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// A requested resource does not exist
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Location catalog storage errors
    #[error("Catalog error: {source}")]
    Catalog {
        #[from]
        source: sqlx::Error,
    },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl GeoScanError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            GeoScanError::Validation { message } | GeoScanError::NotFound { message } => {
                message.clone()
            }
            GeoScanError::Config { .. } => "Service is not configured correctly".to_string(),
            GeoScanError::Catalog { .. } => "Location catalog is unavailable".to_string(),
            GeoScanError::Io { .. } => "Internal error".to_string(),
        }
    }

    /// HTTP status this error is reported with
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            GeoScanError::Validation { .. } => StatusCode::BAD_REQUEST,
            GeoScanError::NotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GeoScanError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            warn!("Request failed: {self:?}");
        }
        (status, Json(json!({ "error": self.user_message() }))).into_response()
    }
}
