use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::acquisition::fetcher::FetchError;
use crate::sections::Section;

/// Failures inside the export pipeline.
///
/// None of these are fatal: the orchestrators turn them into summary fields,
/// and the HTTP layer maps whatever still escapes into a status code.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No usable profile data could be obtained: {0}")]
    AcquisitionFailure(String),

    #[error("Section '{section}' could not be mapped: {reason}")]
    SectionMappingFault { section: Section, reason: String },

    #[error("Pagination for '{section}' stopped after {pages} page(s): {reason}")]
    PaginationBailout {
        section: Section,
        pages: u32,
        reason: String,
    },

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Invalid page identity: {0}")]
    InvalidPage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Upstream(msg) => {
                tracing::warn!("Upstream error: {msg}");
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", msg.clone())
            }
            AppError::Export(ExportError::InvalidPage(msg)) => {
                (StatusCode::BAD_REQUEST, "INVALID_PAGE", msg.clone())
            }
            AppError::Export(e @ ExportError::AcquisitionFailure(_))
            | AppError::Export(e @ ExportError::Fetch(_)) => {
                tracing::warn!("Acquisition error: {e}");
                (StatusCode::BAD_GATEWAY, "ACQUISITION_ERROR", e.to_string())
            }
            AppError::Export(e) => {
                tracing::error!("Export error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EXPORT_ERROR",
                    "The profile could not be exported".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
