use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::shared::types::ApiResponse;

/// SQLSTATE raised by PostgreSQL for a malformed `~` pattern
const INVALID_REGULAR_EXPRESSION: &str = "2201B";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    /// The blob was written but its metadata record was not.
    #[error("Metadata write failed for stored object '{key}': {source}")]
    OrphanedBlob {
        key: String,
        #[source]
        source: Box<AppError>,
    },

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Map a database error raised while evaluating a search pattern.
    ///
    /// PostgreSQL's regex dialect is not identical to the one used for up-front
    /// validation, so a pattern can still be rejected by the server.
    pub fn from_search_error(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if is_invalid_regex_code(db_err.code().as_deref()) {
                return AppError::InvalidQuery(db_err.message().to_string());
            }
        }
        AppError::Database(err)
    }
}

fn is_invalid_regex_code(code: Option<&str>) -> bool {
    code == Some(INVALID_REGULAR_EXPRESSION)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                    None,
                )
            }
            AppError::NotFound(ref msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            AppError::Validation(ref msg) => (
                StatusCode::BAD_REQUEST,
                msg.clone(),
                Some(vec![msg.clone()]),
            ),
            AppError::BadRequest(ref msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::InvalidQuery(ref msg) => (
                StatusCode::BAD_REQUEST,
                "Invalid search query".to_string(),
                Some(vec![msg.clone()]),
            ),
            AppError::Unauthorized(ref msg) => (StatusCode::UNAUTHORIZED, msg.clone(), None),
            AppError::UploadFailed(ref msg) => {
                tracing::error!("Storage upload error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "Storage upload error".to_string(),
                    None,
                )
            }
            AppError::DownloadFailed(ref msg) => {
                tracing::error!("Storage download error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "Storage download error".to_string(),
                    None,
                )
            }
            AppError::OrphanedBlob { ref key, ref source } => {
                tracing::error!(orphaned_key = %key, "Metadata write failed after upload: {}", source);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "File content was stored but its metadata could not be recorded; retry the upload"
                        .to_string(),
                    None,
                )
            }
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = Json(ApiResponse::<()>::error(Some(message), errors));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
