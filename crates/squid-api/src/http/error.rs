//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use squid_types::error::{ChatError, RepositoryError, ScanError};

use crate::http::response::{ApiErrorDetail, ApiResponse};

/// Where a client goes once the free scans are used up.
const UPGRADE_URL: &str = "https://squidbay.io/pricing";

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Storage failures.
    Repository(RepositoryError),
    /// Scan orchestration failures.
    Scan(ScanError),
    /// Chat failures that are not model failures.
    Chat(ChatError),
    /// Missing resource.
    NotFound(String),
    /// Validation error.
    Validation(String),
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        AppError::Repository(e)
    }
}

impl From<ScanError> for AppError {
    fn from(e: ScanError) -> Self {
        AppError::Scan(e)
    }
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String, Option<serde_json::Value>) {
        match self {
            AppError::Repository(RepositoryError::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }
            AppError::Repository(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", e.to_string(), None)
            }
            AppError::Scan(ScanError::QuotaExceeded { used, allowed }) => (
                StatusCode::PAYMENT_REQUIRED,
                "QUOTA_EXCEEDED",
                "Free scan limit reached".to_string(),
                Some(json!({
                    "scans_used": used,
                    "scans_free": allowed,
                    "upgrade": UPGRADE_URL,
                })),
            ),
            AppError::Scan(ScanError::MissingTarget) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "repo URL required: set GITHUB_REPO or pass repo in the body".to_string(),
                None,
            ),
            AppError::Scan(ScanError::Scanner(msg)) => {
                (StatusCode::BAD_GATEWAY, "SCANNER_ERROR", msg.clone(), None)
            }
            AppError::Scan(ScanError::Storage(e)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", e.to_string(), None)
            }
            AppError::Chat(ChatError::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }
            AppError::Chat(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CHAT_ERROR", e.to_string(), None)
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = self.parts();

        if status.is_server_error() {
            tracing::error!(code, error = %message, "Request failed");
        }

        ApiResponse::error(
            status,
            ApiErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        )
        .into_response()
    }
}
