//! Error types for the catalog server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use once_cell::sync::OnceCell;
use thiserror::Error;

use crate::views::ErrorPage;

/// Whether error pages may carry diagnostic detail (set once at startup)
static EXPOSE_DETAILS: OnceCell<bool> = OnceCell::new();

/// Enable or disable diagnostic detail on error pages.
///
/// Only the first call has an effect; later calls are ignored.
pub fn expose_error_details(enabled: bool) {
    let _ = EXPOSE_DETAILS.set(enabled);
}

fn details_exposed() -> bool {
    EXPOSE_DETAILS.get().copied().unwrap_or(false)
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status code the error page is rendered with
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::NotFound(msg) | AppError::Validation(msg) | AppError::BadRequest(msg) => {
                msg.clone()
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
        };

        let detail = details_exposed().then(|| self.to_string());

        ErrorPage::new(status, message, detail).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

/// Parse an identity received as text (path segment or form field).
///
/// Anything that is not a positive integer cannot name a stored record,
/// so it is reported as a lookup miss.
pub fn parse_id(raw: &str, kind: &str) -> AppResult<i32> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::NotFound(format!("{} {} not found", kind, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Database(sqlx::Error::RowNotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42", "Book").unwrap(), 42);
        assert_eq!(parse_id(" 7 ", "Book").unwrap(), 7);
        assert!(matches!(parse_id("abc", "Book"), Err(AppError::NotFound(_))));
        assert!(matches!(parse_id("0", "Book"), Err(AppError::NotFound(_))));
        assert!(matches!(parse_id("", "Book"), Err(AppError::NotFound(_))));
    }
}
