//! Presentation boundary
//!
//! A page is a template name plus the property mapping handed to it. Pages are
//! serialized as JSON documents; a templating front-end renders them.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    models::Resource,
    services::Outcome,
};

/// A rendered page: template, title and page-specific data
#[derive(Debug, Serialize)]
pub struct Page {
    pub status: &'static str,
    pub template: &'static str,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub data: serde_json::Value,
}

impl Page {
    pub fn new(
        template: &'static str,
        title: impl Into<String>,
        data: impl Serialize,
    ) -> AppResult<Self> {
        let data = serde_json::to_value(data)
            .map_err(|e| AppError::Internal(format!("Failed to serialize page data: {}", e)))?;
        Ok(Self {
            status: "ok",
            template,
            title: title.into(),
            error: None,
            data,
        })
    }

    /// Page rendered without data because gathering it failed
    pub fn failed(template: &'static str, title: impl Into<String>, error: &AppError) -> Self {
        Self {
            status: "error",
            template,
            title: title.into(),
            error: Some(match error {
                AppError::Database(_) => "Database error".to_string(),
                other => other.to_string(),
            }),
            data: serde_json::Value::Null,
        }
    }
}

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    status: u16,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

/// Generic error page, rendered with the error's HTTP status
#[derive(Debug, Serialize)]
pub struct ErrorPage {
    #[serde(skip)]
    code: StatusCode,
    status: &'static str,
    template: &'static str,
    title: String,
    error: ErrorBody,
}

impl ErrorPage {
    pub fn new(code: StatusCode, message: String, detail: Option<String>) -> Self {
        Self {
            code,
            status: "error",
            template: "error",
            title: code.canonical_reason().unwrap_or("Error").to_string(),
            error: ErrorBody {
                status: code.as_u16(),
                message,
                detail,
            },
        }
    }
}

impl IntoResponse for ErrorPage {
    fn into_response(self) -> Response {
        (self.code, Json(self)).into_response()
    }
}

/// A record together with its canonical location
#[derive(Debug, Clone, Serialize)]
pub struct Linked<T> {
    #[serde(flatten)]
    pub item: T,
    pub url: String,
}

impl<T: Resource> From<T> for Linked<T> {
    fn from(item: T) -> Self {
        let url = item.url();
        Self { item, url }
    }
}

/// Attach canonical locations to a list of records
pub fn linked<T: Resource>(items: Vec<T>) -> Vec<Linked<T>> {
    items.into_iter().map(Linked::from).collect()
}

/// Turn a controller outcome into a response: render the view or redirect
pub fn respond<V: Serialize>(
    outcome: Outcome<V>,
    template: &'static str,
    title: &str,
) -> AppResult<Response> {
    match outcome {
        Outcome::Render(view) => Ok(Page::new(template, title, view)?.into_response()),
        Outcome::Redirect(location) => Ok(Redirect::to(&location).into_response()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_serialization() {
        let page = Page::new("book/book_list", "Book List", json!({ "book_list": [] })).unwrap();
        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(value["status"], "ok");
        assert_eq!(value["template"], "book/book_list");
        assert_eq!(value["title"], "Book List");
        assert!(value.get("error").is_none());
        assert_eq!(value["data"]["book_list"], json!([]));
    }

    #[test]
    fn test_failed_page_carries_error() {
        let page = Page::failed("index", "Local Library Home", &AppError::Internal("boom".into()));
        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["data"], serde_json::Value::Null);
        assert!(value["error"].as_str().unwrap().contains("boom"));
    }

    #[test]
    fn test_error_page_hides_missing_detail() {
        let page = ErrorPage::new(StatusCode::NOT_FOUND, "Book 3 not found".into(), None);
        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(value["template"], "error");
        assert_eq!(value["error"]["status"], 404);
        assert!(value["error"].get("detail").is_none());
    }

    #[test]
    fn test_redirect_outcome() {
        let response = respond::<()>(Outcome::Redirect("/catalog/books".into()), "x", "x").unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/catalog/books");
    }
}
