//! Page handlers and routing for the catalog

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod catalog;
pub mod genres;
pub mod health;
pub mod openapi;

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    response::Redirect,
    routing::get,
    Json, Router,
};
use axum_extra::extract::Form;
use serde::de::DeserializeOwned;

use crate::{error::AppError, AppState};

/// Write-flow body: form-encoded (repeated keys allowed) or JSON
pub struct FormOrJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for FormOrJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|ct| ct.starts_with("application/json"))
            .unwrap_or(false);

        if is_json {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            Ok(FormOrJson(value))
        } else {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            Ok(FormOrJson(value))
        }
    }
}

async fn not_found() -> AppError {
    AppError::NotFound("Not Found".to_string())
}

/// Create the catalog router (without middleware layers)
pub fn router(state: AppState) -> Router {
    let catalog = Router::new()
        .route("/", get(catalog::index))
        // Books
        .route("/books", get(books::book_list))
        .route("/book/create", get(books::book_create_get).post(books::book_create_post))
        .route("/book/:id", get(books::book_detail))
        .route("/book/:id/delete", get(books::book_delete_get).post(books::book_delete_post))
        .route("/book/:id/update", get(books::book_update_get).post(books::book_update_post))
        // Authors
        .route("/authors", get(authors::author_list))
        .route("/author/create", get(authors::author_create_get).post(authors::author_create_post))
        .route("/author/:id", get(authors::author_detail))
        .route("/author/:id/delete", get(authors::author_delete_get).post(authors::author_delete_post))
        .route("/author/:id/update", get(authors::author_update_get).post(authors::author_update_post))
        // Genres
        .route("/genres", get(genres::genre_list))
        .route("/genre/create", get(genres::genre_create_get).post(genres::genre_create_post))
        .route("/genre/:id", get(genres::genre_detail))
        .route("/genre/:id/delete", get(genres::genre_delete_get).post(genres::genre_delete_post))
        .route("/genre/:id/update", get(genres::genre_update_get).post(genres::genre_update_post))
        // Book instances
        .route("/bookinstances", get(book_instances::bookinstance_list))
        .route(
            "/bookinstance/create",
            get(book_instances::bookinstance_create_get).post(book_instances::bookinstance_create_post),
        )
        .route("/bookinstance/:id", get(book_instances::bookinstance_detail))
        .route(
            "/bookinstance/:id/delete",
            get(book_instances::bookinstance_delete_get).post(book_instances::bookinstance_delete_post),
        )
        .route(
            "/bookinstance/:id/update",
            get(book_instances::bookinstance_update_get).post(book_instances::bookinstance_update_post),
        );

    Router::new()
        .route("/", get(|| async { Redirect::to("/catalog") }))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest("/catalog", catalog)
        .fallback(not_found)
        .with_state(state)
        .merge(openapi::create_openapi_router())
}
