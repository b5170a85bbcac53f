//! Author pages

use axum::{
    extract::{Path, State},
    response::Response,
};

use super::FormOrJson;
use crate::{
    error::AppResult,
    services::authors::{AuthorDeleteInput, AuthorInput},
    views::{respond, Page},
    AppState,
};

/// List all authors
#[utoipa::path(
    get,
    path = "/catalog/authors",
    tag = "authors",
    responses((status = 200, description = "Author list page"))
)]
pub async fn author_list(State(state): State<AppState>) -> AppResult<Page> {
    let view = state.services.authors.list().await?;
    Page::new("author/author_list", "Author List", view)
}

/// Author details with books
#[utoipa::path(
    get,
    path = "/catalog/author/{id}",
    tag = "authors",
    params(("id" = String, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author detail page"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn author_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Page> {
    let view = state.services.authors.detail(&id).await?;
    Page::new("author/author_detail", "Author Detail", view)
}

#[utoipa::path(
    get,
    path = "/catalog/author/create",
    tag = "authors",
    responses((status = 200, description = "Author form page"))
)]
pub async fn author_create_get(State(state): State<AppState>) -> AppResult<Page> {
    Page::new("author/author_form", "Create Author", state.services.authors.create_form())
}

#[utoipa::path(
    post,
    path = "/catalog/author/create",
    tag = "authors",
    responses(
        (status = 303, description = "Author created"),
        (status = 200, description = "Form re-rendered with errors")
    )
)]
pub async fn author_create_post(
    State(state): State<AppState>,
    FormOrJson(input): FormOrJson<AuthorInput>,
) -> AppResult<Response> {
    let outcome = state.services.authors.create(input).await?;
    respond(outcome, "author/author_form", "Create Author")
}

#[utoipa::path(
    get,
    path = "/catalog/author/{id}/delete",
    tag = "authors",
    params(("id" = String, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Delete confirmation page"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn author_delete_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Page> {
    let view = state.services.authors.delete_form(&id).await?;
    Page::new("author/author_delete", "Delete Author", view)
}

#[utoipa::path(
    post,
    path = "/catalog/author/{id}/delete",
    tag = "authors",
    params(("id" = String, Path, description = "Author ID")),
    responses(
        (status = 303, description = "Author deleted"),
        (status = 200, description = "Books exist, confirmation page re-rendered")
    )
)]
pub async fn author_delete_post(
    State(state): State<AppState>,
    FormOrJson(input): FormOrJson<AuthorDeleteInput>,
) -> AppResult<Response> {
    let outcome = state.services.authors.delete(input).await?;
    respond(outcome, "author/author_delete", "Delete Author")
}

#[utoipa::path(
    get,
    path = "/catalog/author/{id}/update",
    tag = "authors",
    params(("id" = String, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author form page"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn author_update_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Page> {
    let view = state.services.authors.update_form(&id).await?;
    Page::new("author/author_form", "Update Author", view)
}

#[utoipa::path(
    post,
    path = "/catalog/author/{id}/update",
    tag = "authors",
    params(("id" = String, Path, description = "Author ID")),
    responses(
        (status = 303, description = "Author updated"),
        (status = 200, description = "Form re-rendered with errors"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn author_update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    FormOrJson(input): FormOrJson<AuthorInput>,
) -> AppResult<Response> {
    let outcome = state.services.authors.update(&id, input).await?;
    respond(outcome, "author/author_form", "Update Author")
}
