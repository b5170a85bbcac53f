//! Book instance (copy) pages

use axum::{
    extract::{Path, State},
    response::Response,
};

use super::FormOrJson;
use crate::{
    error::AppResult,
    services::book_instances::{BookInstanceDeleteInput, BookInstanceInput},
    views::{respond, Page},
    AppState,
};

#[utoipa::path(
    get,
    path = "/catalog/bookinstances",
    tag = "bookinstances",
    responses((status = 200, description = "Book copy list page"))
)]
pub async fn bookinstance_list(State(state): State<AppState>) -> AppResult<Page> {
    let view = state.services.book_instances.list().await?;
    Page::new("bookinstance/bookinstance_list", "Book Instance List", view)
}

#[utoipa::path(
    get,
    path = "/catalog/bookinstance/{id}",
    tag = "bookinstances",
    params(("id" = String, Path, description = "Book copy ID")),
    responses(
        (status = 200, description = "Book copy detail page"),
        (status = 404, description = "Book copy not found")
    )
)]
pub async fn bookinstance_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Page> {
    let view = state.services.book_instances.detail(&id).await?;
    Page::new("bookinstance/bookinstance_detail", "Book", view)
}

#[utoipa::path(
    get,
    path = "/catalog/bookinstance/create",
    tag = "bookinstances",
    responses((status = 200, description = "Book copy form page"))
)]
pub async fn bookinstance_create_get(State(state): State<AppState>) -> AppResult<Page> {
    let view = state.services.book_instances.create_form().await?;
    Page::new("bookinstance/bookinstance_form", "Create BookInstance", view)
}

#[utoipa::path(
    post,
    path = "/catalog/bookinstance/create",
    tag = "bookinstances",
    responses(
        (status = 303, description = "Book copy created"),
        (status = 200, description = "Form re-rendered with errors")
    )
)]
pub async fn bookinstance_create_post(
    State(state): State<AppState>,
    FormOrJson(input): FormOrJson<BookInstanceInput>,
) -> AppResult<Response> {
    let outcome = state.services.book_instances.create(input).await?;
    respond(outcome, "bookinstance/bookinstance_form", "Create BookInstance")
}

#[utoipa::path(
    get,
    path = "/catalog/bookinstance/{id}/delete",
    tag = "bookinstances",
    params(("id" = String, Path, description = "Book copy ID")),
    responses(
        (status = 200, description = "Delete confirmation page"),
        (status = 404, description = "Book copy not found")
    )
)]
pub async fn bookinstance_delete_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Page> {
    let view = state.services.book_instances.delete_form(&id).await?;
    Page::new("bookinstance/bookinstance_delete", "Delete BookInstance", view)
}

#[utoipa::path(
    post,
    path = "/catalog/bookinstance/{id}/delete",
    tag = "bookinstances",
    params(("id" = String, Path, description = "Book copy ID")),
    responses((status = 303, description = "Book copy deleted"))
)]
pub async fn bookinstance_delete_post(
    State(state): State<AppState>,
    FormOrJson(input): FormOrJson<BookInstanceDeleteInput>,
) -> AppResult<Response> {
    let outcome = state.services.book_instances.delete(input).await?;
    respond(outcome, "bookinstance/bookinstance_delete", "Delete BookInstance")
}

#[utoipa::path(
    get,
    path = "/catalog/bookinstance/{id}/update",
    tag = "bookinstances",
    params(("id" = String, Path, description = "Book copy ID")),
    responses(
        (status = 200, description = "Book copy form page"),
        (status = 404, description = "Book copy not found")
    )
)]
pub async fn bookinstance_update_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Page> {
    let view = state.services.book_instances.update_form(&id).await?;
    Page::new("bookinstance/bookinstance_form", "Update BookInstance", view)
}

#[utoipa::path(
    post,
    path = "/catalog/bookinstance/{id}/update",
    tag = "bookinstances",
    params(("id" = String, Path, description = "Book copy ID")),
    responses(
        (status = 303, description = "Book copy updated"),
        (status = 200, description = "Form re-rendered with errors"),
        (status = 404, description = "Book copy not found")
    )
)]
pub async fn bookinstance_update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    FormOrJson(input): FormOrJson<BookInstanceInput>,
) -> AppResult<Response> {
    let outcome = state.services.book_instances.update(&id, input).await?;
    respond(outcome, "bookinstance/bookinstance_form", "Update BookInstance")
}
