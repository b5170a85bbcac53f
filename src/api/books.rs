//! Book pages

use axum::{
    extract::{Path, State},
    response::Response,
};

use super::FormOrJson;
use crate::{
    error::AppResult,
    services::books::{BookDeleteInput, BookInput},
    views::{respond, Page},
    AppState,
};

/// List all books
#[utoipa::path(
    get,
    path = "/catalog/books",
    tag = "books",
    responses(
        (status = 200, description = "Book list page")
    )
)]
pub async fn book_list(State(state): State<AppState>) -> AppResult<Page> {
    let view = state.services.books.list().await?;
    Page::new("book/book_list", "Book List", view)
}

/// Book details with copies
#[utoipa::path(
    get,
    path = "/catalog/book/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book detail page"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn book_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Page> {
    let view = state.services.books.detail(&id).await?;
    let title = view.book.item.title.clone();
    Page::new("book/book_detail", title, view)
}

/// Blank book form
#[utoipa::path(
    get,
    path = "/catalog/book/create",
    tag = "books",
    responses(
        (status = 200, description = "Book form page")
    )
)]
pub async fn book_create_get(State(state): State<AppState>) -> AppResult<Page> {
    let view = state.services.books.create_form().await?;
    Page::new("book/book_form", "Create Book", view)
}

/// Create a book
#[utoipa::path(
    post,
    path = "/catalog/book/create",
    tag = "books",
    responses(
        (status = 303, description = "Book created, redirect to its page"),
        (status = 200, description = "Form re-rendered with errors")
    )
)]
pub async fn book_create_post(
    State(state): State<AppState>,
    FormOrJson(input): FormOrJson<BookInput>,
) -> AppResult<Response> {
    let outcome = state.services.books.create(input).await?;
    respond(outcome, "book/book_form", "Create Book")
}

/// Book delete confirmation
#[utoipa::path(
    get,
    path = "/catalog/book/{id}/delete",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Delete confirmation page"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn book_delete_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Page> {
    let view = state.services.books.delete_form(&id).await?;
    Page::new("book/book_delete", "Delete Book", view)
}

/// Delete a book that has no copies
#[utoipa::path(
    post,
    path = "/catalog/book/{id}/delete",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    responses(
        (status = 303, description = "Book deleted, redirect to the book list"),
        (status = 200, description = "Copies exist, confirmation page re-rendered")
    )
)]
pub async fn book_delete_post(
    State(state): State<AppState>,
    FormOrJson(input): FormOrJson<BookDeleteInput>,
) -> AppResult<Response> {
    let outcome = state.services.books.delete(input).await?;
    respond(outcome, "book/book_delete", "Delete Book")
}

/// Book form pre-filled for update
#[utoipa::path(
    get,
    path = "/catalog/book/{id}/update",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book form page"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn book_update_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Page> {
    let view = state.services.books.update_form(&id).await?;
    Page::new("book/book_form", "Update Book", view)
}

/// Replace a book
#[utoipa::path(
    post,
    path = "/catalog/book/{id}/update",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    responses(
        (status = 303, description = "Book updated, redirect to its page"),
        (status = 200, description = "Form re-rendered with errors"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn book_update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    FormOrJson(input): FormOrJson<BookInput>,
) -> AppResult<Response> {
    let outcome = state.services.books.update(&id, input).await?;
    respond(outcome, "book/book_form", "Update Book")
}
