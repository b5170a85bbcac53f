//! Genre pages

use axum::{
    extract::{Path, State},
    response::Response,
};

use super::FormOrJson;
use crate::{
    error::AppResult,
    services::genres::{GenreDeleteInput, GenreInput},
    views::{respond, Page},
    AppState,
};

#[utoipa::path(
    get,
    path = "/catalog/genres",
    tag = "genres",
    responses((status = 200, description = "Genre list page"))
)]
pub async fn genre_list(State(state): State<AppState>) -> AppResult<Page> {
    let view = state.services.genres.list().await?;
    Page::new("genre/genre_list", "Genre List", view)
}

#[utoipa::path(
    get,
    path = "/catalog/genre/{id}",
    tag = "genres",
    params(("id" = String, Path, description = "Genre ID")),
    responses(
        (status = 200, description = "Genre detail page"),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn genre_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Page> {
    let view = state.services.genres.detail(&id).await?;
    Page::new("genre/genre_detail", "Genre Detail", view)
}

#[utoipa::path(
    get,
    path = "/catalog/genre/create",
    tag = "genres",
    responses((status = 200, description = "Genre form page"))
)]
pub async fn genre_create_get(State(state): State<AppState>) -> AppResult<Page> {
    Page::new("genre/genre_form", "Create Genre", state.services.genres.create_form())
}

#[utoipa::path(
    post,
    path = "/catalog/genre/create",
    tag = "genres",
    responses(
        (status = 303, description = "Genre created, or the existing genre of that name"),
        (status = 200, description = "Form re-rendered with errors")
    )
)]
pub async fn genre_create_post(
    State(state): State<AppState>,
    FormOrJson(input): FormOrJson<GenreInput>,
) -> AppResult<Response> {
    let outcome = state.services.genres.create(input).await?;
    respond(outcome, "genre/genre_form", "Create Genre")
}

#[utoipa::path(
    get,
    path = "/catalog/genre/{id}/delete",
    tag = "genres",
    params(("id" = String, Path, description = "Genre ID")),
    responses(
        (status = 200, description = "Delete confirmation page"),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn genre_delete_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Page> {
    let view = state.services.genres.delete_form(&id).await?;
    Page::new("genre/genre_delete", "Delete Genre", view)
}

#[utoipa::path(
    post,
    path = "/catalog/genre/{id}/delete",
    tag = "genres",
    params(("id" = String, Path, description = "Genre ID")),
    responses(
        (status = 303, description = "Genre deleted"),
        (status = 200, description = "Books exist, confirmation page re-rendered")
    )
)]
pub async fn genre_delete_post(
    State(state): State<AppState>,
    FormOrJson(input): FormOrJson<GenreDeleteInput>,
) -> AppResult<Response> {
    let outcome = state.services.genres.delete(input).await?;
    respond(outcome, "genre/genre_delete", "Delete Genre")
}

#[utoipa::path(
    get,
    path = "/catalog/genre/{id}/update",
    tag = "genres",
    params(("id" = String, Path, description = "Genre ID")),
    responses(
        (status = 200, description = "Genre form page"),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn genre_update_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Page> {
    let view = state.services.genres.update_form(&id).await?;
    Page::new("genre/genre_form", "Update Genre", view)
}

#[utoipa::path(
    post,
    path = "/catalog/genre/{id}/update",
    tag = "genres",
    params(("id" = String, Path, description = "Genre ID")),
    responses(
        (status = 303, description = "Genre updated"),
        (status = 200, description = "Form re-rendered with errors"),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn genre_update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    FormOrJson(input): FormOrJson<GenreInput>,
) -> AppResult<Response> {
    let outcome = state.services.genres.update(&id, input).await?;
    respond(outcome, "genre/genre_form", "Update Genre")
}
