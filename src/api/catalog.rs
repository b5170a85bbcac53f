//! Home page

use axum::extract::State;

use crate::{views::Page, AppState};

const HOME_TITLE: &str = "Local Library Home";

/// Catalog home page with record counts.
///
/// Failing to gather the counts still renders the page, with the error set.
#[utoipa::path(
    get,
    path = "/catalog",
    tag = "catalog",
    responses((status = 200, description = "Home page with record counts"))
)]
pub async fn index(State(state): State<AppState>) -> Page {
    let counts = state.services.catalog.counts().await;
    let page = counts.and_then(|counts| Page::new("index", HOME_TITLE, counts));
    page.unwrap_or_else(|e| {
        tracing::error!("Failed to load catalog counts: {}", e);
        Page::failed("index", HOME_TITLE, &e)
    })
}
