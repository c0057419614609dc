//! Storefront content routes: FAQ and legal pages.

use axum::extract::{Path, State};
use axum::Json;

use frantoio_core::types::{Faq, LegalPage};

use crate::error::ApiError;
use crate::SharedState;

/// `GET /api/v1/content/faqs` - published FAQ entries in display order.
pub async fn list_faqs(State(state): State<SharedState>) -> Result<Json<Vec<Faq>>, ApiError> {
    let faqs = state.db.content().list_published_faqs().await?;
    Ok(Json(faqs))
}

/// `GET /api/v1/content/pages/{slug}` - one legal/marketing page.
pub async fn get_page(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Result<Json<LegalPage>, ApiError> {
    state
        .db
        .content()
        .get_page_by_slug(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Page", &slug))
}
