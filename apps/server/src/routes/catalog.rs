//! Storefront catalog routes.

use axum::extract::{Path, State};
use axum::Json;

use frantoio_core::types::Product;

use crate::error::ApiError;
use crate::SharedState;

/// `GET /api/v1/products` - the active catalog.
pub async fn list_products(
    State(state): State<SharedState>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state.db.products().list_active().await?;
    Ok(Json(products))
}

/// `GET /api/v1/products/{slug}` - one product page.
pub async fn get_product(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Result<Json<Product>, ApiError> {
    state
        .db
        .products()
        .get_by_slug(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Product", &slug))
}
