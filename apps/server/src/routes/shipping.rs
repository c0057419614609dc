//! Storefront shipping quote route.
//!
//! The cart page calls this on every destination/cart change so the
//! customer sees the shipping cost before starting checkout.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use frantoio_core::money::Money;
use frantoio_core::shipping::ShippingQuote;
use frantoio_core::validation;

use crate::error::ApiError;
use crate::SharedState;

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    /// ISO 3166-1 alpha-2 destination.
    pub country: String,
    /// Total parcel weight in grams.
    pub weight_grams: i64,
    /// Gross cart subtotal in cents (drives the free-shipping threshold).
    pub subtotal_cents: i64,
}

/// `POST /api/v1/shipping/quote`
pub async fn quote(
    State(state): State<SharedState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<ShippingQuote>, ApiError> {
    validation::validate_country_code(&request.country)?;
    validation::validate_weight_grams(request.weight_grams)?;
    validation::validate_price_cents(request.subtotal_cents)?;

    let config = state.db.shipping_config().load().await?;
    let quote = config.quote(
        &request.country,
        request.weight_grams,
        Money::from_cents(request.subtotal_cents),
    )?;

    Ok(Json(quote))
}
