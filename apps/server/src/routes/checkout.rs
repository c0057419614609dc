//! Checkout and payment webhook routes.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Checkout Flow                                     │
//! │                                                                         │
//! │  POST /api/v1/checkout                                                  │
//! │    1. Validate input (email, country, quantities)                       │
//! │    2. Re-price every line against the catalog (never trust the         │
//! │       client's prices) + stock check                                   │
//! │    3. Quote shipping for destination/weight/subtotal                    │
//! │    4. Persist Pending order + items (one transaction)                   │
//! │    5. Upsert the customer record                                        │
//! │    6. Create the processor checkout session                             │
//! │    7. Enqueue order-placed notifications                                │
//! │    8. → { orderNumber, checkoutUrl }                                    │
//! │                                                                         │
//! │  POST /api/v1/checkout/webhook   (called by the processor)              │
//! │    1. Shared-secret header check                                        │
//! │    2. checkout.session.completed → mark order paid,                     │
//! │       decrement stock, enqueue order-paid notifications                 │
//! │    3. Anything else → acknowledged and ignored                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use frantoio_core::cart::{Cart, CartItem};
use frantoio_core::money::Money;
use frantoio_core::types::{
    Address, NotificationEvent, Order, OrderItem, OrderKind, OrderStatus, PaymentStatus, Product,
};
use frantoio_core::{validation, CoreError};
use frantoio_notify::enqueue_order_event;

use crate::error::ApiError;
use crate::payments::{
    CheckoutMode, CreateSessionRequest, SessionLineItem, WebhookEvent, EVENT_SESSION_COMPLETED,
};
use crate::SharedState;

// =============================================================================
// Request / Response
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CheckoutItem {
    pub slug: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutCustomer {
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub marketing_consent: bool,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutItem>,
    /// Defaults to a one-time purchase.
    pub kind: Option<OrderKind>,
    pub customer: CheckoutCustomer,
    pub shipping_address: Address,
    pub seller_code: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub order_id: String,
    pub order_number: String,
    /// Hosted payment page to redirect the customer to.
    pub checkout_url: String,
}

// =============================================================================
// Checkout
// =============================================================================

/// `POST /api/v1/checkout`
pub async fn create_checkout(
    State(state): State<SharedState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    if request.items.is_empty() {
        return Err(CoreError::EmptyCart.into());
    }

    validation::validate_email(&request.customer.email)?;
    validation::validate_country_code(&request.shipping_address.country)?;
    for item in &request.items {
        validation::validate_quantity(item.quantity)?;
    }

    let kind = request.kind.unwrap_or(OrderKind::OneTime);
    let country = request.shipping_address.country.trim().to_ascii_uppercase();

    // Seller attribution: a dead or mistyped code is an input error, the
    // storefront should never have offered it.
    let seller_code = match &request.seller_code {
        Some(code) => {
            validation::validate_seller_code(code)?;
            let seller = state.db.sellers().get_by_code(code).await?;
            match seller {
                Some(s) => Some(s.code),
                None => return Err(ApiError::validation(format!("Unknown seller code: {code}"))),
            }
        }
        None => None,
    };

    // Re-price every line against the catalog; the Cart merges repeated
    // slugs and enforces the line/quantity caps.
    let mut cart = Cart::new();
    let mut products: HashMap<String, Product> = HashMap::new();

    for item in &request.items {
        let product = match products.values().find(|p| p.slug == item.slug) {
            Some(known) => known.clone(),
            None => state
                .db
                .products()
                .get_by_slug(&item.slug)
                .await?
                .ok_or_else(|| ApiError::not_found("Product", &item.slug))?,
        };

        if kind == OrderKind::Subscription && !product.subscribable {
            return Err(CoreError::MixedCheckoutModes.into());
        }

        cart.add_item(CartItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price_cents: product.price_cents,
            weight_grams: product.weight_grams,
            quantity: item.quantity,
        })?;

        products.insert(product.id.clone(), product);
    }

    // Stock check on the merged quantities
    let mut vat = Money::zero();
    for line in cart.items() {
        let product = &products[&line.product_id];
        if !product.can_sell(line.quantity) {
            return Err(CoreError::InsufficientStock {
                slug: product.slug.clone(),
                available: product.stock_quantity.max(0),
                requested: line.quantity,
            }
            .into());
        }
        vat += product.price().vat_included(product.vat_rate()) * line.quantity;
    }

    let subtotal = cart.subtotal();
    let total_weight = cart.total_weight_grams();
    let order_id = uuid::Uuid::new_v4().to_string();

    let mut order_items = Vec::with_capacity(cart.line_count());
    let mut session_lines = Vec::with_capacity(cart.line_count());
    for line in cart.items() {
        let product = &products[&line.product_id];

        order_items.push(OrderItem {
            id: uuid::Uuid::new_v4().to_string(),
            order_id: order_id.clone(),
            product_id: line.product_id.clone(),
            name: line.name.clone(),
            unit_price_cents: line.unit_price_cents,
            quantity: line.quantity,
            line_total_cents: line.line_total().cents(),
            weight_grams: line.weight_grams,
        });

        session_lines.push(SessionLineItem {
            name: line.name.clone(),
            unit_amount_cents: line.unit_price_cents,
            quantity: line.quantity,
            interval: match kind {
                OrderKind::Subscription => product.subscription_interval,
                OrderKind::OneTime => None,
            },
        });
    }

    // Shipping quote for the whole parcel
    let shipping_config = state.db.shipping_config().load().await?;
    let quote = shipping_config.quote(&country, total_weight, subtotal)?;
    let total = subtotal + quote.cost();

    // Persist the pending order
    let now = Utc::now();
    let order_number = state.db.orders().next_order_number().await?;
    let mut shipping_address = request.shipping_address.clone();
    shipping_address.country = country;

    let order = Order {
        id: order_id.clone(),
        order_number,
        kind,
        status: OrderStatus::Pending,
        payment_status: PaymentStatus::Unpaid,
        customer_email: request.customer.email.trim().to_string(),
        customer_name: request.customer.name.trim().to_string(),
        customer_phone: request.customer.phone.clone(),
        shipping_address,
        seller_code,
        subtotal_cents: subtotal.cents(),
        shipping_cents: quote.cost_cents,
        vat_cents: vat.cents(),
        total_cents: total.cents(),
        total_weight_grams: total_weight,
        checkout_session_id: None,
        notes: request.notes.clone(),
        created_at: now,
        updated_at: now,
        paid_at: None,
    };

    state.db.orders().insert(&order, &order_items).await?;

    state
        .db
        .customers()
        .upsert_by_email(
            &order.customer_email,
            &order.customer_name,
            order.customer_phone.as_deref(),
            Some(&order.shipping_address),
            request.customer.marketing_consent,
        )
        .await?;

    // Create the processor session. On failure the pending order stays
    // behind for the admin to see; nothing was charged.
    let session = state
        .payments
        .create_checkout_session(&CreateSessionRequest {
            mode: match kind {
                OrderKind::OneTime => CheckoutMode::Payment,
                OrderKind::Subscription => CheckoutMode::Subscription,
            },
            currency: "eur",
            line_items: session_lines,
            shipping_amount_cents: quote.cost_cents,
            customer_email: order.customer_email.clone(),
            success_url: state.payments.success_url().to_string(),
            cancel_url: state.payments.cancel_url().to_string(),
            client_reference_id: order.id.clone(),
        })
        .await?;

    state
        .db
        .orders()
        .set_checkout_session(&order.id, &session.id)
        .await?;

    enqueue_order_event(&state.db, &state.notify, NotificationEvent::OrderPlaced, &order).await?;

    info!(
        order_number = %order.order_number,
        total = %total,
        zone = %quote.zone,
        "Checkout session created"
    );

    Ok(Json(CheckoutResponse {
        order_id: order.id,
        order_number: order.order_number,
        checkout_url: session.url,
    }))
}

// =============================================================================
// Webhook
// =============================================================================

/// `POST /api/v1/checkout/webhook`
///
/// Always answers 200 for events we understand but cannot act on
/// (unknown session, already-paid order): the processor retries on
/// non-2xx, and retrying those cannot help.
pub async fn webhook(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(event): Json<WebhookEvent>,
) -> Result<StatusCode, ApiError> {
    let presented = headers
        .get("x-webhook-secret")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if !state.payments.verify_webhook_secret(presented) {
        return Err(ApiError::unauthorized("Invalid webhook secret"));
    }

    if event.event_type != EVENT_SESSION_COMPLETED {
        return Ok(StatusCode::OK);
    }

    let session_id = &event.data.object.id;
    let order = match state.db.orders().get_by_checkout_session(session_id).await? {
        Some(order) => order,
        None => {
            warn!(session_id = %session_id, "Webhook for unknown checkout session");
            return Ok(StatusCode::OK);
        }
    };

    if order.payment_status == PaymentStatus::Paid {
        // Redelivery of an event we already processed
        return Ok(StatusCode::OK);
    }

    state.db.orders().mark_paid(&order.id).await?;

    // Stock leaves the shelf when the money arrives
    let items = state.db.orders().items_for_order(&order.id).await?;
    for item in &items {
        let tracked = state
            .db
            .products()
            .get_by_id(&item.product_id)
            .await?
            .map(|p| p.track_inventory)
            .unwrap_or(false);
        if !tracked {
            continue;
        }

        if let Err(e) = state
            .db
            .products()
            .adjust_stock(&item.product_id, -item.quantity)
            .await
        {
            warn!(
                product_id = %item.product_id,
                error = %e,
                "Stock adjustment failed for paid order"
            );
        }
    }

    let paid_order = state
        .db
        .orders()
        .get_by_id(&order.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", &order.id))?;

    enqueue_order_event(
        &state.db,
        &state.notify,
        NotificationEvent::OrderPaid,
        &paid_order,
    )
    .await?;

    info!(order_number = %paid_order.order_number, "Order paid");

    Ok(StatusCode::OK)
}
