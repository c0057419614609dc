//! HTTP route modules and router assembly.

pub mod admin;
pub mod catalog;
pub mod checkout;
pub mod content;
pub mod shipping;

use axum::extract::State;
use axum::middleware;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;

use crate::auth::admin_auth;
use crate::SharedState;

/// Paged listing envelope shared by the admin list endpoints.
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
}

/// Builds the full application router.
///
/// Public storefront routes are unauthenticated; everything under
/// `/api/v1/admin` (except login) goes through the JWT middleware.
pub fn build_router(state: SharedState) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/api/v1/products", get(catalog::list_products))
        .route("/api/v1/products/{slug}", get(catalog::get_product))
        .route("/api/v1/content/faqs", get(content::list_faqs))
        .route("/api/v1/content/pages/{slug}", get(content::get_page))
        .route("/api/v1/shipping/quote", post(shipping::quote))
        .route("/api/v1/checkout", post(checkout::create_checkout))
        .route("/api/v1/checkout/webhook", post(checkout::webhook));

    let admin_guarded = Router::new()
        .route(
            "/products",
            get(admin::list_products).post(admin::create_product),
        )
        .route(
            "/products/{id}",
            get(admin::get_product)
                .put(admin::update_product)
                .delete(admin::delete_product),
        )
        .route("/orders", get(admin::list_orders))
        .route("/orders/{id}", get(admin::get_order))
        .route("/orders/{id}/status", put(admin::update_order_status))
        .route("/customers", get(admin::list_customers))
        .route(
            "/customers/{id}",
            get(admin::get_customer).delete(admin::delete_customer),
        )
        .route("/sellers", get(admin::list_sellers).post(admin::create_seller))
        .route(
            "/sellers/{id}",
            put(admin::update_seller).delete(admin::delete_seller),
        )
        .route(
            "/shipping-config",
            get(admin::get_shipping_config).put(admin::update_shipping_config),
        )
        .route(
            "/scenarios",
            get(admin::list_scenarios).post(admin::create_scenario),
        )
        .route(
            "/scenarios/{id}",
            get(admin::get_scenario)
                .put(admin::update_scenario)
                .delete(admin::delete_scenario),
        )
        .route("/scenarios/{id}/calculate", post(admin::calculate_scenario))
        .route("/goals", get(admin::list_goals).post(admin::create_goal))
        .route("/goals/{id}", put(admin::update_goal).delete(admin::delete_goal))
        .route("/faqs", get(admin::list_faqs).post(admin::create_faq))
        .route("/faqs/{id}", put(admin::update_faq).delete(admin::delete_faq))
        .route("/pages", get(admin::list_pages))
        .route("/pages/{slug}", put(admin::upsert_page))
        .route("/templates", get(admin::list_templates))
        .route("/templates/{key}", put(admin::upsert_template))
        .route("/notifications/dead", get(admin::list_dead_notifications))
        .route_layer(middleware::from_fn_with_state(state.clone(), admin_auth));

    let admin = Router::new()
        .route("/login", post(admin::login))
        .merge(admin_guarded);

    Router::new()
        .merge(public)
        .nest("/api/v1/admin", admin)
        .with_state(state)
}

/// Health check: process is up and the database answers.
async fn health(State(state): State<SharedState>) -> Json<serde_json::Value> {
    let database = if state.db.health_check().await {
        "ok"
    } else {
        "unavailable"
    };

    Json(json!({
        "status": "healthy",
        "service": "frantoio-server",
        "database": database,
    }))
}
