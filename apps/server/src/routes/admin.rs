//! Admin back-office routes.
//!
//! Everything here (except `login`) sits behind the JWT middleware in
//! the router. Handlers are thin: validate, call a repository, map the
//! result. Business rules (status transitions, tariff validation,
//! scenario math) live in frantoio-core.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use frantoio_core::scenario::{Goal, Scenario, ScenarioOutcome};
use frantoio_core::shipping::ShippingConfig;
use frantoio_core::types::{
    Customer, EmailTemplate, Faq, LegalPage, NotificationEvent, NotificationOutboxEntry, Order,
    OrderItem, OrderStatus, Product, Seller, SubscriptionInterval,
};
use frantoio_core::{validation, CoreError};
use frantoio_notify::enqueue_order_event;

use crate::auth::verify_password;
use crate::error::ApiError;
use crate::routes::PaginatedResponse;
use crate::SharedState;

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// =============================================================================
// Login
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// `POST /api/v1/admin/login`
pub async fn login(
    State(state): State<SharedState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let hash = state
        .config
        .admin_password_hash
        .as_deref()
        .ok_or_else(|| ApiError::unauthorized("Admin login is not configured"))?;

    if !verify_password(&request.password, hash) {
        return Err(ApiError::unauthorized("Wrong password"));
    }

    let token = state.jwt.issue()?;
    info!("Admin logged in");

    Ok(Json(LoginResponse { token }))
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ProductPayload {
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub compare_at_price_cents: Option<i64>,
    pub weight_grams: i64,
    #[serde(default = "default_vat_bps")]
    pub vat_rate_bps: u32,
    #[serde(default)]
    pub stock_quantity: i64,
    #[serde(default = "default_true")]
    pub track_inventory: bool,
    #[serde(default)]
    pub subscribable: bool,
    pub subscription_interval: Option<SubscriptionInterval>,
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_vat_bps() -> u32 {
    frantoio_core::DEFAULT_VAT_BPS
}

fn default_true() -> bool {
    true
}

fn validate_product_payload(payload: &ProductPayload) -> Result<(), ApiError> {
    validation::validate_slug(&payload.slug)?;
    validation::validate_product_name(&payload.name)?;
    validation::validate_price_cents(payload.price_cents)?;
    validation::validate_weight_grams(payload.weight_grams)?;
    validation::validate_vat_bps(payload.vat_rate_bps)?;
    Ok(())
}

/// `GET /api/v1/admin/products`
pub async fn list_products(
    State(state): State<SharedState>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.db.products().list_all().await?))
}

/// `GET /api/v1/admin/products/{id}`
pub async fn get_product(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Product", &id))
}

/// `POST /api/v1/admin/products`
pub async fn create_product(
    State(state): State<SharedState>,
    Json(payload): Json<ProductPayload>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    validate_product_payload(&payload)?;

    let now = Utc::now();
    let product = Product {
        id: new_id(),
        slug: payload.slug,
        name: payload.name,
        description: payload.description,
        price_cents: payload.price_cents,
        compare_at_price_cents: payload.compare_at_price_cents,
        weight_grams: payload.weight_grams,
        vat_rate_bps: payload.vat_rate_bps,
        stock_quantity: payload.stock_quantity,
        track_inventory: payload.track_inventory,
        subscribable: payload.subscribable,
        subscription_interval: payload.subscription_interval,
        image_url: payload.image_url,
        is_active: payload.is_active,
        created_at: now,
        updated_at: now,
    };

    state.db.products().insert(&product).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /api/v1/admin/products/{id}`
pub async fn update_product(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<Product>, ApiError> {
    validate_product_payload(&payload)?;

    let existing = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &id))?;

    let product = Product {
        id: existing.id,
        slug: payload.slug,
        name: payload.name,
        description: payload.description,
        price_cents: payload.price_cents,
        compare_at_price_cents: payload.compare_at_price_cents,
        weight_grams: payload.weight_grams,
        vat_rate_bps: payload.vat_rate_bps,
        stock_quantity: payload.stock_quantity,
        track_inventory: payload.track_inventory,
        subscribable: payload.subscribable,
        subscription_interval: payload.subscription_interval,
        image_url: payload.image_url,
        is_active: payload.is_active,
        created_at: existing.created_at,
        updated_at: existing.updated_at,
    };

    state.db.products().update(&product).await?;

    state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Product", &id))
}

/// `DELETE /api/v1/admin/products/{id}` (soft delete)
pub async fn delete_product(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.db.products().soft_delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// `GET /api/v1/admin/orders`
pub async fn list_orders(
    State(state): State<SharedState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PaginatedResponse<Order>>, ApiError> {
    let page = params.page.unwrap_or(1).max(1);
    let per_page = params.per_page.unwrap_or(20).clamp(1, 100);

    let orders = state
        .db
        .orders()
        .list(per_page, (page - 1) * per_page)
        .await?;
    let total = state.db.orders().count().await?;

    Ok(Json(PaginatedResponse {
        data: orders,
        total,
        page,
    }))
}

/// `GET /api/v1/admin/orders/{id}`
pub async fn get_order(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<OrderDetail>, ApiError> {
    let order = state
        .db
        .orders()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", &id))?;
    let items = state.db.orders().items_for_order(&id).await?;

    Ok(Json(OrderDetail { order, items }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// `PUT /api/v1/admin/orders/{id}/status`
///
/// Enforces the fulfilment state machine; moving to Shipped queues the
/// customer's shipping notification.
pub async fn update_order_status(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, ApiError> {
    let order = state
        .db
        .orders()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", &id))?;

    if !order.status.can_transition_to(request.status) {
        return Err(CoreError::InvalidStatusTransition {
            order_id: order.id,
            current_status: order.status.as_str().to_string(),
            requested_status: request.status.as_str().to_string(),
        }
        .into());
    }

    state.db.orders().update_status(&id, request.status).await?;

    let updated = state
        .db
        .orders()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", &id))?;

    if request.status == OrderStatus::Shipped {
        enqueue_order_event(
            &state.db,
            &state.notify,
            NotificationEvent::OrderShipped,
            &updated,
        )
        .await?;
    }

    Ok(Json(updated))
}

// =============================================================================
// Customers
// =============================================================================

/// `GET /api/v1/admin/customers`
pub async fn list_customers(
    State(state): State<SharedState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PaginatedResponse<Customer>>, ApiError> {
    let page = params.page.unwrap_or(1).max(1);
    let per_page = params.per_page.unwrap_or(20).clamp(1, 100);

    let customers = state
        .db
        .customers()
        .list(per_page, (page - 1) * per_page)
        .await?;
    let total = state.db.customers().count().await?;

    Ok(Json(PaginatedResponse {
        data: customers,
        total,
        page,
    }))
}

/// `GET /api/v1/admin/customers/{id}`
pub async fn get_customer(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Customer>, ApiError> {
    state
        .db
        .customers()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Customer", &id))
}

/// `DELETE /api/v1/admin/customers/{id}` (GDPR erasure)
pub async fn delete_customer(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.db.customers().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Sellers
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SellerPayload {
    pub code: String,
    pub name: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub commission_bps: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn validate_seller_payload(payload: &SellerPayload) -> Result<(), ApiError> {
    validation::validate_seller_code(&payload.code)?;
    validation::validate_product_name(&payload.name)?;
    validation::validate_commission_bps(payload.commission_bps)?;
    if let Some(email) = &payload.contact_email {
        validation::validate_email(email)?;
    }
    Ok(())
}

/// `GET /api/v1/admin/sellers`
pub async fn list_sellers(State(state): State<SharedState>) -> Result<Json<Vec<Seller>>, ApiError> {
    Ok(Json(state.db.sellers().list().await?))
}

/// `POST /api/v1/admin/sellers`
pub async fn create_seller(
    State(state): State<SharedState>,
    Json(payload): Json<SellerPayload>,
) -> Result<(StatusCode, Json<Seller>), ApiError> {
    validate_seller_payload(&payload)?;

    let now = Utc::now();
    let seller = Seller {
        id: new_id(),
        code: payload.code,
        name: payload.name,
        contact_email: payload.contact_email,
        contact_phone: payload.contact_phone,
        commission_bps: payload.commission_bps,
        is_active: payload.is_active,
        created_at: now,
        updated_at: now,
    };

    state.db.sellers().insert(&seller).await?;
    Ok((StatusCode::CREATED, Json(seller)))
}

/// `PUT /api/v1/admin/sellers/{id}`
pub async fn update_seller(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<SellerPayload>,
) -> Result<Json<Seller>, ApiError> {
    validate_seller_payload(&payload)?;

    let existing = state
        .db
        .sellers()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Seller", &id))?;

    let seller = Seller {
        id: existing.id,
        code: payload.code,
        name: payload.name,
        contact_email: payload.contact_email,
        contact_phone: payload.contact_phone,
        commission_bps: payload.commission_bps,
        is_active: payload.is_active,
        created_at: existing.created_at,
        updated_at: existing.updated_at,
    };

    state.db.sellers().update(&seller).await?;

    state
        .db
        .sellers()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Seller", &id))
}

/// `DELETE /api/v1/admin/sellers/{id}` (deactivation)
pub async fn delete_seller(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.db.sellers().soft_delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Shipping configuration
// =============================================================================

/// `GET /api/v1/admin/shipping-config`
pub async fn get_shipping_config(
    State(state): State<SharedState>,
) -> Result<Json<ShippingConfig>, ApiError> {
    Ok(Json(state.db.shipping_config().load().await?))
}

/// `PUT /api/v1/admin/shipping-config`
///
/// The document is validated as a whole before it replaces the old one;
/// a broken tariff table must never reach the storefront.
pub async fn update_shipping_config(
    State(state): State<SharedState>,
    Json(config): Json<ShippingConfig>,
) -> Result<Json<ShippingConfig>, ApiError> {
    config.validate()?;
    for zone in &config.zones {
        for country in &zone.countries {
            validation::validate_country_code(country)?;
        }
    }

    state.db.shipping_config().save(&config).await?;
    info!("Shipping configuration updated");

    Ok(Json(config))
}

// =============================================================================
// Scenarios
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ScenarioPayload {
    pub name: String,
    pub notes: Option<String>,
    pub bottles_produced: i64,
    pub sell_through_bps: u32,
    pub retail_price_cents: i64,
    pub direct_share_bps: u32,
    pub reseller_price_cents: i64,
    pub production_cost_cents: i64,
    pub packaging_cost_cents: i64,
    pub shipping_cost_cents: i64,
    pub bottles_per_order: i64,
    pub fixed_costs_cents: i64,
    pub payment_fee_bps: u32,
}

fn validate_scenario_payload(payload: &ScenarioPayload) -> Result<(), ApiError> {
    validation::validate_product_name(&payload.name)?;
    validation::validate_vat_bps(payload.sell_through_bps)?;
    validation::validate_vat_bps(payload.direct_share_bps)?;
    validation::validate_price_cents(payload.retail_price_cents)?;
    validation::validate_price_cents(payload.reseller_price_cents)?;
    if payload.bottles_produced < 0 {
        return Err(ApiError::validation("bottles_produced must not be negative"));
    }
    Ok(())
}

fn scenario_from_payload(id: String, payload: ScenarioPayload, created_at: chrono::DateTime<Utc>) -> Scenario {
    let now = Utc::now();
    Scenario {
        id,
        name: payload.name,
        notes: payload.notes,
        bottles_produced: payload.bottles_produced,
        sell_through_bps: payload.sell_through_bps,
        retail_price_cents: payload.retail_price_cents,
        direct_share_bps: payload.direct_share_bps,
        reseller_price_cents: payload.reseller_price_cents,
        production_cost_cents: payload.production_cost_cents,
        packaging_cost_cents: payload.packaging_cost_cents,
        shipping_cost_cents: payload.shipping_cost_cents,
        bottles_per_order: payload.bottles_per_order,
        fixed_costs_cents: payload.fixed_costs_cents,
        payment_fee_bps: payload.payment_fee_bps,
        created_at,
        updated_at: now,
    }
}

/// `GET /api/v1/admin/scenarios`
pub async fn list_scenarios(
    State(state): State<SharedState>,
) -> Result<Json<Vec<Scenario>>, ApiError> {
    Ok(Json(state.db.scenarios().list().await?))
}

/// `GET /api/v1/admin/scenarios/{id}`
pub async fn get_scenario(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Scenario>, ApiError> {
    state
        .db
        .scenarios()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Scenario", &id))
}

/// `POST /api/v1/admin/scenarios`
pub async fn create_scenario(
    State(state): State<SharedState>,
    Json(payload): Json<ScenarioPayload>,
) -> Result<(StatusCode, Json<Scenario>), ApiError> {
    validate_scenario_payload(&payload)?;

    let scenario = scenario_from_payload(new_id(), payload, Utc::now());
    state.db.scenarios().insert(&scenario).await?;

    Ok((StatusCode::CREATED, Json(scenario)))
}

/// `PUT /api/v1/admin/scenarios/{id}`
pub async fn update_scenario(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<ScenarioPayload>,
) -> Result<Json<Scenario>, ApiError> {
    validate_scenario_payload(&payload)?;

    let existing = state
        .db
        .scenarios()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Scenario", &id))?;

    let scenario = scenario_from_payload(existing.id, payload, existing.created_at);
    state.db.scenarios().update(&scenario).await?;

    Ok(Json(scenario))
}

/// `DELETE /api/v1/admin/scenarios/{id}`
pub async fn delete_scenario(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.db.scenarios().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/v1/admin/scenarios/{id}/calculate`
pub async fn calculate_scenario(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ScenarioOutcome>, ApiError> {
    let scenario = state
        .db
        .scenarios()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Scenario", &id))?;

    Ok(Json(scenario.calculate()))
}

// =============================================================================
// Goals
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct GoalPayload {
    pub label: String,
    pub period: String,
    pub target_revenue_cents: i64,
    pub target_units: i64,
    pub scenario_id: Option<String>,
}

/// `GET /api/v1/admin/goals`
pub async fn list_goals(State(state): State<SharedState>) -> Result<Json<Vec<Goal>>, ApiError> {
    Ok(Json(state.db.scenarios().list_goals().await?))
}

/// `POST /api/v1/admin/goals`
pub async fn create_goal(
    State(state): State<SharedState>,
    Json(payload): Json<GoalPayload>,
) -> Result<(StatusCode, Json<Goal>), ApiError> {
    validation::validate_product_name(&payload.label)?;
    validation::validate_price_cents(payload.target_revenue_cents)?;

    let now = Utc::now();
    let goal = Goal {
        id: new_id(),
        label: payload.label,
        period: payload.period,
        target_revenue_cents: payload.target_revenue_cents,
        target_units: payload.target_units,
        scenario_id: payload.scenario_id,
        created_at: now,
        updated_at: now,
    };

    state.db.scenarios().insert_goal(&goal).await?;
    Ok((StatusCode::CREATED, Json(goal)))
}

/// `PUT /api/v1/admin/goals/{id}`
pub async fn update_goal(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<GoalPayload>,
) -> Result<Json<Goal>, ApiError> {
    validation::validate_product_name(&payload.label)?;
    validation::validate_price_cents(payload.target_revenue_cents)?;

    let existing = state
        .db
        .scenarios()
        .get_goal_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Goal", &id))?;

    let goal = Goal {
        id: existing.id,
        label: payload.label,
        period: payload.period,
        target_revenue_cents: payload.target_revenue_cents,
        target_units: payload.target_units,
        scenario_id: payload.scenario_id,
        created_at: existing.created_at,
        updated_at: Utc::now(),
    };

    state.db.scenarios().update_goal(&goal).await?;
    Ok(Json(goal))
}

/// `DELETE /api/v1/admin/goals/{id}`
pub async fn delete_goal(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.db.scenarios().delete_goal(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// FAQ
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct FaqPayload {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub position: i64,
    #[serde(default = "default_true")]
    pub is_published: bool,
}

/// `GET /api/v1/admin/faqs`
pub async fn list_faqs(State(state): State<SharedState>) -> Result<Json<Vec<Faq>>, ApiError> {
    Ok(Json(state.db.content().list_all_faqs().await?))
}

/// `POST /api/v1/admin/faqs`
pub async fn create_faq(
    State(state): State<SharedState>,
    Json(payload): Json<FaqPayload>,
) -> Result<(StatusCode, Json<Faq>), ApiError> {
    if payload.question.trim().is_empty() || payload.answer.trim().is_empty() {
        return Err(ApiError::validation("question and answer are required"));
    }

    let faq = Faq {
        id: new_id(),
        question: payload.question,
        answer: payload.answer,
        position: payload.position,
        is_published: payload.is_published,
        updated_at: Utc::now(),
    };

    state.db.content().insert_faq(&faq).await?;
    Ok((StatusCode::CREATED, Json(faq)))
}

/// `PUT /api/v1/admin/faqs/{id}`
pub async fn update_faq(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<FaqPayload>,
) -> Result<Json<Faq>, ApiError> {
    if payload.question.trim().is_empty() || payload.answer.trim().is_empty() {
        return Err(ApiError::validation("question and answer are required"));
    }

    let faq = Faq {
        id,
        question: payload.question,
        answer: payload.answer,
        position: payload.position,
        is_published: payload.is_published,
        updated_at: Utc::now(),
    };

    state.db.content().update_faq(&faq).await?;
    Ok(Json(faq))
}

/// `DELETE /api/v1/admin/faqs/{id}`
pub async fn delete_faq(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.db.content().delete_faq(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Legal pages
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct PagePayload {
    pub title: String,
    pub body_html: String,
}

/// `GET /api/v1/admin/pages`
pub async fn list_pages(
    State(state): State<SharedState>,
) -> Result<Json<Vec<LegalPage>>, ApiError> {
    Ok(Json(state.db.content().list_pages().await?))
}

/// `PUT /api/v1/admin/pages/{slug}`
pub async fn upsert_page(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
    Json(payload): Json<PagePayload>,
) -> Result<Json<LegalPage>, ApiError> {
    validation::validate_slug(&slug)?;
    validation::validate_product_name(&payload.title)?;

    let page = state
        .db
        .content()
        .upsert_page(&slug, &payload.title, &payload.body_html)
        .await?;

    Ok(Json(page))
}

// =============================================================================
// Email templates
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct TemplatePayload {
    pub subject: String,
    pub body_html: String,
}

/// `GET /api/v1/admin/templates`
pub async fn list_templates(
    State(state): State<SharedState>,
) -> Result<Json<Vec<EmailTemplate>>, ApiError> {
    Ok(Json(state.db.content().list_templates().await?))
}

/// `PUT /api/v1/admin/templates/{key}`
pub async fn upsert_template(
    State(state): State<SharedState>,
    Path(key): Path<String>,
    Json(payload): Json<TemplatePayload>,
) -> Result<Json<EmailTemplate>, ApiError> {
    if payload.subject.trim().is_empty() {
        return Err(ApiError::validation("subject is required"));
    }

    let template = state
        .db
        .content()
        .upsert_template(&key, &payload.subject, &payload.body_html)
        .await?;

    Ok(Json(template))
}

// =============================================================================
// Notifications
// =============================================================================

/// `GET /api/v1/admin/notifications/dead`
///
/// The dead-letter list: notifications that exhausted their retries.
pub async fn list_dead_notifications(
    State(state): State<SharedState>,
) -> Result<Json<Vec<NotificationOutboxEntry>>, ApiError> {
    Ok(Json(state.db.notifications().list_dead(100).await?))
}
