//! # Domain Types
//!
//! Core domain types used throughout Frantoio.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Order      │   │    Customer     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  slug (business)│   │  order_number   │   │  email (unique) │       │
//! │  │  price_cents    │   │  status         │   │  address        │       │
//! │  │  weight_grams   │   │  total_cents    │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Seller      │   │  EmailTemplate  │   │  Faq/LegalPage  │       │
//! │  │  code (unique)  │   │  key (unique)   │   │  content docs   │       │
//! │  │  commission_bps │   │  {{placeholder}}│   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (slug, order_number, email, code...) - human-readable

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// VAT Rate
// =============================================================================

/// VAT rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 400 bps = 4% (Italian reduced rate for food products)
/// 2200 bps = 22% (Italian standard rate, e.g. merchandising)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VatRate(u32);

impl VatRate {
    /// Creates a VAT rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        VatRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero VAT rate.
    #[inline]
    pub const fn zero() -> Self {
        VatRate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for VatRate {
    fn default() -> Self {
        VatRate(crate::DEFAULT_VAT_BPS)
    }
}

// =============================================================================
// Product
// =============================================================================

/// How often a subscription product is re-delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionInterval {
    Monthly,
    Bimonthly,
    Quarterly,
}

impl SubscriptionInterval {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SubscriptionInterval::Monthly => "monthly",
            SubscriptionInterval::Bimonthly => "bimonthly",
            SubscriptionInterval::Quarterly => "quarterly",
        }
    }
}

impl FromStr for SubscriptionInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(SubscriptionInterval::Monthly),
            "bimonthly" => Ok(SubscriptionInterval::Bimonthly),
            "quarterly" => Ok(SubscriptionInterval::Quarterly),
            other => Err(format!("unknown subscription interval: {other}")),
        }
    }
}

/// A product available in the storefront catalog.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// URL slug - business identifier (e.g. "olio-evo-500ml").
    pub slug: String,

    /// Display name shown in the storefront.
    pub name: String,

    /// Long description (storefront product page).
    pub description: Option<String>,

    /// Gross (VAT-inclusive) price in euro cents.
    pub price_cents: i64,

    /// Optional struck-through comparison price in euro cents.
    pub compare_at_price_cents: Option<i64>,

    /// Shipping weight in grams, packaging included. Drives the tariff lookup.
    pub weight_grams: i64,

    /// VAT rate in basis points (400 = 4% reduced food rate).
    pub vat_rate_bps: u32,

    /// Current stock level.
    pub stock_quantity: i64,

    /// Whether to enforce stock on checkout.
    pub track_inventory: bool,

    /// Whether the product can be bought as a recurring subscription.
    pub subscribable: bool,

    /// Delivery interval when bought as a subscription.
    pub subscription_interval: Option<SubscriptionInterval>,

    /// Main product image URL.
    pub image_url: Option<String>,

    /// Whether the product is visible in the storefront (soft delete).
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the VAT rate.
    #[inline]
    pub fn vat_rate(&self) -> VatRate {
        VatRate::from_bps(self.vat_rate_bps)
    }

    /// Checks if the requested quantity can be sold.
    pub fn can_sell(&self, quantity: i64) -> bool {
        if !self.track_inventory {
            return true;
        }
        self.stock_quantity >= quantity
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Fulfilment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order created, checkout session open, payment not confirmed.
    Pending,
    /// Payment confirmed by the payment processor.
    Paid,
    /// Being bottled/boxed.
    Preparing,
    /// Handed to the courier.
    Shipped,
    /// Confirmed delivered.
    Delivered,
    /// Abandoned or refunded.
    Cancelled,
}

impl OrderStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Whether a manual transition to `next` is allowed.
    ///
    /// The storefront never moves an order backwards; cancellation is
    /// allowed from any non-terminal state.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, next) {
            (Pending, Paid) | (Pending, Cancelled) => true,
            (Paid, Preparing) | (Paid, Cancelled) => true,
            (Preparing, Shipped) | (Preparing, Cancelled) => true,
            (Shipped, Delivered) => true,
            _ => false,
        }
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "paid" => Ok(OrderStatus::Paid),
            "preparing" => Ok(OrderStatus::Preparing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

/// One-time purchase or recurring subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderKind {
    OneTime,
    Subscription,
}

impl OrderKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderKind::OneTime => "one_time",
            OrderKind::Subscription => "subscription",
        }
    }
}

impl FromStr for OrderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "one_time" => Ok(OrderKind::OneTime),
            "subscription" => Ok(OrderKind::Subscription),
            other => Err(format!("unknown order kind: {other}")),
        }
    }
}

/// Payment processor status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unpaid" => Ok(PaymentStatus::Unpaid),
            "paid" => Ok(PaymentStatus::Paid),
            "refunded" => Ok(PaymentStatus::Refunded),
            other => Err(format!("unknown payment status: {other}")),
        }
    }
}

// =============================================================================
// Address
// =============================================================================

/// A shipping address.
///
/// Stored as a JSON document column on the order, frozen at checkout
/// time (snapshot pattern - later customer edits never rewrite orders).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Address {
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub province: Option<String>,
    pub postal_code: String,
    /// ISO 3166-1 alpha-2 country code.
    pub country: String,
}

// =============================================================================
// Order
// =============================================================================

/// A storefront order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: String,
    /// Human-readable business identifier (e.g. "FR-2026-00042").
    pub order_number: String,
    pub kind: OrderKind,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,

    pub customer_email: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub shipping_address: Address,

    /// Referral code of the seller this order is attributed to, if any.
    pub seller_code: Option<String>,

    pub subtotal_cents: i64,
    pub shipping_cents: i64,
    /// VAT contained in the gross totals (informational - prices are gross).
    pub vat_cents: i64,
    pub total_cents: i64,
    pub total_weight_grams: i64,

    /// Payment processor checkout session id, once the session is created.
    pub checkout_session_id: Option<String>,

    pub notes: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub paid_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Returns the grand total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A line item in an order.
/// Uses the snapshot pattern to freeze product data at checkout time.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    /// Product name at the time of purchase.
    pub name: String,
    /// Gross unit price at the time of purchase.
    pub unit_price_cents: i64,
    pub quantity: i64,
    pub line_total_cents: i64,
    pub weight_grams: i64,
}

// =============================================================================
// Customer
// =============================================================================

/// A storefront customer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Customer {
    pub id: String,
    /// Unique business identifier.
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub default_address: Option<Address>,
    /// Consent to marketing email, GDPR-relevant.
    pub marketing_consent: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Seller
// =============================================================================

/// A reseller/referral partner (restaurants, shops, agents).
///
/// Orders carrying a seller's code are attributed to them for
/// commission settlement at the end of the season.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Seller {
    pub id: String,
    /// Unique referral code (e.g. "RIST-MARIO").
    pub code: String,
    pub name: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    /// Commission on attributed orders, in basis points.
    pub commission_bps: u32,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Content: email templates, FAQ, legal pages
// =============================================================================

/// A transactional email template with `{{placeholder}}` markers.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EmailTemplate {
    pub id: String,
    /// Unique template key (e.g. "order_placed", "order_shipped").
    pub key: String,
    pub subject: String,
    /// HTML body with `{{placeholder}}` markers.
    pub body_html: String,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl EmailTemplate {
    /// Renders the subject line, substituting `{{name}}`-style placeholders.
    pub fn render_subject(&self, vars: &[(&str, &str)]) -> String {
        render_placeholders(&self.subject, vars)
    }

    /// Renders the HTML body, substituting `{{name}}`-style placeholders.
    pub fn render_body(&self, vars: &[(&str, &str)]) -> String {
        render_placeholders(&self.body_html, vars)
    }
}

/// Substitutes `{{key}}` markers with their values.
///
/// Unknown markers are left intact so a typo in a template shows up in
/// the delivered mail instead of silently vanishing.
pub fn render_placeholders(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in vars {
        out = out.replace(&format!("{{{{{key}}}}}"), value);
    }
    out
}

/// A storefront FAQ entry.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Faq {
    pub id: String,
    pub question: String,
    pub answer: String,
    /// Display order in the FAQ page (ascending).
    pub position: i64,
    pub is_published: bool,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A legal/marketing page (privacy, terms, cookie policy...).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LegalPage {
    pub id: String,
    /// Unique URL slug (e.g. "privacy").
    pub slug: String,
    pub title: String,
    pub body_html: String,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Notification Outbox
// =============================================================================

/// Delivery channel for an outbound notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    Email,
    Telegram,
    Whatsapp,
}

impl NotificationChannel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            NotificationChannel::Email => "email",
            NotificationChannel::Telegram => "telegram",
            NotificationChannel::Whatsapp => "whatsapp",
        }
    }
}

impl FromStr for NotificationChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(NotificationChannel::Email),
            "telegram" => Ok(NotificationChannel::Telegram),
            "whatsapp" => Ok(NotificationChannel::Whatsapp),
            other => Err(format!("unknown notification channel: {other}")),
        }
    }
}

/// Order lifecycle event that triggers notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum NotificationEvent {
    OrderPlaced,
    OrderPaid,
    OrderShipped,
}

impl NotificationEvent {
    pub const fn as_str(&self) -> &'static str {
        match self {
            NotificationEvent::OrderPlaced => "order_placed",
            NotificationEvent::OrderPaid => "order_paid",
            NotificationEvent::OrderShipped => "order_shipped",
        }
    }

    /// The email template key used when this event is delivered over email.
    pub const fn template_key(&self) -> &'static str {
        self.as_str()
    }
}

impl FromStr for NotificationEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "order_placed" => Ok(NotificationEvent::OrderPlaced),
            "order_paid" => Ok(NotificationEvent::OrderPaid),
            "order_shipped" => Ok(NotificationEvent::OrderShipped),
            other => Err(format!("unknown notification event: {other}")),
        }
    }
}

/// Lifecycle of an outbox row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    /// Waiting for delivery (or for the next retry window).
    Pending,
    /// Delivered successfully.
    Sent,
    /// Gave up after the maximum number of attempts.
    Dead,
}

impl NotificationStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            NotificationStatus::Pending => "pending",
            NotificationStatus::Sent => "sent",
            NotificationStatus::Dead => "dead",
        }
    }
}

impl FromStr for NotificationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(NotificationStatus::Pending),
            "sent" => Ok(NotificationStatus::Sent),
            "dead" => Ok(NotificationStatus::Dead),
            other => Err(format!("unknown notification status: {other}")),
        }
    }
}

/// A queued outbound notification (outbox pattern).
///
/// Rows are written in the same transaction as the order change that
/// triggered them, then delivered asynchronously by the notification
/// worker. Delivery state lives here, never in the order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NotificationOutboxEntry {
    pub id: String,
    pub event: NotificationEvent,
    pub channel: NotificationChannel,
    pub order_id: String,
    /// JSON payload with the template variables for this event.
    pub payload: String,
    pub status: NotificationStatus,
    pub attempts: i64,
    #[ts(as = "String")]
    pub next_attempt_at: DateTime<Utc>,
    pub last_error: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub sent_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_roundtrip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Paid,
            OrderStatus::Preparing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("teleported".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_order_status_transitions() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Paid));
        assert!(OrderStatus::Paid.can_transition_to(OrderStatus::Preparing));
        assert!(OrderStatus::Preparing.can_transition_to(OrderStatus::Shipped));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Delivered));

        // No going backwards, no skipping into delivered
        assert!(!OrderStatus::Paid.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_product_can_sell() {
        let mut product = Product {
            id: "p1".into(),
            slug: "olio-evo-500ml".into(),
            name: "Olio EVO 500ml".into(),
            description: None,
            price_cents: 1850,
            compare_at_price_cents: None,
            weight_grams: 900,
            vat_rate_bps: 400,
            stock_quantity: 3,
            track_inventory: true,
            subscribable: false,
            subscription_interval: None,
            image_url: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(product.can_sell(3));
        assert!(!product.can_sell(4));

        product.track_inventory = false;
        assert!(product.can_sell(1000));
    }

    #[test]
    fn test_render_placeholders() {
        let rendered = render_placeholders(
            "Ciao {{name}}, il tuo ordine {{order_number}} è confermato.",
            &[("name", "Anna"), ("order_number", "FR-2026-00042")],
        );
        assert_eq!(rendered, "Ciao Anna, il tuo ordine FR-2026-00042 è confermato.");
    }

    #[test]
    fn test_render_placeholders_leaves_unknown_markers() {
        let rendered = render_placeholders("Hello {{nmae}}", &[("name", "Anna")]);
        assert_eq!(rendered, "Hello {{nmae}}");
    }

    #[test]
    fn test_template_render() {
        let template = EmailTemplate {
            id: "t1".into(),
            key: "order_placed".into(),
            subject: "Ordine {{order_number}} ricevuto".into(),
            body_html: "<p>Grazie {{name}}!</p>".into(),
            updated_at: Utc::now(),
        };

        assert_eq!(
            template.render_subject(&[("order_number", "FR-2026-00001")]),
            "Ordine FR-2026-00001 ricevuto"
        );
        assert_eq!(template.render_body(&[("name", "Anna")]), "<p>Grazie Anna!</p>");
    }
}
