//! # frantoio-core: Pure Business Logic for Frantoio
//!
//! This crate is the **heart** of the shop backend. It contains all business
//! logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Frantoio Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Storefront / Admin (JS frontend)                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ REST (JSON)                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/server (Axum)                           │   │
//! │  │    catalog, cart checkout, admin CRUD, webhook                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ frantoio-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ validation│  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │   ┌───────────┐  ┌───────────┐                                 │   │
//! │  │   │ shipping  │  │ scenario  │                                 │   │
//! │  │   └───────────┘  └───────────┘                                 │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 frantoio-db (Database Layer)                    │   │
//! │  │             SQLite queries, migrations, repositories            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Order, Customer, Seller, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//! - [`cart`] - Cart math (merge, totals, weight)
//! - [`shipping`] - Zone/weight shipping tariff lookup
//! - [`scenario`] - Revenue scenario profit model
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in euro cents (i64)
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod scenario;
pub mod shipping;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use frantoio_core::Money` instead of
// `use frantoio_core::money::Money`

pub use cart::{Cart, CartItem};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use scenario::{Goal, Scenario, ScenarioOutcome};
pub use shipping::{ShippingConfig, ShippingError, ShippingQuote, ShippingZone, WeightTier};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default VAT rate for olive oil in basis points.
///
/// Olive oil is a food product and falls under the Italian reduced VAT
/// rate of 4%. Non-food products (merchandising) override this per product.
pub const DEFAULT_VAT_BPS: u32 = 400;

/// Maximum distinct lines allowed in a single cart.
///
/// The shop sells a handful of formats; a cart with more distinct lines
/// than this is a malformed request, not a real customer.
pub const MAX_CART_ITEMS: usize = 50;

/// Maximum quantity of a single item in a cart line.
///
/// Prevents accidental over-ordering (e.g., typing 500 instead of 5).
/// Wholesale orders go through the seller channel, not the storefront.
pub const MAX_ITEM_QUANTITY: i64 = 120;

/// The shop's domestic country (ISO 3166-1 alpha-2).
pub const DOMESTIC_COUNTRY: &str = "IT";
