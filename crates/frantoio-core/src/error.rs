//! # Error Types
//!
//! Domain-specific error types for frantoio-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  frantoio-core errors (this file)                                      │
//! │  ├── CoreError        - General domain errors                          │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── ShippingError    - Tariff lookup failures (shipping module)       │
//! │                                                                         │
//! │  frantoio-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  API errors (in server app)                                            │
//! │  └── ApiError         - What the frontend sees (HTTP + JSON)           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Frontend     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (slug, order number, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

use crate::shipping::ShippingError;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found (unknown id/slug, or soft-deleted).
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Insufficient stock to complete checkout.
    #[error("Insufficient stock for {slug}: available {available}, requested {requested}")]
    InsufficientStock {
        slug: String,
        available: i64,
        requested: i64,
    },

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Order is not in a state that allows the requested transition.
    ///
    /// ## When This Occurs
    /// - Marking a cancelled order shipped
    /// - Moving an order backwards (Shipped → Paid)
    #[error("Order {order_id} is {current_status}, cannot move to {requested_status}")]
    InvalidStatusTransition {
        order_id: String,
        current_status: String,
        requested_status: String,
    },

    /// Checkout submitted with an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Cart has exceeded maximum allowed distinct lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Cart operation referenced a line that is not in the cart.
    #[error("Cart item not found: {0}")]
    CartItemNotFound(String),

    /// Mixed cart: subscriptions check out alone.
    ///
    /// The payment processor creates a session in a single mode; a cart
    /// mixing one-time and subscription products cannot be expressed.
    #[error("Subscription products must be checked out separately")]
    MixedCheckoutModes,

    /// Shipping tariff lookup failed (wraps ShippingError).
    #[error(transparent)]
    Shipping(#[from] ShippingError),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid email, invalid country code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate slug).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
