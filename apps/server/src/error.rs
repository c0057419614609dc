//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Serialization
//! This is what the frontend receives when a request fails:
//! ```json
//! {
//!   "error": {
//!     "code": "NOT_FOUND",
//!     "message": "Product not found: olio-evo-500ml"
//!   }
//! }
//! ```
//!
//! Every error carries a machine-readable `code` for programmatic
//! handling and a human-readable `message` for display. Internal detail
//! (SQL text, provider bodies) goes to the log, never to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use frantoio_core::{CoreError, ShippingError, ValidationError};
use frantoio_db::DbError;

use crate::payments::PaymentError;

/// API error returned from HTTP handlers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (422)
    ValidationError,

    /// Business logic error (422)
    BusinessLogic,

    /// Missing or invalid credentials (401)
    Unauthorized,

    /// Insufficient stock (409)
    InsufficientStock,

    /// Payment processor failure (502)
    PaymentError,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    const fn status(&self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::BusinessLogic => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::InsufficientStock => StatusCode::CONFLICT,
            ErrorCode::PaymentError => StatusCode::BAD_GATEWAY,
            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status();
        let body = json!({
            "error": {
                "code": self.code,
                "message": self.message,
            }
        });
        (status, Json(body)).into_response()
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::InvalidDocument(e) => {
                tracing::error!("Invalid stored document: {}", e);
                ApiError::new(ErrorCode::Internal, "Stored document is invalid")
            }
            DbError::InvalidValue(e) => {
                tracing::error!("Invalid stored value: {}", e);
                ApiError::new(ErrorCode::Internal, "Stored value is invalid")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::OrderNotFound(id) => ApiError::not_found("Order", &id),
            CoreError::InsufficientStock {
                slug,
                available,
                requested,
            } => ApiError::new(
                ErrorCode::InsufficientStock,
                format!(
                    "Insufficient stock for {}: {} available, {} requested",
                    slug, available, requested
                ),
            ),
            CoreError::InvalidStatusTransition { .. }
            | CoreError::EmptyCart
            | CoreError::MixedCheckoutModes => {
                ApiError::new(ErrorCode::BusinessLogic, err.to_string())
            }
            CoreError::CartTooLarge { .. }
            | CoreError::QuantityTooLarge { .. }
            | CoreError::CartItemNotFound(_) => {
                ApiError::new(ErrorCode::ValidationError, err.to_string())
            }
            CoreError::Shipping(e) => e.into(),
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<ShippingError> for ApiError {
    fn from(err: ShippingError) -> Self {
        // Lookup misses are the customer's problem statement ("we don't
        // ship there"), table defects are ours.
        match err {
            ShippingError::DestinationNotServed(_)
            | ShippingError::WeightExceedsTiers { .. } => {
                ApiError::new(ErrorCode::BusinessLogic, err.to_string())
            }
            ShippingError::EmptyTiers(_)
            | ShippingError::TiersNotAscending { .. }
            | ShippingError::NegativeRate { .. } => {
                ApiError::new(ErrorCode::ValidationError, err.to_string())
            }
        }
    }
}

/// Converts payment client errors to API errors.
impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        tracing::error!("Payment processor error: {}", err);
        ApiError::new(ErrorCode::PaymentError, "Payment processor unavailable")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ErrorCode::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::ValidationError.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(ErrorCode::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::PaymentError.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_db_not_found_maps_to_404() {
        let api: ApiError = DbError::not_found("Product", "p1").into();
        assert!(matches!(api.code, ErrorCode::NotFound));
        assert_eq!(api.message, "Product not found: p1");
    }
}
