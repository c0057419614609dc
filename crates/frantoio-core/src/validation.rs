//! # Validation Module
//!
//! Input validation utilities for Frantoio.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Storefront (TypeScript)                                      │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: API Handler (Rust)                                           │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE constraints                                                │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product or page slug.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 80 characters
/// - Lowercase letters, digits and hyphens only
///
/// ## Example
/// ```rust
/// use frantoio_core::validation::validate_slug;
///
/// assert!(validate_slug("olio-evo-500ml").is_ok());
/// assert!(validate_slug("").is_err());
/// assert!(validate_slug("Olio EVO").is_err());
/// ```
pub fn validate_slug(slug: &str) -> ValidationResult<()> {
    let slug = slug.trim();

    if slug.is_empty() {
        return Err(ValidationError::Required {
            field: "slug".to_string(),
        });
    }

    if slug.len() > 80 {
        return Err(ValidationError::TooLong {
            field: "slug".to_string(),
            max: 80,
        });
    }

    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(ValidationError::InvalidFormat {
            field: "slug".to_string(),
            reason: "must contain only lowercase letters, digits, and hyphens".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates an email address.
///
/// ## Rules
/// - Must not be empty, at most 254 characters
/// - Must contain exactly one `@` with a dot in the domain part
///
/// Deliberately loose: the transactional email provider is the real
/// authority on deliverability, this only rejects obvious typos.
///
/// ## Example
/// ```rust
/// use frantoio_core::validation::validate_email;
///
/// assert!(validate_email("anna@example.com").is_ok());
/// assert!(validate_email("anna@localhost").is_err());
/// assert!(validate_email("not-an-email").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    if email.len() > 254 {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: 254,
        });
    }

    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");

    if local.is_empty() || domain.is_empty() || domain.contains('@') || !domain.contains('.') {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must be a valid email address".to_string(),
        });
    }

    Ok(())
}

/// Validates an ISO 3166-1 alpha-2 country code.
///
/// ## Rules
/// - Exactly two ASCII letters (case-insensitive; normalize with
///   `to_ascii_uppercase` before storing)
pub fn validate_country_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "country".to_string(),
        });
    }

    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::InvalidFormat {
            field: "country".to_string(),
            reason: "must be an ISO 3166-1 alpha-2 code".to_string(),
        });
    }

    Ok(())
}

/// Validates a seller referral code.
///
/// ## Rules
/// - Must not be empty, at most 40 characters
/// - Uppercase letters, digits, and hyphens only
pub fn validate_seller_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() > 40 {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: 40,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only uppercase letters, digits, and hyphens".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a gross price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (samples, promo items)
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a shipping weight in grams.
///
/// ## Rules
/// - Must be positive (a bottle always weighs something)
/// - Upper bound of 50kg: above that the courier quote is manual
pub fn validate_weight_grams(grams: i64) -> ValidationResult<()> {
    if grams <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "weight".to_string(),
        });
    }

    if grams > 50_000 {
        return Err(ValidationError::OutOfRange {
            field: "weight".to_string(),
            min: 1,
            max: 50_000,
        });
    }

    Ok(())
}

/// Validates a VAT rate in basis points.
///
/// ## Rules
/// - Must be between 0 and 10000 (0% to 100%)
pub fn validate_vat_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "vat_rate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

/// Validates a commission rate in basis points.
///
/// ## Rules
/// - Must be between 0 and 5000 (0% to 50%)
pub fn validate_commission_bps(bps: u32) -> ValidationResult<()> {
    if bps > 5000 {
        return Err(ValidationError::OutOfRange {
            field: "commission_bps".to_string(),
            min: 0,
            max: 5000,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates cart size (number of distinct lines).
pub fn validate_cart_size(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_slug() {
        assert!(validate_slug("olio-evo-500ml").is_ok());
        assert!(validate_slug("olio-nuovo-2026").is_ok());

        assert!(validate_slug("").is_err());
        assert!(validate_slug("   ").is_err());
        assert!(validate_slug("Olio EVO").is_err());
        assert!(validate_slug("olio_evo").is_err());
        assert!(validate_slug(&"a".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("anna@example.com").is_ok());
        assert!(validate_email("a.b+c@shop.example.it").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("anna@localhost").is_err());
        assert!(validate_email("@example.com").is_err());
    }

    #[test]
    fn test_validate_country_code() {
        assert!(validate_country_code("IT").is_ok());
        assert!(validate_country_code("de").is_ok());

        assert!(validate_country_code("").is_err());
        assert!(validate_country_code("ITA").is_err());
        assert!(validate_country_code("1T").is_err());
    }

    #[test]
    fn test_validate_seller_code() {
        assert!(validate_seller_code("RIST-MARIO").is_ok());
        assert!(validate_seller_code("AGENTE-01").is_ok());

        assert!(validate_seller_code("").is_err());
        assert!(validate_seller_code("rist-mario").is_err());
        assert!(validate_seller_code("HAS SPACE").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(1850).is_ok());
        assert!(validate_price_cents(-100).is_err());
    }

    #[test]
    fn test_validate_weight_grams() {
        assert!(validate_weight_grams(900).is_ok());
        assert!(validate_weight_grams(0).is_err());
        assert!(validate_weight_grams(60_000).is_err());
    }

    #[test]
    fn test_validate_vat_bps() {
        assert!(validate_vat_bps(0).is_ok());
        assert!(validate_vat_bps(400).is_ok());
        assert!(validate_vat_bps(10000).is_ok());
        assert!(validate_vat_bps(10001).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("not-a-uuid").is_err());
    }
}
