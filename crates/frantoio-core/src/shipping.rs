//! # Shipping Module
//!
//! Configuration-driven shipping tariff lookup.
//!
//! ## How a Quote Is Resolved
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Shipping Quote Resolution                          │
//! │                                                                         │
//! │  quote(country="DE", weight=3200g, subtotal=€55.50)                    │
//! │       │                                                                 │
//! │       ├── subtotal ≥ free threshold? ──► €0.00 (free=true)             │
//! │       │                                                                 │
//! │       ├── country == IT? ──► domestic tier table                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  find first zone whose country list contains "DE"                      │
//! │       │                                                                 │
//! │       ├── none ──► DestinationNotServed                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  find first tier with weight ≤ max_weight_grams                        │
//! │       │                                                                 │
//! │       ├── none ──► WeightExceedsTiers                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  tier.rate_cents                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The tariff table is a plain document edited in the admin back-office
//! and stored as JSON; this module never hardcodes courier prices beyond
//! the seed defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::money::Money;
use crate::DOMESTIC_COUNTRY;

// =============================================================================
// Configuration Types
// =============================================================================

/// One weight bracket of a tariff table.
///
/// A tier covers every weight up to and including `max_weight_grams`
/// that the previous tier did not cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WeightTier {
    pub max_weight_grams: i64,
    pub rate_cents: i64,
}

/// A shipping zone: a named group of destination countries sharing a
/// tariff table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShippingZone {
    pub name: String,
    /// ISO 3166-1 alpha-2 codes, uppercase.
    pub countries: Vec<String>,
    /// Ordered by ascending `max_weight_grams`.
    pub tiers: Vec<WeightTier>,
}

/// The shop's complete shipping configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShippingConfig {
    /// Tariff table for domestic (Italy) shipments.
    pub domestic_tiers: Vec<WeightTier>,
    /// Foreign zones, matched in order.
    pub zones: Vec<ShippingZone>,
    /// Order subtotal (gross, cents) at or above which shipping is free.
    pub free_shipping_threshold_cents: Option<i64>,
}

/// A resolved shipping quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShippingQuote {
    pub cost_cents: i64,
    /// True when the free-shipping threshold waived the cost.
    pub free: bool,
    /// Name of the matched zone ("Italia" for domestic).
    pub zone: String,
}

impl ShippingQuote {
    /// Returns the quoted cost as Money.
    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_cents(self.cost_cents)
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Tariff lookup and configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShippingError {
    /// No zone lists the destination country.
    #[error("We do not ship to {0}")]
    DestinationNotServed(String),

    /// Parcel weight is above the last tier of the matched zone.
    #[error("Parcel of {weight_grams}g exceeds the {zone} tariff table")]
    WeightExceedsTiers { zone: String, weight_grams: i64 },

    /// A tariff table has no tiers.
    #[error("Tariff table for {0} is empty")]
    EmptyTiers(String),

    /// Tiers are not strictly ascending by weight.
    #[error("Tariff table for {zone} is not ascending at {max_weight_grams}g")]
    TiersNotAscending { zone: String, max_weight_grams: i64 },

    /// A tier carries a negative rate.
    #[error("Tariff table for {zone} has a negative rate at {max_weight_grams}g")]
    NegativeRate { zone: String, max_weight_grams: i64 },
}

// =============================================================================
// Lookup
// =============================================================================

impl ShippingConfig {
    /// Resolves the shipping cost for a destination, parcel weight, and
    /// order subtotal.
    ///
    /// ## Invariant
    /// For every weight within a tier, the quoted rate equals that
    /// tier's configured rate - the lookup is a pure table scan, never
    /// interpolation.
    ///
    /// ## Example
    /// ```rust
    /// use frantoio_core::money::Money;
    /// use frantoio_core::shipping::ShippingConfig;
    ///
    /// let config = ShippingConfig::seed_default();
    /// let quote = config.quote("IT", 900, Money::from_cents(1850)).unwrap();
    /// assert!(!quote.free);
    /// assert!(quote.cost_cents > 0);
    /// ```
    pub fn quote(
        &self,
        country: &str,
        weight_grams: i64,
        subtotal: Money,
    ) -> Result<ShippingQuote, ShippingError> {
        let country = country.trim().to_ascii_uppercase();

        let (zone_name, tiers) = if country == DOMESTIC_COUNTRY {
            ("Italia".to_string(), &self.domestic_tiers)
        } else {
            let zone = self
                .zones
                .iter()
                .find(|z| z.countries.iter().any(|c| c == &country))
                .ok_or_else(|| ShippingError::DestinationNotServed(country.clone()))?;
            (zone.name.clone(), &zone.tiers)
        };

        // Threshold check happens after the destination check: an order to
        // an unserved country is rejected even when it would ship free.
        if let Some(threshold) = self.free_shipping_threshold_cents {
            if subtotal.cents() >= threshold {
                return Ok(ShippingQuote {
                    cost_cents: 0,
                    free: true,
                    zone: zone_name,
                });
            }
        }

        let rate = tiers
            .iter()
            .find(|t| weight_grams <= t.max_weight_grams)
            .map(|t| t.rate_cents)
            .ok_or(ShippingError::WeightExceedsTiers {
                zone: zone_name.clone(),
                weight_grams,
            })?;

        Ok(ShippingQuote {
            cost_cents: rate,
            free: false,
            zone: zone_name,
        })
    }

    /// Validates the whole document before it is saved from the admin
    /// back-office.
    ///
    /// ## Rules
    /// - Every tariff table is non-empty
    /// - Tiers are strictly ascending on `max_weight_grams`
    /// - Rates are non-negative
    pub fn validate(&self) -> Result<(), ShippingError> {
        validate_tiers("Italia", &self.domestic_tiers)?;
        for zone in &self.zones {
            validate_tiers(&zone.name, &zone.tiers)?;
        }
        Ok(())
    }

    /// The tariff table the shop launches with; editable afterwards in
    /// the admin back-office.
    pub fn seed_default() -> Self {
        ShippingConfig {
            domestic_tiers: vec![
                WeightTier { max_weight_grams: 2_000, rate_cents: 690 },
                WeightTier { max_weight_grams: 5_000, rate_cents: 890 },
                WeightTier { max_weight_grams: 10_000, rate_cents: 1_190 },
                WeightTier { max_weight_grams: 25_000, rate_cents: 1_690 },
            ],
            zones: vec![
                ShippingZone {
                    name: "Europa".to_string(),
                    countries: [
                        "AT", "BE", "DE", "DK", "ES", "FR", "IE", "LU", "NL", "PT", "SI",
                    ]
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
                    tiers: vec![
                        WeightTier { max_weight_grams: 2_000, rate_cents: 1_490 },
                        WeightTier { max_weight_grams: 5_000, rate_cents: 1_990 },
                        WeightTier { max_weight_grams: 10_000, rate_cents: 2_790 },
                    ],
                },
                ShippingZone {
                    name: "Europa extra".to_string(),
                    countries: ["CH", "GB", "NO", "SE", "FI", "PL", "CZ"]
                        .iter()
                        .map(|c| c.to_string())
                        .collect(),
                    tiers: vec![
                        WeightTier { max_weight_grams: 2_000, rate_cents: 2_190 },
                        WeightTier { max_weight_grams: 5_000, rate_cents: 2_990 },
                        WeightTier { max_weight_grams: 10_000, rate_cents: 3_990 },
                    ],
                },
            ],
            free_shipping_threshold_cents: Some(9_000),
        }
    }
}

fn validate_tiers(zone: &str, tiers: &[WeightTier]) -> Result<(), ShippingError> {
    if tiers.is_empty() {
        return Err(ShippingError::EmptyTiers(zone.to_string()));
    }

    let mut previous = 0i64;
    for tier in tiers {
        if tier.max_weight_grams <= previous {
            return Err(ShippingError::TiersNotAscending {
                zone: zone.to_string(),
                max_weight_grams: tier.max_weight_grams,
            });
        }
        if tier.rate_cents < 0 {
            return Err(ShippingError::NegativeRate {
                zone: zone.to_string(),
                max_weight_grams: tier.max_weight_grams,
            });
        }
        previous = tier.max_weight_grams;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ShippingConfig {
        ShippingConfig::seed_default()
    }

    #[test]
    fn test_domestic_lookup() {
        let quote = config().quote("IT", 900, Money::from_cents(1850)).unwrap();
        assert_eq!(quote.cost_cents, 690);
        assert_eq!(quote.zone, "Italia");
        assert!(!quote.free);
    }

    #[test]
    fn test_domestic_is_case_insensitive() {
        let quote = config().quote("it", 900, Money::from_cents(1850)).unwrap();
        assert_eq!(quote.cost_cents, 690);
    }

    #[test]
    fn test_zone_lookup() {
        let quote = config().quote("DE", 3_200, Money::from_cents(5550)).unwrap();
        assert_eq!(quote.cost_cents, 1_990);
        assert_eq!(quote.zone, "Europa");

        let quote = config().quote("CH", 3_200, Money::from_cents(5550)).unwrap();
        assert_eq!(quote.cost_cents, 2_990);
        assert_eq!(quote.zone, "Europa extra");
    }

    /// Every weight inside a tier maps to exactly the tier's rate.
    #[test]
    fn test_rate_constant_within_tier() {
        let cfg = config();
        for weight in [1, 500, 1_999, 2_000] {
            let quote = cfg.quote("DE", weight, Money::zero()).unwrap();
            assert_eq!(quote.cost_cents, 1_490, "weight {weight}g");
        }
        for weight in [2_001, 3_500, 5_000] {
            let quote = cfg.quote("DE", weight, Money::zero()).unwrap();
            assert_eq!(quote.cost_cents, 1_990, "weight {weight}g");
        }
    }

    #[test]
    fn test_tier_boundary_is_inclusive() {
        let cfg = config();
        assert_eq!(cfg.quote("IT", 2_000, Money::zero()).unwrap().cost_cents, 690);
        assert_eq!(cfg.quote("IT", 2_001, Money::zero()).unwrap().cost_cents, 890);
    }

    #[test]
    fn test_free_shipping_threshold() {
        let cfg = config();

        let quote = cfg.quote("IT", 5_400, Money::from_cents(9_000)).unwrap();
        assert!(quote.free);
        assert_eq!(quote.cost_cents, 0);

        let quote = cfg.quote("IT", 5_400, Money::from_cents(8_999)).unwrap();
        assert!(!quote.free);
        assert_eq!(quote.cost_cents, 1_190);
    }

    #[test]
    fn test_unserved_destination() {
        let err = config().quote("US", 900, Money::from_cents(1850)).unwrap_err();
        assert_eq!(err, ShippingError::DestinationNotServed("US".to_string()));

        // Unserved stays unserved even above the free threshold
        let err = config().quote("US", 900, Money::from_cents(99_000)).unwrap_err();
        assert!(matches!(err, ShippingError::DestinationNotServed(_)));
    }

    #[test]
    fn test_weight_above_last_tier() {
        let err = config().quote("DE", 12_000, Money::zero()).unwrap_err();
        assert!(matches!(err, ShippingError::WeightExceedsTiers { .. }));
    }

    #[test]
    fn test_validate_accepts_seed() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unordered_tiers() {
        let mut cfg = config();
        cfg.domestic_tiers = vec![
            WeightTier { max_weight_grams: 5_000, rate_cents: 890 },
            WeightTier { max_weight_grams: 2_000, rate_cents: 690 },
        ];
        assert!(matches!(
            cfg.validate(),
            Err(ShippingError::TiersNotAscending { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_empty_and_negative() {
        let mut cfg = config();
        cfg.zones[0].tiers.clear();
        assert!(matches!(cfg.validate(), Err(ShippingError::EmptyTiers(_))));

        let mut cfg = config();
        cfg.domestic_tiers[0].rate_cents = -1;
        assert!(matches!(cfg.validate(), Err(ShippingError::NegativeRate { .. })));
    }
}
