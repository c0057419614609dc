//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004   WRONG!                             │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Euro Cents                                       │
//! │    1850 cents = €18.50, exact at every step                             │
//! │    Splits that lose a cent lose it EXPLICITLY                           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use frantoio_core::money::Money;
//!
//! // Create from cents (preferred)
//! let price = Money::from_cents(1850); // €18.50
//!
//! // Arithmetic operations
//! let doubled = price * 2;                        // €37.00
//! let total = price + Money::from_cents(500);     // €23.50
//!
//! // NEVER do this:
//! // let bad = Money::from_float(18.50); // NO SUCH METHOD EXISTS!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::VatRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in euro cents (the smallest currency unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for refunds and losses
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// Every monetary value in the system flows through this type:
/// product prices, cart subtotals, shipping rates, order totals,
/// scenario revenue and costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from euro cents.
    ///
    /// ## Example
    /// ```rust
    /// use frantoio_core::money::Money;
    ///
    /// let price = Money::from_cents(1850); // Represents €18.50
    /// assert_eq!(price.cents(), 1850);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (euros and cents).
    ///
    /// ## Example
    /// ```rust
    /// use frantoio_core::money::Money;
    ///
    /// let price = Money::from_major_minor(18, 50); // €18.50
    /// assert_eq!(price.cents(), 1850);
    ///
    /// let negative = Money::from_major_minor(-5, 50); // -€5.50 (refund)
    /// assert_eq!(negative.cents(), -550);
    /// ```
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    /// `from_major_minor(-5, 50)` = -€5.50, not -€4.50
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (euros) portion.
    #[inline]
    pub const fn euros(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Returns the given fraction (in basis points) of this amount.
    ///
    /// Rounds half-up using integer math: `(amount * bps + 5000) / 10000`.
    /// Uses i128 intermediates so large amounts cannot overflow.
    ///
    /// ## Example
    /// ```rust
    /// use frantoio_core::money::Money;
    ///
    /// let revenue = Money::from_cents(100_000); // €1000.00
    /// let fee = revenue.percentage(290);        // 2.9% payment fee
    /// assert_eq!(fee.cents(), 2900);
    /// ```
    pub fn percentage(&self, bps: u32) -> Money {
        let part = (self.0 as i128 * bps as i128 + 5000) / 10000;
        Money::from_cents(part as i64)
    }

    /// Returns the VAT amount already contained in a gross (VAT-inclusive) price.
    ///
    /// Storefront prices are gross: a €18.50 bottle at 4% VAT contains
    /// €0.71 of VAT. The net portion is `gross * 10000 / (10000 + bps)`
    /// rounded half-up; the VAT portion is the remainder, so
    /// `net + vat == gross` always holds.
    ///
    /// ## Example
    /// ```rust
    /// use frantoio_core::money::Money;
    /// use frantoio_core::types::VatRate;
    ///
    /// let gross = Money::from_cents(1850);
    /// let vat = gross.vat_included(VatRate::from_bps(400));
    /// assert_eq!(vat.cents(), 71); // €0.71 of the €18.50 is VAT
    /// ```
    pub fn vat_included(&self, rate: VatRate) -> Money {
        if rate.is_zero() {
            return Money::zero();
        }
        let divisor = 10000i128 + rate.bps() as i128;
        let net = (self.0 as i128 * 10000 + divisor / 2) / divisor;
        Money::from_cents(self.0 - net as i64)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use frantoio_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(1850); // €18.50
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.cents(), 5550); // €55.50
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and debugging. The storefront formats amounts
/// client-side to handle localization properly.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}€{}.{:02}", sign, self.euros().abs(), self.cents_part())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1850);
        assert_eq!(money.cents(), 1850);
        assert_eq!(money.euros(), 18);
        assert_eq!(money.cents_part(), 50);
    }

    #[test]
    fn test_from_major_minor() {
        let money = Money::from_major_minor(18, 50);
        assert_eq!(money.cents(), 1850);

        let negative = Money::from_major_minor(-5, 50);
        assert_eq!(negative.cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1850)), "€18.50");
        assert_eq!(format!("{}", Money::from_cents(500)), "€5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-€5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "€0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        let result: Money = a * 3;
        assert_eq!(result.cents(), 3000);
    }

    #[test]
    fn test_percentage() {
        // €1000.00 at 2.9% = €29.00
        let amount = Money::from_cents(100_000);
        assert_eq!(amount.percentage(290).cents(), 2900);

        // Rounding: €10.00 at 8.25% = €0.825 → €0.83
        let amount = Money::from_cents(1000);
        assert_eq!(amount.percentage(825).cents(), 83);
    }

    #[test]
    fn test_vat_included_net_plus_vat_is_gross() {
        for gross in [1, 99, 1850, 2490, 100_000, 123_457] {
            let gross = Money::from_cents(gross);
            for bps in [0u32, 400, 1000, 2200] {
                let vat = gross.vat_included(VatRate::from_bps(bps));
                let net = gross - vat;
                assert_eq!(net + vat, gross);
                assert!(!vat.is_negative());
            }
        }
    }

    #[test]
    fn test_vat_included_reduced_rate() {
        // €18.50 gross at 4%: net €17.79, VAT €0.71
        let vat = Money::from_cents(1850).vat_included(VatRate::from_bps(400));
        assert_eq!(vat.cents(), 71);

        // Zero rate contains no VAT
        let vat = Money::from_cents(1850).vat_included(VatRate::zero());
        assert!(vat.is_zero());
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_cents(1850);
        let line_total = unit_price.multiply_quantity(3);
        assert_eq!(line_total.cents(), 5550);
    }

    /// Splitting €10.00 three ways loses a cent, and we can see it.
    #[test]
    fn test_division_precision_loss_documented() {
        let ten = Money::from_cents(1000);
        let one_third = Money::from_cents(1000 / 3); // 333 cents
        let reconstructed: Money = one_third * 3; // 999 cents

        assert_eq!(reconstructed.cents(), 999);
        assert_eq!((ten - reconstructed).cents(), 1);
    }
}
