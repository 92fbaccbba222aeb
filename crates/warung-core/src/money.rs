//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                         │
//! │                                                                     │
//! │  In JavaScript/floating point:                                      │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                        │
//! │                                                                     │
//! │  An order total computed in f64 will drift after enough             │
//! │  discount/tax steps, and a drifting total is a settlement bug:      │
//! │  an exact-payment method compares amounts with `==`.                │
//! │                                                                     │
//! │  OUR SOLUTION: integer minor units (cents). The database, the       │
//! │  pricing math, and the settlement comparison all use the same       │
//! │  exact i64 value. Only a UI would ever format it.                   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use warung_core::money::Money;
//!
//! let price = Money::from_cents(10_000);
//! let line = price * 3i64;
//! assert_eq!(line.cents(), 30_000);
//!
//! // 10% of the line, in basis points (1000 bps = 10%)
//! assert_eq!(line.percent_bps(1000).cents(), 3_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: allows negative values for refunds and credits
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Derives**: full serde support for JSON serialization
///
/// Every monetary field in the system (`price_cents`, `subtotal_cents`,
/// `amount_saved_cents`, ...) is the raw i64 form of this type; entity
/// structs expose `Money` through accessor methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Zero money value.
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

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use warung_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(10_000);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 30_000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Takes a basis-point fraction of this amount, rounded half-up.
    ///
    /// ## Basis Points
    /// 1 bps = 0.01% = 1/10000. 1100 bps = 11%, 1000 bps = 10%.
    ///
    /// ## Implementation
    /// Integer math in i128 to prevent overflow on large amounts:
    /// `(amount * bps + 5000) / 10000`. The `+5000` rounds the half case up.
    ///
    /// ## Example
    /// ```rust
    /// use warung_core::money::Money;
    ///
    /// // 10% of 30 000 = 3 000, exactly
    /// assert_eq!(Money::from_cents(30_000).percent_bps(1000).cents(), 3_000);
    /// ```
    pub fn percent_bps(&self, bps: u32) -> Money {
        let part = (self.0 as i128 * bps as i128 + 5000) / 10_000;
        Money::from_cents(part as i64)
    }

    /// Calculates tax on this amount at the given rate.
    ///
    /// The taxable base is decided by the caller (the pricing workflow
    /// taxes `subtotal - discount`); this function only applies the rate.
    ///
    /// ## Example
    /// ```rust
    /// use warung_core::money::Money;
    /// use warung_core::types::TaxRate;
    ///
    /// let base = Money::from_cents(27_000);
    /// let tax = base.calculate_tax(TaxRate::from_bps(1100)); // 11%
    /// assert_eq!(tax.cents(), 2_970);
    /// ```
    #[inline]
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        self.percent_bps(rate.bps())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows the raw minor-unit amount.
///
/// Currency formatting (symbol, thousands separators, locale) belongs to
/// the presentation layer, not here.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
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

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
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
        let money = Money::from_cents(10_000);
        assert_eq!(money.cents(), 10_000);
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        let tripled: Money = a * 3i64;
        assert_eq!(tripled.cents(), 3000);
    }

    #[test]
    fn test_percent_bps_exact() {
        // 10% of 30 000 divides evenly - no rounding involved
        let line = Money::from_cents(30_000);
        assert_eq!(line.percent_bps(1000).cents(), 3_000);
    }

    #[test]
    fn test_percent_bps_rounds_half_up() {
        // 8.25% of 1000 = 82.5 → 83
        let amount = Money::from_cents(1000);
        assert_eq!(amount.percent_bps(825).cents(), 83);
    }

    #[test]
    fn test_tax_calculation() {
        // 11% of 27 000 = 2 970
        let base = Money::from_cents(27_000);
        let tax = base.calculate_tax(TaxRate::from_bps(1100));
        assert_eq!(tax.cents(), 2_970);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        assert!(Money::from_cents(100).is_positive());
        assert!(Money::from_cents(-100).is_negative());
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_cents(10_000);
        assert_eq!(unit_price.multiply_quantity(7).cents(), 70_000);
    }

    /// Large amounts must not overflow the bps math.
    #[test]
    fn test_percent_bps_large_amount() {
        let big = Money::from_cents(i64::MAX / 2);
        // i128 intermediate keeps this from wrapping
        let half_pct = big.percent_bps(50);
        assert!(half_pct.cents() > 0);
    }
}
