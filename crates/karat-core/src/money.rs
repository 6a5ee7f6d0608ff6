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
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A gold invoice multiplies a per-gram rate by a 3-decimal weight, then  │
//! │  adds making charge, wastage, stones and 3% tax. Every float step      │
//! │  drifts a little and the drift shows up on the printed bill.           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer paise                                            │
//! │    ₹6,250.00/g × 10.125 g = 625000 × 10125 / 1000 = 6328125 paise      │
//! │    Rounding happens once, at the boundary, and is explicit.            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use karat_core::money::Money;
//! use karat_core::weight::Weight;
//!
//! let rate = Money::from_cents(625_000);            // ₹6,250.00 per gram
//! let value = rate.times_weight(Weight::from_mg(10_125)); // 10.125 g
//! assert_eq!(value.cents(), 6_328_125);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;
use crate::weight::Weight;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (paise).
///
/// ## Design Decisions
/// - **i64 (signed)**: Intermediate differences (total − paid) may go negative
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Material rate ──► Pricing Engine ──► selling / final price            │
/// │                                                                         │
/// │  Item rate × qty − discount ──► subtotal ──► − header discount         │
/// │        ──► + CGST + SGST ──► − adjustments ──► total                   │
/// │        ──► payments ──► amount due / refund                            │
/// │                                                                         │
/// │  EVERY monetary value in the engine flows through this type            │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use karat_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // ₹10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole currency units.
    ///
    /// ## Example
    /// ```rust
    /// use karat_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(200_000).cents(), 20_000_000);
    /// ```
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit portion (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
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

    /// Floors the value at zero.
    #[inline]
    pub fn non_negative(self) -> Self {
        self.max(Money::zero())
    }

    /// Returns `bps / 10000` of this amount, rounded half away from zero.
    ///
    /// ## Example
    /// ```rust
    /// use karat_core::money::Money;
    ///
    /// // 12.5% of ₹1,000.00
    /// assert_eq!(Money::from_cents(100_000).percentage(1250).cents(), 12_500);
    /// ```
    pub fn percentage(&self, bps: u32) -> Money {
        Money(div_round(self.0 as i128 * bps as i128, 10_000))
    }

    /// Calculates tax at the given rate.
    ///
    /// ## Example
    /// ```rust
    /// use karat_core::money::Money;
    /// use karat_core::types::TaxRate;
    ///
    /// let price = Money::from_cents(1000);
    /// let tax = price.calculate_tax(TaxRate::from_bps(825));
    /// // ₹10.00 × 8.25% = ₹0.825 → ₹0.83
    /// assert_eq!(tax.cents(), 83);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        self.percentage(rate.bps())
    }

    /// Treats `self` as a per-gram rate and prices the given weight.
    ///
    /// `paise/g × mg / 1000`, rounded half away from zero. Uses i128 so a
    /// kilogram bar at a high rate cannot overflow.
    pub fn times_weight(&self, weight: Weight) -> Money {
        Money(div_round(self.0 as i128 * weight.mg() as i128, 1_000))
    }

    /// Multiplies money by a quantity. `None` when the product leaves `i64`.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_sub(&self, other: Money) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Sums amounts, `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use karat_core::money::Money;
    ///
    /// let parts = [Money::from_cents(i64::MAX), Money::from_cents(1)];
    /// assert!(Money::checked_sum(parts).is_none());
    /// ```
    pub fn checked_sum<I: IntoIterator<Item = Money>>(amounts: I) -> Option<Money> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, amount| acc.checked_add(amount))
    }

    /// Rounds to the nearest whole currency unit (half up).
    ///
    /// ## Example
    /// ```rust
    /// use karat_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(91_850).round_to_whole_units().cents(), 91_900);
    /// assert_eq!(Money::from_cents(91_849).round_to_whole_units().cents(), 91_800);
    /// ```
    pub fn round_to_whole_units(&self) -> Money {
        Money(div_round(self.0 as i128, 100) * 100)
    }
}

/// Integer division rounding half away from zero.
fn div_round(numerator: i128, denominator: i128) -> i64 {
    let half = denominator / 2;
    let rounded = if numerator >= 0 {
        (numerator + half) / denominator
    } else {
        (numerator - half) / denominator
    };
    rounded as i64
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money as `₹1234.50`.
///
/// ## Note
/// This is for logs and error messages. Clients format for their locale.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₹{}.{:02}", sign, self.major().abs(), self.cents_part())
    }
}

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

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
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
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "₹10.99");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-₹5.50");
        assert_eq!(format!("{}", Money::zero()), "₹0.00");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_percentage_rounds_half_away_from_zero() {
        // 3% of ₹0.50 = 1.5 paise → 2
        assert_eq!(Money::from_cents(50).percentage(300).cents(), 2);
        // 3% of ₹0.49 = 1.47 paise → 1
        assert_eq!(Money::from_cents(49).percentage(300).cents(), 1);
        assert_eq!(Money::from_cents(-50).percentage(300).cents(), -2);
    }

    #[test]
    fn test_times_weight() {
        // ₹5,000.00/g × 2.345 g = ₹11,725.00
        let rate = Money::from_cents(500_000);
        assert_eq!(rate.times_weight(Weight::from_mg(2_345)).cents(), 1_172_500);

        // ₹0.01/g × 0.500 g = 0.5 paise → 1
        assert_eq!(Money::from_cents(1).times_weight(Weight::from_mg(500)).cents(), 1);
        assert!(rate.times_weight(Weight::zero()).is_zero());
    }

    #[test]
    fn test_checked_arithmetic() {
        let rate = Money::from_cents(10_000);
        assert_eq!(rate.checked_multiply_quantity(10), Some(Money::from_cents(100_000)));
        assert_eq!(Money::from_cents(i64::MAX).checked_multiply_quantity(2), None);
        assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
        assert_eq!(Money::from_cents(i64::MIN).checked_sub(Money::from_cents(1)), None);
        assert_eq!(
            Money::checked_sum([rate, rate, rate]),
            Some(Money::from_cents(30_000))
        );
    }

    #[test]
    fn test_round_to_whole_units() {
        assert_eq!(Money::from_cents(91_850).round_to_whole_units().cents(), 91_900);
        assert_eq!(Money::from_cents(91_849).round_to_whole_units().cents(), 91_800);
        assert_eq!(Money::from_cents(0).round_to_whole_units().cents(), 0);
    }

    #[test]
    fn test_non_negative() {
        assert_eq!(Money::from_cents(-1).non_negative(), Money::zero());
        assert_eq!(Money::from_cents(7).non_negative().cents(), 7);
    }
}
