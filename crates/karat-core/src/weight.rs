//! # Weight Module
//!
//! Net and gross weights are kept in milligrams so that the three decimal
//! places jewellers quote (`10.125 g`) survive arithmetic exactly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use ts_rs::TS;

/// A weight in milligrams.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Weight(i64);

impl Weight {
    /// Creates a weight from milligrams.
    #[inline]
    pub const fn from_mg(mg: i64) -> Self {
        Weight(mg)
    }

    /// Creates a weight from grams and a 3-digit milligram fraction.
    ///
    /// ```rust
    /// use karat_core::weight::Weight;
    ///
    /// assert_eq!(Weight::from_grams(10, 125).mg(), 10_125);
    /// ```
    #[inline]
    pub const fn from_grams(grams: i64, milli: i64) -> Self {
        Weight(grams * 1000 + milli)
    }

    #[inline]
    pub const fn mg(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Weight(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03} g", self.0 / 1000, (self.0 % 1000).abs())
    }
}

impl Add for Weight {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Weight(self.0 + other.0)
    }
}

impl Sub for Weight {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Weight(self.0 - other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_keeps_three_decimals() {
        assert_eq!(Weight::from_mg(10_125).to_string(), "10.125 g");
        assert_eq!(Weight::from_mg(5).to_string(), "0.005 g");
    }

    #[test]
    fn test_arithmetic() {
        let gross = Weight::from_grams(12, 0);
        let stones = Weight::from_grams(1, 875);
        assert_eq!((gross - stones).mg(), 10_125);
        assert_eq!((stones + stones).mg(), 3_750);
    }
}
