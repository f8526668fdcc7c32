//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  The storefront this replaces stored DECIMAL(10,2) and did discount    │
//! │  math in JS floats. A 7% promo on 999.00 must not drift by a unit.     │
//! │                                                                         │
//! │  OUR SOLUTION: integer minor units (kopecks/cents)                     │
//! │    999.00 → 99900, all arithmetic is exact, rounding is explicit       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use lavka_core::money::Money;
//!
//! // Create from minor units (preferred)
//! let price = Money::from_minor(1099); // 10.99
//!
//! // Arithmetic operations
//! let doubled = price * 2;                       // 21.98
//! let total = price + Money::from_minor(500);    // 15.99
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative intermediates (discount math)
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units (the smallest currency unit).
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// ## Example
    /// ```rust
    /// use lavka_core::money::Money;
    ///
    /// let price = Money::from_major_minor(10, 99); // 10.99
    /// assert_eq!(price.minor(), 1099);
    /// ```
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    /// `from_major_minor(-5, 50)` = -5.50, not -4.50
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Parses a decimal string like `"10.99"` or `"500"` into Money.
    ///
    /// Accepted forms: optional leading/trailing whitespace, an integer
    /// part, and at most two fractional digits separated by `.` or `,`.
    /// Negative amounts are rejected; this is used for operator input
    /// (product prices) where negatives are never meaningful.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let s = input.trim().replace(',', ".");

        let invalid = || ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: "expected a decimal like 499 or 499.90".to_string(),
        };

        let (major_str, minor_str) = match s.split_once('.') {
            Some((a, b)) => (a, b),
            None => (s.as_str(), ""),
        };

        if major_str.is_empty() || major_str.starts_with('-') || minor_str.len() > 2 {
            return Err(invalid());
        }

        let major: i64 = major_str.parse().map_err(|_| invalid())?;
        let minor: i64 = if minor_str.is_empty() {
            0
        } else {
            // "9" means 90 minor units, "09" means 9
            let parsed: i64 = minor_str.parse().map_err(|_| invalid())?;
            if minor_str.len() == 1 {
                parsed * 10
            } else {
                parsed
            }
        };

        Ok(Money::from_major_minor(major, minor))
    }

    /// Returns the value in minor units (smallest currency unit).
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
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

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use lavka_core::money::Money;
    ///
    /// let unit_price = Money::from_minor(299);
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.minor(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Clamps negative values to zero.
    ///
    /// Discount math can drive an intermediate below zero (e.g. a 100%
    /// promo); prices handed back to callers are floored here.
    #[inline]
    pub const fn clamp_non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable decimal format.
///
/// ## Note
/// This is for logs and notification text. The mini-app frontend formats
/// amounts itself to handle localization properly.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor_part())
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

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minor() {
        let money = Money::from_minor(1099);
        assert_eq!(money.minor(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor_part(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        let money = Money::from_major_minor(10, 99);
        assert_eq!(money.minor(), 1099);

        let negative = Money::from_major_minor(-5, 50);
        assert_eq!(negative.minor(), -550);
    }

    #[test]
    fn test_parse() {
        assert_eq!(Money::parse("499").unwrap().minor(), 49900);
        assert_eq!(Money::parse("499.90").unwrap().minor(), 49990);
        assert_eq!(Money::parse("499,90").unwrap().minor(), 49990);
        assert_eq!(Money::parse("  10.5 ").unwrap().minor(), 1050);
        assert_eq!(Money::parse("0.07").unwrap().minor(), 7);

        assert!(Money::parse("").is_err());
        assert!(Money::parse("-10").is_err());
        assert!(Money::parse("10.999").is_err());
        assert!(Money::parse("ten").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_minor(1099)), "10.99");
        assert_eq!(format!("{}", Money::from_minor(500)), "5.00");
        assert_eq!(format!("{}", Money::from_minor(-550)), "-5.50");
        assert_eq!(format!("{}", Money::from_minor(0)), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_minor(1000);
        let b = Money::from_minor(500);

        assert_eq!((a + b).minor(), 1500);
        assert_eq!((a - b).minor(), 500);
        let result: Money = a * 3;
        assert_eq!(result.minor(), 3000);
    }

    #[test]
    fn test_clamp_non_negative() {
        assert_eq!(Money::from_minor(-100).clamp_non_negative().minor(), 0);
        assert_eq!(Money::from_minor(100).clamp_non_negative().minor(), 100);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_minor(100);
        assert!(positive.is_positive());

        let negative = Money::from_minor(-100);
        assert!(negative.is_negative());
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_minor(299);
        assert_eq!(unit_price.multiply_quantity(3).minor(), 897);
    }
}
