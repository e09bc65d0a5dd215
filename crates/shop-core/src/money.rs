//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                         │
//! │                                                                     │
//! │  In floating point:                                                 │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                       │
//! │                                                                     │
//! │  OUR SOLUTION: Integer Cents                                        │
//! │    Every amount in the system - product prices, line totals,        │
//! │    invoice totals, discounts, customer debt - is an i64 count       │
//! │    of the smallest currency unit. Arithmetic is exact.              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use shop_core::money::Money;
//!
//! let unit_price = Money::from_cents(5000);
//! let line_total = unit_price * 3;
//! assert_eq!(line_total.cents(), 15_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

/// A monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: deletion reversals and debt deltas can be negative
///   transiently; the workflow layer decides where negatives are legal.
/// - **Single field tuple struct**: zero-cost abstraction over i64.
/// - **Full serde support**: serializes as a bare integer on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
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

    /// Checks if the value is strictly positive.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies by a quantity (line total = unit price × quantity).
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Subtracts, flooring the result at zero.
    ///
    /// Used when reducing customer debt on settlement: paying off more than
    /// is owed must never leave a negative debt.
    ///
    /// ```rust
    /// use shop_core::money::Money;
    ///
    /// let debt = Money::from_cents(5_000);
    /// assert_eq!(debt.saturating_sub_floor(Money::from_cents(15_000)), Money::zero());
    /// assert_eq!(debt.saturating_sub_floor(Money::from_cents(2_000)).cents(), 3_000);
    /// ```
    #[inline]
    pub const fn saturating_sub_floor(&self, other: Money) -> Self {
        let diff = self.0 - other.0;
        if diff < 0 {
            Money(0)
        } else {
            Money(diff)
        }
    }

    /// Clamps the value to at most `max`.
    #[inline]
    pub fn min(self, max: Money) -> Self {
        Money(self.0.min(max.0))
    }
}

/// Display implementation shows money in a human-readable format.
///
/// For logs and debugging; the UI formats amounts with locale rules.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
        assert_eq!(a.multiply_quantity(4).cents(), 4000);
    }

    #[test]
    fn test_saturating_sub_floor() {
        let debt = Money::from_cents(5000);
        assert_eq!(debt.saturating_sub_floor(Money::from_cents(2000)).cents(), 3000);
        assert_eq!(debt.saturating_sub_floor(Money::from_cents(5000)).cents(), 0);
        assert_eq!(debt.saturating_sub_floor(Money::from_cents(9000)).cents(), 0);
    }

    #[test]
    fn test_min_clamp() {
        let paid = Money::from_cents(20_000);
        let due = Money::from_cents(15_000);
        assert_eq!(paid.min(due).cents(), 15_000);
        assert_eq!(due.min(paid).cents(), 15_000);
    }

    #[test]
    fn test_sign_checks() {
        assert!(Money::zero().is_zero());
        assert!(Money::from_cents(1).is_positive());
        assert!(Money::from_cents(-1).is_negative());
    }
}
