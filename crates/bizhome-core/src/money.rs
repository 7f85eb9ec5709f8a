//! # Money Module
//!
//! Provides the `Money` type used by summaries and display formatting.
//!
//! ## Rounding Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  WHERE ROUNDING HAPPENS                                                 │
//! │                                                                         │
//! │  ventas.total, ganancia_neta, gastos_hogar.cantidad                     │
//! │        │  stored as REAL, never rounded                                 │
//! │        ▼                                                                │
//! │  Summary sums (f64)                                                     │
//! │        │  still never rounded                                           │
//! │        ▼                                                                │
//! │  Money::to_string() / format_currency()                                 │
//! │           ONLY HERE: two decimals                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Amounts are plain floating point on purpose: the ledger stores REAL
//! columns and quantities are fractional (kg, litro), so integer cents
//! would lose the `quantity × unit_price` identity.
//!
//! ## Usage
//! ```rust
//! use bizhome_core::money::Money;
//!
//! let price = Money::new(10.5);
//! let total = price * 3.0;
//! assert_eq!(total.to_string(), "31.50");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};
use ts_rs::TS;

/// Tolerance used when comparing computed amounts.
pub const EPSILON: f64 = 1e-9;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in the store's currency.
///
/// ## Design Decisions
/// - **f64**: matches the ledger's REAL columns and fractional quantities
/// - **Transparent serde**: serializes as a bare number for the UI
/// - **Display**: always two decimals, the only place rounding happens
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct Money(f64);

impl Money {
    /// Zero amount.
    pub const ZERO: Money = Money(0.0);

    #[inline]
    pub const fn new(amount: f64) -> Self {
        Money(amount)
    }

    /// Returns the raw amount.
    #[inline]
    pub const fn amount(&self) -> f64 {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.abs() < EPSILON
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < -EPSILON
    }

    /// Percentage of this amount (`amount × percent / 100`).
    ///
    /// ## Example
    /// ```rust
    /// use bizhome_core::money::Money;
    ///
    /// let gross = Money::new(15.0);
    /// assert!(gross.percent(20.0).approx_eq(Money::new(3.0)));
    /// ```
    #[inline]
    pub fn percent(&self, percent: f64) -> Money {
        Money(self.0 * percent / 100.0)
    }

    /// Compares two amounts within [`EPSILON`].
    #[inline]
    pub fn approx_eq(&self, other: Money) -> bool {
        (self.0 - other.0).abs() < EPSILON
    }

    /// Formats with a currency symbol prefix, e.g. `$1234.50`.
    pub fn format_with(&self, symbol: &str) -> String {
        if self.0 < 0.0 {
            format!("-{}{:.2}", symbol, -self.0)
        } else {
            format!("{}{:.2}", symbol, self.0)
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl From<f64> for Money {
    fn from(amount: f64) -> Self {
        Money(amount)
    }
}

impl From<Money> for f64 {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money(self.0 - other.0)
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

/// Multiply by a (possibly fractional) quantity.
impl Mul<f64> for Money {
    type Output = Money;

    fn mul(self, quantity: f64) -> Money {
        Money(self.0 * quantity)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
