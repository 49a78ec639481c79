//! Integer money amounts.
//!
//! The platform currency (UGX by default) has no minor unit, so amounts
//! are plain integers - no decimal arithmetic, no cents. The currency code
//! itself is configuration, not data: every amount in one deployment is in
//! the same currency.

use serde::{Deserialize, Serialize};

/// An amount of money in the platform currency.
///
/// Amounts are whole currency units (e.g. `Money::new(2000)` is
/// UGX 2,000). Formatting for chat messages and views uses thousands
/// separators and no decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// A zero amount.
    pub const ZERO: Self = Self(0);

    /// Create an amount from whole currency units.
    #[must_use]
    pub const fn new(amount: i64) -> Self {
        Self(amount)
    }

    /// Get the underlying amount.
    #[must_use]
    pub const fn amount(self) -> i64 {
        self.0
    }

    /// The line total for `quantity` items at this unit price.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * i64::from(quantity))
    }

    /// Format with thousands separators and no decimal places.
    ///
    /// ```
    /// use sokoni_core::Money;
    ///
    /// assert_eq!(Money::new(9000).grouped(), "9,000");
    /// assert_eq!(Money::new(1_234_567).grouped(), "1,234,567");
    /// ```
    #[must_use]
    pub fn grouped(self) -> String {
        let digits = self.0.unsigned_abs().to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
        if self.0 < 0 {
            out.push('-');
        }
        let first_group = match digits.len() % 3 {
            0 => 3,
            n => n,
        };
        for (i, c) in digits.chars().enumerate() {
            if i != 0 && (i + 3 - first_group) % 3 == 0 {
                out.push(',');
            }
            out.push(c);
        }
        out
    }
}

impl std::ops::Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, std::ops::Add::add)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.grouped())
    }
}
