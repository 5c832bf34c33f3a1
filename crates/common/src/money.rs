//! INR currency amounts stored in paise to avoid floating point issues.

use serde::{Deserialize, Serialize};

/// An amount of Indian rupees, stored as whole paise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money {
    /// Amount in paise (e.g. 12550 = ₹125.50).
    paise: i64,
}

impl Money {
    /// Creates an amount from paise.
    pub fn from_paise(paise: i64) -> Self {
        Self { paise }
    }

    /// Creates an amount from whole rupees.
    pub fn from_rupees(rupees: i64) -> Self {
        Self {
            paise: rupees * 100,
        }
    }

    /// Returns zero rupees.
    pub fn zero() -> Self {
        Self { paise: 0 }
    }

    /// Returns the amount in paise.
    pub fn paise(&self) -> i64 {
        self.paise
    }

    /// Returns the whole-rupee portion.
    pub fn rupees(&self) -> i64 {
        self.paise / 100
    }

    /// Returns the paise portion after the rupees.
    pub fn paise_part(&self) -> i64 {
        self.paise.abs() % 100
    }

    /// Returns true if the amount is strictly positive.
    pub fn is_positive(&self) -> bool {
        self.paise > 0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.paise == 0
    }

    /// Multiplies by a unit count.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            paise: self.paise * quantity as i64,
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.paise < 0 {
            write!(f, "-₹{}.{:02}", self.rupees().abs(), self.paise_part())
        } else {
            write!(f, "₹{}.{:02}", self.rupees(), self.paise_part())
        }
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            paise: self.paise + rhs.paise,
        }
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money {
            paise: self.paise - rhs.paise,
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.paise += rhs.paise;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}
