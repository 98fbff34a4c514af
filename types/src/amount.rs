//! Token amount type.
//!
//! Amounts are fixed-point integers (u128) to avoid floating-point errors.
//! The smallest unit is 1 raw; the on-chain token uses wider words, but every
//! value the indexer handles fits comfortably in 128 bits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

/// A staked-token amount in raw units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenAmount(u128);

impl TokenAmount {
    pub const ZERO: Self = Self(0);

    pub fn new(raw: u128) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl Add for TokenAmount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for TokenAmount {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Sum for TokenAmount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, a| Self(acc.0 + a.0))
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_sub_detects_underflow() {
        let a = TokenAmount::new(5);
        let b = TokenAmount::new(7);
        assert_eq!(a.checked_sub(b), None);
        assert_eq!(b.checked_sub(a), Some(TokenAmount::new(2)));
    }

    #[test]
    fn saturating_sub_clamps_to_zero() {
        let a = TokenAmount::new(5);
        let b = TokenAmount::new(7);
        assert_eq!(a.saturating_sub(b), TokenAmount::ZERO);
    }

    #[test]
    fn sum_over_iterator() {
        let total: TokenAmount = [1u128, 2, 3].iter().map(|&n| TokenAmount::new(n)).sum();
        assert_eq!(total, TokenAmount::new(6));
    }
}
