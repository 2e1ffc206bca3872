use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

/// Number of decimal places kept by fees.
pub const FEE_DECIMAL_PLACES: u32 = 6;

/// An amount of coins.
/// Amounts are fixed-point decimals, so sums and differences are exact and an exactly balanced
/// transaction never turns into an insufficient one.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct Coin(Decimal);

impl Coin {
    pub const fn new(amount: Decimal) -> Self {
        Coin(amount)
    }

    pub fn zero() -> Self {
        Self::new(Decimal::ZERO)
    }

    pub fn is_negative(&self) -> bool {
        *self < Self::zero()
    }

    /// Returns `None` if the sum is outside of the representable range.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Clamps the sum to the representable range.
    pub fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    /// Rounds to `FEE_DECIMAL_PLACES` places, halfway values are rounded away from zero.
    pub fn round_fee(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(FEE_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero),
        )
    }
}

impl Add for Coin {
    type Output = Coin;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Coin {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum<Coin> for Coin {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        let mut sum = Self::zero();
        for el in iter {
            sum = sum.add(el);
        }
        sum
    }
}

impl<'a> Sum<&'a Coin> for Coin {
    fn sum<I: Iterator<Item = &'a Coin>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Sub for Coin {
    type Output = Coin;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl From<i64> for Coin {
    fn from(value: i64) -> Self {
        Self::new(Decimal::from(value))
    }
}

impl From<i32> for Coin {
    fn from(value: i32) -> Self {
        Self::new(Decimal::from(value))
    }
}

impl From<Decimal> for Coin {
    fn from(value: Decimal) -> Self {
        Self::new(value)
    }
}

impl FromStr for Coin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim())
            .map(Self::new)
            .map_err(|e| format!("Invalid amount: {}. Reason: {}", s, e))
    }
}

impl Display for Coin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} BTC", self.0.normalize())
    }
}
