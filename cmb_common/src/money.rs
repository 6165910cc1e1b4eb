use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

//--------------------------------------       Money        ----------------------------------------------------------
/// An amount of money, stored as a signed number of minor units (cents).
///
/// All order totals, escrow amounts and ledger entries are expressed in `Money`. Keeping amounts in integer cents
/// sidesteps binary floating point entirely; callers that need a two-decimal display value use the [`Display`] impl.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Money(i64);

op!(binary Money, Add, add);
op!(binary Money, Sub, sub);
op!(inplace Money, AddAssign, add_assign);
op!(inplace Money, SubAssign, sub_assign);
op!(unary Money, Neg, neg);

impl Mul<i64> for Money {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from(self.value() * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in cents: {0}")]
pub struct MoneyConversionError(String);

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Money {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Money {}

impl TryFrom<u64> for Money {
    type Error = MoneyConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(MoneyConversionError(format!("Value {} is too large to convert to Money", value)))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();
        write!(f, "{sign}${}.{:02}", cents / 100, cents % 100)
    }
}

impl Money {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn from_dollars(dollars: i64) -> Self {
        Self(dollars * 100)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

#[cfg(test)]
mod test {
    use super::Money;

    #[test]
    fn display_is_sign_aware() {
        assert_eq!(Money::from_cents(14200).to_string(), "$142.00");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
        assert_eq!(Money::from_cents(-500).to_string(), "-$5.00");
        assert_eq!(Money::default().to_string(), "$0.00");
    }

    #[test]
    fn arithmetic() {
        let total = Money::from_dollars(142);
        let advance = Money::from_cents(5680);
        let fee = Money::from_cents(1704);
        assert_eq!(total - advance - fee, Money::from_cents(6816));
        assert_eq!(advance + fee + Money::from_cents(6816), total);
        assert_eq!(-Money::from_cents(500), Money::from_cents(-500));
        assert_eq!(Money::from_cents(250) * 4, Money::from_dollars(10));
        let sum: Money = vec![Money::from_cents(1), Money::from_cents(2)].into_iter().sum();
        assert_eq!(sum, Money::from_cents(3));
    }

    #[test]
    fn in_place_adjustments() {
        let mut payout = Money::from_dollars(90);
        payout += Money::from_cents(-500);
        assert_eq!(payout, Money::from_cents(8500));
        payout -= Money::from_cents(500);
        assert_eq!(payout, Money::from_dollars(80));
    }
}
