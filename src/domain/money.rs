use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

/// Fixed-scale money value. Incoming amounts are normalized to four decimal
/// places with banker's rounding so arithmetic never accumulates drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Money(Decimal);

impl Money {
    pub const TARGET_DECIMALS: u32 = 4;
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn from_decimal_str(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        let value: Decimal = s.parse().ok()?;
        Some(Self(value.round_dp(Self::TARGET_DECIMALS)))
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(Decimal::from(value))
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1$}", self.0, Self::TARGET_DECIMALS as usize)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Money::from_decimal_str(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("Invalid Money format: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::Money;

    #[test]
    fn bankers_round_half_even() {
        let v = Money::from_decimal_str("1.23445").unwrap(); // 1.23445 -> 1.2344
        assert_eq!(format!("{}", v), "1.2344");
        let v = Money::from_decimal_str("1.23455").unwrap(); // 1.23455 -> 1.2346
        assert_eq!(format!("{}", v), "1.2346");
        let v = Money::from_decimal_str("-1.23445").unwrap();
        assert_eq!(format!("{}", v), "-1.2344");
        let v = Money::from_decimal_str("-1.23455").unwrap();
        assert_eq!(format!("{}", v), "-1.2346");
    }

    #[test]
    fn pads_to_four_decimals() {
        let v = Money::from_decimal_str("400.0").unwrap();
        assert_eq!(format!("{}", v), "400.0000");
        assert_eq!(format!("{}", Money::ZERO), "0.0000");
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(Money::from_decimal_str("").is_none());
        assert!(Money::from_decimal_str("12.3.4").is_none());
        assert!(Money::from_decimal_str("abc").is_none());
    }

    #[test]
    fn scale_does_not_affect_equality() {
        let a = Money::from_decimal_str("1.5").unwrap();
        let b = Money::from_decimal_str("1.5000").unwrap();
        assert_eq!(a, b);
    }
}
