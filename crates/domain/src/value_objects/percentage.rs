use crate::value_objects::amount::mul_decimal_floor;
use num_bigint::BigUint;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// A fraction in `[0, 1]`, used for slippage tolerances and split shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Percentage(pub Decimal);

impl Percentage {
    /// `None` unless `0 <= value <= 1`.
    #[must_use]
    pub fn new(value: Decimal) -> Option<Self> {
        (value >= Decimal::ZERO && value <= Decimal::ONE).then_some(Self(value))
    }

    pub fn from_bps(bps: u32) -> Self {
        Self(Decimal::from(bps) / Decimal::from(10000))
    }

    pub fn to_bps(&self) -> u32 {
        (self.0 * Decimal::from(10000)).to_u32().unwrap_or(0)
    }

    /// `floor(amount · (1 - self))`, the minimum acceptable output under this slippage.
    #[must_use]
    pub fn min_out(&self, expected: &BigUint) -> BigUint {
        mul_decimal_floor(expected, Decimal::ONE - self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_bps_round_trip() {
        let p = Percentage::from_bps(50);
        assert_eq!(p.0, dec!(0.005));
        assert_eq!(p.to_bps(), 50);
    }

    #[test]
    fn test_min_out() {
        let p = Percentage::new(dec!(0.005)).unwrap();
        assert_eq!(p.min_out(&BigUint::from(1_000_000u32)), BigUint::from(995_000u32));
        assert!(Percentage::new(dec!(1.5)).is_none());
    }
}
