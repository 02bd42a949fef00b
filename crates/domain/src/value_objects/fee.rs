use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// One in 18-decimal fixed point.
pub const WAD: u64 = 1_000_000_000_000_000_000;

/// Pool swap fee as an 18-decimal fraction in `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct SwapFee(u64);

impl SwapFee {
    pub const ZERO: SwapFee = SwapFee(0);

    /// Fee from its wad representation; `None` unless `wad < 1e18`.
    #[must_use]
    pub fn from_wad(wad: u64) -> Option<Self> {
        (wad < WAD).then_some(Self(wad))
    }

    /// Fee from a decimal fraction such as `0.003`, truncated to 18 decimals.
    #[must_use]
    pub fn from_decimal(fee: Decimal) -> Option<Self> {
        if fee.is_sign_negative() || fee >= Decimal::ONE {
            return None;
        }
        let scaled = fee.checked_mul(Decimal::from(WAD))?.trunc();
        scaled.to_u64().and_then(Self::from_wad)
    }

    /// Fee in hundredths of a basis point, the unit venue U pools use (3000 = 0.3%).
    #[must_use]
    pub fn from_pips(pips: u32) -> Option<Self> {
        Self::from_wad(u64::from(pips) * 1_000_000_000_000)
    }

    #[must_use]
    pub fn wad(&self) -> u64 {
        self.0
    }

    /// `1 - fee` in wad.
    #[must_use]
    pub fn complement_wad(&self) -> u64 {
        WAD - self.0
    }

    #[must_use]
    pub fn pips(&self) -> u32 {
        (self.0 / 1_000_000_000_000) as u32
    }

    #[must_use]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::from(self.0) / Decimal::from(WAD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_fee_conversions() {
        let fee = SwapFee::from_decimal(dec!(0.003)).unwrap();
        assert_eq!(fee.wad(), 3_000_000_000_000_000);
        assert_eq!(fee.pips(), 3000);
        assert_eq!(SwapFee::from_pips(3000), Some(fee));
        assert_eq!(fee.to_decimal(), dec!(0.003));
    }

    #[test]
    fn test_fee_bounds() {
        assert!(SwapFee::from_decimal(Decimal::ONE).is_none());
        assert!(SwapFee::from_decimal(dec!(-0.1)).is_none());
        assert!(SwapFee::from_wad(WAD).is_none());
    }
}
