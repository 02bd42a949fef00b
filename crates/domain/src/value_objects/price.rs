use crate::value_objects::amount::pow10;
use num_bigint::BigUint;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// USD price of one whole token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Price {
    pub value: Decimal,
}

impl Price {
    pub fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Converts `amount` raw units of a token priced at `self` into raw units of a
    /// token priced at `to`, truncating. `None` when either price is not positive.
    #[must_use]
    pub fn convert_raw(
        &self,
        amount: &BigUint,
        from_decimals: u8,
        to: &Price,
        to_decimals: u8,
    ) -> Option<BigUint> {
        if self.value <= Decimal::ZERO || to.value <= Decimal::ZERO {
            return None;
        }
        let from_mantissa = BigUint::from(self.value.mantissa().unsigned_abs());
        let to_mantissa = BigUint::from(to.value.mantissa().unsigned_abs());

        // amount·from/10^fd · 10^td / to, with both prices expanded to integer mantissas.
        let numerator = amount
            * from_mantissa
            * pow10(to.value.scale())
            * pow10(u32::from(to_decimals));
        let denominator =
            to_mantissa * pow10(self.value.scale()) * pow10(u32::from(from_decimals));
        Some(numerator / denominator)
    }
}
