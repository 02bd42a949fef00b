//! 18-decimal fixed-point normalization of raw token amounts.

use crate::entities::token::MAX_DECIMALS;
use crate::error::MathError;
use crate::value_objects::amount::pow10;
use num_bigint::BigUint;

/// Decimals of the normalized representation.
pub const NORMALIZED_DECIMALS: u8 = 18;

/// `1.0` in normalized units.
pub fn one() -> BigUint {
    pow10(u32::from(NORMALIZED_DECIMALS))
}

/// Rejects tokens with more decimals than the router supports.
pub fn ensure_supported(decimals: u8) -> Result<(), MathError> {
    if decimals > MAX_DECIMALS {
        return Err(MathError::InvalidInput("token decimals above 30"));
    }
    Ok(())
}

/// Raw units to 18-decimal normalized units, truncating when `decimals > 18`.
pub fn normalize(raw: &BigUint, decimals: u8) -> BigUint {
    match decimals.cmp(&NORMALIZED_DECIMALS) {
        std::cmp::Ordering::Less => raw * pow10(u32::from(NORMALIZED_DECIMALS - decimals)),
        std::cmp::Ordering::Equal => raw.clone(),
        std::cmp::Ordering::Greater => raw / pow10(u32::from(decimals - NORMALIZED_DECIMALS)),
    }
}

/// Normalized units back to raw units, truncating when `decimals < 18`.
pub fn denormalize(normalized: &BigUint, decimals: u8) -> BigUint {
    match decimals.cmp(&NORMALIZED_DECIMALS) {
        std::cmp::Ordering::Less => normalized / pow10(u32::from(NORMALIZED_DECIMALS - decimals)),
        std::cmp::Ordering::Equal => normalized.clone(),
        std::cmp::Ordering::Greater => normalized * pow10(u32::from(decimals - NORMALIZED_DECIMALS)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_six_decimals() {
        let raw = BigUint::from(1_500_000u64);
        let norm = normalize(&raw, 6);
        assert_eq!(norm, BigUint::from(1_500_000_000_000_000_000u128));
        assert_eq!(denormalize(&norm, 6), raw);
    }

    #[test]
    fn test_normalize_high_decimals_truncates() {
        let raw = BigUint::from(1_234_567u64);
        // 24 decimals: the last six digits are below normalized precision.
        assert_eq!(normalize(&raw, 24), BigUint::from(1u32));
        assert_eq!(denormalize(&BigUint::from(1u32), 24), BigUint::from(1_000_000u64));
    }

    #[test]
    fn test_ensure_supported() {
        assert!(ensure_supported(30).is_ok());
        assert!(ensure_supported(31).is_err());
    }
}
