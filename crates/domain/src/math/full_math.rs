//! 256-bit multiply-divide with 512-bit intermediates.

use crate::error::MathError;
use primitive_types::{U256, U512};

/// `floor(a · b / denominator)`.
///
/// # Errors
/// `MathError::InvalidInput` for a zero denominator, `MathError::Overflow`
/// when the quotient does not fit 256 bits.
pub fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::InvalidInput("mul_div by zero"));
    }
    let quotient = a.full_mul(b) / U512::from(denominator);
    U256::try_from(quotient).map_err(|_| MathError::Overflow("mul_div"))
}

/// `ceil(a · b / denominator)`.
///
/// # Errors
/// Same as [`mul_div`].
pub fn mul_div_rounding_up(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::InvalidInput("mul_div by zero"));
    }
    let product = a.full_mul(b);
    let denominator = U512::from(denominator);
    let mut quotient = product / denominator;
    if !(product % denominator).is_zero() {
        quotient += U512::one();
    }
    U256::try_from(quotient).map_err(|_| MathError::Overflow("mul_div_rounding_up"))
}

/// `ceil(a / b)`.
///
/// # Errors
/// `MathError::InvalidInput` for a zero divisor.
pub fn div_rounding_up(a: U256, b: U256) -> Result<U256, MathError> {
    if b.is_zero() {
        return Err(MathError::InvalidInput("division by zero"));
    }
    let quotient = a / b;
    if (a % b).is_zero() {
        Ok(quotient)
    } else {
        Ok(quotient + U256::one())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_uses_wide_intermediate() {
        let a = U256::MAX;
        let b = U256::from(2u32);
        assert_eq!(mul_div(a, b, U256::from(4u32)).unwrap(), U256::MAX / 2);
        assert!(mul_div(a, b, U256::one()).is_err());
    }

    #[test]
    fn test_rounding_up() {
        assert_eq!(mul_div_rounding_up(U256::from(7u32), U256::from(3u32), U256::from(2u32)).unwrap(), U256::from(11u32));
        assert_eq!(mul_div_rounding_up(U256::from(4u32), U256::from(3u32), U256::from(2u32)).unwrap(), U256::from(6u32));
        assert_eq!(div_rounding_up(U256::from(10u32), U256::from(3u32)).unwrap(), U256::from(4u32));
        assert!(div_rounding_up(U256::one(), U256::zero()).is_err());
    }
}
