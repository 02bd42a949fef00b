//! Token deltas between sqrt prices and next-price computation for exact-in swaps.

use crate::error::MathError;
use crate::math::full_math::{div_rounding_up, mul_div, mul_div_rounding_up};
use crate::math::tick_math::Q96;
use primitive_types::U256;

/// Largest value representable in 160 bits.
const MAX_U160: U256 = U256([u64::MAX, u64::MAX, u32::MAX as u64, 0]);

fn sorted(a: U256, b: U256) -> (U256, U256) {
    if a > b { (b, a) } else { (a, b) }
}

/// Token0 amount between two sqrt prices: `L · (√b − √a) / (√a · √b)`.
///
/// # Errors
/// `MathError::InvalidInput` when the lower price is zero.
pub fn amount0_delta(sqrt_a: U256, sqrt_b: U256, liquidity: u128, round_up: bool) -> Result<U256, MathError> {
    let (lower, upper) = sorted(sqrt_a, sqrt_b);
    if lower.is_zero() {
        return Err(MathError::InvalidInput("sqrt price is zero"));
    }
    let numerator1 = U256::from(liquidity) << 96;
    let numerator2 = upper - lower;
    if round_up {
        div_rounding_up(mul_div_rounding_up(numerator1, numerator2, upper)?, lower)
    } else {
        Ok(mul_div(numerator1, numerator2, upper)? / lower)
    }
}

/// Token1 amount between two sqrt prices: `L · (√b − √a)`.
///
/// # Errors
/// `MathError::Overflow` on an unrepresentable result.
pub fn amount1_delta(sqrt_a: U256, sqrt_b: U256, liquidity: u128, round_up: bool) -> Result<U256, MathError> {
    let (lower, upper) = sorted(sqrt_a, sqrt_b);
    let diff = upper - lower;
    if round_up {
        mul_div_rounding_up(U256::from(liquidity), diff, Q96)
    } else {
        mul_div(U256::from(liquidity), diff, Q96)
    }
}

fn next_from_amount0_rounding_up(sqrt_price: U256, liquidity: u128, amount: U256) -> Result<U256, MathError> {
    if amount.is_zero() {
        return Ok(sqrt_price);
    }
    let numerator1 = U256::from(liquidity) << 96;
    let (product, overflow) = amount.overflowing_mul(sqrt_price);
    if !overflow {
        let (denominator, overflow) = numerator1.overflowing_add(product);
        if !overflow {
            return mul_div_rounding_up(numerator1, sqrt_price, denominator);
        }
    }
    let fallback = (numerator1 / sqrt_price)
        .checked_add(amount)
        .ok_or(MathError::Overflow("next sqrt price from amount0"))?;
    div_rounding_up(numerator1, fallback)
}

fn next_from_amount1_rounding_down(sqrt_price: U256, liquidity: u128, amount: U256) -> Result<U256, MathError> {
    let liquidity = U256::from(liquidity);
    let quotient = if amount <= MAX_U160 {
        (amount << 96) / liquidity
    } else {
        mul_div(amount, Q96, liquidity)?
    };
    let next = sqrt_price
        .checked_add(quotient)
        .ok_or(MathError::Overflow("next sqrt price from amount1"))?;
    if next > MAX_U160 {
        return Err(MathError::Overflow("sqrt price above 160 bits"));
    }
    Ok(next)
}

/// Sqrt price after adding `amount_in` of the input token.
///
/// # Errors
/// `MathError::InvalidInput` for zero price or liquidity.
pub fn next_sqrt_price_from_input(
    sqrt_price: U256,
    liquidity: u128,
    amount_in: U256,
    zero_for_one: bool,
) -> Result<U256, MathError> {
    if sqrt_price.is_zero() || liquidity == 0 {
        return Err(MathError::InvalidInput("zero price or liquidity"));
    }
    if zero_for_one {
        next_from_amount0_rounding_up(sqrt_price, liquidity, amount_in)
    } else {
        next_from_amount1_rounding_down(sqrt_price, liquidity, amount_in)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::tick_math::sqrt_ratio_at_tick;

    #[test]
    fn test_deltas_rounding() {
        let a = sqrt_ratio_at_tick(-60).unwrap();
        let b = sqrt_ratio_at_tick(60).unwrap();
        let l = 1_000_000_000_000_000_000u128;
        let down = amount0_delta(a, b, l, false).unwrap();
        let up = amount0_delta(a, b, l, true).unwrap();
        assert!(up == down || up == down + U256::one());
        let down1 = amount1_delta(a, b, l, false).unwrap();
        let up1 = amount1_delta(b, a, l, true).unwrap();
        assert!(up1 == down1 || up1 == down1 + U256::one());
        // Symmetric range around tick 0: both sides need about the same amount.
        let gap = if down > down1 { down - down1 } else { down1 - down };
        assert!(gap < U256::from(1_000_000u64));
    }

    #[test]
    fn test_next_price_direction() {
        let p = sqrt_ratio_at_tick(0).unwrap();
        let l = 1_000_000_000_000_000_000u128;
        let amount = U256::from(1_000_000_000_000_000u64);
        assert!(next_sqrt_price_from_input(p, l, amount, true).unwrap() < p);
        assert!(next_sqrt_price_from_input(p, l, amount, false).unwrap() > p);
        assert_eq!(next_sqrt_price_from_input(p, l, U256::zero(), true).unwrap(), p);
        assert!(next_sqrt_price_from_input(p, 0, amount, true).is_err());
    }
}
