//! Single swap step within one initialized tick range (exact input).

use crate::error::MathError;
use crate::math::full_math::{mul_div, mul_div_rounding_up};
use crate::math::sqrt_price_math::{amount0_delta, amount1_delta, next_sqrt_price_from_input};
use primitive_types::U256;

/// Fee denominator of venue U pools (hundredths of a basis point).
pub const FEE_DENOMINATOR: u32 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapStep {
    pub sqrt_price_next: U256,
    pub amount_in: U256,
    pub amount_out: U256,
    pub fee_amount: U256,
}

/// Swaps as much of `amount_remaining` as fits between the current and target
/// prices. The direction follows from the price ordering.
///
/// # Errors
/// `MathError::InvalidInput` for a fee at or above 100%; arithmetic errors
/// from the delta computations.
pub fn compute_swap_step(
    sqrt_price_current: U256,
    sqrt_price_target: U256,
    liquidity: u128,
    amount_remaining: U256,
    fee_pips: u32,
) -> Result<SwapStep, MathError> {
    if fee_pips >= FEE_DENOMINATOR {
        return Err(MathError::InvalidInput("fee at or above 100%"));
    }
    let zero_for_one = sqrt_price_current >= sqrt_price_target;
    let denominator = U256::from(FEE_DENOMINATOR);
    let fee = U256::from(fee_pips);

    let remaining_less_fee = mul_div(amount_remaining, denominator - fee, denominator)?;
    let max_in = if zero_for_one {
        amount0_delta(sqrt_price_target, sqrt_price_current, liquidity, true)?
    } else {
        amount1_delta(sqrt_price_current, sqrt_price_target, liquidity, true)?
    };

    let sqrt_price_next = if remaining_less_fee >= max_in {
        sqrt_price_target
    } else {
        next_sqrt_price_from_input(sqrt_price_current, liquidity, remaining_less_fee, zero_for_one)?
    };
    let reached_target = sqrt_price_next == sqrt_price_target;

    let (amount_in, amount_out) = if zero_for_one {
        let amount_in = if reached_target {
            max_in
        } else {
            amount0_delta(sqrt_price_next, sqrt_price_current, liquidity, true)?
        };
        (amount_in, amount1_delta(sqrt_price_next, sqrt_price_current, liquidity, false)?)
    } else {
        let amount_in = if reached_target {
            max_in
        } else {
            amount1_delta(sqrt_price_current, sqrt_price_next, liquidity, true)?
        };
        (amount_in, amount0_delta(sqrt_price_current, sqrt_price_next, liquidity, false)?)
    };

    // A partial step keeps the whole remainder as fee.
    let fee_amount = if reached_target {
        mul_div_rounding_up(amount_in, fee, denominator - fee)?
    } else {
        amount_remaining - amount_in
    };

    Ok(SwapStep {
        sqrt_price_next,
        amount_in,
        amount_out,
        fee_amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::tick_math::sqrt_ratio_at_tick;

    #[test]
    fn test_step_stops_inside_range() {
        let current = sqrt_ratio_at_tick(0).unwrap();
        let target = sqrt_ratio_at_tick(-600).unwrap();
        let amount = U256::from(1_000_000_000_000_000u64);
        let step = compute_swap_step(current, target, 1_000_000_000_000_000_000, amount, 3000).unwrap();
        assert!(step.sqrt_price_next < current && step.sqrt_price_next > target);
        assert_eq!(step.amount_in + step.fee_amount, amount);
        assert!(step.amount_out < step.amount_in);
    }

    #[test]
    fn test_step_reaches_target() {
        let current = sqrt_ratio_at_tick(0).unwrap();
        let target = sqrt_ratio_at_tick(60).unwrap();
        let amount = U256::from(10u64).pow(U256::from(20u32));
        let step = compute_swap_step(current, target, 1_000_000_000_000_000_000, amount, 500).unwrap();
        assert_eq!(step.sqrt_price_next, target);
        assert!(step.amount_in + step.fee_amount < amount);
    }

    #[test]
    fn test_zero_liquidity_moves_freely() {
        let current = sqrt_ratio_at_tick(0).unwrap();
        let target = sqrt_ratio_at_tick(-60).unwrap();
        let step = compute_swap_step(current, target, 0, U256::from(1000u32), 3000).unwrap();
        assert_eq!(step.sqrt_price_next, target);
        assert!(step.amount_in.is_zero() && step.amount_out.is_zero());
    }
}
