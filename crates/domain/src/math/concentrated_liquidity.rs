//! Exact-input swap across the initialized ticks of a concentrated-liquidity pool.

use crate::entities::pool::ConcentratedState;
use crate::error::MathError;
use crate::math::swap_math::compute_swap_step;
use crate::math::tick_math::{
    MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK, sqrt_ratio_at_tick, tick_at_sqrt_ratio,
};
use num_bigint::BigUint;
use primitive_types::U256;

/// Result of a full exact-in swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapOutcome {
    /// Input consumed, fees included.
    pub amount_in: U256,
    pub amount_out: U256,
    pub sqrt_price_after: U256,
    pub tick_after: i32,
    pub liquidity_after: u128,
    pub ticks_crossed: u32,
}

/// Simulates selling `amount_in` of token0 (`zero_for_one`) or token1.
///
/// Walks initialized ticks from the current price, debiting the fee from the
/// input at every step, until the input is exhausted.
///
/// # Errors
/// `MathError::InsufficientLiquidity` when the price limit is reached with
/// input left; arithmetic errors from the step math.
pub fn swap_exact_in(
    state: &ConcentratedState,
    zero_for_one: bool,
    amount_in: U256,
    fee_pips: u32,
) -> Result<SwapOutcome, MathError> {
    let price_limit = if zero_for_one {
        MIN_SQRT_RATIO + U256::one()
    } else {
        MAX_SQRT_RATIO - U256::one()
    };
    if (zero_for_one && state.sqrt_price_x96 <= price_limit)
        || (!zero_for_one && state.sqrt_price_x96 >= price_limit)
    {
        return Err(MathError::InsufficientLiquidity);
    }

    let mut remaining = amount_in;
    let mut amount_out = U256::zero();
    let mut sqrt_price = state.sqrt_price_x96;
    let mut tick = state.tick;
    let mut liquidity = state.liquidity;
    let mut ticks_crossed = 0u32;

    while !remaining.is_zero() && sqrt_price != price_limit {
        let next = if zero_for_one {
            state.ticks.at_or_below(tick)
        } else {
            state.ticks.above(tick)
        };
        let next_index = match next {
            Some(t) => t.index.clamp(MIN_TICK, MAX_TICK),
            None if zero_for_one => MIN_TICK,
            None => MAX_TICK,
        };
        let sqrt_price_next = sqrt_ratio_at_tick(next_index)?;
        let target = if zero_for_one {
            sqrt_price_next.max(price_limit)
        } else {
            sqrt_price_next.min(price_limit)
        };

        let step = compute_swap_step(sqrt_price, target, liquidity, remaining, fee_pips)?;
        remaining -= step.amount_in + step.fee_amount;
        amount_out += step.amount_out;
        sqrt_price = step.sqrt_price_next;

        if sqrt_price == sqrt_price_next {
            if let Some(crossed) = next {
                let net = if zero_for_one {
                    -crossed.liquidity_net
                } else {
                    crossed.liquidity_net
                };
                liquidity = apply_liquidity_delta(liquidity, net)?;
                ticks_crossed += 1;
            }
            tick = if zero_for_one { next_index - 1 } else { next_index };
        } else {
            tick = tick_at_sqrt_ratio(sqrt_price)?;
        }
    }

    if !remaining.is_zero() {
        return Err(MathError::InsufficientLiquidity);
    }

    Ok(SwapOutcome {
        amount_in: amount_in - remaining,
        amount_out,
        sqrt_price_after: sqrt_price,
        tick_after: tick,
        liquidity_after: liquidity,
        ticks_crossed,
    })
}

fn apply_liquidity_delta(liquidity: u128, delta: i128) -> Result<u128, MathError> {
    if delta < 0 {
        liquidity
            .checked_sub(delta.unsigned_abs())
            .ok_or(MathError::Overflow("liquidity below zero after crossing"))
    } else {
        liquidity
            .checked_add(delta.unsigned_abs())
            .ok_or(MathError::Overflow("liquidity above u128 after crossing"))
    }
}

/// `U256` from an arbitrary-precision integer, `None` above 256 bits.
pub fn u256_from_biguint(value: &BigUint) -> Option<U256> {
    let digits = value.to_u64_digits();
    if digits.len() > 4 {
        return None;
    }
    let mut limbs = [0u64; 4];
    limbs[..digits.len()].copy_from_slice(&digits);
    Some(U256(limbs))
}

pub fn biguint_from_u256(value: U256) -> BigUint {
    let mut bytes = Vec::with_capacity(32);
    for limb in value.0 {
        bytes.extend_from_slice(&limb.to_le_bytes());
    }
    BigUint::from_bytes_le(&bytes)
}
