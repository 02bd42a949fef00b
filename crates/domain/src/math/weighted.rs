//! Weighted-pool swap math in 18-decimal normalized units.
//!
//! `out = balOut · (1 − (balIn / (balIn + xNet))^(wIn/wOut))`, with
//! `xNet = x · (1 − fee)` truncated toward zero.

use crate::error::MathError;
use crate::math::precise::pow_ratio;
use crate::value_objects::SwapFee;
use crate::value_objects::fee::WAD;
use num_bigint::BigUint;
use num_traits::Zero;

/// Input left after the swap fee, truncated.
pub fn amount_after_fee(amount_in: &BigUint, fee: SwapFee) -> BigUint {
    amount_in * BigUint::from(fee.complement_wad()) / BigUint::from(WAD)
}

/// Exact-in output of a weighted pool.
///
/// # Errors
/// `MathError::InvalidInput` when a balance or a weight is zero.
pub fn calc_out_given_in(
    balance_in: &BigUint,
    weight_in: u32,
    balance_out: &BigUint,
    weight_out: u32,
    fee: SwapFee,
    amount_in: &BigUint,
) -> Result<BigUint, MathError> {
    if balance_in.is_zero() || balance_out.is_zero() {
        return Err(MathError::InvalidInput("weighted pool balance is zero"));
    }
    if weight_in == 0 || weight_out == 0 {
        return Err(MathError::InvalidInput("weighted pool weight is zero"));
    }
    if amount_in.is_zero() {
        return Ok(BigUint::zero());
    }

    let net_in = amount_after_fee(amount_in, fee);
    if net_in.is_zero() {
        return Ok(BigUint::zero());
    }
    let denominator = balance_in + &net_in;

    if weight_in == weight_out {
        return Ok(balance_out * &net_in / denominator);
    }

    let ratio = pow_ratio(balance_in, &denominator, weight_in, weight_out)?;
    Ok(ratio.complement_mul_floor(balance_out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::scaling::one;
    use rust_decimal_macros::dec;

    fn units(v: u64) -> BigUint {
        BigUint::from(v) * one()
    }

    #[test]
    fn test_equal_weights_constant_product() {
        // 1000/1000 pool, 100 in: 1000 · 100 / 1100 = 90.909090909090909090 (18 decimals).
        let out = calc_out_given_in(&units(1000), 50, &units(1000), 50, SwapFee::ZERO, &units(100))
            .unwrap();
        let expected = units(1000) * units(100) / units(1100);
        assert_eq!(out, expected);
        assert_eq!(out, BigUint::from(90_909_090_909_090_909_090u128));
    }

    #[test]
    fn test_equal_weights_match_general_form() {
        // 30/30 takes the exact shortcut; 1/1 reduces to the same p = 1.
        let fee = SwapFee::from_decimal(dec!(0.0025)).unwrap();
        let a = calc_out_given_in(&units(5000), 30, &units(20), 30, fee, &units(7)).unwrap();
        let net = amount_after_fee(&units(7), fee);
        let b = units(20) * &net / (units(5000) + &net);
        assert_eq!(a, b);
    }

    #[test]
    fn test_eighty_twenty_with_fee() {
        // 800/200 at 80/20, fee 0.3%, x = 10: exponent 4 is evaluated exactly.
        let fee = SwapFee::from_decimal(dec!(0.003)).unwrap();
        let out = calc_out_given_in(&units(800), 80, &units(200), 20, fee, &units(10)).unwrap();

        let bal_in = units(800);
        let x_net = BigUint::from(9_970_000_000_000_000_000u128);
        let den = (&bal_in + &x_net).pow(4);
        let num = bal_in.pow(4);
        let expected = units(200) * (&den - &num) / &den;
        assert_eq!(out, expected);
        // ~ 9.61 units of the 20-weight token
        assert!(out > units(9) && out < units(10));
    }

    #[test]
    fn test_twenty_eighty_fractional_exponent() {
        // Reverse direction: exponent 1/4. Check (1 − out/balOut)^4 against the base ratio.
        let fee = SwapFee::from_decimal(dec!(0.003)).unwrap();
        let bal_in = units(200);
        let bal_out = units(800);
        let out = calc_out_given_in(&bal_in, 20, &bal_out, 80, fee, &units(10)).unwrap();

        let x_net = amount_after_fee(&units(10), fee);
        let left = (&bal_out - &out).pow(4);
        let left_den = bal_out.pow(4);
        let base_num = bal_in.clone();
        let base_den = &bal_in + &x_net;
        // left/left_den ≈ base_num/base_den to well within 1 normalized unit of out.
        let lhs = &left * &base_den;
        let rhs = &base_num * &left_den;
        let diff = if lhs > rhs { &lhs - &rhs } else { &rhs - &lhs };
        assert!(diff * BigUint::from(10u32).pow(15) < rhs);
    }

    #[test]
    fn test_zero_input_and_bad_pool() {
        assert_eq!(
            calc_out_given_in(&units(1), 50, &units(1), 50, SwapFee::ZERO, &BigUint::zero()).unwrap(),
            BigUint::zero()
        );
        assert!(calc_out_given_in(&BigUint::zero(), 50, &units(1), 50, SwapFee::ZERO, &units(1)).is_err());
    }
}
