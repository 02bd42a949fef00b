//! Tick ↔ Q64.96 sqrt price conversion for concentrated-liquidity pools.

use crate::error::MathError;
use primitive_types::U256;
use std::sync::LazyLock;

pub const MIN_TICK: i32 = -887272;
pub const MAX_TICK: i32 = 887272;

/// `sqrt_ratio_at_tick(MIN_TICK)`.
pub const MIN_SQRT_RATIO: U256 = U256([4295128739, 0, 0, 0]);

/// `sqrt_ratio_at_tick(MAX_TICK)` = 1461446703485210103287273052203988822378723970342.
pub const MAX_SQRT_RATIO: U256 = U256([
    0x5d951d5263988d26,
    0xefd1fc6a50648849,
    0xfffd8963,
    0,
]);

/// 2^96.
pub const Q96: U256 = U256([0, 1 << 32, 0, 0]);

// 1/sqrt(1.0001)^(2^i) in Q128.128 for i = 1..19.
const TICK_FACTORS: [u128; 19] = [
    0xfff97272373d413259a46990580e213a,
    0xfff2e50f5f656932ef12357cf3c7fdcc,
    0xffe5caca7e10e4e61c3624eaa0941cd0,
    0xffcb9843d60f6159c9db58835c926644,
    0xff973b41fa98c081472e6896dfb254c0,
    0xff2ea16466c96a3843ec78b326b52861,
    0xfe5dee046a99a2a811c461f1969c3053,
    0xfcbe86c7900a88aedcffc83b479aa3a4,
    0xf987a7253ac413176f2b074cf7815e54,
    0xf3392b0822b70005940c7a398e4b70f3,
    0xe7159475a2c29b7443b29c7fa6e889d9,
    0xd097f3bdfd2022b8845ad8f792aa5825,
    0xa9f746462d870fdf8a65dc1f90e061e5,
    0x70d869a156d2a1b890bb3df62baf32f7,
    0x31be135f97d08fd981231505542fcfa6,
    0x9aa508b5b7a84e1c677de54f3e99bc9,
    0x5d6af8dedb81196699c329225ee604,
    0x2216e584f5fa1ea926041bedfe98,
    0x48a170391f7dc42444e8fa2,
];

const TICK_ODD_FACTOR: u128 = 0xfffcb933bd6fad37aa2d162d1a594001;

static FACTORS: LazyLock<Vec<U256>> =
    LazyLock::new(|| TICK_FACTORS.iter().map(|f| U256::from(*f)).collect());

/// Q64.96 sqrt price at `tick`: `sqrt(1.0001^tick) · 2^96`, rounded up.
///
/// # Errors
/// `MathError::InvalidInput` outside `[MIN_TICK, MAX_TICK]`.
pub fn sqrt_ratio_at_tick(tick: i32) -> Result<U256, MathError> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(MathError::InvalidInput("tick out of range"));
    }
    let abs_tick = tick.unsigned_abs();

    let mut ratio = if abs_tick & 1 != 0 {
        U256::from(TICK_ODD_FACTOR)
    } else {
        U256::one() << 128
    };
    for (i, factor) in FACTORS.iter().enumerate() {
        if abs_tick & (1u32 << (i + 1)) != 0 {
            ratio = (ratio * *factor) >> 128;
        }
    }
    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // Q128.128 to Q64.96, rounding up.
    let remainder = ratio & U256::from(u32::MAX);
    let mut sqrt_price = ratio >> 32;
    if !remainder.is_zero() {
        sqrt_price += U256::one();
    }
    Ok(sqrt_price)
}

/// Greatest tick whose sqrt ratio is at or below `sqrt_price_x96`.
///
/// # Errors
/// `MathError::InvalidInput` outside `[MIN_SQRT_RATIO, MAX_SQRT_RATIO)`.
pub fn tick_at_sqrt_ratio(sqrt_price_x96: U256) -> Result<i32, MathError> {
    if sqrt_price_x96 < MIN_SQRT_RATIO || sqrt_price_x96 >= MAX_SQRT_RATIO {
        return Err(MathError::InvalidInput("sqrt price out of range"));
    }
    let (mut lo, mut hi) = (MIN_TICK, MAX_TICK);
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        if sqrt_ratio_at_tick(mid)? <= sqrt_price_x96 {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    Ok(lo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert_eq!(sqrt_ratio_at_tick(MIN_TICK).unwrap(), MIN_SQRT_RATIO);
        assert_eq!(sqrt_ratio_at_tick(MAX_TICK).unwrap(), MAX_SQRT_RATIO);
        assert_eq!(
            MAX_SQRT_RATIO,
            U256::from_dec_str("1461446703485210103287273052203988822378723970342").unwrap()
        );
        assert!(sqrt_ratio_at_tick(MAX_TICK + 1).is_err());
    }

    #[test]
    fn test_tick_zero_is_q96() {
        assert_eq!(sqrt_ratio_at_tick(0).unwrap(), Q96);
        assert_eq!(Q96, U256::from_dec_str("79228162514264337593543950336").unwrap());
    }

    #[test]
    fn test_monotonic_and_inverse() {
        let mut previous = sqrt_ratio_at_tick(-1000).unwrap();
        for tick in [-999, -60, -1, 0, 1, 60, 1000] {
            let current = sqrt_ratio_at_tick(tick).unwrap();
            assert!(current > previous);
            assert_eq!(tick_at_sqrt_ratio(current).unwrap(), tick);
            assert_eq!(tick_at_sqrt_ratio(current + U256::one()).unwrap(), tick);
            previous = current;
        }
    }
}
