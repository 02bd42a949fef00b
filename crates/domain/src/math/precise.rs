//! Fractional powers of rationals over arbitrary-precision integers.
//!
//! `r^p` for `r ∈ (0, 1]` and rational `p` is evaluated as `exp(p · ln r)` in
//! decimal fixed point with [`WORKING_DIGITS`] digits, which keeps the relative
//! error far below `1e-40` for exponents with numerator and denominator up to
//! 1000. Integer exponents and `p = 1` are exact.

use crate::error::MathError;
use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{One, Zero};
use std::sync::LazyLock;

/// Decimal digits carried by the fixed-point logarithm and exponential.
pub const WORKING_DIGITS: u32 = 90;

/// Integer exponents up to this value are evaluated by exact exponentiation.
const EXACT_POWER_LIMIT: u32 = 64;

/// `exp` argument is halved this many times before the Taylor series.
const EXP_HALVINGS: u32 = 8;

static SCALE: LazyLock<BigInt> = LazyLock::new(|| BigInt::from(10u32).pow(WORKING_DIGITS));

// ln 2 = 2·atanh(1/3)
static LN2: LazyLock<BigInt> = LazyLock::new(|| {
    let third = &*SCALE / BigInt::from(3u32);
    atanh_fixed(&third) * BigInt::from(2u32)
});

static LN10: LazyLock<BigInt> = LazyLock::new(|| ln_fixed(&BigUint::from(10u32)));

/// An exact non-negative rational `num / den`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ratio {
    pub num: BigUint,
    pub den: BigUint,
}

impl Ratio {
    pub fn new(num: BigUint, den: BigUint) -> Self {
        Self { num, den }
    }

    pub fn zero() -> Self {
        Self::new(BigUint::zero(), BigUint::one())
    }

    pub fn one() -> Self {
        Self::new(BigUint::one(), BigUint::one())
    }

    pub fn is_zero(&self) -> bool {
        self.num.is_zero()
    }

    /// `floor(value · self)`.
    pub fn mul_floor(&self, value: &BigUint) -> BigUint {
        value * &self.num / &self.den
    }

    /// `floor(value · (1 − self))`, zero when `self ≥ 1`.
    pub fn complement_mul_floor(&self, value: &BigUint) -> BigUint {
        if self.num >= self.den {
            return BigUint::zero();
        }
        value * (&self.den - &self.num) / &self.den
    }
}

/// Computes `(num/den)^(p_num/p_den)` for a base in `[0, 1]`.
///
/// `p = 0` yields 1, a zero base yields 0, `p = 1` returns the base itself.
///
/// # Errors
/// `MathError::InvalidInput` for a zero denominator in the base or the
/// exponent, or a base above one.
pub fn pow_ratio(num: &BigUint, den: &BigUint, p_num: u32, p_den: u32) -> Result<Ratio, MathError> {
    if den.is_zero() {
        return Err(MathError::InvalidInput("power base has a zero denominator"));
    }
    if p_den == 0 {
        return Err(MathError::InvalidInput("power exponent has a zero denominator"));
    }
    if num > den {
        return Err(MathError::InvalidInput("power base above one"));
    }
    if p_num == 0 {
        return Ok(Ratio::one());
    }
    if num.is_zero() {
        return Ok(Ratio::zero());
    }

    let g = p_num.gcd(&p_den);
    let (p_num, p_den) = (p_num / g, p_den / g);

    if p_num == 1 && p_den == 1 {
        return Ok(Ratio::new(num.clone(), den.clone()));
    }
    if num == den {
        return Ok(Ratio::one());
    }
    if p_den == 1 && p_num <= EXACT_POWER_LIMIT {
        return Ok(Ratio::new(num.pow(p_num), den.pow(p_num)));
    }

    // t = p · (ln den − ln num) ≥ 0, result = exp(−t)
    let log_gap = ln_fixed(den) - ln_fixed(num);
    let t = log_gap * BigInt::from(p_num) / BigInt::from(p_den);
    let (mantissa, decades) = exp_neg_fixed(&t)?;

    let mantissa = mantissa
        .to_biguint()
        .ok_or(MathError::Overflow("negative exponential mantissa"))?;
    let scale = SCALE
        .to_biguint()
        .ok_or(MathError::Overflow("negative fixed-point scale"))?;
    let den = scale * BigUint::from(10u32).pow(decades);
    Ok(Ratio::new(mantissa, den))
}

/// `atanh(z)` for a fixed-point `|z| < 1/3`.
fn atanh_fixed(z: &BigInt) -> BigInt {
    let scale = &*SCALE;
    let z_sq = z * z / scale;
    let mut sum = z.clone();
    let mut power = z.clone();
    let mut k: u32 = 1;
    loop {
        power = power * &z_sq / scale;
        k += 2;
        let term = &power / BigInt::from(k);
        if term.is_zero() {
            break;
        }
        sum += term;
    }
    sum
}

/// Natural logarithm of an integer `v ≥ 1`, in fixed point.
fn ln_fixed(v: &BigUint) -> BigInt {
    let scale = &*SCALE;
    let k = v.bits().saturating_sub(1);
    // m = v / 2^k ∈ [1, 2)
    let m = (BigInt::from_biguint(Sign::Plus, v.clone()) * scale) >> k;
    let z = (&m - scale) * scale / (&m + scale);
    &*LN2 * BigInt::from(k) + atanh_fixed(&z) * BigInt::from(2u32)
}

/// `exp(−t)` for fixed-point `t ≥ 0`, returned as `(mantissa, m)` with
/// `exp(−t) = mantissa / (SCALE · 10^m)`.
fn exp_neg_fixed(t: &BigInt) -> Result<(BigInt, u32), MathError> {
    let scale = &*SCALE;
    let ln10 = &*LN10;
    let (decades, rest) = t.div_mod_floor(ln10);
    let decades = u32::try_from(&decades).map_err(|_| MathError::Overflow("power result underflows"))?;

    let y = rest >> EXP_HALVINGS;
    let mut sum = scale.clone();
    let mut term = scale.clone();
    let mut k: u32 = 1;
    loop {
        term = -(term * &y) / scale / BigInt::from(k);
        if term.is_zero() {
            break;
        }
        sum += &term;
        k += 1;
    }
    for _ in 0..EXP_HALVINGS {
        sum = &sum * &sum / scale;
    }
    Ok((sum, decades))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(v: u64) -> BigUint {
        BigUint::from(v)
    }

    /// |a − b| ≤ b · 10^-digits for a = an/ad, b = bn/bd.
    fn rel_close(an: &BigUint, ad: &BigUint, bn: &BigUint, bd: &BigUint, digits: u32) -> bool {
        let lhs = an * bd;
        let rhs = bn * ad;
        let diff = if lhs > rhs { &lhs - &rhs } else { &rhs - &lhs };
        diff * BigUint::from(10u32).pow(digits) <= rhs
    }

    #[test]
    fn test_square_root_of_quarter() {
        let r = pow_ratio(&big(1), &big(4), 1, 2).unwrap();
        assert!(rel_close(&r.num, &r.den, &big(1), &big(2), 40));
    }

    #[test]
    fn test_fractional_power_consistency() {
        // (7/9)^(3/2) squared equals (7/9)^3.
        let r = pow_ratio(&big(7), &big(9), 3, 2).unwrap();
        let sq_num = &r.num * &r.num;
        let sq_den = &r.den * &r.den;
        assert!(rel_close(&sq_num, &sq_den, &big(343), &big(729), 40));
    }

    #[test]
    fn test_large_exponent_terms() {
        // (3e-6)^(355/113): raise to 113 and compare against base^355.
        let base_num = big(3);
        let base_den = big(1_000_000);
        let r = pow_ratio(&base_num, &base_den, 355, 113).unwrap();
        let lhs_num = r.num.pow(113);
        let lhs_den = r.den.pow(113);
        assert!(rel_close(
            &lhs_num,
            &lhs_den,
            &base_num.pow(355),
            &base_den.pow(355),
            36
        ));
    }

    #[test]
    fn test_exponent_reduction_to_integer() {
        // 8/2 reduces to 4, evaluated exactly.
        let r = pow_ratio(&big(2), &big(3), 8, 2).unwrap();
        assert_eq!(r, Ratio::new(big(16), big(81)));
    }

    #[test]
    fn test_corner_cases() {
        let num = big(123_456);
        let den = big(1_000_000);
        assert_eq!(pow_ratio(&num, &den, 5, 5).unwrap(), Ratio::new(num.clone(), den.clone()));
        assert_eq!(pow_ratio(&num, &den, 0, 7).unwrap(), Ratio::one());
        assert!(pow_ratio(&big(0), &den, 3, 7).unwrap().is_zero());
        assert_eq!(pow_ratio(&den, &den, 3, 7).unwrap(), Ratio::one());
        assert!(pow_ratio(&big(2), &big(1), 1, 2).is_err());
        assert!(pow_ratio(&big(1), &big(0), 1, 2).is_err());
        assert!(pow_ratio(&big(1), &big(2), 1, 0).is_err());
    }

    #[test]
    fn test_ratio_complement() {
        let r = Ratio::new(big(1), big(4));
        assert_eq!(r.complement_mul_floor(&big(100)), big(75));
        assert_eq!(r.mul_floor(&big(101)), big(25));
        assert_eq!(Ratio::one().complement_mul_floor(&big(100)), big(0));
    }
}
