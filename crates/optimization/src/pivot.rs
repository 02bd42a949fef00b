//! Seed distribution for the split search.

use dexroute_domain::config::OptimizerConfig;
use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use rust_decimal::{Decimal, MathematicalOps};

/// Decimal places kept in seed shares.
const SEED_SCALE: u32 = 9;

/// Reshapes a share around `pivot`: shares above it are amplified along a
/// concave curve, shares below it are damped quadratically.
pub fn pivot_transform(share: Decimal, pivot: Decimal) -> Decimal {
    if pivot <= Decimal::ZERO || pivot >= Decimal::ONE {
        return share;
    }
    if share > pivot {
        let span = Decimal::ONE - pivot;
        let root = ((share - pivot) / span).sqrt().unwrap_or(Decimal::ZERO);
        pivot + root * span
    } else {
        let ratio = share / pivot;
        pivot * ratio * ratio
    }
}

/// `numerator / denominator` as a decimal share with 18 places, truncated.
fn share_of(numerator: &BigUint, denominator: &BigUint) -> Decimal {
    let scaled = numerator * BigUint::from(10u64).pow(18) / denominator;
    scaled
        .to_i128()
        .map(|v| Decimal::from_i128_with_scale(v, 18))
        .unwrap_or(Decimal::ONE)
}

/// Initial split from single-shot route outputs.
///
/// Shares proportional to output go through [`pivot_transform`], are floored at
/// `seed_floor`, and are renormalized to sum to exactly one (the rounding
/// residue lands on the largest share).
pub fn seed_distribution(outputs: &[BigUint], config: &OptimizerConfig) -> Vec<Decimal> {
    let n = outputs.len();
    if n == 0 {
        return Vec::new();
    }
    let total: BigUint = outputs.iter().sum();
    let shares: Vec<Decimal> = if total.is_zero() {
        vec![Decimal::ONE / Decimal::from(n); n]
    } else {
        outputs.iter().map(|y| share_of(y, &total)).collect()
    };

    let shaped: Vec<Decimal> = shares
        .iter()
        .map(|p| pivot_transform(*p, config.pivot).max(config.seed_floor))
        .collect();
    let sum: Decimal = shaped.iter().copied().sum();

    let mut seed: Vec<Decimal> = shaped
        .iter()
        .map(|q| (*q / sum).round_dp(SEED_SCALE))
        .collect();
    let rounded: Decimal = seed.iter().copied().sum();
    let largest = seed
        .iter()
        .enumerate()
        .fold(0, |best, (i, s)| if *s > seed[best] { i } else { best });
    seed[largest] += Decimal::ONE - rounded;
    seed
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_pivot_transform_shape() {
        let pivot = dec!(0.40);
        assert_eq!(pivot_transform(pivot, pivot), pivot);
        assert!((pivot_transform(Decimal::ONE, pivot) - Decimal::ONE).abs() < dec!(0.000001));
        assert_eq!(pivot_transform(dec!(0.20), pivot), dec!(0.10));
        // Winners are amplified, losers damped.
        assert!(pivot_transform(dec!(0.55), pivot) > dec!(0.55));
        assert!(pivot_transform(dec!(0.30), pivot) < dec!(0.30));
    }

    #[test]
    fn test_seed_sums_to_one() {
        let config = OptimizerConfig::default();
        let outputs = vec![
            BigUint::from(100u32),
            BigUint::from(50u32),
            BigUint::from(1u32),
            BigUint::zero(),
        ];
        let seed = seed_distribution(&outputs, &config);
        assert_eq!(seed.iter().copied().sum::<Decimal>(), Decimal::ONE);
        assert!(seed.iter().all(|s| *s >= dec!(0.0009)));
        assert!(seed[0] > seed[1] && seed[1] > seed[2]);
    }

    #[test]
    fn test_seed_all_zero_is_uniform() {
        let config = OptimizerConfig::default();
        let seed = seed_distribution(&[BigUint::zero(), BigUint::zero()], &config);
        assert_eq!(seed, vec![dec!(0.5), dec!(0.5)]);
    }
}
