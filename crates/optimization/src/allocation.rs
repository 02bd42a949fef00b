use dexroute_domain::value_objects::mul_decimal_floor;
use num_bigint::BigUint;
use num_traits::Zero;
use rust_decimal::Decimal;

/// Splits `total` raw input units across routes by `fractions`.
///
/// Every route receives `floor(total · s_i)`, except the last route with a
/// positive fraction, which takes whatever remains so the allocations sum to
/// `total` exactly. With no positive fraction every allocation is zero.
pub fn allocate(total: &BigUint, fractions: &[Decimal]) -> Vec<BigUint> {
    let Some(last) = fractions.iter().rposition(|f| *f > Decimal::ZERO) else {
        return vec![BigUint::zero(); fractions.len()];
    };
    let mut allocations: Vec<BigUint> = fractions
        .iter()
        .map(|f| mul_decimal_floor(total, *f))
        .collect();
    let others: BigUint = allocations
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != last)
        .map(|(_, a)| a)
        .sum();
    allocations[last] = if others >= *total {
        BigUint::zero()
    } else {
        total - others
    };
    allocations
}
