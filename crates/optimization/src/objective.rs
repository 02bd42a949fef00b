use num_bigint::BigUint;
use std::cmp::Ordering;

/// Quantity the split optimizer maximizes, given per-route outputs of a trial split.
pub trait Objective {
    fn evaluate(&self, outputs: &[BigUint]) -> BigUint;
    fn compare(&self, a: &[BigUint], b: &[BigUint]) -> Ordering {
        self.evaluate(a).cmp(&self.evaluate(b))
    }
}

/// Total output across routes.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaximizeOutput;
impl Objective for MaximizeOutput {
    fn evaluate(&self, outputs: &[BigUint]) -> BigUint {
        outputs.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maximize_output_sums() {
        let a = [BigUint::from(3u32), BigUint::from(4u32)];
        let b = [BigUint::from(8u32)];
        assert_eq!(MaximizeOutput.evaluate(&a), BigUint::from(7u32));
        assert_eq!(MaximizeOutput.compare(&a, &b), Ordering::Less);
    }
}
