use dexroute_domain::entities::Route;
use dexroute_domain::enums::Venue;
use dexroute_domain::value_objects::mul_decimal_floor;
use num_bigint::BigUint;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Penalty factor when a plan touches both venues.
const CROSS_VENUE_FACTOR: Decimal = Decimal::from_parts(7, 0, 0, false, 1);
/// Penalty factor when any leg wraps or unwraps.
const CONVERSION_FACTOR: Decimal = Decimal::from_parts(8, 0, 0, false, 1);

/// What selection compares for one candidate plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateScore {
    pub net_output: BigUint,
    pub balance_score: Decimal,
}

/// Post-trade balance score of a set of legs; lower is better.
///
/// `maxFraction²`, scaled by 0.7 when both venues are used and by 0.8 when
/// any leg wraps or unwraps.
pub fn balance_score<'a>(legs: impl IntoIterator<Item = (Decimal, &'a Route)>) -> Decimal {
    let mut max_fraction = Decimal::ZERO;
    let mut venues = BTreeSet::new();
    let mut converts = false;
    for (fraction, route) in legs {
        if fraction <= Decimal::ZERO {
            continue;
        }
        max_fraction = max_fraction.max(fraction);
        venues.extend(route.venues());
        converts |= route.has_conversion();
    }
    let mut score = max_fraction * max_fraction;
    if venues.contains(&Venue::U) && venues.contains(&Venue::B) {
        score *= CROSS_VENUE_FACTOR;
    }
    if converts {
        score *= CONVERSION_FACTOR;
    }
    score
}

/// Index of the winning candidate.
///
/// Candidates whose net output is within `tolerance` (relative) of the best
/// are near ties. Among those the lowest balance score wins, then the highest
/// net output, then the earliest candidate.
pub fn select_candidate(candidates: &[CandidateScore], tolerance: Decimal) -> Option<usize> {
    let best = candidates.iter().map(|c| &c.net_output).max()?;
    let band = mul_decimal_floor(best, tolerance);
    let threshold = if band >= *best { BigUint::default() } else { best - &band };

    let mut winner: Option<usize> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        if candidate.net_output < threshold {
            continue;
        }
        let Some(current) = winner else {
            winner = Some(index);
            continue;
        };
        let incumbent = &candidates[current];
        let better = match candidate.balance_score.cmp(&incumbent.balance_score) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => candidate.net_output > incumbent.net_output,
        };
        if better {
            winner = Some(index);
        }
    }
    winner
}
