//! Step grouping, balance flags and approvals.

use crate::gas::step_gas;
use dexroute_domain::config::{GasConfig, RouterConfig};
use dexroute_domain::entities::{Approval, Hop, Route, Step};
use dexroute_domain::enums::{StepMethod, StepVenue, Venue};
use dexroute_domain::value_objects::{Address, Percentage};
use dexroute_simulation::route_simulator::{HopQuote, RouteQuote};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// One route of a plan with its share and the quote for its allocation.
#[derive(Debug, Clone)]
pub struct Leg<'a> {
    pub route: &'a Route,
    pub fraction: Decimal,
    pub quote: RouteQuote,
}

/// Expands legs into executor steps, route by route.
///
/// Consecutive swap hops on one venue share a step; Wrap and Unwrap are steps
/// of their own. Swap steps get `floor(expected · (1 - slippage))` as minimum
/// output, conversions are exact and keep their expected amount.
pub fn build_steps(legs: &[Leg<'_>], slippage: Percentage, wrapped_native: Address, gas: &GasConfig) -> Vec<Step> {
    let split_total = legs.len();
    let mut steps = Vec::new();
    for (split_index, leg) in legs.iter().enumerate() {
        let mut group: Vec<&HopQuote> = Vec::new();
        let mut group_venue: Option<Venue> = None;
        for hop in &leg.quote.hops {
            match &hop.hop {
                Hop::Swap(swap) => {
                    if group_venue.is_some_and(|v| v != swap.venue) {
                        steps.push(swap_step(&group, split_index, split_total, slippage, gas));
                        group.clear();
                    }
                    group_venue = Some(swap.venue);
                    group.push(hop);
                }
                Hop::Wrap | Hop::Unwrap => {
                    if !group.is_empty() {
                        steps.push(swap_step(&group, split_index, split_total, slippage, gas));
                        group.clear();
                    }
                    group_venue = None;
                    steps.push(conversion_step(hop, split_index, split_total, wrapped_native, gas));
                }
            }
        }
        if !group.is_empty() {
            steps.push(swap_step(&group, split_index, split_total, slippage, gas));
        }
    }
    steps
}

fn swap_step(
    hops: &[&HopQuote],
    split_index: usize,
    split_total: usize,
    slippage: Percentage,
    gas: &GasConfig,
) -> Step {
    let swaps: Vec<_> = hops.iter().filter_map(|h| h.hop.as_swap()).collect();
    let (first, last) = (swaps[0], swaps[swaps.len() - 1]);
    let venue = first.venue;
    let method = match (swaps.len(), venue) {
        (1, _) => StepMethod::Single,
        (_, Venue::B) => StepMethod::Batch,
        (_, Venue::U) => StepMethod::Multi,
    };
    let expected = hops[hops.len() - 1].amount_out.clone();
    Step {
        venue: venue.into(),
        method,
        pools: swaps.iter().map(|s| s.pool_id.clone()).collect(),
        token_in: first.token_in,
        token_out: last.token_out,
        amount_in: hops[0].amount_in.clone(),
        min_amount_out: slippage.min_out(&expected),
        expected_amount_out: expected,
        split_index,
        split_total,
        use_all_balance: false,
        gas_estimate: step_gas(gas, venue.into(), swaps.len()),
    }
}

fn conversion_step(
    hop: &HopQuote,
    split_index: usize,
    split_total: usize,
    wrapped_native: Address,
    gas: &GasConfig,
) -> Step {
    let (venue, token_in, token_out) = if matches!(hop.hop, Hop::Wrap) {
        (StepVenue::Wrap, Address::NATIVE, wrapped_native)
    } else {
        (StepVenue::Unwrap, wrapped_native, Address::NATIVE)
    };
    Step {
        venue,
        method: StepMethod::Single,
        pools: Vec::new(),
        token_in,
        token_out,
        amount_in: hop.amount_in.clone(),
        expected_amount_out: hop.amount_out.clone(),
        min_amount_out: hop.amount_out.clone(),
        split_index,
        split_total,
        use_all_balance: false,
        gas_estimate: step_gas(gas, venue, 0),
    }
}

/// Flags the last consumer of every input token, in plan order, to spend the
/// whole runtime balance. A sole consumer is its own last consumer.
pub fn mark_use_all_balance(steps: &mut [Step]) {
    let mut last: HashMap<Address, usize> = HashMap::new();
    for (index, step) in steps.iter().enumerate() {
        last.insert(step.token_in, index);
    }
    for (index, step) in steps.iter_mut().enumerate() {
        step.use_all_balance = last.get(&step.token_in) == Some(&index);
    }
}

/// Approvals the signer must grant, unique by `(token, spender)` in order of
/// first appearance, amounts summed. Conversions and native inputs need none.
pub fn approvals(steps: &[Step], config: &RouterConfig) -> Vec<Approval> {
    let mut approvals: Vec<Approval> = Vec::new();
    for step in steps {
        let spender = match step.venue {
            StepVenue::U => config.venue_u_spender,
            StepVenue::B => config.venue_b_spender,
            StepVenue::Wrap | StepVenue::Unwrap => continue,
        };
        if step.token_in.is_native() {
            continue;
        }
        match approvals
            .iter_mut()
            .find(|a| a.token == step.token_in && a.spender == spender)
        {
            Some(existing) => existing.amount += &step.amount_in,
            None => approvals.push(Approval {
                token: step.token_in,
                spender,
                amount: step.amount_in.clone(),
            }),
        }
    }
    approvals
}
