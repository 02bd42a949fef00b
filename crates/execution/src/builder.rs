//! Plan assembly and candidate selection.
//!
//! The builder re-quotes each candidate distribution hop by hop, expands it
//! into steps, prices its gas and keeps the candidate with the best
//! `(net output, balance score)` pair.

use crate::gas::{GasPrices, cost_in_output, gas_cost_wei};
use crate::scoring::{CandidateScore, balance_score, select_candidate};
use crate::steps::{Leg, approvals, build_steps, mark_use_all_balance};
use dexroute_domain::config::RouterConfig;
use dexroute_domain::entities::{ExecutionPlan, Hop, PlanSplit, Route};
use dexroute_domain::error::RouterError;
use dexroute_domain::value_objects::{Address, Percentage};
use dexroute_optimization::allocation::allocate;
use dexroute_optimization::split_optimizer::SplitOutcome;
use dexroute_simulation::route_simulator::{NATIVE_DECIMALS, RouteSimulator};
use num_bigint::BigUint;
use num_traits::Zero;
use rust_decimal::Decimal;
use tracing::{debug, info};

/// What the plan is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanRequest {
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: BigUint,
}

/// Builds the final [`ExecutionPlan`] from optimizer output.
#[derive(Debug, Clone, Copy)]
pub struct PlanBuilder<'a> {
    config: &'a RouterConfig,
    simulator: RouteSimulator<'a>,
}

impl<'a> PlanBuilder<'a> {
    pub fn new(config: &'a RouterConfig, simulator: RouteSimulator<'a>) -> Self {
        Self { config, simulator }
    }

    /// Chooses between the optimizer's split and every single route.
    ///
    /// `warnings` are attached to the returned plan unchanged.
    ///
    /// # Errors
    /// `RouterError::InvalidConfig` for a slippage outside `[0, 1]`,
    /// `RouterError::NoLiquidity` when no candidate can be quoted.
    pub fn build(
        &self,
        request: &PlanRequest,
        routes: &[Route],
        outcome: &SplitOutcome,
        prices: &GasPrices,
        warnings: Vec<String>,
    ) -> Result<ExecutionPlan, RouterError> {
        let slippage = Percentage::new(self.config.slippage).ok_or_else(|| {
            RouterError::InvalidConfig(format!("slippage {} outside [0, 1]", self.config.slippage))
        })?;

        let mut distributions = Vec::with_capacity(routes.len() + 1);
        if outcome.is_split {
            distributions.push(outcome.fractions.clone());
        }
        for (index, output) in outcome.single_outputs.iter().enumerate().take(routes.len()) {
            if !output.is_zero() {
                distributions.push(one_hot(routes.len(), index));
            }
        }

        let mut plans = Vec::with_capacity(distributions.len());
        for fractions in &distributions {
            if let Some(plan) = self.assemble(request, routes, fractions, slippage, prices) {
                plans.push(plan);
            }
        }
        let scores: Vec<CandidateScore> = plans
            .iter()
            .map(|p| CandidateScore {
                net_output: p.net_output(),
                balance_score: p.balance_score,
            })
            .collect();
        let winner = select_candidate(&scores, self.config.near_tie_tolerance).ok_or(RouterError::NoLiquidity)?;
        let mut plan = plans.swap_remove(winner);
        plan.warnings = warnings;

        info!(
            splits = plan.splits.len(),
            steps = plan.steps.len(),
            expected = %plan.expected_output,
            min = %plan.min_output,
            gas = plan.total_gas_estimate,
            balance_score = %plan.balance_score,
            candidates = scores.len(),
            "plan selected"
        );
        Ok(plan)
    }

    /// Plan for one distribution; `None` when any funded leg fails to quote.
    fn assemble(
        &self,
        request: &PlanRequest,
        routes: &[Route],
        fractions: &[Decimal],
        slippage: Percentage,
        prices: &GasPrices,
    ) -> Option<ExecutionPlan> {
        let allocations = allocate(&request.amount_in, fractions);
        let mut legs = Vec::new();
        for ((route, fraction), amount) in routes.iter().zip(fractions).zip(&allocations) {
            if amount.is_zero() {
                continue;
            }
            match self.simulator.quote(route, amount) {
                Ok(quote) => legs.push(Leg {
                    route,
                    fraction: *fraction,
                    quote,
                }),
                Err(err) => {
                    debug!(route = %route, error = %err, "candidate leg does not quote");
                    return None;
                }
            }
        }
        if legs.is_empty() {
            return None;
        }

        let mut steps = build_steps(&legs, slippage, self.config.wrapped_native, &self.config.gas);
        mark_use_all_balance(&mut steps);
        let approvals = approvals(&steps, self.config);

        let expected_output: BigUint = legs.iter().map(|l| &l.quote.amount_out).sum();
        let total_gas_estimate: u64 = steps.iter().map(|s| s.gas_estimate).sum();
        let wei = gas_cost_wei(&self.config.gas, total_gas_estimate);
        let native_like = self.config.is_native_like(&request.token_out);
        let gas_cost_in_output =
            match cost_in_output(&wei, native_like, self.output_decimals(legs[0].route), prices) {
                Some(cost) => cost,
                None => {
                    debug!(token_out = %request.token_out, "gas cost unknown, prices missing");
                    BigUint::zero()
                }
            };
        let balance_score = balance_score(legs.iter().map(|l| (l.fraction, l.route)));

        let splits = legs
            .into_iter()
            .map(|leg| PlanSplit {
                route: leg.route.clone(),
                fraction: leg.fraction,
                amount_in: leg.quote.amount_in,
                expected_output: leg.quote.amount_out,
            })
            .collect();

        Some(ExecutionPlan {
            token_in: request.token_in,
            token_out: request.token_out,
            amount_in: request.amount_in.clone(),
            splits,
            steps,
            approvals,
            min_output: slippage.min_out(&expected_output),
            expected_output,
            total_gas_estimate,
            gas_cost_in_output,
            balance_score,
            slippage: slippage.0,
            warnings: Vec::new(),
        })
    }

    /// Decimals of the route's output token.
    fn output_decimals(&self, route: &Route) -> u8 {
        match route.hops.last() {
            Some(Hop::Swap(swap)) => self
                .simulator
                .pools()
                .get(&swap.pool_id)
                .and_then(|pool| pool.tokens.get(swap.token_out_index))
                .map_or(NATIVE_DECIMALS, |token| token.decimals),
            _ => NATIVE_DECIMALS,
        }
    }
}

fn one_hot(n: usize, index: usize) -> Vec<Decimal> {
    let mut fractions = vec![Decimal::ZERO; n];
    fractions[index] = Decimal::ONE;
    fractions
}
