use crate::allocation::allocate;
use crate::objective::{MaximizeOutput, Objective};
use crate::pivot::seed_distribution;
use dexroute_domain::config::OptimizerConfig;
use dexroute_domain::entities::Route;
use dexroute_simulation::route_simulator::RouteSimulator;
use num_bigint::BigUint;
use num_traits::Zero;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

/// Decimal places kept on the hill-climbing step after each decay.
const STEP_SCALE: u32 = 12;

/// Source of exact route outputs for the optimizer.
pub trait RouteEvaluator {
    fn route_count(&self) -> usize;
    /// Raw output of route `index` for `amount_in` raw input units; zero on failure.
    fn output(&self, index: usize, amount_in: &BigUint) -> BigUint;
}

/// Evaluates candidate routes by full simulation against a pool snapshot.
pub struct SimulatedRoutes<'a> {
    simulator: RouteSimulator<'a>,
    routes: &'a [Route],
}

impl<'a> SimulatedRoutes<'a> {
    pub fn new(simulator: RouteSimulator<'a>, routes: &'a [Route]) -> Self {
        Self { simulator, routes }
    }
}

impl RouteEvaluator for SimulatedRoutes<'_> {
    fn route_count(&self) -> usize {
        self.routes.len()
    }

    fn output(&self, index: usize, amount_in: &BigUint) -> BigUint {
        match self.routes.get(index) {
            Some(route) => self.simulator.simulate(route, amount_in),
            None => BigUint::zero(),
        }
    }
}

/// Search counters reported alongside every outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OptimizerStats {
    pub iterations: u32,
    pub evaluations: u64,
    pub final_step: Decimal,
}

/// Result of a split search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOutcome {
    /// Share of the input per candidate route, summing to one.
    pub fractions: Vec<Decimal>,
    /// Total raw output of the chosen distribution.
    pub total_output: BigUint,
    /// `false` when a single route carries the whole input.
    pub is_split: bool,
    /// Index of the best route on its own (first on ties).
    pub best_single: usize,
    /// Output of every route given the full input.
    pub single_outputs: Vec<BigUint>,
    pub stats: OptimizerStats,
}

/// Pivot-seeded pairwise hill climbing over input fractions.
#[derive(Debug, Clone)]
pub struct SplitOptimizer<O = MaximizeOutput> {
    config: OptimizerConfig,
    objective: O,
}

impl SplitOptimizer<MaximizeOutput> {
    pub fn new(config: OptimizerConfig) -> Self {
        Self::with_objective(config, MaximizeOutput)
    }
}

impl<O: Objective> SplitOptimizer<O> {
    pub fn with_objective(config: OptimizerConfig, objective: O) -> Self {
        Self { config, objective }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Distributes `total` raw input units across the evaluator's routes.
    ///
    /// A split is emitted only when its objective strictly exceeds that of
    /// every single route; otherwise the whole input goes to the best single
    /// route. Returns `None` when there is nothing to route or every route
    /// yields zero.
    pub fn optimize<E: RouteEvaluator>(&self, total: &BigUint, evaluator: &E) -> Option<SplitOutcome> {
        let n = evaluator.route_count();
        if n == 0 || total.is_zero() {
            return None;
        }
        let mut stats = OptimizerStats::default();

        let single_outputs: Vec<BigUint> = (0..n).map(|i| evaluator.output(i, total)).collect();
        stats.evaluations += n as u64;

        let mut best_single = 0;
        let mut single_value = self.objective.evaluate(&one_hot_outputs(&single_outputs, 0));
        for i in 1..n {
            let value = self.objective.evaluate(&one_hot_outputs(&single_outputs, i));
            if value > single_value {
                best_single = i;
                single_value = value;
            }
        }
        if single_value.is_zero() {
            return None;
        }

        let single = |stats: OptimizerStats| SplitOutcome {
            fractions: one_hot(n, best_single),
            total_output: single_outputs[best_single].clone(),
            is_split: false,
            best_single,
            single_outputs: single_outputs.clone(),
            stats,
        };
        if n == 1 {
            return Some(single(stats));
        }

        let mut current = seed_distribution(&single_outputs, &self.config);
        let (mut current_value, _) = self.evaluate(total, &current, evaluator, &mut stats);
        let mut best = (current.clone(), current_value.clone());
        let mut step = self.config.initial_step;

        while step >= self.config.min_step && stats.iterations < self.config.max_iterations {
            stats.iterations += 1;
            let mut improved = false;

            'scan: for i in 0..n {
                for j in (i + 1)..n {
                    for (from, to) in [(i, j), (j, i)] {
                        if current[from] < step {
                            continue;
                        }
                        let mut trial = current.clone();
                        trial[from] -= step;
                        trial[to] += step;
                        let (value, _) = self.evaluate(total, &trial, evaluator, &mut stats);
                        if value > best.1 {
                            best = (trial.clone(), value.clone());
                        }
                        if value > current_value {
                            current = trial;
                            current_value = value;
                            improved = true;
                            break 'scan;
                        }
                    }
                }
            }

            if !improved {
                step = (step * self.config.step_decay).round_dp(STEP_SCALE);
            }
        }
        stats.final_step = step;

        let (fractions, best_value) = best;
        debug!(
            routes = n,
            iterations = stats.iterations,
            evaluations = stats.evaluations,
            final_step = %stats.final_step,
            "split search finished"
        );

        if best_value <= single_value {
            return Some(single(stats));
        }
        let (_, outputs) = self.evaluate(total, &fractions, evaluator, &mut stats);
        Some(SplitOutcome {
            fractions,
            total_output: outputs.iter().sum(),
            is_split: true,
            best_single,
            single_outputs,
            stats,
        })
    }

    fn evaluate<E: RouteEvaluator>(
        &self,
        total: &BigUint,
        fractions: &[Decimal],
        evaluator: &E,
        stats: &mut OptimizerStats,
    ) -> (BigUint, Vec<BigUint>) {
        let outputs: Vec<BigUint> = allocate(total, fractions)
            .iter()
            .enumerate()
            .map(|(i, amount)| {
                if amount.is_zero() {
                    BigUint::zero()
                } else {
                    stats.evaluations += 1;
                    evaluator.output(i, amount)
                }
            })
            .collect();
        (self.objective.evaluate(&outputs), outputs)
    }
}

fn one_hot(n: usize, index: usize) -> Vec<Decimal> {
    (0..n)
        .map(|i| if i == index { Decimal::ONE } else { Decimal::ZERO })
        .collect()
}

fn one_hot_outputs(outputs: &[BigUint], index: usize) -> Vec<BigUint> {
    outputs
        .iter()
        .enumerate()
        .map(|(i, y)| if i == index { y.clone() } else { BigUint::zero() })
        .collect()
}
