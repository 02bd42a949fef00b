use crate::paths::PathEnumerator;
use dexroute_data::price_feed::PriceFeed;
use dexroute_data::registry::PoolRegistry;
use dexroute_domain::config::{OptimizeOptions, RouterConfig};
use dexroute_domain::entities::{ExecutionPlan, PoolSet, Route};
use dexroute_domain::error::RouterError;
use dexroute_domain::value_objects::Address;
use dexroute_execution::builder::{PlanBuilder, PlanRequest};
use dexroute_execution::gas::GasPrices;
use dexroute_optimization::split_optimizer::{SimulatedRoutes, SplitOptimizer};
use dexroute_simulation::route_simulator::RouteSimulator;
use num_bigint::BigUint;
use num_traits::Zero;
use std::sync::Arc;
use tracing::{Instrument, debug, info, info_span};
use uuid::Uuid;

/// Off-chain swap router over the configured venues.
///
/// One instance serves any number of concurrent requests; the only shared
/// state is the pool cache inside the registry.
pub struct SwapRouter {
    config: RouterConfig,
    registry: PoolRegistry,
    prices: Arc<dyn PriceFeed>,
}

impl SwapRouter {
    pub fn new(config: RouterConfig, registry: PoolRegistry, prices: Arc<dyn PriceFeed>) -> Self {
        Self {
            config,
            registry,
            prices,
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn registry(&self) -> &PoolRegistry {
        &self.registry
    }

    /// Best execution plan for selling `amount_in` raw units of `token_in`.
    ///
    /// Dropping the returned future cancels the request; nothing is persisted
    /// past the last completed cache write.
    ///
    /// # Errors
    /// - `InvalidConfig` for out-of-range options, a zero amount or identical tokens
    /// - `NoLiquidity` when no route yields a positive output
    /// - `SimulationDiverged` when the only routes with liquidity fail to converge
    /// - `RateLimited`, `IndexerUnavailable` from discovery
    pub async fn optimize(
        &self,
        token_in: Address,
        token_out: Address,
        amount_in: &BigUint,
        opts: &OptimizeOptions,
    ) -> Result<ExecutionPlan, RouterError> {
        let request_id = Uuid::new_v4();
        let span = info_span!("optimize", %request_id, %token_in, %token_out, amount_in = %amount_in);
        self.run(token_in, token_out, amount_in, opts).instrument(span).await
    }

    async fn run(
        &self,
        token_in: Address,
        token_out: Address,
        amount_in: &BigUint,
        opts: &OptimizeOptions,
    ) -> Result<ExecutionPlan, RouterError> {
        let config = self.config.with_options(opts)?;
        if amount_in.is_zero() {
            return Err(RouterError::InvalidConfig("amount in must be positive".to_string()));
        }
        if token_in == token_out {
            return Err(RouterError::InvalidConfig(format!(
                "token in and token out are both {token_in}"
            )));
        }

        // Native and wrapped native are one vertex: converting needs no pools.
        let conversion_only = config.routing_vertex(&token_in) == config.routing_vertex(&token_out);
        let (pools, warnings) = if conversion_only {
            (PoolSet::new(), Vec::new())
        } else {
            let discovery = self.registry.discover(&[token_in, token_out], &config).await?;
            debug!(pools = discovery.pools.len(), dropped = discovery.dropped, "pools discovered");
            (discovery.pools, discovery.warnings)
        };
        let prices = self.gas_prices(&config, token_out).await;

        let routes = PathEnumerator::new(&pools, &config).enumerate(token_in, token_out)?;
        let simulator = RouteSimulator::new(&pools, config.wrapped_native);
        let candidates = select_candidates(&simulator, routes, amount_in, config.max_candidates)?;

        let optimizer = SplitOptimizer::new(config.optimizer.clone());
        let outcome = optimizer
            .optimize(amount_in, &SimulatedRoutes::new(simulator, &candidates))
            .ok_or(RouterError::NoLiquidity)?;
        debug!(
            iterations = outcome.stats.iterations,
            evaluations = outcome.stats.evaluations,
            is_split = outcome.is_split,
            "split search finished"
        );

        let request = PlanRequest {
            token_in,
            token_out,
            amount_in: amount_in.clone(),
        };
        let plan = PlanBuilder::new(&config, simulator).build(&request, &candidates, &outcome, &prices, warnings)?;
        info!(
            routes = candidates.len(),
            splits = plan.splits.len(),
            expected = %plan.expected_output,
            min = %plan.min_output,
            warnings = plan.warnings.len(),
            "request complete"
        );
        Ok(plan)
    }

    /// Best-effort prices for gas accounting.
    async fn gas_prices(&self, config: &RouterConfig, token_out: Address) -> GasPrices {
        if config.is_native_like(&token_out) {
            return GasPrices::default();
        }
        GasPrices {
            eth_usd: self.prices.eth_usd().await,
            token_out_usd: self.prices.token_usd(&token_out).await,
        }
    }
}

/// Simulates every route with the full input, drops the ones yielding
/// nothing and keeps the `max` best, ties in enumeration order.
fn select_candidates(
    simulator: &RouteSimulator<'_>,
    routes: Vec<Route>,
    amount_in: &BigUint,
    max: usize,
) -> Result<Vec<Route>, RouterError> {
    let total = routes.len();
    let mut diverged = 0usize;
    let mut scored: Vec<(BigUint, Route)> = Vec::with_capacity(total);
    for route in routes {
        match simulator.quote(&route, amount_in) {
            Ok(quote) => scored.push((quote.amount_out, route)),
            Err(err) => {
                if err.is_divergence() {
                    diverged += 1;
                }
                debug!(route = %route, error = %err, "route dropped");
            }
        }
    }
    debug!(total, viable = scored.len(), diverged, "routes simulated");

    if scored.is_empty() {
        return Err(if diverged > 0 {
            RouterError::SimulationDiverged(format!("{diverged} of {total} routes did not converge"))
        } else {
            RouterError::NoLiquidity
        });
    }
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.truncate(max);
    Ok(scored.into_iter().map(|(_, route)| route).collect())
}
