//! Exact output of a route for a given input, hop by hop.
//!
//! Amounts travel between hops in 18-decimal normalized units; Wrap and Unwrap
//! are identity transforms. Concentrated-liquidity hops run on raw token units
//! since their state is denominated in raw amounts.

use crate::error::SimulationError;
use dexroute_domain::entities::{Hop, Pool, PoolParams, PoolSet, Route, SwapHop};
use dexroute_domain::math::concentrated_liquidity::{
    biguint_from_u256, swap_exact_in, u256_from_biguint,
};
use dexroute_domain::math::scaling::{denormalize, ensure_supported, normalize};
use dexroute_domain::math::{stable, weighted};
use dexroute_domain::error::MathError;
use dexroute_domain::value_objects::Address;
use num_bigint::BigUint;
use num_traits::Zero;
use tracing::trace;

/// Decimals of the native asset and its wrapped form.
pub const NATIVE_DECIMALS: u8 = 18;

/// Raw amounts through one hop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HopQuote {
    pub hop: Hop,
    pub amount_in: BigUint,
    pub amount_out: BigUint,
}

/// Raw amounts through a whole route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteQuote {
    pub amount_in: BigUint,
    pub amount_out: BigUint,
    pub hops: Vec<HopQuote>,
}

/// Simulates routes against one pool snapshot.
#[derive(Debug, Clone, Copy)]
pub struct RouteSimulator<'a> {
    pools: &'a PoolSet,
    wrapped_native: Address,
}

impl<'a> RouteSimulator<'a> {
    pub fn new(pools: &'a PoolSet, wrapped_native: Address) -> Self {
        Self {
            pools,
            wrapped_native,
        }
    }

    pub fn pools(&self) -> &'a PoolSet {
        self.pools
    }

    /// Output of `route` for `amount_in` raw input units; zero on any failure.
    pub fn simulate(&self, route: &Route, amount_in: &BigUint) -> BigUint {
        if amount_in.is_zero() {
            return BigUint::zero();
        }
        match self.quote(route, amount_in) {
            Ok(quote) => quote.amount_out,
            Err(err) => {
                trace!(route = %route, error = %err, "route simulates to zero");
                BigUint::zero()
            }
        }
    }

    /// Full per-hop quote of `route` for `amount_in` raw input units.
    ///
    /// # Errors
    /// Any [`SimulationError`]; a hop with zero output is an error too.
    pub fn quote(&self, route: &Route, amount_in: &BigUint) -> Result<RouteQuote, SimulationError> {
        if amount_in.is_zero() {
            return Err(SimulationError::ZeroInput);
        }
        let mut decimals = match route.hops.first() {
            Some(Hop::Swap(swap)) => {
                let pool = self.hop_pool(swap)?;
                pool.tokens[swap.token_in_index].decimals
            }
            Some(_) => NATIVE_DECIMALS,
            None => return Err(SimulationError::InvalidRoute),
        };
        ensure_supported(decimals)?;

        let mut held = route.token_in;
        let mut amount = normalize(amount_in, decimals);
        let mut hops = Vec::with_capacity(route.hops.len());

        for hop in &route.hops {
            match hop {
                Hop::Wrap | Hop::Unwrap => {
                    let (from, to) = if matches!(hop, Hop::Wrap) {
                        (Address::NATIVE, self.wrapped_native)
                    } else {
                        (self.wrapped_native, Address::NATIVE)
                    };
                    if held != from {
                        return Err(SimulationError::InvalidRoute);
                    }
                    let raw = denormalize(&amount, NATIVE_DECIMALS);
                    hops.push(HopQuote {
                        hop: hop.clone(),
                        amount_in: raw.clone(),
                        amount_out: raw,
                    });
                    held = to;
                    decimals = NATIVE_DECIMALS;
                }
                Hop::Swap(swap) => {
                    if held != swap.token_in {
                        return Err(SimulationError::InvalidRoute);
                    }
                    let pool = self.hop_pool(swap)?;
                    let decimals_in = pool.tokens[swap.token_in_index].decimals;
                    let decimals_out = pool.tokens[swap.token_out_index].decimals;
                    ensure_supported(decimals_in)?;
                    ensure_supported(decimals_out)?;

                    let out = swap_normalized(pool, swap, &amount)?;
                    if out.is_zero() {
                        return Err(SimulationError::ZeroOutput(swap.pool_id.clone()));
                    }
                    hops.push(HopQuote {
                        hop: hop.clone(),
                        amount_in: denormalize(&amount, decimals_in),
                        amount_out: denormalize(&out, decimals_out),
                    });
                    amount = out;
                    held = swap.token_out;
                    decimals = decimals_out;
                }
            }
        }

        if held != route.token_out {
            return Err(SimulationError::InvalidRoute);
        }
        let amount_out = denormalize(&amount, decimals);
        if amount_out.is_zero() {
            return Err(SimulationError::InvalidRoute);
        }
        Ok(RouteQuote {
            amount_in: amount_in.clone(),
            amount_out,
            hops,
        })
    }

    /// The hop's pool, after checking the hop is consistent with it.
    fn hop_pool(&self, swap: &SwapHop) -> Result<&'a Pool, SimulationError> {
        let pool = self
            .pools
            .get(&swap.pool_id)
            .ok_or_else(|| SimulationError::UnknownPool(swap.pool_id.clone()))?;
        let invalid = |reason| SimulationError::InvalidHop {
            pool: swap.pool_id.clone(),
            reason,
        };
        if pool.venue != swap.venue {
            return Err(invalid("venue mismatch"));
        }
        if swap.token_in_index == swap.token_out_index {
            return Err(invalid("token indices are equal"));
        }
        let n = pool.tokens.len();
        if swap.token_in_index >= n || swap.token_out_index >= n || pool.balances.len() != n {
            return Err(invalid("token index out of range"));
        }
        if pool.tokens[swap.token_in_index].address != swap.token_in
            || pool.tokens[swap.token_out_index].address != swap.token_out
        {
            return Err(invalid("token address mismatch"));
        }
        Ok(pool)
    }
}

/// Dispatches one hop to the kernel for the pool's class.
fn swap_normalized(pool: &Pool, swap: &SwapHop, amount: &BigUint) -> Result<BigUint, SimulationError> {
    let (i, j) = (swap.token_in_index, swap.token_out_index);
    match &pool.params {
        PoolParams::Weighted(params) => {
            let balances = pool.normalized_balances();
            let (w_in, w_out) = match (params.weights.get(i), params.weights.get(j)) {
                (Some(w_in), Some(w_out)) => (*w_in, *w_out),
                _ => {
                    return Err(SimulationError::InvalidHop {
                        pool: swap.pool_id.clone(),
                        reason: "missing weight",
                    });
                }
            };
            Ok(weighted::calc_out_given_in(
                &balances[i],
                w_in,
                &balances[j],
                w_out,
                pool.swap_fee,
                amount,
            )?)
        }
        PoolParams::Stable(params) => {
            let balances = pool.normalized_balances();
            let amp = stable::scaled_amplification(params.amplification)?;
            Ok(stable::calc_out_given_in(&amp, &balances, i, j, pool.swap_fee, amount)?)
        }
        PoolParams::Concentrated(state) => {
            let decimals_in = pool.tokens[i].decimals;
            let decimals_out = pool.tokens[j].decimals;
            let raw_in = denormalize(amount, decimals_in);
            if raw_in.is_zero() {
                return Ok(BigUint::zero());
            }
            let raw_in = u256_from_biguint(&raw_in).ok_or(MathError::Overflow("swap input above 256 bits"))?;
            let outcome = swap_exact_in(state, i == 0, raw_in, pool.swap_fee.pips())?;
            Ok(normalize(&biguint_from_u256(outcome.amount_out), decimals_out))
        }
        PoolParams::Unknown => Err(SimulationError::UnroutablePool(swap.pool_id.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dexroute_domain::entities::{ConcentratedState, StableParams, Tick, TickSnapshot, Token, WeightedParams};
    use dexroute_domain::enums::Venue;
    use dexroute_domain::math::scaling::one;
    use dexroute_domain::math::tick_math::sqrt_ratio_at_tick;
    use dexroute_domain::value_objects::{PoolId, SwapFee};
    use rust_decimal_macros::dec;

    const WRAPPED: Address = Address::from_bytes([0xee; 20]);

    fn token(byte: u8, decimals: u8) -> Token {
        Token::new(Address::from_bytes([byte; 20]), format!("T{byte}"), decimals)
    }

    fn weighted_pool(id: u8, a: Token, b: Token, balances: (u64, u64), weights: (u32, u32), fee: SwapFee) -> Pool {
        let raw = |units: u64, t: &Token| BigUint::from(units) * BigUint::from(10u32).pow(u32::from(t.decimals));
        Pool {
            id: PoolId::new(vec![id; 32]),
            address: Address::from_bytes([id; 20]),
            venue: Venue::B,
            name: None,
            balances: vec![raw(balances.0, &a), raw(balances.1, &b)],
            tokens: vec![a, b],
            swap_fee: fee,
            params: PoolParams::Weighted(WeightedParams {
                weights: vec![weights.0, weights.1],
            }),
        }
    }

    fn swap_hop(pool: &Pool, i: usize, j: usize) -> Hop {
        Hop::Swap(SwapHop {
            pool_id: pool.id.clone(),
            venue: pool.venue,
            token_in_index: i,
            token_out_index: j,
            token_in: pool.tokens[i].address,
            token_out: pool.tokens[j].address,
        })
    }

    fn units(v: u64) -> BigUint {
        BigUint::from(v) * one()
    }

    #[test]
    fn test_fifty_fifty_pool_scenario() {
        let pool = weighted_pool(1, token(1, 18), token(2, 18), (1000, 1000), (50, 50), SwapFee::ZERO);
        let route = Route::new(vec![swap_hop(&pool, 0, 1)], pool.tokens[0].address, pool.tokens[1].address);
        let pools: PoolSet = [pool].into_iter().collect();
        let sim = RouteSimulator::new(&pools, WRAPPED);

        let out = sim.simulate(&route, &units(100));
        // 1000/11 = 90.909090909090909090...
        let exact = units(1000) * units(100) / units(1100);
        let diff = if out > exact { &out - &exact } else { &exact - &out };
        assert!(diff <= BigUint::from(2u32));
    }

    #[test]
    fn test_denormalized_output_matches_kernel() {
        // 18-decimal token in, 6-decimal token out.
        let fee = SwapFee::from_decimal(dec!(0.003)).unwrap();
        let pool = weighted_pool(2, token(1, 18), token(3, 6), (800, 200), (80, 20), fee);
        let route = Route::new(vec![swap_hop(&pool, 0, 1)], pool.tokens[0].address, pool.tokens[1].address);
        let pools: PoolSet = [pool.clone()].into_iter().collect();
        let sim = RouteSimulator::new(&pools, WRAPPED);

        let quote = sim.quote(&route, &units(10)).unwrap();
        let balances = pool.normalized_balances();
        let kernel = weighted::calc_out_given_in(&balances[0], 80, &balances[1], 20, fee, &units(10)).unwrap();
        assert_eq!(quote.amount_out, denormalize(&kernel, 6));
        assert_eq!(quote.hops.len(), 1);
    }

    #[test]
    fn test_wrap_is_identity() {
        let weth = Token::new(WRAPPED, "WETH", 18);
        let pool = weighted_pool(3, weth, token(4, 18), (500, 500), (50, 50), SwapFee::ZERO);
        let route = Route::new(
            vec![Hop::Wrap, swap_hop(&pool, 0, 1)],
            Address::NATIVE,
            pool.tokens[1].address,
        );
        let pools: PoolSet = [pool].into_iter().collect();
        let sim = RouteSimulator::new(&pools, WRAPPED);

        let quote = sim.quote(&route, &units(5)).unwrap();
        assert_eq!(quote.hops[0].amount_in, units(5));
        assert_eq!(quote.hops[0].amount_out, units(5));
        assert_eq!(quote.hops[1].amount_in, units(5));
    }

    #[test]
    fn test_stable_and_concentrated_hops() {
        let usdc = token(5, 6);
        let dai = token(6, 18);
        let stable = Pool {
            id: PoolId::new(vec![7; 32]),
            address: Address::from_bytes([7; 20]),
            venue: Venue::B,
            name: None,
            balances: vec![
                BigUint::from(1_000_000_000_000u64),
                units(1_000_000),
            ],
            tokens: vec![usdc.clone(), dai.clone()],
            swap_fee: SwapFee::ZERO,
            params: PoolParams::Stable(StableParams {
                amplification: dec!(100),
                is_updating: false,
            }),
        };
        let l = 1_000_000_000_000_000_000_000i128;
        let concentrated = Pool {
            id: PoolId::new(vec![8; 20]),
            address: Address::from_bytes([8; 20]),
            venue: Venue::U,
            name: None,
            balances: vec![units(1_000), units(1_000)],
            tokens: vec![dai.clone(), token(9, 18)],
            swap_fee: SwapFee::from_pips(3000).unwrap(),
            params: PoolParams::Concentrated(ConcentratedState {
                sqrt_price_x96: sqrt_ratio_at_tick(0).unwrap(),
                liquidity: l as u128,
                tick: 0,
                tick_spacing: 60,
                ticks: TickSnapshot::new(
                    vec![
                        Tick { index: -6000, liquidity_net: l, liquidity_gross: l as u128 },
                        Tick { index: 6000, liquidity_net: -l, liquidity_gross: l as u128 },
                    ],
                    60,
                ),
            }),
        };
        let route = Route::new(
            vec![swap_hop(&stable, 0, 1), swap_hop(&concentrated, 0, 1)],
            usdc.address,
            concentrated.tokens[1].address,
        );
        let pools: PoolSet = [stable, concentrated].into_iter().collect();
        let sim = RouteSimulator::new(&pools, WRAPPED);

        let quote = sim.quote(&route, &BigUint::from(1_000_000_000u64)).unwrap();
        // The DAI produced by the first hop is what the second hop consumes.
        assert_eq!(quote.hops[0].amount_out, quote.hops[1].amount_in);
        assert!(quote.amount_out > units(990) && quote.amount_out < units(1_000));
    }

    #[test]
    fn test_failures_yield_zero() {
        let pool = weighted_pool(4, token(1, 18), token(2, 18), (10, 10), (50, 50), SwapFee::ZERO);
        let good = Route::new(vec![swap_hop(&pool, 0, 1)], pool.tokens[0].address, pool.tokens[1].address);
        let broken = Route::new(vec![swap_hop(&pool, 0, 1)], pool.tokens[1].address, pool.tokens[0].address);
        let pools: PoolSet = [pool].into_iter().collect();
        let missing = PoolSet::new();

        let sim = RouteSimulator::new(&pools, WRAPPED);
        assert!(sim.simulate(&good, &BigUint::zero()).is_zero());
        assert!(sim.simulate(&broken, &units(1)).is_zero());
        assert!(matches!(sim.quote(&broken, &units(1)), Err(SimulationError::InvalidRoute)));

        let empty = RouteSimulator::new(&missing, WRAPPED);
        assert!(matches!(empty.quote(&good, &units(1)), Err(SimulationError::UnknownPool(_))));
    }
}
