//! Candidate path enumeration over a pool snapshot.
//!
//! Native and wrapped native share one routing vertex. Paths are searched
//! between vertices (direct, one bridge, two bridges) and the Wrap/Unwrap
//! pseudo-hops are added at the ends where the requested tokens are native.

use dexroute_domain::config::RouterConfig;
use dexroute_domain::entities::{Hop, PoolSet, Route, SwapHop};
use dexroute_domain::enums::Venue;
use dexroute_domain::error::RouterError;
use dexroute_domain::value_objects::{Address, PoolId};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Enumerates candidate routes for one request.
pub struct PathEnumerator<'a> {
    config: &'a RouterConfig,
    /// Swap edges between routing vertices, in pool id order.
    edges: BTreeMap<(Address, Address), Vec<SwapHop>>,
}

impl<'a> PathEnumerator<'a> {
    /// Indexes the routable pools of enabled venues.
    pub fn new(pools: &PoolSet, config: &'a RouterConfig) -> Self {
        let mut edges: BTreeMap<(Address, Address), Vec<SwapHop>> = BTreeMap::new();
        for pool in pools.iter() {
            let enabled = match pool.venue {
                Venue::U => config.use_venue_u,
                Venue::B => config.use_venue_b,
            };
            if !enabled || !pool.is_routable() {
                continue;
            }
            for (i, from) in pool.tokens.iter().enumerate() {
                for (j, to) in pool.tokens.iter().enumerate() {
                    if i == j || from.address == to.address {
                        continue;
                    }
                    edges
                        .entry((from.address, to.address))
                        .or_default()
                        .push(SwapHop {
                            pool_id: pool.id.clone(),
                            venue: pool.venue,
                            token_in_index: i,
                            token_out_index: j,
                            token_in: from.address,
                            token_out: to.address,
                        });
                }
            }
        }
        Self { config, edges }
    }

    /// Every candidate route from `token_in` to `token_out`, deduplicated by
    /// pool sequence with the first occurrence kept.
    ///
    /// # Errors
    /// `RouterError::InvalidConfig` when both tokens are the same address.
    pub fn enumerate(&self, token_in: Address, token_out: Address) -> Result<Vec<Route>, RouterError> {
        if token_in == token_out {
            return Err(RouterError::InvalidConfig(format!(
                "token in and token out are both {token_in}"
            )));
        }
        let from = self.config.routing_vertex(&token_in);
        let to = self.config.routing_vertex(&token_out);
        if from == to {
            let hop = if token_in.is_native() { Hop::Wrap } else { Hop::Unwrap };
            return Ok(vec![Route::new(vec![hop], token_in, token_out)]);
        }

        let bridges = self.bridges(from, to);
        let mut sequences: Vec<Vec<Address>> = vec![vec![from, to]];
        if self.config.max_hops >= 2 {
            sequences.extend(bridges.iter().map(|b| vec![from, *b, to]));
        }

        let mut routes = Vec::new();
        let mut seen: HashSet<Vec<PoolId>> = HashSet::new();
        for sequence in &sequences {
            for swaps in self.expand(sequence) {
                self.push_route(swaps, token_in, token_out, &mut seen, &mut routes);
            }
        }

        if self.config.max_hops >= 3 {
            let mut three_hop = 0usize;
            'pairs: for first in &bridges {
                for second in &bridges {
                    if first == second {
                        continue;
                    }
                    for swaps in self.expand(&[from, *first, *second, to]) {
                        if three_hop >= self.config.max_three_hop_paths {
                            break 'pairs;
                        }
                        if self.push_route(swaps, token_in, token_out, &mut seen, &mut routes) {
                            three_hop += 1;
                        }
                    }
                }
            }
        }

        debug!(routes = routes.len(), bridges = bridges.len(), "paths enumerated");
        Ok(routes)
    }

    /// Bridge vertices usable between `from` and `to`, wrapped native first.
    fn bridges(&self, from: Address, to: Address) -> Vec<Address> {
        let mut bridges: Vec<Address> = Vec::with_capacity(self.config.bridges.len());
        for bridge in &self.config.bridges {
            let vertex = self.config.routing_vertex(bridge);
            if vertex != from && vertex != to && !bridges.contains(&vertex) {
                bridges.push(vertex);
            }
        }
        let wrapped = self.config.wrapped_native;
        if let Some(position) = bridges.iter().position(|b| *b == wrapped) {
            let vertex = bridges.remove(position);
            bridges.insert(0, vertex);
        }
        bridges
    }

    /// Every pool combination along a vertex sequence that uses no pool twice.
    fn expand(&self, sequence: &[Address]) -> Vec<Vec<SwapHop>> {
        let mut partial: Vec<Vec<SwapHop>> = vec![Vec::new()];
        for leg in sequence.windows(2) {
            let Some(candidates) = self.edges.get(&(leg[0], leg[1])) else {
                return Vec::new();
            };
            let mut next = Vec::with_capacity(partial.len() * candidates.len());
            for prefix in &partial {
                for hop in candidates {
                    if prefix.iter().any(|h| h.pool_id == hop.pool_id) {
                        continue;
                    }
                    let mut path = prefix.clone();
                    path.push(hop.clone());
                    next.push(path);
                }
            }
            partial = next;
        }
        partial
    }

    /// Wraps `swaps` with the conversions the request needs; `false` for a duplicate.
    fn push_route(
        &self,
        swaps: Vec<SwapHop>,
        token_in: Address,
        token_out: Address,
        seen: &mut HashSet<Vec<PoolId>>,
        routes: &mut Vec<Route>,
    ) -> bool {
        let key: Vec<PoolId> = swaps.iter().map(|s| s.pool_id.clone()).collect();
        if !seen.insert(key) {
            return false;
        }
        let mut hops = Vec::with_capacity(swaps.len() + 2);
        if token_in.is_native() {
            hops.push(Hop::Wrap);
        }
        hops.extend(swaps.into_iter().map(Hop::Swap));
        if token_out.is_native() {
            hops.push(Hop::Unwrap);
        }
        routes.push(Route::new(hops, token_in, token_out));
        true
    }
}
