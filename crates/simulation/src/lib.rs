//! Route simulation over an immutable pool snapshot.
//!
//! Every function here is pure: no network, no cache access, deterministic
//! for a given [`PoolSet`](dexroute_domain::entities::PoolSet).

/// Simulation errors.
pub mod error;
/// Per-route exact output simulation.
pub mod route_simulator;

/// Prelude module for convenient imports.
pub mod prelude;
