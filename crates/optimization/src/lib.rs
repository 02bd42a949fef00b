//! Split optimization over candidate routes.
//!
//! The optimizer seeds a distribution from single-route outputs with a pivot
//! transform, then improves it by pairwise hill climbing where every trial
//! split is re-simulated exactly.

/// Integer allocation of the input across routes.
pub mod allocation;
/// Objective functions.
pub mod objective;
/// Seed distribution.
pub mod pivot;
/// Pairwise hill-climbing optimizer.
pub mod split_optimizer;

/// Prelude module for convenient imports.
pub mod prelude;
