//! Prelude module for convenient imports.
//!
//! ```rust
//! use dexroute_optimization::prelude::*;
//! ```

pub use crate::allocation::allocate;
pub use crate::objective::{MaximizeOutput, Objective};
pub use crate::pivot::{pivot_transform, seed_distribution};
pub use crate::split_optimizer::{
    OptimizerStats, RouteEvaluator, SimulatedRoutes, SplitOptimizer, SplitOutcome,
};
