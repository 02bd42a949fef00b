//! Prelude module for convenient imports.
//!
//! ```rust
//! use dexroute_execution::prelude::*;
//! ```

pub use crate::builder::{PlanBuilder, PlanRequest};
pub use crate::gas::{GasPrices, cost_in_output, gas_cost_wei, step_gas};
pub use crate::scoring::{CandidateScore, balance_score, select_candidate};
pub use crate::steps::{Leg, approvals, build_steps, mark_use_all_balance};
