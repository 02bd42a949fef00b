//! Prelude module for convenient imports.
//!
//! ```rust
//! use dexroute_domain::prelude::*;
//! ```

pub use crate::config::{GasConfig, OptimizeOptions, OptimizerConfig, RouterConfig};
pub use crate::entities::{
    Approval, ConcentratedState, ExecutionPlan, Hop, PlanSplit, Pool, PoolError, PoolParams,
    PoolSet, Route, StableParams, Step, SwapHop, Tick, TickSnapshot, Token, WeightedParams,
};
pub use crate::enums::{PoolClass, StepMethod, StepVenue, Venue, VenueTag};
pub use crate::error::{MathError, RouterError};
pub use crate::value_objects::{
    Address, AddressError, Percentage, PoolId, Price, SwapFee, format_units, mul_decimal_floor,
    parse_units,
};
