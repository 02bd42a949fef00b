pub mod plan;
pub mod pool;
pub mod route;
pub mod token;

// Re-export for easier access
pub use plan::{Approval, ExecutionPlan, PlanSplit, Step};
pub use pool::{
    ConcentratedState, Pool, PoolError, PoolParams, PoolSet, StableParams, Tick, TickSnapshot,
    WeightedParams,
};
pub use route::{Hop, Route, SwapHop};
pub use token::Token;
