use dexroute_domain::error::MathError;
use dexroute_domain::value_objects::PoolId;
use thiserror::Error;

/// Why a route could not be simulated. All kinds make the route output zero.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Math(#[from] MathError),

    #[error("pool {0} is not in the snapshot")]
    UnknownPool(PoolId),

    #[error("pool {0} has no routable class")]
    UnroutablePool(PoolId),

    #[error("hop through pool {pool} is inconsistent: {reason}")]
    InvalidHop { pool: PoolId, reason: &'static str },

    #[error("route is empty or its tokens do not chain")]
    InvalidRoute,

    #[error("hop through pool {0} produced no output")]
    ZeroOutput(PoolId),

    #[error("route input is zero")]
    ZeroInput,
}

impl SimulationError {
    /// Whether the kernel failed to converge (stable pools).
    pub fn is_divergence(&self) -> bool {
        matches!(self, SimulationError::Math(MathError::SimulationDiverged { .. }))
    }
}
