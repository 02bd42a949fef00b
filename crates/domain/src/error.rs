//! Error types shared across the router crates.

use thiserror::Error;

/// Errors raised by the AMM math kernel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("stable invariant did not converge after {iterations} iterations")]
    SimulationDiverged { iterations: u32 },

    #[error("invalid math input: {0}")]
    InvalidInput(&'static str),

    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),

    #[error("insufficient liquidity to fill the input amount")]
    InsufficientLiquidity,
}

/// Request-level errors surfaced to the caller of `optimize`.
///
/// `RateLimited` is the only retriable kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("no viable route with liquidity")]
    NoLiquidity,

    #[error("rate limited by {source_name}")]
    RateLimited { source_name: String },

    #[error("simulation diverged: {0}")]
    SimulationDiverged(String),

    #[error("indexer unavailable: {0}")]
    IndexerUnavailable(String),

    #[error("pool cache io failed: {0}")]
    CacheIo(String),
}

impl RouterError {
    /// Whether the caller may retry the request after a backoff.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        matches!(self, RouterError::RateLimited { .. })
    }
}

impl From<MathError> for RouterError {
    fn from(err: MathError) -> Self {
        RouterError::SimulationDiverged(err.to_string())
    }
}
