use crate::error::AdapterError;
use alloy::primitives::Bytes;
use async_trait::async_trait;
use dexroute_domain::value_objects::Address;

/// Read-only contract access at the latest block.
#[async_trait]
pub trait Chain: Send + Sync {
    /// Executes a view call with ABI-encoded `data` and returns the raw
    /// return data.
    ///
    /// # Errors
    /// `AdapterError::RateLimited` when the node asks to back off; any other
    /// variant for transport, timeout or revert failures.
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, AdapterError>;
}
