use dexroute_domain::error::RouterError;
use thiserror::Error;

/// Failures of external adapters (indexers, chain RPC, price feeds).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    /// The remote side asked us to back off.
    #[error("rate limited by {0}")]
    RateLimited(String),

    #[error("{source_name} unavailable: {reason}")]
    Unavailable { source_name: String, reason: String },

    #[error("{0} timed out")]
    Timeout(String),

    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl AdapterError {
    pub fn unavailable(source_name: impl Into<String>, reason: impl ToString) -> Self {
        AdapterError::Unavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AdapterError::RateLimited(_))
    }
}

impl From<AdapterError> for RouterError {
    fn from(err: AdapterError) -> Self {
        match err {
            AdapterError::RateLimited(source_name) => RouterError::RateLimited { source_name },
            other => RouterError::IndexerUnavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_error_mapping() {
        let limited: RouterError = AdapterError::RateLimited("indexer-b".into()).into();
        assert!(limited.is_retriable());
        let down: RouterError = AdapterError::Timeout("indexer-u".into()).into();
        assert_eq!(down, RouterError::IndexerUnavailable("indexer-u timed out".into()));
    }
}
