//! Data access for the router: indexer and chain adapters, the persistent
//! pool-class cache, price feeds and the pool registry that ties them together.

/// Persistent pool-class cache.
pub mod cache;
/// JSON-RPC chain adapter.
pub mod chain_rpc;
/// Indexer adapters.
pub mod indexer;
/// Gas pricing inputs.
pub mod price_feed;
/// Pool discovery and classification.
pub mod registry;

/// Prelude module for convenient imports.
pub mod prelude;
