//! Prelude module for convenient imports.
//!
//! ```rust
//! use dexroute_data::prelude::*;
//! ```

pub use crate::cache::{CacheError, CacheStore, CachedPool, InMemoryCache, JsonFileCache, PoolCache};
pub use crate::chain_rpc::{HttpProvider, RpcChain};
pub use crate::indexer::{
    GraphQlIndexer, Indexer, PoolFilters, RawConcentrated, RawPool, RawToken,
};
pub use crate::price_feed::{PriceFeed, StaticPriceFeed};
pub use crate::registry::{Discovery, PoolRegistry};
