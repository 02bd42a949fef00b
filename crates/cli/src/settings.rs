//! Settings read from the environment and an optional JSON config file.

use anyhow::{Context, Result};
use dexroute_domain::config::RouterConfig;
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const ENV_INDEXER_U: &str = "DEXROUTE_INDEXER_U";
pub const ENV_INDEXER_B: &str = "DEXROUTE_INDEXER_B";
pub const ENV_RPC_URL: &str = "DEXROUTE_RPC_URL";
pub const ENV_CACHE_PATH: &str = "DEXROUTE_CACHE_PATH";
pub const ENV_ETH_USD: &str = "DEXROUTE_ETH_USD";

const DEFAULT_CACHE_PATH: &str = "pool_cache.json";

/// Endpoints and paths of one CLI run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub indexer_u: Option<String>,
    pub indexer_b: Option<String>,
    pub rpc_url: Option<String>,
    pub cache_path: PathBuf,
    pub eth_usd: Option<Decimal>,
}

impl Settings {
    /// Reads the process environment (after `.env` has been loaded).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let eth_usd = match get(ENV_ETH_USD) {
            Some(raw) => Some(
                Decimal::from_str(&raw).with_context(|| format!("{ENV_ETH_USD}={raw} is not a decimal"))?,
            ),
            None => None,
        };
        Ok(Self {
            indexer_u: get(ENV_INDEXER_U),
            indexer_b: get(ENV_INDEXER_B),
            rpc_url: get(ENV_RPC_URL),
            cache_path: get(ENV_CACHE_PATH).map_or_else(|| PathBuf::from(DEFAULT_CACHE_PATH), PathBuf::from),
            eth_usd,
        })
    }
}

/// Router configuration from `path`, or the defaults when no file is given.
pub fn load_router_config(path: Option<&Path>) -> Result<RouterConfig> {
    let Some(path) = path else {
        return Ok(RouterConfig::default());
    };
    let body = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&body).with_context(|| format!("parsing {}", path.display()))
}
