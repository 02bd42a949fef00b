//! Persistent cache of venue-B pool classes.
//!
//! Only static metadata is stored (class, weights, amplification); balances
//! change every block and are never persisted. Keys this version does not
//! know about are kept in `extra` maps and written back unchanged.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dexroute_domain::entities::{PoolParams, StableParams, WeightedParams};
use dexroute_domain::enums::{PoolClass, Venue};
use dexroute_domain::error::RouterError;
use dexroute_domain::value_objects::PoolId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Layout version written by this crate.
pub const CACHE_VERSION: &str = "1.0.0";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cache document is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<CacheError> for RouterError {
    fn from(err: CacheError) -> Self {
        RouterError::CacheIo(err.to_string())
    }
}

/// Cached metadata of one pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedPool {
    pub class: PoolClass,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amplification_parameter: Option<Decimal>,
    pub venue: Venue,
    pub queried_at: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl CachedPool {
    pub fn from_params(params: &PoolParams, venue: Venue, queried_at: DateTime<Utc>) -> Self {
        let (weights, amplification_parameter) = match params {
            PoolParams::Weighted(w) => (Some(w.weights.clone()), None),
            PoolParams::Stable(s) => (None, Some(s.amplification)),
            PoolParams::Concentrated(_) | PoolParams::Unknown => (None, None),
        };
        Self {
            class: params.class(),
            weights,
            amplification_parameter,
            venue,
            queried_at,
            extra: BTreeMap::new(),
        }
    }

    /// Pool parameters restored from the entry; `None` when the entry lacks the
    /// fields its class needs, which callers treat as a miss.
    pub fn params(&self) -> Option<PoolParams> {
        match self.class {
            PoolClass::Weighted => self
                .weights
                .clone()
                .map(|weights| PoolParams::Weighted(WeightedParams { weights })),
            PoolClass::Stable => self.amplification_parameter.map(|amplification| {
                PoolParams::Stable(StableParams {
                    amplification,
                    is_updating: false,
                })
            }),
            PoolClass::Unknown => Some(PoolParams::Unknown),
            PoolClass::Concentrated => None,
        }
    }
}

/// The whole cache document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolCache {
    pub version: String,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub pools: BTreeMap<String, CachedPool>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for PoolCache {
    fn default() -> Self {
        Self {
            version: CACHE_VERSION.to_string(),
            last_updated: DateTime::<Utc>::UNIX_EPOCH,
            pools: BTreeMap::new(),
            extra: BTreeMap::new(),
        }
    }
}

impl PoolCache {
    pub fn get(&self, id: &PoolId) -> Option<&CachedPool> {
        self.pools.get(&id.to_hex())
    }

    pub fn insert(&mut self, id: &PoolId, entry: CachedPool) {
        self.pools.insert(id.to_hex(), entry);
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}

/// Key-value persistence of the [`PoolCache`] document.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Loads the document; a store that was never written yields an empty cache.
    async fn load(&self) -> Result<PoolCache, CacheError>;
    /// Replaces the stored document.
    async fn save(&self, cache: &PoolCache) -> Result<(), CacheError>;
}

/// JSON file store.
///
/// Saves go to a temporary sibling file that is then renamed over the target,
/// so a concurrent reader sees either the old or the new document. Saves are
/// serialized.
pub struct JsonFileCache {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> CacheError {
        CacheError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Deletes the cache file. A missing file is not an error.
    pub async fn clear(&self) -> Result<(), CacheError> {
        let _guard = self.write_lock.lock().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.io_error(err)),
        }
    }
}

#[async_trait]
impl CacheStore for JsonFileCache {
    async fn load(&self) -> Result<PoolCache, CacheError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no pool cache yet");
                return Ok(PoolCache::default());
            }
            Err(err) => return Err(self.io_error(err)),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn save(&self, cache: &PoolCache) -> Result<(), CacheError> {
        let body = serde_json::to_vec_pretty(cache)?;
        let _guard = self.write_lock.lock().await;
        let temp = self.temp_path();
        tokio::fs::write(&temp, &body)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        debug!(path = %self.path.display(), pools = cache.len(), "pool cache saved");
        Ok(())
    }
}

/// Process-local store, used when no cache path is configured.
#[derive(Default)]
pub struct InMemoryCache {
    document: RwLock<PoolCache>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(cache: PoolCache) -> Self {
        Self {
            document: RwLock::new(cache),
        }
    }
}

#[async_trait]
impl CacheStore for InMemoryCache {
    async fn load(&self) -> Result<PoolCache, CacheError> {
        Ok(self.document.read().await.clone())
    }

    async fn save(&self, cache: &PoolCache) -> Result<(), CacheError> {
        *self.document.write().await = cache.clone();
        Ok(())
    }
}
