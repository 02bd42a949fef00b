//! Pool discovery and classification for one request.
//!
//! Indexers of every enabled venue are queried concurrently, records are
//! filtered and converted to raw units, and venue-B pools are classified from
//! the cache or, on a miss, by chain probes. The cache is held as an immutable
//! snapshot that is replaced wholesale after new classifications.

use crate::cache::{CacheError, CacheStore, CachedPool, PoolCache};
use crate::indexer::{Indexer, PoolFilters, RawPool};
use chrono::Utc;
use dexroute_domain::config::RouterConfig;
use dexroute_domain::entities::{Pool, PoolParams, PoolSet};
use dexroute_domain::enums::Venue;
use dexroute_domain::error::RouterError;
use dexroute_domain::math::scaling::one;
use dexroute_domain::value_objects::{Address, PoolId, mul_decimal_floor};
use dexroute_protocols::chain::Chain;
use dexroute_protocols::error::AdapterError;
use dexroute_protocols::probes::classify_pool;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Output of [`PoolRegistry::discover`].
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Routable pools with complete static metadata.
    pub pools: PoolSet,
    /// Absorbed failures worth reporting to the caller.
    pub warnings: Vec<String>,
    /// Records dropped by filters, classification or validation.
    pub dropped: usize,
}

enum Classification {
    /// Parameters carried by the indexer record itself.
    Indexed(PoolParams),
    Cached(PoolParams),
    Probed(PoolParams),
    /// Probing ran past the deadline.
    TimedOut,
}

pub struct PoolRegistry {
    indexers: Vec<Arc<dyn Indexer>>,
    chain: Arc<dyn Chain>,
    store: Arc<dyn CacheStore>,
    filters: PoolFilters,
    snapshot: RwLock<Option<Arc<PoolCache>>>,
    save_lock: Mutex<()>,
}

impl PoolRegistry {
    pub fn new(indexers: Vec<Arc<dyn Indexer>>, chain: Arc<dyn Chain>, store: Arc<dyn CacheStore>) -> Self {
        Self {
            indexers,
            chain,
            store,
            filters: PoolFilters::default(),
            snapshot: RwLock::new(None),
            save_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn with_filters(mut self, filters: PoolFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Current cache snapshot, loading it from the store on first use.
    ///
    /// A load failure records a warning and yields an empty cache for this
    /// call only; nothing is kept, so the next call retries the store.
    pub async fn cache_snapshot(&self, warnings: &mut Vec<String>) -> Arc<PoolCache> {
        match self.loaded_snapshot().await {
            Ok(cache) => cache,
            Err(err) => {
                let err = RouterError::from(err);
                warn!(error = %err, "continuing with in-memory pool cache");
                warnings.push(err.to_string());
                Arc::new(PoolCache::default())
            }
        }
    }

    async fn loaded_snapshot(&self) -> Result<Arc<PoolCache>, CacheError> {
        if let Some(cache) = self.snapshot.read().await.as_ref() {
            return Ok(Arc::clone(cache));
        }
        let mut guard = self.snapshot.write().await;
        if let Some(cache) = guard.as_ref() {
            return Ok(Arc::clone(cache));
        }
        let cache = Arc::new(self.store.load().await?);
        debug!(pools = cache.len(), "pool cache loaded");
        *guard = Some(Arc::clone(&cache));
        Ok(cache)
    }

    /// Finds the routable pools touching `tokens` or any configured bridge.
    ///
    /// # Errors
    /// `RouterError::RateLimited` when any indexer or probe is throttled,
    /// `RouterError::IndexerUnavailable` when an indexer fails outright.
    pub async fn discover(&self, tokens: &[Address], config: &RouterConfig) -> Result<Discovery, RouterError> {
        let deadline = Duration::from_secs(config.io_deadline_secs);
        let mut discovery = Discovery::default();
        let query_tokens = query_token_set(tokens, config);

        let raw_pools = self.fetch(&query_tokens, config, deadline, &mut discovery.warnings).await?;
        let fetched = raw_pools.len();

        let floor = mul_decimal_floor(&one(), config.liquidity_floor);
        let mut candidates: Vec<(RawPool, Pool)> = Vec::with_capacity(raw_pools.len());
        for raw in raw_pools {
            if !raw.is_active() || raw.tokens.len() < 2 {
                continue;
            }
            match raw.to_pool(PoolParams::Unknown) {
                Ok(pool) if pool.validate().is_ok() && pool.normalized_liquidity() >= floor => {
                    candidates.push((raw, pool));
                }
                Ok(_) => {}
                Err(err) => debug!(pool = %raw.id, error = %err, "pool record rejected"),
            }
        }

        let cache = self.cache_snapshot(&mut discovery.warnings).await;
        let classifications = join_all(candidates.iter().map(|(raw, _)| self.classify(raw, &cache, deadline))).await;

        let mut fresh: Vec<(PoolId, CachedPool)> = Vec::new();
        let mut timed_out = 0usize;
        for ((raw, mut pool), classification) in candidates.into_iter().zip(classifications) {
            let params = match classification.map_err(RouterError::from)? {
                Classification::Indexed(params) | Classification::Cached(params) => params,
                Classification::Probed(params) => {
                    fresh.push((raw.id.clone(), CachedPool::from_params(&params, raw.venue, Utc::now())));
                    params
                }
                Classification::TimedOut => {
                    timed_out += 1;
                    continue;
                }
            };
            if matches!(params, PoolParams::Unknown) {
                continue;
            }
            pool.params = params;
            match pool.validate() {
                Ok(()) => {
                    discovery.pools.insert(pool);
                }
                Err(err) => warn!(error = %err, "dropping pool with invalid metadata"),
            }
        }
        if timed_out > 0 {
            warn!(timed_out, "pool classification ran past the deadline");
        }

        if !fresh.is_empty() {
            self.persist(fresh, &mut discovery.warnings).await;
        }

        discovery.dropped = fetched - discovery.pools.len();
        info!(
            fetched,
            routable = discovery.pools.len(),
            dropped = discovery.dropped,
            "pool discovery complete"
        );
        Ok(discovery)
    }

    async fn fetch(
        &self,
        tokens: &[Address],
        config: &RouterConfig,
        deadline: Duration,
        warnings: &mut Vec<String>,
    ) -> Result<Vec<RawPool>, RouterError> {
        let enabled = self.indexers.iter().filter(|i| venue_enabled(config, i.venue()));
        let results = join_all(enabled.map(|indexer| async move {
            (indexer.venue(), timeout(deadline, indexer.pools(tokens, &self.filters)).await)
        }))
        .await;

        let mut pools = Vec::new();
        for (venue, result) in results {
            match result {
                Ok(Ok(batch)) => {
                    debug!(%venue, pools = batch.len(), "indexer answered");
                    pools.extend(batch);
                }
                Ok(Err(err)) => return Err(err.into()),
                Err(_) => {
                    let message = format!("venue {venue} indexer gave no answer within {}s", deadline.as_secs());
                    warn!("{message}");
                    warnings.push(message);
                }
            }
        }
        Ok(pools)
    }

    async fn classify(
        &self,
        raw: &RawPool,
        cache: &PoolCache,
        deadline: Duration,
    ) -> Result<Classification, AdapterError> {
        if raw.venue == Venue::U {
            return Ok(match raw.concentrated_params() {
                Ok(params) => Classification::Indexed(params),
                Err(_) => Classification::Indexed(PoolParams::Unknown),
            });
        }
        if let Some(params) = cache.get(&raw.id).and_then(CachedPool::params) {
            return Ok(Classification::Cached(params));
        }
        let symbols = raw.token_symbols();
        match timeout(deadline, classify_pool(self.chain.as_ref(), raw.address, &symbols)).await {
            Ok(Ok((params, source))) => {
                debug!(pool = %raw.id, class = ?params.class(), ?source, "pool classified");
                Ok(Classification::Probed(params))
            }
            Ok(Err(err)) => Err(err),
            Err(_) => Ok(Classification::TimedOut),
        }
    }

    /// Merges new classifications into the latest snapshot and saves it.
    ///
    /// Nothing is saved while the store cannot be loaded, so an unreadable
    /// document is never replaced by a partial one.
    async fn persist(&self, fresh: Vec<(PoolId, CachedPool)>, warnings: &mut Vec<String>) {
        let _save = self.save_lock.lock().await;
        let base = match self.loaded_snapshot().await {
            Ok(base) => base,
            Err(err) => {
                let err = RouterError::from(err);
                warn!(error = %err, pools = fresh.len(), "pool cache unreadable, classifications kept in memory only");
                warnings.push(err.to_string());
                return;
            }
        };
        let mut next = (*base).clone();
        for (id, entry) in fresh {
            next.insert(&id, entry);
        }
        next.last_updated = Utc::now();
        let next = Arc::new(next);
        *self.snapshot.write().await = Some(Arc::clone(&next));

        if let Err(err) = self.store.save(&next).await {
            let err = RouterError::from(err);
            warn!(error = %err, "pool cache not persisted");
            warnings.push(err.to_string());
        }
    }
}

fn venue_enabled(config: &RouterConfig, venue: Venue) -> bool {
    match venue {
        Venue::U => config.use_venue_u,
        Venue::B => config.use_venue_b,
    }
}

/// `tokens ∪ bridges` as routing vertices, first occurrence order.
fn query_token_set(tokens: &[Address], config: &RouterConfig) -> Vec<Address> {
    let mut set = Vec::with_capacity(tokens.len() + config.bridges.len());
    for address in tokens.iter().chain(&config.bridges) {
        let vertex = config.routing_vertex(address);
        if !set.contains(&vertex) {
            set.push(vertex);
        }
    }
    set
}
