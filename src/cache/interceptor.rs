//! The fetch interception policy.
//!
//! Routing is a pure function of the request plus configuration; the async
//! half just executes the decision against the storage and network seams.
//! Cache-first, deliberately stale-is-fine: a hit is returned verbatim with
//! no freshness check. Storage failures never fail a user-visible request -
//! reads degrade to misses and writes are dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::cache::request::{
    FetchError, NetworkFetcher, RequestDescriptor, RequestKey, ResponseSnapshot,
};
use crate::cache::store::{CacheName, CacheStorage};
use crate::config::{ConfigError, CoreConfig};

/// Why a request was handed to the network without cache interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BypassReason {
    NonGet,
    CrossOrigin,
    DynamicPath,
}

/// Outcome of the pure routing policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteDecision {
    /// Pass through to the network untouched.
    Bypass(BypassReason),
    /// Eligible: consult the cache under this key.
    Intercept(RequestKey),
}

/// Where the returned response came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServedFrom {
    /// Cache hit, returned verbatim.
    Cache,
    /// Cache miss; fetched and written back.
    Network,
    /// Cache miss; fetched but not cacheable, returned uncached.
    NetworkUncacheable,
    /// Bypassed the cache entirely.
    NetworkBypass,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchOutcome {
    pub response: ResponseSnapshot,
    pub served_from: ServedFrom,
}

/// Point-in-time counters for the shell's diagnostics surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub bypasses: u64,
    pub dropped_writes: u64,
}

#[derive(Debug, Default)]
struct InterceptStats {
    hits: AtomicU64,
    misses: AtomicU64,
    bypasses: AtomicU64,
    dropped_writes: AtomicU64,
}

impl InterceptStats {
    fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            bypasses: self.bypasses.load(Ordering::Relaxed),
            dropped_writes: self.dropped_writes.load(Ordering::Relaxed),
        }
    }
}

/// Per-request routing between the cache store and the network.
pub struct FetchInterceptor {
    config: CoreConfig,
    current: CacheName,
    origin: url::Origin,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn NetworkFetcher>,
    stats: InterceptStats,
}

impl FetchInterceptor {
    pub fn new(
        config: CoreConfig,
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn NetworkFetcher>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let current = config.cache_name()?;
        let origin = config.app_origin();
        Ok(Self {
            config,
            current,
            origin,
            storage,
            network,
            stats: InterceptStats::default(),
        })
    }

    pub fn current_store(&self) -> &CacheName {
        &self.current
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Classify a request. Only same-origin GETs outside the dynamic
    /// prefixes are eligible for cache interception.
    pub fn route(&self, request: &RequestDescriptor) -> RouteDecision {
        if !request.method.is_get() {
            return RouteDecision::Bypass(BypassReason::NonGet);
        }
        if request.url.origin() != self.origin {
            return RouteDecision::Bypass(BypassReason::CrossOrigin);
        }
        if self.config.is_dynamic_path(request.path()) {
            return RouteDecision::Bypass(BypassReason::DynamicPath);
        }
        RouteDecision::Intercept(RequestKey::for_get(&request.url))
    }

    /// Produce exactly one response for an intercepted request, or a
    /// [`FetchError`] when the network fails on a miss or bypass. Offline
    /// with no prior cache entry is an explicit failure, not a fallback.
    #[instrument(skip_all, fields(method = %request.method, path = request.path()))]
    pub async fn handle_fetch(
        &self,
        request: &RequestDescriptor,
    ) -> Result<FetchOutcome, FetchError> {
        let key = match self.route(request) {
            RouteDecision::Bypass(reason) => {
                debug!(?reason, "bypassing cache");
                self.stats.bypasses.fetch_add(1, Ordering::Relaxed);
                let response = self.network.fetch(request).await?;
                return Ok(FetchOutcome {
                    response,
                    served_from: ServedFrom::NetworkBypass,
                });
            }
            RouteDecision::Intercept(key) => key,
        };

        match self.storage.lookup(self.current.as_str(), &key).await {
            Ok(Some(cached)) => {
                debug!("cache hit");
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(FetchOutcome {
                    response: cached,
                    served_from: ServedFrom::Cache,
                });
            }
            Ok(None) => {}
            // A failed read degrades to a miss; the network still answers.
            Err(e) => warn!(error = %e, "cache read failed, treating as miss"),
        }

        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        let response = self.network.fetch(request).await?;

        if !response.is_cacheable() {
            debug!(status = response.status, "response not cacheable");
            return Ok(FetchOutcome {
                response,
                served_from: ServedFrom::NetworkUncacheable,
            });
        }

        // Clone into the store; the original goes back to the caller either
        // way. A dropped write must never fail the request.
        if let Err(e) = self
            .storage
            .put(self.current.as_str(), key, response.clone())
            .await
        {
            warn!(error = %e, "cache write dropped");
            self.stats.dropped_writes.fetch_add(1, Ordering::Relaxed);
        }

        Ok(FetchOutcome {
            response,
            served_from: ServedFrom::Network,
        })
    }
}
