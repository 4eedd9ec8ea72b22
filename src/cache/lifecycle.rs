//! Install and activate: precache seeding and the generation sweep.
//!
//! `install` blocks readiness until every manifest entry is fetched and
//! written; any failure fails the whole step so a partial precache is never
//! mistaken for success. `activate` deletes every store generation other
//! than the current one and then claims open clients, so pages controlled
//! by the prior generation keep working without a reload.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::cache::request::{FetchError, NetworkFetcher, RequestDescriptor, RequestKey};
use crate::cache::store::{CacheName, CacheStorage, StoreError};
use crate::config::{ConfigError, CoreConfig};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InstallError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("precache fetch failed for '{path}': {source}")]
    Fetch { path: String, source: FetchError },

    #[error("precache response for '{path}' is not cacheable (status {status})")]
    NotCacheable { path: String, status: u16 },

    #[error(transparent)]
    Storage(#[from] StoreError),
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[error("client claim failed: {message}")]
pub struct ClaimError {
    pub message: String,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActivateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error(transparent)]
    Claim(#[from] ClaimError),
}

/// Control over already-open client connections. On activation the new
/// generation takes over existing pages immediately instead of waiting for
/// their next navigation.
#[async_trait::async_trait]
pub trait ClientControl: Send + Sync {
    /// Claim open clients; returns how many were claimed.
    async fn claim(&self) -> Result<usize, ClaimError>;
}

/// [`ClientControl`] for headless shells and tests: nothing to claim.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoClients;

#[async_trait::async_trait]
impl ClientControl for NoClients {
    async fn claim(&self) -> Result<usize, ClaimError> {
        Ok(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallReport {
    pub store: String,
    pub seeded: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivateReport {
    pub store: String,
    pub swept: Vec<String>,
    pub clients_claimed: usize,
}

/// Runs the install/activate lifecycle for the configured generation.
pub struct CacheLifecycle {
    config: CoreConfig,
    current: CacheName,
}

impl CacheLifecycle {
    pub fn new(config: CoreConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let current = config.cache_name()?;
        Ok(Self { config, current })
    }

    pub fn current_store(&self) -> &CacheName {
        &self.current
    }

    /// Seed the current store with every manifest entry. All-or-nothing:
    /// the first fetch or write failure aborts the install.
    #[instrument(skip_all, fields(store = %self.current))]
    pub async fn install(
        &self,
        storage: &dyn CacheStorage,
        network: &dyn NetworkFetcher,
    ) -> Result<InstallReport, InstallError> {
        let mut seeded = Vec::with_capacity(self.config.precache_manifest.len());

        for path in &self.config.precache_manifest {
            let url = self.config.resource_url(path)?;
            let request = RequestDescriptor::get(url);

            let response = network
                .fetch(&request)
                .await
                .map_err(|source| InstallError::Fetch {
                    path: path.clone(),
                    source,
                })?;

            if !response.is_cacheable() {
                warn!(path, status = response.status, "precache entry rejected");
                return Err(InstallError::NotCacheable {
                    path: path.clone(),
                    status: response.status,
                });
            }

            let key = RequestKey::for_get(&request.url);
            storage.put(self.current.as_str(), key, response).await?;
            debug!(path, "precached");
            seeded.push(path.clone());
        }

        info!(entries = seeded.len(), "install complete");
        Ok(InstallReport {
            store: self.current.as_str().to_string(),
            seeded,
        })
    }

    /// Sweep stale generations and take control of open clients. After this
    /// returns, exactly one store generation exists.
    #[instrument(skip_all, fields(store = %self.current))]
    pub async fn activate(
        &self,
        storage: &dyn CacheStorage,
        clients: &dyn ClientControl,
    ) -> Result<ActivateReport, ActivateError> {
        let mut swept = Vec::new();

        for name in storage.store_names().await? {
            if name != self.current.as_str() {
                storage.delete_store(&name).await?;
                debug!(stale = %name, "swept stale cache generation");
                swept.push(name);
            }
        }

        let clients_claimed = clients.claim().await?;
        info!(swept = swept.len(), clients_claimed, "activate complete");

        Ok(ActivateReport {
            store: self.current.as_str().to_string(),
            swept,
            clients_claimed,
        })
    }
}
