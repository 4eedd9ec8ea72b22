//! Versioned cache store names and the storage seam.
//!
//! The platform Cache API is treated as an external key-value service with
//! open/match/put/delete-by-name semantics. Exactly one store name is
//! current at any time; everything else is a stale generation the sweeper
//! removes on activation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::cache::request::{RequestKey, ResponseSnapshot};

pub const MAX_PREFIX_LENGTH: usize = 64;

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum StoreError {
    #[error("invalid cache name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("storage backend error: {message} (retryable: {retryable})")]
    Backend { message: String, retryable: bool },
}

impl StoreError {
    pub fn backend(message: impl Into<String>, retryable: bool) -> Self {
        Self::Backend {
            message: message.into(),
            retryable,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Backend { retryable: true, .. })
    }
}

/// Generation counter carried in a cache store name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CacheVersion(pub u32);

impl std::fmt::Display for CacheVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A version-tagged store name, `"<prefix>-v<N>"` - immutable after
/// construction.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheName(String);

impl CacheName {
    pub fn versioned(prefix: &str, version: CacheVersion) -> Result<Self, StoreError> {
        Self::validate_prefix(prefix)?;
        Ok(Self(format!("{prefix}-{version}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate_prefix(prefix: &str) -> Result<(), StoreError> {
        if prefix.is_empty() {
            return Err(StoreError::InvalidName {
                name: prefix.to_string(),
                reason: "prefix cannot be empty".to_string(),
            });
        }
        if prefix.len() > MAX_PREFIX_LENGTH {
            return Err(StoreError::InvalidName {
                name: prefix.chars().take(32).collect::<String>() + "...",
                reason: format!("prefix exceeds {MAX_PREFIX_LENGTH} bytes"),
            });
        }
        if !prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(StoreError::InvalidName {
                name: prefix.to_string(),
                reason: "prefix contains invalid characters (allowed: a-z, A-Z, 0-9, -, _)"
                    .to_string(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for CacheName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The external cache storage service. Shells back this with the platform
/// Cache API; stores are created implicitly on first write, matching
/// `caches.open` semantics.
#[async_trait::async_trait]
pub trait CacheStorage: Send + Sync {
    async fn lookup(
        &self,
        store: &str,
        key: &RequestKey,
    ) -> Result<Option<ResponseSnapshot>, StoreError>;

    async fn put(
        &self,
        store: &str,
        key: RequestKey,
        response: ResponseSnapshot,
    ) -> Result<(), StoreError>;

    /// Delete an entire store generation. Returns whether it existed.
    async fn delete_store(&self, store: &str) -> Result<bool, StoreError>;

    async fn store_names(&self) -> Result<Vec<String>, StoreError>;
}

/// In-memory [`CacheStorage`] for tests and headless shells.
#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    stores: RwLock<HashMap<String, HashMap<RequestKey, ResponseSnapshot>>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entry_count(&self, store: &str) -> usize {
        self.stores
            .read()
            .await
            .get(store)
            .map_or(0, HashMap::len)
    }
}

#[async_trait::async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn lookup(
        &self,
        store: &str,
        key: &RequestKey,
    ) -> Result<Option<ResponseSnapshot>, StoreError> {
        Ok(self
            .stores
            .read()
            .await
            .get(store)
            .and_then(|entries| entries.get(key))
            .cloned())
    }

    async fn put(
        &self,
        store: &str,
        key: RequestKey,
        response: ResponseSnapshot,
    ) -> Result<(), StoreError> {
        self.stores
            .write()
            .await
            .entry(store.to_string())
            .or_default()
            .insert(key, response);
        Ok(())
    }

    async fn delete_store(&self, store: &str) -> Result<bool, StoreError> {
        Ok(self.stores.write().await.remove(store).is_some())
    }

    async fn store_names(&self) -> Result<Vec<String>, StoreError> {
        let mut names: Vec<String> = self.stores.read().await.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
