//! Shell-supplied core configuration.
//!
//! Shells hand the core one JSON document at startup: the application
//! origin, the current cache generation, the precache manifest, and the
//! dynamic path prefixes the interceptor must never cache.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::{Origin, Url};

use crate::cache::store::{CacheName, CacheVersion, StoreError};

pub const DEFAULT_CACHE_PREFIX: &str = "gather-cache";

fn default_cache_prefix() -> String {
    DEFAULT_CACHE_PREFIX.to_string()
}

fn default_precache_manifest() -> Vec<String> {
    vec!["/".to_string(), "/manifest.webmanifest".to_string()]
}

fn default_dynamic_prefixes() -> Vec<String> {
    vec!["/api/".to_string(), "/proxy/".to_string()]
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("configuration is not valid JSON: {0}")]
    Parse(String),

    #[error("invalid origin '{origin}': {reason}")]
    InvalidOrigin { origin: String, reason: String },

    #[error(transparent)]
    CachePrefix(#[from] StoreError),

    #[error("precache manifest cannot be empty")]
    EmptyManifest,

    #[error("precache manifest must include the root navigation entry '/'")]
    MissingRootEntry,

    #[error("invalid manifest path '{path}': {reason}")]
    InvalidManifestPath { path: String, reason: String },

    #[error("dynamic prefix '{prefix}' must start with '/'")]
    InvalidDynamicPrefix { prefix: String },
}

/// Core configuration, validated before the cache layer accepts it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Application origin all eligible requests must share.
    pub origin: Url,

    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: String,

    /// Current cache generation. Bumping it retires every older store on
    /// the next activation.
    pub cache_version: u32,

    #[serde(default = "default_precache_manifest")]
    pub precache_manifest: Vec<String>,

    /// Path prefixes excluded from caching even for same-origin GETs.
    #[serde(default = "default_dynamic_prefixes")]
    pub dynamic_prefixes: Vec<String>,
}

impl CoreConfig {
    pub fn new(origin: &str, cache_version: u32) -> Result<Self, ConfigError> {
        let origin = Url::parse(origin).map_err(|e| ConfigError::InvalidOrigin {
            origin: origin.to_string(),
            reason: e.to_string(),
        })?;
        let config = Self {
            origin,
            cache_prefix: default_cache_prefix(),
            cache_version,
            precache_manifest: default_precache_manifest(),
            dynamic_prefixes: default_dynamic_prefixes(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.origin.cannot_be_a_base() || !self.origin.origin().is_tuple() {
            return Err(ConfigError::InvalidOrigin {
                origin: self.origin.to_string(),
                reason: "origin must be an http(s)-style base URL".to_string(),
            });
        }

        CacheName::versioned(&self.cache_prefix, CacheVersion(self.cache_version))?;

        if self.precache_manifest.is_empty() {
            return Err(ConfigError::EmptyManifest);
        }
        if !self.precache_manifest.iter().any(|p| p == "/") {
            return Err(ConfigError::MissingRootEntry);
        }
        for path in &self.precache_manifest {
            if !path.starts_with('/') {
                return Err(ConfigError::InvalidManifestPath {
                    path: path.clone(),
                    reason: "paths must be absolute".to_string(),
                });
            }
        }

        for prefix in &self.dynamic_prefixes {
            if !prefix.starts_with('/') {
                return Err(ConfigError::InvalidDynamicPrefix {
                    prefix: prefix.clone(),
                });
            }
        }

        Ok(())
    }

    pub fn app_origin(&self) -> Origin {
        self.origin.origin()
    }

    pub fn cache_name(&self) -> Result<CacheName, ConfigError> {
        Ok(CacheName::versioned(
            &self.cache_prefix,
            CacheVersion(self.cache_version),
        )?)
    }

    pub fn resource_url(&self, path: &str) -> Result<Url, ConfigError> {
        self.origin
            .join(path)
            .map_err(|e| ConfigError::InvalidManifestPath {
                path: path.to_string(),
                reason: e.to_string(),
            })
    }

    pub fn is_dynamic_path(&self, path: &str) -> bool {
        self.dynamic_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }
}
