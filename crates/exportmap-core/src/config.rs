//! Indexer configuration: defaults, TOML file, environment overrides

use crate::error::{IndexError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding [`IndexerConfig::source_dir`].
pub const ENV_SOURCE_DIR: &str = "EXPORTMAP_SOURCE_DIR";
/// Environment variable overriding [`IndexerConfig::cache_ttl_secs`].
pub const ENV_CACHE_TTL_SECS: &str = "EXPORTMAP_CACHE_TTL_SECS";
/// Environment variable overriding [`IndexerConfig::workers`].
pub const ENV_WORKERS: &str = "EXPORTMAP_WORKERS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// Directory under the package root holding the sources.
    pub source_dir: String,
    /// Lifetime of a cached scan, in seconds.
    pub cache_ttl_secs: u64,
    /// Parser worker threads.
    pub workers: usize,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        IndexerConfig {
            source_dir: "src".to_string(),
            cache_ttl_secs: crate::cache::DEFAULT_TTL.as_secs(),
            workers: default_workers(),
        }
    }
}

impl IndexerConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: IndexerConfig =
            toml::from_str(text).map_err(|e| IndexError::Config(e.to_string()))?;
        config.validated()
    }

    /// Load a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| IndexError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("Loaded config from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Apply `EXPORTMAP_*` environment overrides.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (the environment in production).
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_SOURCE_DIR) {
            self.source_dir = dir;
        }
        if let Some(ttl) = lookup(ENV_CACHE_TTL_SECS) {
            self.cache_ttl_secs = ttl
                .trim()
                .parse()
                .map_err(|_| IndexError::Config(format!("{ENV_CACHE_TTL_SECS}={ttl} is not a number")))?;
        }
        if let Some(workers) = lookup(ENV_WORKERS) {
            self.workers = workers
                .trim()
                .parse()
                .map_err(|_| IndexError::Config(format!("{ENV_WORKERS}={workers} is not a number")))?;
        }
        self.validated()
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    fn validated(self) -> Result<Self> {
        if self.source_dir.trim().is_empty() {
            return Err(IndexError::Config("source_dir must not be empty".to_string()));
        }
        if self.workers == 0 {
            return Err(IndexError::Config("workers must be at least 1".to_string()));
        }
        Ok(self)
    }
}

/// Number of CPU cores, but at least 2.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().max(2))
        .unwrap_or(2)
}
