//! TTL cache of package scans, keyed by package root

use crate::model::ExportIndex;
use dashmap::DashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default lifetime of a cached scan.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Cache entry with expiration
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub index: Arc<ExportIndex>,
    pub expires_at: Instant,
}

impl CacheEntry {
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Cache of export indexes. Thread-safe for concurrent access.
///
/// Indexes are stored as `Arc` snapshots and never mutated after insertion;
/// concurrent `put`s for the same root are last-writer-wins.
#[derive(Debug)]
pub struct ScanCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl ScanCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        ScanCache {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get the cached index for a root if present and not expired.
    ///
    /// A stale entry is evicted.
    pub fn get(&self, package_root: &Path) -> Option<Arc<ExportIndex>> {
        let key = cache_key(package_root);
        let hit = self.entries.get(&key).map(|entry| {
            if entry.is_expired() {
                None
            } else {
                Some(Arc::clone(&entry.index))
            }
        });

        match hit {
            Some(Some(index)) => {
                tracing::trace!("Scan cache hit: {}", key);
                Some(index)
            }
            Some(None) => {
                // Re-check under the write lock: a fresh put may have landed in between.
                self.entries.remove_if(&key, |_, entry| entry.is_expired());
                tracing::debug!("Scan cache entry expired: {}", key);
                None
            }
            None => None,
        }
    }

    /// Store an index using the cache's default TTL.
    pub fn put(&self, package_root: &Path, index: Arc<ExportIndex>) {
        self.put_with_ttl(package_root, index, self.ttl);
    }

    /// Store an index that expires after `ttl`, replacing any existing entry.
    pub fn put_with_ttl(&self, package_root: &Path, index: Arc<ExportIndex>, ttl: Duration) {
        let entry = CacheEntry {
            index,
            expires_at: Instant::now() + ttl,
        };
        self.entries.insert(cache_key(package_root), entry);
    }

    /// Remove all entries.
    pub fn clear(&self) {
        let removed = self.entries.len();
        self.entries.clear();
        tracing::debug!("Scan cache cleared ({} entries)", removed);
    }

    /// Drop expired entries without waiting for them to be read.
    pub fn purge_expired(&self) {
        self.entries.retain(|_, entry| !entry.is_expired());
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ScanCache {
    fn default() -> Self {
        Self::new()
    }
}

fn cache_key(package_root: &Path) -> String {
    package_root.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExportKind, ExportRecord};
    use std::path::PathBuf;

    fn sample_index() -> Arc<ExportIndex> {
        let mut index = ExportIndex::new();
        index.insert(ExportRecord::new(
            "Button",
            PathBuf::from("/pkg/src/Button.tsx"),
            ExportKind::Variable,
        ));
        Arc::new(index)
    }

    #[test]
    fn test_get_returns_stored_snapshot() {
        let cache = ScanCache::new();
        let index = sample_index();
        cache.put(Path::new("/pkg"), Arc::clone(&index));

        let hit = cache.get(Path::new("/pkg")).unwrap();
        assert!(Arc::ptr_eq(&hit, &index));
        assert!(cache.get(Path::new("/other")).is_none());
    }

    #[test]
    fn test_expired_entry_is_evicted() {
        let cache = ScanCache::with_ttl(Duration::from_millis(10));
        cache.put(Path::new("/pkg"), sample_index());
        assert_eq!(cache.len(), 1);

        std::thread::sleep(Duration::from_millis(30));

        assert!(cache.get(Path::new("/pkg")).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_put_overwrites_existing_entry() {
        let cache = ScanCache::new();
        cache.put(Path::new("/pkg"), sample_index());

        let replacement = Arc::new(ExportIndex::new());
        cache.put(Path::new("/pkg"), Arc::clone(&replacement));

        let hit = cache.get(Path::new("/pkg")).unwrap();
        assert!(Arc::ptr_eq(&hit, &replacement));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear_removes_everything() {
        let cache = ScanCache::new();
        cache.put(Path::new("/a"), sample_index());
        cache.put(Path::new("/b"), sample_index());

        cache.clear();

        assert!(cache.is_empty());
        assert!(cache.get(Path::new("/a")).is_none());
    }

    #[test]
    fn test_purge_expired_keeps_live_entries() {
        let cache = ScanCache::new();
        cache.put_with_ttl(Path::new("/old"), sample_index(), Duration::ZERO);
        cache.put(Path::new("/new"), sample_index());

        cache.purge_expired();

        assert_eq!(cache.len(), 1);
        assert!(cache.get(Path::new("/new")).is_some());
    }
}
