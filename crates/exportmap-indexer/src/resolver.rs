//! Query surface: scan a package once, answer export lookups from the cache

use std::path::{Path, PathBuf};
use std::sync::Arc;

use exportmap_core::{ExportIndex, ExportKind, ExportRecord, IndexError, IndexerConfig, ScanCache};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use serde::Serialize;

use crate::builder::{IndexBuilder, scan_failure};
use crate::parser_pool::ParserPool;
use crate::reader::{FsReader, SourceReader};

/// A resolved export together with the text of its defining file
#[derive(Debug, Clone, Serialize)]
pub struct ExportSource {
    pub record: ExportRecord,
    pub source: String,
}

/// Resolves exports of installed packages.
///
/// Owns its [`ScanCache`]; pass a shared one through [`ExportResolver::with_parts`]
/// when several resolvers should see the same scans.
#[derive(Clone)]
pub struct ExportResolver {
    cache: Arc<ScanCache>,
    builder: Arc<IndexBuilder>,
    reader: Arc<dyn SourceReader>,
    source_dir: String,
}

impl ExportResolver {
    pub fn new(config: &IndexerConfig) -> Self {
        Self::with_parts(
            Arc::new(ScanCache::with_ttl(config.cache_ttl())),
            ParserPool::new(config.workers),
            Arc::new(FsReader),
            config.source_dir.clone(),
        )
    }

    pub fn with_parts(
        cache: Arc<ScanCache>,
        pool: ParserPool,
        reader: Arc<dyn SourceReader>,
        source_dir: impl Into<String>,
    ) -> Self {
        ExportResolver {
            cache,
            builder: Arc::new(IndexBuilder::new(pool, Arc::clone(&reader))),
            reader,
            source_dir: source_dir.into(),
        }
    }

    pub fn cache(&self) -> &Arc<ScanCache> {
        &self.cache
    }

    pub fn source_root(&self, package_root: &Path) -> PathBuf {
        package_root.join(&self.source_dir)
    }

    /// Scan a package, or return the cached scan while it is fresh.
    pub async fn scan_package_exports(&self, package_root: &Path) -> Arc<ExportIndex> {
        if let Some(index) = self.cache.get(package_root) {
            return index;
        }

        let builder = Arc::clone(&self.builder);
        let source_root = self.source_root(package_root);
        let scan_root = source_root.clone();
        let scanned =
            tokio::task::spawn_blocking(move || builder.try_build_from_source_root(&scan_root)).await;

        match scanned {
            Ok(Ok(index)) => self.store(package_root, index),
            // A failed collection is never cached.
            Ok(Err(e)) => Arc::new(scan_failure(&source_root, &e)),
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => {
                tracing::error!("Scan of {} did not complete: {}", package_root.display(), e);
                Arc::new(incomplete_scan(&e))
            }
        }
    }

    /// Blocking variant of [`scan_package_exports`](Self::scan_package_exports).
    pub fn scan_package_exports_blocking(&self, package_root: &Path) -> Arc<ExportIndex> {
        if let Some(index) = self.cache.get(package_root) {
            return index;
        }
        let source_root = self.source_root(package_root);
        match self.builder.try_build_from_source_root(&source_root) {
            Ok(index) => self.store(package_root, index),
            Err(e) => Arc::new(scan_failure(&source_root, &e)),
        }
    }

    fn store(&self, package_root: &Path, index: ExportIndex) -> Arc<ExportIndex> {
        tracing::info!(
            "Scanned {}: {} exports, {} errors",
            package_root.display(),
            index.len(),
            index.errors.len()
        );
        let index = Arc::new(index);
        self.cache.purge_expired();
        self.cache.put(package_root, Arc::clone(&index));
        index
    }

    /// Find the authoritative record for `export_name`.
    pub async fn find_export_source(&self, package_root: &Path, export_name: &str) -> Option<ExportRecord> {
        self.scan_package_exports(package_root).await.get(export_name).cloned()
    }

    pub fn find_export_source_blocking(&self, package_root: &Path, export_name: &str) -> Option<ExportRecord> {
        self.scan_package_exports_blocking(package_root)
            .get(export_name)
            .cloned()
    }

    /// Forget every cached scan.
    pub fn clear_export_cache(&self) {
        self.cache.clear();
    }

    /// Resolve an export and read its defining file.
    pub async fn read_export_source(
        &self,
        package_root: &Path,
        export_name: &str,
    ) -> exportmap_core::Result<Option<ExportSource>> {
        let Some(record) = self.find_export_source(package_root, export_name).await else {
            return Ok(None);
        };

        let reader = Arc::clone(&self.reader);
        let path = record.defining_file_path.clone();
        let read = tokio::task::spawn_blocking(move || reader.read_to_string(&path))
            .await
            .map_err(|e| IndexError::Read {
                path: record.defining_file_path.clone(),
                source: std::io::Error::other(e),
            })?;

        let source = read.map_err(|source| IndexError::Read {
            path: record.defining_file_path.clone(),
            source,
        })?;

        Ok(Some(ExportSource { record, source }))
    }

    /// Export names resembling `query`, best match first.
    pub async fn suggest_exports(&self, package_root: &Path, query: &str, limit: usize) -> Vec<String> {
        let index = self.scan_package_exports(package_root).await;
        rank_names(index.exports.keys().map(String::as_str), query, limit)
    }

    /// All exports, optionally of one kind, in name order.
    pub async fn list_exports(&self, package_root: &Path, kind: Option<ExportKind>) -> Vec<ExportRecord> {
        let index = self.scan_package_exports(package_root).await;
        match kind {
            Some(kind) => index.of_kind(kind).cloned().collect(),
            None => index.exports.values().cloned().collect(),
        }
    }
}

impl std::fmt::Debug for ExportResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportResolver")
            .field("source_dir", &self.source_dir)
            .field("cached_packages", &self.cache.len())
            .finish()
    }
}

/// The index reported when the blocking scan task never produced a result.
fn incomplete_scan(reason: &dyn std::fmt::Display) -> ExportIndex {
    let mut index = ExportIndex::new();
    index.errors.push(format!("Scan did not complete: {}", reason));
    index
}

/// Rank candidate names by fuzzy score against `query`; ties break by name.
pub fn rank_names<'a>(names: impl Iterator<Item = &'a str>, query: &str, limit: usize) -> Vec<String> {
    let matcher = SkimMatcherV2::default();
    let mut scored: Vec<(i64, &str)> = names
        .filter_map(|name| matcher.fuzzy_match(name, query).map(|score| (score, name)))
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored
        .into_iter()
        .take(limit)
        .map(|(_, name)| name.to_string())
        .collect()
}
