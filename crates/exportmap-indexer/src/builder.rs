//! Builds an export index from a list of source files

use std::path::{Path, PathBuf};
use std::sync::Arc;

use exportmap_core::{ExportIndex, ExportRecord, IndexError};

use crate::collector;
use crate::languages::get_extractor;
use crate::parser_pool::{ParseRequest, ParserPool, PendingParse, SourceDialect};
use crate::reader::SourceReader;

/// Reads, parses and merges a package's files into one [`ExportIndex`].
///
/// Parsing fans out over the pool; records are merged in file order so that
/// name collisions resolve the same way regardless of worker timing.
pub struct IndexBuilder {
    pool: ParserPool,
    reader: Arc<dyn SourceReader>,
}

impl IndexBuilder {
    pub fn new(pool: ParserPool, reader: Arc<dyn SourceReader>) -> Self {
        IndexBuilder { pool, reader }
    }

    /// Index the files under `source_root`.
    ///
    /// An unreadable root yields an empty index with one scan-level error.
    pub fn build_from_source_root(&self, source_root: &Path) -> ExportIndex {
        self.try_build_from_source_root(source_root)
            .unwrap_or_else(|e| scan_failure(source_root, &e))
    }

    /// Like [`build_from_source_root`](Self::build_from_source_root), but an
    /// unreadable root is returned as an error.
    pub fn try_build_from_source_root(&self, source_root: &Path) -> exportmap_core::Result<ExportIndex> {
        let files = collector::try_collect(source_root)?;
        Ok(self.build(&files))
    }

    /// Index the given files. Per-file failures are recorded, never raised.
    pub fn build(&self, files: &[PathBuf]) -> ExportIndex {
        let mut index = ExportIndex::new();
        index.files_scanned = files.len();

        let pending: Vec<_> = files.iter().map(|path| self.submit(path)).collect();

        for (path, submitted) in files.iter().zip(pending) {
            match submitted.and_then(|pending| Self::collect_records(path, pending)) {
                Ok(records) => {
                    for record in records {
                        index.insert(record);
                    }
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", path.display(), e);
                    index.errors.push(format!("Failed to parse {}: {}", path.display(), e));
                }
            }
        }

        tracing::debug!(
            "Indexed {} exports from {} files ({} errors)",
            index.len(),
            files.len(),
            index.errors.len()
        );
        index
    }

    fn submit(&self, path: &Path) -> exportmap_core::Result<PendingParse> {
        let content = self.reader.read_to_string(path).map_err(|source| IndexError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        self.pool
            .submit(ParseRequest::for_file(path, content))
            .map_err(|e| IndexError::Parse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    fn collect_records(path: &Path, pending: PendingParse) -> exportmap_core::Result<Vec<ExportRecord>> {
        let parsed = pending.wait().map_err(|e| IndexError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let dialect = SourceDialect::from_path(path).unwrap_or(SourceDialect::TypeScript);
        Ok(get_extractor(dialect).extract(&parsed.path, &parsed.tree, &parsed.content))
    }
}

/// The index reported when the source root itself could not be walked.
pub(crate) fn scan_failure(source_root: &Path, error: &IndexError) -> ExportIndex {
    tracing::warn!("Failed to scan {}: {}", source_root.display(), error);
    let mut index = ExportIndex::new();
    index.errors.push(format!("Failed to scan src directory: {}", error));
    index
}
