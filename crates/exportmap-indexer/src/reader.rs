//! Filesystem read capability used by the builder

use std::path::Path;

/// Reads source files as UTF-8 text.
///
/// The builder and resolver only ever read file contents through this trait,
/// so tests can count or fail reads without touching permissions.
pub trait SourceReader: Send + Sync {
    fn read_to_string(&self, path: &Path) -> std::io::Result<String>;
}

/// Reads straight from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsReader;

impl SourceReader for FsReader {
    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }
}
