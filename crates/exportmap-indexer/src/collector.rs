//! Source file discovery under a package's source root

use std::path::{Path, PathBuf};

use exportmap_core::IndexError;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;

/// File names collected as sources.
pub const SOURCE_PATTERNS: &[&str] = &["*.ts", "*.tsx"];

/// File names never collected: declaration files, tests and specs.
pub const EXCLUDED_FILE_PATTERNS: &[&str] = &["*.d.ts", "*.test.*", "*.spec.*"];

/// Directories never descended into.
pub const EXCLUDED_DIRS: &[&str] = &[
    "__tests__",
    "__mocks__",
    "__snapshots__",
    "test",
    "tests",
    "examples",
    "node_modules",
];

/// Matches file names against an include and an exclude set
#[derive(Debug, Clone)]
pub struct FileFilter {
    include: GlobSet,
    exclude: GlobSet,
}

impl FileFilter {
    pub fn new(include: &[&str], exclude: &[&str]) -> exportmap_core::Result<Self> {
        Ok(FileFilter {
            include: glob_set(include)?,
            exclude: glob_set(exclude)?,
        })
    }

    /// The fixed source filter: TypeScript files minus tests and declarations.
    pub fn sources() -> exportmap_core::Result<Self> {
        Self::new(SOURCE_PATTERNS, EXCLUDED_FILE_PATTERNS)
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.include.is_match(file_name) && !self.exclude.is_match(file_name)
    }
}

fn glob_set(patterns: &[&str]) -> exportmap_core::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| IndexError::Config(e.to_string()))?;
        builder.add(glob);
    }
    builder.build().map_err(|e| IndexError::Config(e.to_string()))
}

/// Walk `root` and return matching files, sorted by path.
///
/// Fails only when `root` itself cannot be read; unreadable entries below it
/// are skipped with a warning.
pub fn walk_files(root: &Path, filter: &FileFilter) -> exportmap_core::Result<Vec<PathBuf>> {
    std::fs::read_dir(root).map_err(|source| IndexError::SourceRoot {
        path: root.to_path_buf(),
        source,
    })?;

    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .hidden(true)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            if entry.depth() == 0 || !is_dir {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            !EXCLUDED_DIRS.iter().any(|dir| *dir == name)
        })
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Cannot read entry under {}: {}", root.display(), e);
                continue;
            }
        };

        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        if filter.matches(&entry.file_name().to_string_lossy()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

/// Collect source files under `source_root`, reporting why collection failed.
pub fn try_collect(source_root: &Path) -> exportmap_core::Result<Vec<PathBuf>> {
    let files = walk_files(source_root, &FileFilter::sources()?)?;
    tracing::debug!("Collected {} source files under {}", files.len(), source_root.display());
    Ok(files)
}

/// Collect source files under `source_root`; empty when the directory is unreadable.
pub fn collect(source_root: &Path) -> Vec<PathBuf> {
    match try_collect(source_root) {
        Ok(files) => files,
        Err(e) => {
            tracing::warn!("Cannot read source directory {}: {}", source_root.display(), e);
            Vec::new()
        }
    }
}
