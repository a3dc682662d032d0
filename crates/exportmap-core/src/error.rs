//! Error types shared by the indexer crates

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while locating packages, reading sources or parsing them.
///
/// Scans never surface these directly: the builder turns them into the
/// `errors` strings of an [`ExportIndex`](crate::ExportIndex).
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("{source}")]
    SourceRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Failed to load grammar: {0}")]
    Language(String),

    #[error("Invalid package name: {0}")]
    InvalidPackageName(String),

    #[error("Package {name} is not installed under {}", searched.display())]
    PackageNotInstalled { name: String, searched: PathBuf },

    #[error("Invalid manifest {}: {reason}", path.display())]
    Manifest { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl IndexError {
    /// The file or directory the error refers to, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            IndexError::SourceRoot { path, .. }
            | IndexError::Read { path, .. }
            | IndexError::Parse { path, .. }
            | IndexError::Manifest { path, .. } => Some(path),
            IndexError::PackageNotInstalled { searched, .. } => Some(searched),
            IndexError::Language(_) | IndexError::InvalidPackageName(_) | IndexError::Config(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, IndexError>;
