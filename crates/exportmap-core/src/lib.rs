//! exportmap core — export records, scan cache, errors and configuration

pub mod cache;
pub mod config;
pub mod error;
pub mod model;


pub use cache::{CacheEntry, DEFAULT_TTL, ScanCache};
pub use config::IndexerConfig;
pub use error::{IndexError, Result};
pub use model::{ExportIndex, ExportKind, ExportRecord};
