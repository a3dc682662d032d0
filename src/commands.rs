//! CLI command implementations

use anyhow::Context;
use exportmap_core::{ExportKind, IndexerConfig};
use exportmap_indexer::{ExportResolver, FsReader, PackageLocator};
use serde::Serialize;
use std::path::{Path, PathBuf};

const SUGGESTION_LIMIT: usize = 5;

/// Defaults, then the optional TOML file, then `EXPORTMAP_*` variables.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<IndexerConfig> {
    let config = match path {
        Some(path) => IndexerConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => IndexerConfig::default(),
    };
    Ok(config.with_env_overrides()?)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn package_root(package: PathBuf) -> anyhow::Result<PathBuf> {
    package
        .canonicalize()
        .with_context(|| format!("Package root {} does not exist", package.display()))
}

pub async fn scan(config: &IndexerConfig, package: PathBuf) -> anyhow::Result<()> {
    let root = package_root(package)?;
    tracing::info!("Scanning {}", root.display());

    let resolver = ExportResolver::new(config);
    let index = resolver.scan_package_exports(&root).await;

    if index.has_errors() {
        for error in &index.errors {
            tracing::warn!("{}", error);
        }
    }
    for (kind, count) in index.kind_counts() {
        tracing::debug!("{}: {}", kind, count);
    }
    print_json(&*index)
}

pub async fn find(config: &IndexerConfig, package: PathBuf, name: &str) -> anyhow::Result<()> {
    let root = package_root(package)?;
    let resolver = ExportResolver::new(config);

    match resolver.find_export_source(&root, name).await {
        Some(record) => print_json(&record),
        None => {
            let suggestions = resolver.suggest_exports(&root, name, SUGGESTION_LIMIT).await;
            if suggestions.is_empty() {
                anyhow::bail!("Export {} not found in {}", name, root.display());
            }
            anyhow::bail!(
                "Export {} not found in {}; did you mean: {}?",
                name,
                root.display(),
                suggestions.join(", ")
            )
        }
    }
}

pub async fn source(config: &IndexerConfig, package: PathBuf, name: &str) -> anyhow::Result<()> {
    let root = package_root(package)?;
    let resolver = ExportResolver::new(config);

    let source = resolver
        .read_export_source(&root, name)
        .await?
        .with_context(|| format!("Export {} not found in {}", name, root.display()))?;
    print_json(&source)
}

pub async fn list(config: &IndexerConfig, package: PathBuf, kind: Option<&str>) -> anyhow::Result<()> {
    let kind = kind
        .map(|k| ExportKind::from_name(k).with_context(|| format!("Unknown export kind: {k}")))
        .transpose()?;
    let root = package_root(package)?;

    let resolver = ExportResolver::new(config);
    let records = resolver.list_exports(&root, kind).await;
    tracing::info!("{} exports", records.len());
    print_json(&records)
}

pub fn locate(project: PathBuf, name: &str) -> anyhow::Result<()> {
    let info = PackageLocator::new(project).locate(name)?;
    print_json(&info)
}

pub fn css(dir: PathBuf, prefix: &str) -> anyhow::Result<()> {
    let scan = exportmap_indexer::css::scan_utility_classes(&dir, prefix, &FsReader)?;
    for error in &scan.errors {
        tracing::warn!("{}", error);
    }
    print_json(&scan)
}
