//! Installed package lookup and manifest reading

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use exportmap_core::IndexError;
use serde::{Deserialize, Serialize};

/// The parts of `package.json` the indexer cares about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub main: Option<String>,
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default, alias = "typings")]
    pub types: Option<String>,
    #[serde(default, rename = "peerDependencies")]
    pub peer_dependencies: BTreeMap<String, String>,
}

impl PackageManifest {
    /// Read and parse `<package_root>/package.json`.
    pub fn read(package_root: &Path) -> exportmap_core::Result<Self> {
        let path = package_root.join("package.json");
        let text = std::fs::read_to_string(&path).map_err(|source| IndexError::Read {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|e| IndexError::Manifest {
            path,
            reason: e.to_string(),
        })
    }
}

/// A verified, installed package
#[derive(Debug, Clone, Serialize)]
pub struct PackageInfo {
    pub root: PathBuf,
    pub manifest: PackageManifest,
}

/// Finds packages the way Node does: `node_modules/<name>` in the project
/// directory or any of its ancestors.
#[derive(Debug, Clone)]
pub struct PackageLocator {
    project_dir: PathBuf,
}

impl PackageLocator {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        PackageLocator {
            project_dir: project_dir.into(),
        }
    }

    /// Locate `package_name` and read its manifest.
    pub fn locate(&self, package_name: &str) -> exportmap_core::Result<PackageInfo> {
        let relative = package_path(package_name)?;

        for dir in self.project_dir.ancestors() {
            let candidate = dir.join("node_modules").join(&relative);
            if !candidate.join("package.json").is_file() {
                continue;
            }

            let manifest = PackageManifest::read(&candidate)?;
            if manifest.name != package_name {
                tracing::warn!(
                    "Manifest at {} names {} instead of {}",
                    candidate.display(),
                    manifest.name,
                    package_name
                );
            }
            tracing::debug!("Located {} at {}", package_name, candidate.display());
            return Ok(PackageInfo {
                root: candidate,
                manifest,
            });
        }

        Err(IndexError::PackageNotInstalled {
            name: package_name.to_string(),
            searched: self.project_dir.join("node_modules").join(relative),
        })
    }
}

/// `@scope/name` → `@scope/name` as path components; rejects traversal.
fn package_path(package_name: &str) -> exportmap_core::Result<PathBuf> {
    let invalid = || IndexError::InvalidPackageName(package_name.to_string());

    let segments: Vec<&str> = package_name.split('/').collect();
    let well_formed = match segments.as_slice() {
        [name] => !name.starts_with('@'),
        [scope, name] => scope.len() > 1 && scope.starts_with('@') && !name.starts_with('@'),
        _ => false,
    };
    if !well_formed {
        return Err(invalid());
    }

    let path: PathBuf = segments.iter().collect();
    let normal = path
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if !normal || segments.iter().any(|s| s.is_empty() || s.contains('\\')) {
        return Err(invalid());
    }
    Ok(path)
}
