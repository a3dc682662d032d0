//! Integration tests for exportmap
//!
//! These tests drive the library end to end and the `exportmap` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use std::sync::Arc;
use std::time::Duration;

use exportmap_core::{ExportKind, IndexerConfig, ScanCache};
use exportmap_indexer::{ExportResolver, FsReader, PackageLocator, ParserPool};
use tempfile::TempDir;

fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let full_path = root.join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full_path, content).unwrap();
    }
}

/// A project with one installed component library
fn create_project() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    write_files(
        temp_dir.path(),
        &[
            ("package.json", r#"{ "name": "app", "version": "1.0.0" }"#),
            (
                "node_modules/@acme/react-core/package.json",
                r#"{ "name": "@acme/react-core", "version": "5.1.0", "module": "dist/esm/index.js" }"#,
            ),
            (
                "node_modules/@acme/react-core/src/index.ts",
                "export * from './components';\nexport { Alert } from './components/Alert';\n",
            ),
            (
                "node_modules/@acme/react-core/src/components/index.ts",
                "export { Alert, AlertVariant } from './Alert';\nexport { Chart } from '@acme/charts';\n",
            ),
            (
                "node_modules/@acme/react-core/src/components/Alert/index.ts",
                "export * from './Alert';\n",
            ),
            (
                "node_modules/@acme/react-core/src/components/Alert/Alert.tsx",
                r#"import * as React from 'react';

export enum AlertVariant { success = 'success', danger = 'danger' }

export interface AlertProps extends React.HTMLProps<HTMLDivElement> {
  variant?: AlertVariant;
}

export const Alert: React.FunctionComponent<AlertProps> = ({ variant, ...props }) => (
  <div className={`pf-v5-c-alert pf-m-${variant}`} {...props} />
);
"#,
            ),
            (
                "node_modules/@acme/react-core/src/components/Alert/examples/AlertBasic.tsx",
                "export const AlertBasic = () => null;\n",
            ),
            (
                "node_modules/@acme/react-core/dist/css/utilities/Spacing/spacing.css",
                ".pf-v5-u-m-sm { margin: 0.5rem; }\n.pf-v5-u-p-lg { padding: 1.5rem; }\n",
            ),
        ],
    );
    temp_dir
}

#[tokio::test]
async fn test_locate_then_resolve() {
    let project = create_project();
    let info = PackageLocator::new(project.path())
        .locate("@acme/react-core")
        .unwrap();
    assert_eq!(info.manifest.module.as_deref(), Some("dist/esm/index.js"));

    let resolver = ExportResolver::new(&IndexerConfig::default());
    let alert = resolver.find_export_source(&info.root, "Alert").await.unwrap();

    assert_eq!(alert.kind, ExportKind::Variable);
    assert_eq!(alert.defining_file_path, info.root.join("src/components/Alert/Alert.tsx"));

    let chart = resolver.find_export_source(&info.root, "Chart").await.unwrap();
    assert_eq!(chart.kind, ExportKind::Reexport);
    assert_eq!(chart.source_module.as_deref(), Some("@acme/charts"));

    assert!(resolver.find_export_source(&info.root, "AlertBasic").await.is_none());
}

#[tokio::test]
async fn test_shared_cache_between_resolvers() {
    let project = create_project();
    let root = project.path().join("node_modules/@acme/react-core");
    let cache = Arc::new(ScanCache::with_ttl(Duration::from_secs(60)));

    let first = ExportResolver::with_parts(Arc::clone(&cache), ParserPool::new(2), Arc::new(FsReader), "src");
    let second = ExportResolver::with_parts(Arc::clone(&cache), ParserPool::new(2), Arc::new(FsReader), "src");

    let a = first.scan_package_exports(&root).await;
    let b = second.scan_package_exports(&root).await;
    assert!(Arc::ptr_eq(&a, &b));

    second.clear_export_cache();
    assert!(cache.is_empty());
}

fn exportmap(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_exportmap"))
        .args(args)
        .env_remove("EXPORTMAP_SOURCE_DIR")
        .env_remove("EXPORTMAP_CACHE_TTL_SECS")
        .env_remove("EXPORTMAP_WORKERS")
        .output()
        .expect("Failed to execute exportmap")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "exportmap failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_cli_help() {
    let output = exportmap(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Find where a component library defines its exports"));
}

#[test]
fn test_cli_find() {
    let project = create_project();
    let root = project.path().join("node_modules/@acme/react-core");

    let json = stdout_json(&exportmap(&["find", root.to_str().unwrap(), "AlertVariant"]));
    assert_eq!(json["name"], "AlertVariant");
    assert_eq!(json["kind"], "enum");
    assert!(json["defining_file_path"].as_str().unwrap().ends_with("Alert.tsx"));
}

#[test]
fn test_cli_find_missing_suggests() {
    let project = create_project();
    let root = project.path().join("node_modules/@acme/react-core");

    let output = exportmap(&["find", root.to_str().unwrap(), "Alrt"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("did you mean"), "{stderr}");
    assert!(stderr.contains("Alert"));
}

#[test]
fn test_cli_scan_without_sources() {
    let project = create_project();

    let json = stdout_json(&exportmap(&["scan", project.path().to_str().unwrap()]));
    assert_eq!(json["exports"], serde_json::json!({}));
    assert_eq!(json["errors"].as_array().unwrap().len(), 1);
}

#[test]
fn test_cli_list_and_source() {
    let project = create_project();
    let root = project.path().join("node_modules/@acme/react-core");
    let root = root.to_str().unwrap();

    let json = stdout_json(&exportmap(&["list", root, "--kind", "interface"]));
    let names: Vec<_> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["AlertProps"]);

    let json = stdout_json(&exportmap(&["source", root, "AlertProps"]));
    assert!(json["source"].as_str().unwrap().contains("export interface AlertProps"));

    assert!(!exportmap(&["list", root, "--kind", "namespace"]).status.success());
}

#[test]
fn test_cli_locate_and_css() {
    let project = create_project();

    let json = stdout_json(&exportmap(&[
        "locate",
        project.path().to_str().unwrap(),
        "@acme/react-core",
    ]));
    assert_eq!(json["manifest"]["version"], "5.1.0");

    let dist = project.path().join("node_modules/@acme/react-core/dist");
    let json = stdout_json(&exportmap(&["css", dist.to_str().unwrap(), "--prefix", "pf-v5-u-"]));
    assert_eq!(json["classes"], serde_json::json!(["pf-v5-u-m-sm", "pf-v5-u-p-lg"]));
}

#[test]
fn test_cli_config_file() {
    let project = create_project();
    write_files(
        project.path(),
        &[
            ("exportmap.toml", "source_dir = \"lib\"\ncache_ttl_secs = 10\n"),
            ("pkg/lib/util.ts", "export function helper() {}\n"),
        ],
    );
    let config = project.path().join("exportmap.toml");
    let pkg = project.path().join("pkg");

    let json = stdout_json(&exportmap(&[
        "--config",
        config.to_str().unwrap(),
        "find",
        pkg.to_str().unwrap(),
        "helper",
    ]));
    assert_eq!(json["kind"], "function");
}
