//! Test utilities for exportmap-indexer

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use tempfile::TempDir;

use crate::reader::SourceReader;

/// Create a temporary package with the given files (paths relative to the package root)
pub fn create_package(structure: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    for (path, content) in structure {
        let full_path = root.join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }

        fs::write(&full_path, content).unwrap();
    }

    temp_dir
}

/// A small component library: one component, its props and a barrel file
pub fn create_component_package() -> TempDir {
    create_package(&[
        (
            "package.json",
            r#"{ "name": "@acme/react-core", "version": "5.1.0", "main": "dist/js/index.js" }"#,
        ),
        (
            "src/index.ts",
            "export * from './components';\nexport { Button, ButtonVariant } from './components/Button';\n",
        ),
        (
            "src/components/index.ts",
            "export * from './Button';\nexport { Icon } from '@acme/icons';\n",
        ),
        (
            "src/components/Button/index.ts",
            "export { Button, ButtonVariant } from './Button';\n",
        ),
        (
            "src/components/Button/Button.tsx",
            r#"import * as React from 'react';

export enum ButtonVariant {
  primary = 'primary',
  secondary = 'secondary'
}

export interface ButtonProps {
  variant?: ButtonVariant;
}

export const Button: React.FunctionComponent<ButtonProps> = ({ variant = ButtonVariant.primary }) => (
  <button className={`pf-v5-c-button pf-m-${variant}`} />
);
Button.displayName = 'Button';
"#,
        ),
        (
            "src/components/Button/Button.test.tsx",
            "export const ButtonTest = 1;\n",
        ),
    ])
}

/// Wraps a reader, counting calls and failing on chosen paths
pub struct CountingReader<R> {
    inner: R,
    reads: AtomicUsize,
    failures: Mutex<HashMap<PathBuf, io::ErrorKind>>,
}

impl<R: SourceReader> CountingReader<R> {
    pub fn new(inner: R) -> Self {
        CountingReader {
            inner,
            reads: AtomicUsize::new(0),
            failures: Mutex::new(HashMap::new()),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Make reads of `path` fail with `kind`
    pub fn fail_on(&self, path: impl Into<PathBuf>, kind: io::ErrorKind) {
        self.failures.lock().unwrap().insert(path.into(), kind);
    }
}

impl<R: SourceReader> SourceReader for CountingReader<R> {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(kind) = self.failures.lock().unwrap().get(path) {
            return Err(io::Error::new(*kind, "simulated read failure"));
        }
        self.inner.read_to_string(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::FsReader;

    #[test]
    fn test_create_component_package() {
        let pkg = create_component_package();
        let root = pkg.path();

        assert!(root.join("package.json").exists());
        assert!(root.join("src/components/Button/Button.tsx").exists());
    }

    #[test]
    fn test_counting_reader() {
        let pkg = create_package(&[("src/a.ts", "export const a = 1;")]);
        let path = pkg.path().join("src/a.ts");
        let reader = CountingReader::new(FsReader);

        assert!(reader.read_to_string(&path).is_ok());
        reader.fail_on(&path, io::ErrorKind::PermissionDenied);
        let err = reader.read_to_string(&path).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert_eq!(reader.reads(), 2);
    }
}
