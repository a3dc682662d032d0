//! Utility class extraction from stylesheets

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::collector::{FileFilter, walk_files};
use crate::reader::SourceReader;

static COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("static regex: comment"));

/// Text before each `{`: a selector list or an at-rule prelude.
static PRELUDE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([^{};]+)\{").expect("static regex: prelude"));

static CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(-?[_a-zA-Z](?:[_a-zA-Z0-9-]|\\.)*)").expect("static regex: class"));

/// Class names across a set of stylesheets
#[derive(Debug, Clone, Default, Serialize)]
pub struct CssScan {
    pub classes: BTreeSet<String>,
    pub files_scanned: usize,
    pub errors: Vec<String>,
}

/// Class names used in the selectors of `css`, keeping those starting with `prefix`.
///
/// Escapes such as `.pf-m-1\/2` are unescaped (`pf-m-1/2`).
pub fn extract_utility_classes(css: &str, prefix: &str) -> BTreeSet<String> {
    let css = COMMENT.replace_all(css, "");
    let mut classes = BTreeSet::new();

    for prelude in PRELUDE.captures_iter(&css) {
        let selector = prelude[1].trim();
        if selector.starts_with('@') {
            continue;
        }
        for class in CLASS.captures_iter(selector) {
            let name = class[1].replace('\\', "");
            if name.starts_with(prefix) {
                classes.insert(name);
            }
        }
    }

    classes
}

/// Extract utility classes from every `.css` file under `dir`.
pub fn scan_utility_classes(
    dir: &Path,
    prefix: &str,
    reader: &dyn SourceReader,
) -> exportmap_core::Result<CssScan> {
    let files = walk_files(dir, &FileFilter::new(&["*.css"], &[])?)?;
    let mut scan = CssScan {
        files_scanned: files.len(),
        ..CssScan::default()
    };

    for path in &files {
        match reader.read_to_string(path) {
            Ok(text) => scan.classes.extend(extract_utility_classes(&text, prefix)),
            Err(e) => scan.errors.push(format!("Failed to read {}: {}", path.display(), e)),
        }
    }

    tracing::debug!(
        "Found {} classes with prefix {:?} in {} stylesheets",
        scan.classes.len(),
        prefix,
        scan.files_scanned
    );
    Ok(scan)
}
