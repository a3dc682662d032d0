//! Core data structures for the export index

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Discriminates what kind of declaration an export refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    // ── Declarations (true definitions) ─────────────────────
    Variable,
    Function,
    Class,
    Interface,
    Type,
    Enum,

    // ── Forwarded from another module ───────────────────────
    Reexport,
}

impl ExportKind {
    /// Every kind, in declaration order.
    pub const ALL: [ExportKind; 7] = [
        ExportKind::Variable,
        ExportKind::Function,
        ExportKind::Class,
        ExportKind::Interface,
        ExportKind::Type,
        ExportKind::Enum,
        ExportKind::Reexport,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportKind::Variable => "variable",
            ExportKind::Function => "function",
            ExportKind::Class => "class",
            ExportKind::Interface => "interface",
            ExportKind::Type => "type",
            ExportKind::Enum => "enum",
            ExportKind::Reexport => "reexport",
        }
    }

    /// Parse a kind from its lowercase name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// True for every kind except `Reexport`.
    pub fn is_definition(&self) -> bool {
        !matches!(self, ExportKind::Reexport)
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One discovered export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecord {
    /// External name of the export (post-alias for re-exports).
    pub name: String,
    /// File holding the declaration, or the re-export statement.
    pub defining_file_path: PathBuf,
    pub kind: ExportKind,
    pub is_default_export: bool,
    /// Module specifier a re-export forwards from, e.g. `./Button`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_module: Option<String>,
    /// 1-based line of the declaration or specifier.
    pub line: u32,
}

impl ExportRecord {
    pub fn new(name: impl Into<String>, defining_file_path: PathBuf, kind: ExportKind) -> Self {
        ExportRecord {
            name: name.into(),
            defining_file_path,
            kind,
            is_default_export: false,
            source_module: None,
            line: 1,
        }
    }

    pub fn is_reexport(&self) -> bool {
        self.kind == ExportKind::Reexport
    }
}

/// Aggregate result of scanning one package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportIndex {
    /// Export name -> authoritative record.
    pub exports: BTreeMap<String, ExportRecord>,
    /// Per-file or per-scan failures, in the order they occurred.
    pub errors: Vec<String>,
    /// Number of files handed to the builder.
    #[serde(default)]
    pub files_scanned: usize,
}

impl ExportIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, keeping an existing definition over an incoming re-export.
    ///
    /// Returns `true` when the record was stored.
    pub fn insert(&mut self, record: ExportRecord) -> bool {
        if !record.kind.is_definition()
            && self
                .exports
                .get(&record.name)
                .is_some_and(|existing| existing.kind.is_definition())
        {
            return false;
        }
        self.exports.insert(record.name.clone(), record);
        true
    }

    pub fn get(&self, name: &str) -> Option<&ExportRecord> {
        self.exports.get(name)
    }

    pub fn len(&self) -> usize {
        self.exports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Records of one kind, in name order.
    pub fn of_kind(&self, kind: ExportKind) -> impl Iterator<Item = &ExportRecord> {
        self.exports.values().filter(move |r| r.kind == kind)
    }

    /// Count of records per kind.
    pub fn kind_counts(&self) -> BTreeMap<ExportKind, usize> {
        let mut counts = BTreeMap::new();
        for record in self.exports.values() {
            *counts.entry(record.kind).or_insert(0) += 1;
        }
        counts
    }
}
