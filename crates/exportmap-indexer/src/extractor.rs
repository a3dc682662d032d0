//! Export extractor trait and single-file parsing entry point

use std::path::Path;

use exportmap_core::{ExportRecord, IndexError};
use tree_sitter::{Parser, Tree};

use crate::languages::get_extractor;
use crate::parser_pool::SourceDialect;

pub trait ExportExtractor: Send + Sync {
    /// Collect the top-level exports of an already parsed file, in source order.
    fn extract(&self, path: &Path, tree: &Tree, source: &str) -> Vec<ExportRecord>;
}

/// Parse one file's text and extract its exports.
///
/// Uses a parser local to the call; the builder goes through the
/// [`ParserPool`](crate::ParserPool) instead.
pub fn parse_exports(path: &Path, source: &str) -> exportmap_core::Result<Vec<ExportRecord>> {
    let dialect = SourceDialect::from_path(path).unwrap_or(SourceDialect::TypeScript);

    let mut parser = Parser::new();
    parser
        .set_language(&dialect.get_language())
        .map_err(|e| IndexError::Language(e.to_string()))?;

    let tree = parser.parse(source, None).ok_or_else(|| IndexError::Parse {
        path: path.to_path_buf(),
        reason: "Parser produced no syntax tree".to_string(),
    })?;

    Ok(get_extractor(dialect).extract(path, &tree, source))
}
