//! Language extractors

pub mod typescript;

use crate::extractor::ExportExtractor;
use crate::parser_pool::SourceDialect;

/// Get the extractor for a source dialect
pub fn get_extractor(dialect: SourceDialect) -> Box<dyn ExportExtractor> {
    match dialect {
        // The TSX grammar shares the TypeScript node kinds for declarations.
        SourceDialect::TypeScript | SourceDialect::Tsx => Box::new(typescript::TypeScriptExtractor),
    }
}
