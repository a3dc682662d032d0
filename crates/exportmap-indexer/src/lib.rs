//! Source scanning, export extraction and resolution

pub mod builder;
pub mod collector;
pub mod css;
pub mod extractor;
pub mod languages;
pub mod package;
pub mod parser_pool;
pub mod reader;
pub mod resolver;


#[cfg(test)]
pub mod test_utils;

pub use builder::IndexBuilder;
pub use collector::{collect, try_collect};
pub use extractor::{ExportExtractor, parse_exports};
pub use package::{PackageInfo, PackageLocator, PackageManifest};
pub use parser_pool::{ParseRequest, ParseResult, ParserPool, SourceDialect, create_parser_pool};
pub use reader::{FsReader, SourceReader};
pub use resolver::{ExportResolver, ExportSource};
