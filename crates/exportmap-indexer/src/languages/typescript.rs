//! TypeScript export extractor using tree-sitter

use std::collections::HashMap;
use std::path::Path;

use exportmap_core::{ExportKind, ExportRecord};
use tree_sitter::{Node, Tree};

use crate::extractor::ExportExtractor;

/// Extracts top-level exports from `.ts` and `.tsx` syntax trees.
///
/// `export * from '…'` is left unresolved: naming its members needs the
/// target module's exports, which a single-file pass does not have.
pub struct TypeScriptExtractor;

impl TypeScriptExtractor {
    fn line(node: Node) -> u32 {
        (node.start_position().row as u32) + 1
    }

    fn text<'a>(node: Node, source: &'a [u8]) -> Option<&'a str> {
        node.utf8_text(source).ok()
    }

    /// Map a declaration node kind to the export kind it defines.
    fn declaration_kind(kind: &str) -> Option<ExportKind> {
        match kind {
            "lexical_declaration" | "variable_declaration" => Some(ExportKind::Variable),
            "function_declaration" | "generator_function_declaration" | "function_signature" => {
                Some(ExportKind::Function)
            }
            "class_declaration" | "abstract_class_declaration" => Some(ExportKind::Class),
            "interface_declaration" => Some(ExportKind::Interface),
            "type_alias_declaration" => Some(ExportKind::Type),
            "enum_declaration" => Some(ExportKind::Enum),
            _ => None,
        }
    }

    /// `declare const x: T;` wraps the real declaration in an ambient node.
    fn unwrap_ambient(node: Node) -> Node {
        if node.kind() != "ambient_declaration" {
            return node;
        }
        let mut cursor = node.walk();
        let inner = node
            .named_children(&mut cursor)
            .find(|child| Self::declaration_kind(child.kind()).is_some());
        inner.unwrap_or(node)
    }

    /// Names bound by a declaration, with their lines.
    fn declared_names(decl: Node, source: &[u8]) -> Vec<(String, u32)> {
        let mut names = Vec::new();

        if matches!(decl.kind(), "lexical_declaration" | "variable_declaration") {
            let mut cursor = decl.walk();
            for declarator in decl.named_children(&mut cursor) {
                if declarator.kind() != "variable_declarator" {
                    continue;
                }
                if let Some(pattern) = declarator.child_by_field_name("name") {
                    Self::bound_identifiers(pattern, source, &mut names);
                }
            }
        } else if let Some(name_node) = decl.child_by_field_name("name") {
            if let Some(name) = Self::text(name_node, source) {
                names.push((name.to_string(), Self::line(decl)));
            }
        }

        names
    }

    /// Identifiers introduced by a binding pattern (`a`, `{ a, b: c }`, `[a, ...rest]`).
    fn bound_identifiers(pattern: Node, source: &[u8], out: &mut Vec<(String, u32)>) {
        match pattern.kind() {
            "identifier" | "shorthand_property_identifier_pattern" => {
                if let Some(name) = Self::text(pattern, source) {
                    out.push((name.to_string(), Self::line(pattern)));
                }
            }
            "pair_pattern" => {
                if let Some(value) = pattern.child_by_field_name("value") {
                    Self::bound_identifiers(value, source, out);
                }
            }
            "object_assignment_pattern" | "assignment_pattern" => {
                if let Some(left) = pattern.child_by_field_name("left") {
                    Self::bound_identifiers(left, source, out);
                }
            }
            _ => {
                let mut cursor = pattern.walk();
                for child in pattern.named_children(&mut cursor) {
                    Self::bound_identifiers(child, source, out);
                }
            }
        }
    }

    fn has_token(node: Node, token: &str) -> bool {
        let mut cursor = node.walk();
        let found = node.children(&mut cursor).any(|child| child.kind() == token);
        found
    }

    fn module_specifier(string_node: Node, source: &[u8]) -> Option<String> {
        Self::text(string_node, source).map(|s| s.trim_matches(|c| c == '"' || c == '\'' || c == '`').to_string())
    }

    /// `export { A, B as C } from './x'` yields `A` and `C`.
    fn extract_reexports(clause: Node, module: &str, source: &[u8], path: &Path, records: &mut Vec<ExportRecord>) {
        let mut cursor = clause.walk();
        for specifier in clause.named_children(&mut cursor) {
            if specifier.kind() != "export_specifier" {
                continue;
            }
            let external = specifier
                .child_by_field_name("alias")
                .or_else(|| specifier.child_by_field_name("name"));
            let Some(name) = external.and_then(|n| Self::module_specifier(n, source)) else {
                continue;
            };

            let mut record = ExportRecord::new(name, path.to_path_buf(), ExportKind::Reexport);
            record.source_module = Some(module.to_string());
            record.line = Self::line(specifier);
            records.push(record);
        }
    }

    fn visit_export(
        node: Node,
        source: &[u8],
        path: &Path,
        records: &mut Vec<ExportRecord>,
        default_refs: &mut Vec<String>,
    ) {
        if let Some(source_node) = node.child_by_field_name("source") {
            let Some(module) = Self::module_specifier(source_node, source) else {
                return;
            };
            let mut cursor = node.walk();
            let clause = node
                .named_children(&mut cursor)
                .find(|child| child.kind() == "export_clause");
            match clause {
                Some(clause) => Self::extract_reexports(clause, &module, source, path, records),
                None => tracing::trace!("Wildcard re-export of {} in {} left unresolved", module, path.display()),
            }
            return;
        }

        let is_default = Self::has_token(node, "default");

        if let Some(decl) = node.child_by_field_name("declaration") {
            let decl = Self::unwrap_ambient(decl);
            let Some(kind) = Self::declaration_kind(decl.kind()) else {
                tracing::trace!("Skipping {} export in {}", decl.kind(), path.display());
                return;
            };
            for (name, line) in Self::declared_names(decl, source) {
                let mut record = ExportRecord::new(name, path.to_path_buf(), kind);
                record.is_default_export = is_default;
                record.line = line;
                records.push(record);
            }
            return;
        }

        if !is_default {
            // Bare `export { X }`: X is already recorded by its own declaration.
            return;
        }

        let Some(value) = node.child_by_field_name("value") else {
            return;
        };
        let kind = match value.kind() {
            "identifier" => {
                if let Some(name) = Self::text(value, source) {
                    default_refs.push(name.to_string());
                }
                return;
            }
            "function_expression" | "function" | "generator_function" => ExportKind::Function,
            "class" => ExportKind::Class,
            _ => return,
        };
        // Named default expressions only; anonymous defaults have nothing to index.
        if let Some(name) = value.child_by_field_name("name").and_then(|n| Self::text(n, source)) {
            let mut record = ExportRecord::new(name, path.to_path_buf(), kind);
            record.is_default_export = true;
            record.line = Self::line(value);
            records.push(record);
        }
    }
}

impl ExportExtractor for TypeScriptExtractor {
    fn extract(&self, path: &Path, tree: &Tree, source: &str) -> Vec<ExportRecord> {
        let root = tree.root_node();
        if root.has_error() {
            tracing::debug!("Syntax errors in {}, extracting well-formed exports only", path.display());
        }

        let bytes = source.as_bytes();
        let mut records = Vec::new();
        let mut default_refs = Vec::new();
        // Top-level declarations that are not exported in place.
        let mut locals: HashMap<String, (ExportKind, u32)> = HashMap::new();

        let mut cursor = root.walk();
        for node in root.named_children(&mut cursor) {
            match node.kind() {
                "export_statement" => Self::visit_export(node, bytes, path, &mut records, &mut default_refs),
                "ERROR" => {}
                _ => {
                    let decl = Self::unwrap_ambient(node);
                    if let Some(kind) = Self::declaration_kind(decl.kind()) {
                        for (name, line) in Self::declared_names(decl, bytes) {
                            locals.insert(name, (kind, line));
                        }
                    }
                }
            }
        }

        // `export default Button;`
        for name in default_refs {
            let exported = records
                .iter_mut()
                .rev()
                .find(|r| r.name == name && !r.is_reexport());
            match exported {
                Some(existing) => existing.is_default_export = true,
                None => {
                    if let Some(&(kind, line)) = locals.get(&name) {
                        let mut record = ExportRecord::new(name, path.to_path_buf(), kind);
                        record.is_default_export = true;
                        record.line = line;
                        records.push(record);
                    }
                }
            }
        }

        records
    }
}
