//! The abstract extractor contract (§4.3) and small helpers shared by
//! every per-language implementation: a `LanguageParser`-style trait plus
//! node-depth/truncation helpers common to every tree-sitter walk.

use crate::types::{
    Call, Export, Function, Import, Language, StateConstant, TypeDecl, Usage,
};
use std::collections::HashMap;
use tree_sitter::Node;

/// Result of the coarse `parse` operation: everything an extractor can
/// produce except imports/exports, which callers request separately so
/// a caller that only wants functions never pays for import/export work.
pub struct ParseOutcome {
    pub language: Language,
    pub total_lines: u32,
    pub functions: Vec<Function>,
    pub types: Vec<TypeDecl>,
    pub state_constants: Vec<StateConstant>,
}

/// Common interface every per-language extractor implements (§4.3).
///
/// Implementations never throw on malformed source (§7): a syntax error
/// anywhere simply yields fewer symbols, never a panic or `Err`.
pub trait Extractor: Send {
    fn language(&self) -> Language;

    fn parse(&mut self, source: &str) -> ParseOutcome {
        ParseOutcome {
            language: self.language(),
            total_lines: source.lines().count() as u32,
            functions: self.find_functions(source),
            types: self.find_classes(source),
            state_constants: self.find_state_objects(source),
        }
    }

    fn find_functions(&mut self, source: &str) -> Vec<Function>;
    fn find_classes(&mut self, source: &str) -> Vec<TypeDecl>;
    fn find_state_objects(&mut self, source: &str) -> Vec<StateConstant>;
    fn find_calls_in_code(&mut self, source: &str) -> Vec<Call>;
    fn find_imports_in_code(&mut self, source: &str) -> Vec<Import>;
    fn find_exports_in_code(&mut self, source: &str) -> Vec<Export>;
    fn find_usages_in_code(&mut self, source: &str, name: &str) -> Vec<Usage>;

    /// Python-only: `self.X` attribute types, used to resolve
    /// `self.svc.create(...)` to `UserService.create` (§4.6 rule 3).
    fn find_instance_attribute_types(
        &mut self,
        _source: &str,
    ) -> HashMap<Box<str>, HashMap<Box<str>, Box<str>>> {
        HashMap::new()
    }
}

/// Maximum AST recursion depth (§4.4 uses an explicit stack, but nested
/// literals/calls still need a circuit breaker against pathological input).
pub const MAX_AST_DEPTH: usize = 500;

#[inline]
pub fn check_recursion_depth(depth: usize) -> bool {
    depth <= MAX_AST_DEPTH
}

/// Safely truncate a UTF-8 string at a character boundary (never slices
/// through a multi-byte codepoint).
#[inline]
pub fn safe_truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut boundary = max_bytes;
    while boundary > 0 && !s.is_char_boundary(boundary) {
        boundary -= 1;
    }
    &s[..boundary]
}

/// 0-based tree-sitter row to 1-based line (§4.2 position conventions).
#[inline]
pub fn line_of(node: &Node) -> u32 {
    node.start_position().row as u32 + 1
}

#[inline]
pub fn end_line_of(node: &Node) -> u32 {
    node.end_position().row as u32 + 1
}

#[inline]
pub fn column_of(node: &Node) -> u32 {
    node.start_position().column as u32
}

pub fn text_of<'a>(node: &Node, source: &'a str) -> &'a str {
    source
        .get(node.byte_range())
        .unwrap_or_default()
}

/// Best-effort doc-comment extraction: walks the immediately preceding
/// sibling comment nodes, matching the language's convention passed in
/// `comment_kinds` (e.g. `["line_comment", "block_comment"]`), and joins
/// them. Returns the first meaningful line.
pub fn preceding_doc_comment(node: &Node, source: &str, comment_kinds: &[&str]) -> Option<Box<str>> {
    let mut sibling = node.prev_sibling();
    let mut lines = Vec::new();
    while let Some(s) = sibling {
        if comment_kinds.contains(&s.kind()) {
            lines.push(text_of(&s, source).trim().to_string());
            sibling = s.prev_sibling();
        } else {
            break;
        }
    }
    lines.reverse();
    let joined = lines.join("\n");
    let first_line = joined.lines().next()?.trim();
    if first_line.is_empty() {
        None
    } else {
        Some(first_line.into())
    }
}

/// A Python-style docstring: first string-literal statement in a body.
pub fn leading_docstring(body: &Node, source: &str, string_kind: &str) -> Option<Box<str>> {
    let mut cursor = body.walk();
    for child in body.children(&mut cursor) {
        if child.kind() == "expression_statement" {
            if let Some(inner) = child.child(0) {
                if inner.kind() == string_kind {
                    let text = text_of(&inner, source);
                    let trimmed = text.trim_matches(|c| c == '"' || c == '\'').trim();
                    return trimmed.lines().next().map(|l| l.trim().into());
                }
            }
        }
        break;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        let text = "Café";
        let truncated = safe_truncate_str(text, 3);
        assert!(text.starts_with(truncated));
        assert!(truncated.len() <= 3);
    }

    #[test]
    fn recursion_depth_guard_trips_past_limit() {
        assert!(check_recursion_depth(MAX_AST_DEPTH));
        assert!(!check_recursion_depth(MAX_AST_DEPTH + 1));
    }
}
