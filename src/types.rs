//! Core data model shared across the crate: identifiers, spans, and the
//! small tagged variants that replace a single do-everything "symbol"
//! record (see DESIGN.md, redesign note on ad-hoc records).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::path::PathBuf;

/// Opaque handle to a [`FileRecord`] inside a [`crate::index::SymbolIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(NonZeroU32);

impl FileId {
    pub fn new(value: u32) -> Option<Self> {
        NonZeroU32::new(value).map(Self)
    }

    pub fn value(self) -> u32 {
        self.0.get()
    }
}

/// 1-based line/column span. Rows coming out of tree-sitter are 0-based;
/// conversion to this type happens at the extractor boundary (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl Span {
    pub fn new(start_line: u32, start_column: u32, end_line: u32, end_column: u32) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    pub fn contains_line(&self, line: u32) -> bool {
        line >= self.start_line && line <= self.end_line
    }

    pub fn line_span(&self) -> u32 {
        self.end_line.saturating_sub(self.start_line)
    }
}

/// A short reference to an enclosing function, attached to a [`Call`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnclosingFunction {
    pub name: Box<str>,
    pub start_line: u32,
    pub end_line: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Rust,
    Python,
    JavaScript,
    TypeScript,
    Go,
    Java,
    Html,
}

impl Language {
    pub fn all() -> &'static [Language] {
        &[
            Language::Rust,
            Language::Python,
            Language::JavaScript,
            Language::TypeScript,
            Language::Go,
            Language::Java,
            Language::Html,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            Language::Rust => "rust",
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Go => "go",
            Language::Java => "java",
            Language::Html => "html",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A function, method, or lambda/closure bound to a name (§3 "Function").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub name: Box<str>,
    /// Parameters as written, kept verbatim for `verify`/`plan`.
    pub params_text: Box<str>,
    pub params: Vec<Parameter>,
    pub return_type: Option<Box<str>>,
    pub span: Span,
    /// Line the identifier itself sits on, when it differs from `span.start_line`
    /// because of leading decorators/annotations.
    pub name_line: Option<u32>,
    pub indentation: u32,
    pub modifiers: Vec<Box<str>>,
    pub docstring: Option<Box<str>>,
    pub decorators: Vec<Box<str>>,
    pub generics: Option<Box<str>>,
    pub is_method: bool,
    /// Statically known receiver type, when the function is a method on a
    /// type whose name is known lexically (Rust `impl`, Python/Java class).
    pub receiver_type: Option<Box<str>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: Box<str>,
    pub type_annotation: Option<Box<str>>,
    pub default_value: Option<Box<str>>,
    pub is_optional: bool,
    pub is_rest: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    Enum,
    Trait,
    TypeAlias,
    Record,
    Module,
    Macro,
    Impl,
}

/// A class/struct/interface/enum/trait/... declaration (§3 "TypeDecl").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: Box<str>,
    pub kind: TypeKind,
    pub span: Span,
    pub members: Vec<Function>,
    pub modifiers: Vec<Box<str>>,
    pub extends: Option<Box<str>>,
    pub implements: Vec<Box<str>>,
    pub generics: Option<Box<str>>,
    pub docstring: Option<Box<str>>,
}

/// A top-level constant/literal binding matching the state-object naming
/// heuristic (§4.3 `findStateObjects`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateConstant {
    pub name: Box<str>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportKind {
    Named,
    Default,
    Namespace,
    SideEffect,
    Require,
    Dynamic,
    ReExport,
    Relative,
    Static,
}

/// An import/use/require statement (§3 "Import").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    pub source: Box<str>,
    pub names: Vec<Box<str>>,
    pub kind: ImportKind,
    pub line: u32,
    pub aliases: HashMap<Box<str>, Box<str>>,
    pub dynamic: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportKind {
    Named,
    Default,
    ReExport,
    CommonJs,
    TypeOnly,
}

/// An exported name (§3 "Export").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Export {
    pub name: Box<str>,
    pub kind: ExportKind,
    pub line: u32,
    pub source: Option<Box<str>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UsageKind {
    Definition,
    Call,
    Import,
    Reference,
}

/// A single syntactic occurrence of an identifier, classified by role
/// (§3 "Usage"). Computed on demand, never stored in the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub line: u32,
    pub column: u32,
    pub kind: UsageKind,
    /// false when the occurrence sits inside a comment or string literal.
    pub in_code: bool,
}

/// A call site (§3 "Call", §4.4).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    pub callee_name: Box<str>,
    pub line: u32,
    pub is_method: bool,
    pub receiver: Option<Box<str>>,
    pub self_attribute: Option<Box<str>>,
    pub is_constructor: bool,
    pub is_macro: bool,
    pub is_jsx_component: bool,
    pub is_event_handler: bool,
    pub enclosing_function: Option<EnclosingFunction>,
    pub is_function_reference: bool,
    pub is_potential_callback: bool,
    pub uncertain: bool,
    pub resolved_names: Vec<Box<str>>,
    /// Verbatim argument-list text, used by `impact`/`verify`.
    pub arguments_text: Box<str>,
    pub positional_args: u32,
    pub named_args: u32,
    pub has_spread_arg: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    Function,
    Method,
    Type(TypeKind),
    StateConstant,
}

/// A name-indexed, lightweight view over a declaration, used by the
/// disambiguator and by queries that only need identity + location
/// (§3 "SymbolRecord").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolRecord {
    pub name: Box<str>,
    pub file: PathBuf,
    pub file_id: FileId,
    pub kind: SymbolKind,
    pub span: Span,
    pub usage_counts: UsageCounts,
    pub exported: bool,
    pub is_test_file: bool,
    pub decorators: Vec<Box<str>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCounts {
    pub calls: u32,
    pub definitions: u32,
    pub imports: u32,
    pub references: u32,
}

impl UsageCounts {
    pub fn total(&self) -> u32 {
        self.calls + self.definitions + self.imports + self.references
    }
}

/// A directed edge in the import graph (§3 "Edge").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportEdge {
    pub from: PathBuf,
    pub to: PathBuf,
    pub names: Vec<Box<str>>,
    pub dynamic: bool,
}

/// A directed edge in the inheritance graph (§3 "InheritanceEdge").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InheritanceEdge {
    pub child: Box<str>,
    pub parent: Box<str>,
    pub file: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_id_rejects_zero() {
        assert!(FileId::new(0).is_none());
        assert_eq!(FileId::new(7).unwrap().value(), 7);
    }

    #[test]
    fn span_contains_line_is_inclusive() {
        let span = Span::new(10, 0, 20, 5);
        assert!(span.contains_line(10));
        assert!(span.contains_line(20));
        assert!(!span.contains_line(9));
        assert!(!span.contains_line(21));
    }

    #[test]
    fn usage_counts_total_sums_all_kinds() {
        let counts = UsageCounts {
            calls: 3,
            definitions: 1,
            imports: 2,
            references: 4,
        };
        assert_eq!(counts.total(), 10);
    }
}
