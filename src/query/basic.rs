//! The lookup-style queries (§4.9): `find`, `usages`, `typedef`, `api`,
//! `imports`, `exporters`, `fileExports`, `graph`, `stats`. None of these
//! need call-graph resolution; they read [`FileRecord`]s and the name
//! index directly.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::index::{FileRecord, GraphResult as FileLevelGraph, SymbolIndex};
use crate::parsing::LanguageRegistry;
use crate::types::{Export, Import, SymbolRecord, TypeDecl, TypeKind, Usage, UsageKind};

use super::options::{ApiOptions, FindOptions, GraphOptions, TypedefOptions, UsagesOptions};
use super::{not_found, passes_filters, path_matches, sort_by_popularity, NotFound};

#[derive(Debug, Clone, Serialize)]
pub struct FindResult {
    pub items: Vec<SymbolRecord>,
    pub suggestions: Vec<Box<str>>,
}

/// §4.9 `find`: every symbol whose name equals (`exact`) or
/// case-insensitively contains `name`, filtered by path patterns, sorted
/// by usage popularity then disambiguation score.
pub fn find(index: &SymbolIndex, name: &str, opts: &FindOptions) -> FindResult {
    let names: Vec<String> = if opts.exact {
        vec![name.to_string()]
    } else {
        index.names_containing(name).into_iter().map(String::from).collect()
    };

    let mut items: Vec<SymbolRecord> = names
        .iter()
        .flat_map(|n| index.symbols_named(n).to_vec())
        .filter(|s| passes_filters(&s.file, opts.file.as_deref(), &opts.exclude, opts.in_.as_deref()))
        .filter(|s| !s.is_test_file)
        .collect();

    if items.is_empty() {
        return FindResult { items, suggestions: not_found(index, name).suggestions };
    }
    sort_by_popularity(index, &mut items);
    FindResult { items, suggestions: Vec::new() }
}

#[derive(Debug, Clone, Serialize)]
pub struct UsageOccurrence {
    pub file: PathBuf,
    pub line: u32,
    pub column: u32,
    pub kind: UsageKind,
    pub context_before: Vec<String>,
    pub context_after: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UsagesResult {
    pub items: Vec<UsageOccurrence>,
    pub suggestions: Vec<Box<str>>,
}

/// §4.9 `usages`: every syntactic occurrence of `name`, derived on demand
/// by re-running `findUsagesInCode` over each file's source (§5 "Usage...
/// computed on demand, never stored in the index"). Test files are
/// excluded, per the glossary's "Test file" default.
pub fn usages(index: &SymbolIndex, name: &str, opts: &UsagesOptions) -> UsagesResult {
    let registry = LanguageRegistry::new();
    let mut items = Vec::new();

    for file in index.files_sorted() {
        if file.is_test_file || file.parse_error {
            continue;
        }
        if !passes_filters(&file.rel_path, None, &opts.exclude, opts.in_.as_deref()) {
            continue;
        }
        let Ok(source) = std::fs::read_to_string(&file.abs_path) else {
            continue;
        };
        let Ok(mut extractor) = registry.extractor_for(file.language) else {
            continue;
        };
        for usage in extractor.find_usages_in_code(&source, name) {
            if opts.code_only && !usage.in_code {
                continue;
            }
            let (context_before, context_after) = surrounding_context(&source, usage, opts.context);
            items.push(UsageOccurrence {
                file: file.rel_path.clone(),
                line: usage.line,
                column: usage.column,
                kind: usage.kind,
                context_before,
                context_after,
            });
        }
    }

    if items.is_empty() {
        return UsagesResult { items, suggestions: not_found(index, name).suggestions };
    }
    UsagesResult { items, suggestions: Vec::new() }
}

fn surrounding_context(source: &str, usage: Usage, context: Option<u32>) -> (Vec<String>, Vec<String>) {
    let Some(n) = context else {
        return (Vec::new(), Vec::new());
    };
    let lines: Vec<&str> = source.lines().collect();
    let line_idx = usage.line.saturating_sub(1) as usize;
    let before_start = line_idx.saturating_sub(n as usize);
    let before = lines[before_start..line_idx.min(lines.len())].iter().map(|l| l.to_string()).collect();
    let after_end = (line_idx + 1 + n as usize).min(lines.len());
    let after_start = (line_idx + 1).min(lines.len());
    let after = lines[after_start..after_end].iter().map(|l| l.to_string()).collect();
    (before, after)
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeDeclView {
    pub file: PathBuf,
    pub decl: TypeDecl,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypedefResult {
    pub items: Vec<TypeDeclView>,
    pub suggestions: Vec<Box<str>>,
}

const TYPE_LIKE_KINDS: &[TypeKind] = &[
    TypeKind::Class,
    TypeKind::Struct,
    TypeKind::Interface,
    TypeKind::Enum,
    TypeKind::Trait,
    TypeKind::TypeAlias,
    TypeKind::Record,
];

/// §4.9 `typedef`: type-like `TypeDecl`s (excludes `module`/`macro`/`impl`
/// synthesized kinds) whose name matches.
pub fn typedef(index: &SymbolIndex, name: &str, _opts: &TypedefOptions) -> TypedefResult {
    let mut items = Vec::new();
    for file in index.files_sorted() {
        for decl in &file.types {
            if decl.name.as_ref() == name && TYPE_LIKE_KINDS.contains(&decl.kind) {
                items.push(TypeDeclView { file: file.rel_path.clone(), decl: decl.clone() });
            }
        }
    }
    if items.is_empty() {
        return TypedefResult { items, suggestions: not_found(index, name).suggestions };
    }
    TypedefResult { items, suggestions: Vec::new() }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportView {
    pub file: PathBuf,
    pub export: Export,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiResult {
    pub items: Vec<ExportView>,
}

/// §4.9 `api`: every `Export` project-wide, or restricted to one file.
pub fn api(index: &SymbolIndex, opts: &ApiOptions) -> ApiResult {
    let mut items = Vec::new();
    for file in index.files_sorted() {
        if let Some(pattern) = &opts.file {
            if !path_matches(pattern, &file.rel_path) {
                continue;
            }
        }
        for export in &file.exports {
            items.push(ExportView { file: file.rel_path.clone(), export: export.clone() });
        }
    }
    ApiResult { items }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportsResult {
    pub file: PathBuf,
    pub found: bool,
    pub imports: Vec<Import>,
}

/// §4.9 `imports`: a single file's recorded `Import`s (resolution already
/// happened at build time; unresolved specifiers are included too, per
/// §3 "kept as unresolved specifiers ... but do not produce edges").
pub fn imports(index: &SymbolIndex, file: &str) -> ImportsResult {
    match find_file(index, file) {
        Some(record) => {
            let mut all = record.imports.clone();
            all.extend(record.unresolved_imports.clone());
            ImportsResult { file: record.rel_path.clone(), found: true, imports: all }
        }
        None => ImportsResult { file: PathBuf::from(file), found: false, imports: Vec::new() },
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportersResult {
    pub file: PathBuf,
    pub found: bool,
    pub exporters: Vec<PathBuf>,
}

/// §4.9 `exporters`: every file holding an import edge into `file`.
pub fn exporters(index: &SymbolIndex, file: &str) -> ExportersResult {
    match find_file(index, file) {
        Some(record) => {
            let mut importers = index.import_graph().importers_of(&record.rel_path).to_vec();
            importers.sort();
            ExportersResult { file: record.rel_path.clone(), found: true, exporters: importers }
        }
        None => ExportersResult { file: PathBuf::from(file), found: false, exporters: Vec::new() },
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileExportsResult {
    pub file: PathBuf,
    pub found: bool,
    pub exports: Vec<Export>,
}

/// §4.9 `fileExports`: a single file's `Export` records.
pub fn file_exports(index: &SymbolIndex, file: &str) -> FileExportsResult {
    match find_file(index, file) {
        Some(record) => FileExportsResult { file: record.rel_path.clone(), found: true, exports: record.exports.clone() },
        None => FileExportsResult { file: PathBuf::from(file), found: false, exports: Vec::new() },
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileGraphResult {
    pub root: PathBuf,
    pub found: bool,
    pub graph: FileLevelGraph,
}

/// §4.9 `graph`: a depth-limited, cycle-reporting BFS over the import
/// graph rooted at `file`.
pub fn graph(index: &SymbolIndex, file: &str, opts: &GraphOptions) -> FileGraphResult {
    match find_file(index, file) {
        Some(record) => {
            let result = index.import_graph().bfs(&record.rel_path, opts.direction.into(), opts.max_depth);
            FileGraphResult { root: record.rel_path.clone(), found: true, graph: result }
        }
        None => FileGraphResult {
            root: PathBuf::from(file),
            found: false,
            graph: FileLevelGraph { levels: Vec::new(), circular: Vec::new() },
        },
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LanguageStats {
    pub files: u32,
    pub lines: u32,
    pub functions: u32,
    pub types: u32,
    pub parse_errors: u32,
    pub unresolved_imports: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsResult {
    pub total_files: u32,
    pub total_lines: u32,
    pub total_symbols: u32,
    pub by_language: HashMap<String, LanguageStats>,
    pub by_kind: HashMap<String, u32>,
}

/// `stats`: file/line/symbol counts grouped by language and kind, plus
/// the health counters worth pairing with them (parse errors, unresolved
/// imports).
pub fn stats(index: &SymbolIndex) -> StatsResult {
    let mut by_language: HashMap<String, LanguageStats> = HashMap::new();
    let mut by_kind: HashMap<String, u32> = HashMap::new();
    let mut total_lines = 0u32;
    let mut total_symbols = 0u32;
    let mut total_files = 0u32;

    for file in index.files() {
        total_files += 1;
        total_lines += file.total_lines;
        let entry = by_language.entry(file.language.name().to_string()).or_default();
        entry.files += 1;
        entry.lines += file.total_lines;
        entry.functions += file.functions.len() as u32;
        entry.types += file.types.len() as u32;
        if file.parse_error {
            entry.parse_errors += 1;
        }
        entry.unresolved_imports += file.unresolved_imports.len() as u32;

        for record in file.symbol_records() {
            total_symbols += 1;
            *by_kind.entry(kind_label(&record.kind).to_string()).or_default() += 1;
        }
    }

    StatsResult { total_files, total_lines, total_symbols, by_language, by_kind }
}

fn kind_label(kind: &crate::types::SymbolKind) -> &'static str {
    use crate::types::SymbolKind;
    match kind {
        SymbolKind::Function => "function",
        SymbolKind::Method => "method",
        SymbolKind::Type(_) => "type",
        SymbolKind::StateConstant => "state_constant",
    }
}

fn find_file<'a>(index: &'a SymbolIndex, file: &str) -> Option<&'a FileRecord> {
    if let Some(record) = index.file_by_rel_path(Path::new(file)) {
        return Some(record);
    }
    if let Some(record) = index.file_by_abs_path(Path::new(file)) {
        return Some(record);
    }
    index.files_sorted().into_iter().find(|f| path_matches(file, &f.rel_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::index::build_project;
    use std::fs;
    use std::sync::Arc;

    #[test]
    fn find_orders_by_popularity_then_score() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.rs"),
            "fn popular() {}\nfn lonely() {}\nfn main() { popular(); popular(); }\n",
        )
        .unwrap();
        let index = build_project(dir.path(), Arc::new(Settings::default())).unwrap();
        let result = find(&index, "popular", &FindOptions::default());
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].name.as_ref(), "popular");
    }

    #[test]
    fn find_reports_suggestions_when_nothing_matches() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.rs"), "fn helper_one() {}\n").unwrap();
        let index = build_project(dir.path(), Arc::new(Settings::default())).unwrap();
        let result = find(&index, "totally_missing", &FindOptions::default());
        assert!(result.items.is_empty());
        assert!(result.suggestions.is_empty());
    }

    #[test]
    fn imports_reports_not_found_for_unknown_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.rs"), "fn f() {}\n").unwrap();
        let index = build_project(dir.path(), Arc::new(Settings::default())).unwrap();
        let result = imports(&index, "nope.rs");
        assert!(!result.found);
    }

    #[test]
    fn stats_counts_files_and_symbols() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.rs"), "fn one() {}\nfn two() {}\n").unwrap();
        let index = build_project(dir.path(), Arc::new(Settings::default())).unwrap();
        let result = stats(&index);
        assert_eq!(result.total_files, 1);
        assert_eq!(result.total_symbols, 2);
    }
}
