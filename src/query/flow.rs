//! The call-graph-backed queries (§4.9): `context`, `impact`, `trace`,
//! `smart`, `about`, `related`, `tests`, `deadcode`. Every one of these
//! resolves its target through [`resolve_target`] and then walks
//! [`callers_of`]/[`callees_of`]/[`trace`] rather than touching `Call`
//! lists directly.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use regex::Regex;
use serde::Serialize;

use crate::index::{callees_of, callers_of, classify_weight, has_no_callers, trace as trace_tree, CalleeWeight, SymbolIndex, TraceNode};
use crate::parsing::LanguageRegistry;
use crate::types::{SymbolKind, SymbolRecord};

use super::options::{
    AboutOptions, ContextOptions, DeadcodeOptions, ImpactOptions, RelatedOptions, SmartOptions, TestsOptions,
    TraceOptions,
};
use super::{not_found, passes_filters, read_lines, resolve_target, CalleeView, CallerView};

fn symbol_key(s: &SymbolRecord) -> (PathBuf, Box<str>, u32) {
    (s.file.clone(), s.name.clone(), s.span.start_line)
}

fn caller_view(index: &SymbolIndex, site: &crate::index::CallSite) -> CallerView {
    let _ = index;
    CallerView {
        enclosing: site.call.enclosing_function.as_ref().map(|e| e.name.clone()),
        file: site.caller_file.clone(),
        line: site.call.line,
        is_method: site.call.is_method,
        uncertain: site.uncertain,
    }
}

/// Map a [`crate::index::CallSite`] back to the [`SymbolRecord`] of the
/// function/method it occurred inside, used by `related` to find other
/// callees of the same caller (§4.9 `related`: "share ≥1 caller/callee").
fn enclosing_symbol_of(index: &SymbolIndex, site: &crate::index::CallSite) -> Option<SymbolRecord> {
    let enclosing = site.call.enclosing_function.as_ref()?;
    let file = index.file_by_rel_path(&site.caller_file)?;
    file.symbol_records()
        .into_iter()
        .find(|s| s.name.as_ref() == enclosing.name.as_ref() && s.span.start_line == enclosing.start_line)
}

// ---------------------------------------------------------------------
// context
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ContextResult {
    pub symbol: Option<SymbolRecord>,
    pub callers: Vec<CallerView>,
    pub callees: Vec<CalleeView>,
    /// Populated only when `symbol` is a class/struct/interface/trait.
    pub methods: Vec<SymbolRecord>,
    pub expandable: Vec<crate::cache::ExpandableItem>,
    pub suggestions: Vec<Box<str>>,
}

/// §4.9 `context`: immediate callers, immediate callees (each weighted
/// utility/normal), and for a type, its method list. Returns a numbered
/// list of expandable items the remote-procedure surface can cache for an
/// `expand N` follow-up (§4.8, glossary "Expandable item").
pub fn context(index: &SymbolIndex, name: &str, opts: &ContextOptions) -> ContextResult {
    let Some(target) = resolve_target(index, name, opts.file.as_deref()) else {
        return ContextResult {
            symbol: None,
            callers: Vec::new(),
            callees: Vec::new(),
            methods: Vec::new(),
            expandable: Vec::new(),
            suggestions: not_found(index, name).suggestions,
        };
    };

    let callers: Vec<CallerView> = callers_of(index, &target, opts.include_uncertain)
        .iter()
        .filter(|site| passes_filters(&site.caller_file, None, &opts.exclude, None))
        .map(|site| caller_view(index, site))
        .collect();

    let callees: Vec<CalleeView> = callees_of(index, &target, opts.include_uncertain)
        .into_iter()
        .filter(|(_, sym)| opts.include_methods || !matches!(sym.kind, SymbolKind::Method))
        .map(|(site, sym)| CalleeView { weight: classify_weight(index, &sym), uncertain: site.uncertain, symbol: sym })
        .collect();

    let methods: Vec<SymbolRecord> = if matches!(target.kind, SymbolKind::Type(_)) {
        index
            .file(target.file_id)
            .and_then(|f| f.type_named(&target.name).map(|t| (f, t)))
            .map(|(f, t)| t.members.iter().map(|m| f.symbol_record_for_function(m, SymbolKind::Method)).collect())
            .unwrap_or_default()
    } else {
        Vec::new()
    };

    let mut expandable = Vec::new();
    for cv in &callers {
        expandable.push(crate::cache::ExpandableItem {
            file: cv.file.clone(),
            start_line: cv.line.saturating_sub(2).max(1),
            end_line: cv.line + 2,
            label: format!("caller at {}:{}", cv.file.display(), cv.line),
        });
    }
    for cv in &callees {
        expandable.push(crate::cache::ExpandableItem {
            file: cv.symbol.file.clone(),
            start_line: cv.symbol.span.start_line,
            end_line: cv.symbol.span.end_line,
            label: format!("{} ({})", cv.symbol.name, cv.symbol.file.display()),
        });
    }

    ContextResult { symbol: Some(target), callers, callees, methods, expandable, suggestions: Vec::new() }
}

// ---------------------------------------------------------------------
// impact
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ImpactSite {
    pub line: u32,
    pub enclosing: Option<Box<str>>,
    pub arguments_text: Box<str>,
    pub uncertain: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImpactResult {
    pub symbol: Option<SymbolRecord>,
    pub sites_by_file: BTreeMap<PathBuf, Vec<ImpactSite>>,
    pub suggestions: Vec<Box<str>>,
}

/// §4.9 `impact`: every call site resolving to the symbol, grouped by
/// caller file, with the argument text captured verbatim at each site.
pub fn impact(index: &SymbolIndex, name: &str, opts: &ImpactOptions) -> ImpactResult {
    let Some(target) = resolve_target(index, name, opts.file.as_deref()) else {
        return ImpactResult { symbol: None, sites_by_file: BTreeMap::new(), suggestions: not_found(index, name).suggestions };
    };

    let mut sites_by_file: BTreeMap<PathBuf, Vec<ImpactSite>> = BTreeMap::new();
    for site in callers_of(index, &target, true) {
        if !passes_filters(&site.caller_file, None, &opts.exclude, None) {
            continue;
        }
        sites_by_file.entry(site.caller_file.clone()).or_default().push(ImpactSite {
            line: site.call.line,
            enclosing: site.call.enclosing_function.as_ref().map(|e| e.name.clone()),
            arguments_text: site.call.arguments_text.clone(),
            uncertain: site.uncertain,
        });
    }
    ImpactResult { symbol: Some(target), sites_by_file, suggestions: Vec::new() }
}

// ---------------------------------------------------------------------
// trace
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct TraceResult {
    pub root: Option<TraceNode>,
    pub suggestions: Vec<Box<str>>,
}

/// §4.9 `trace`: DFS callee tree rooted at the symbol, up to `depth` hops,
/// collapsing a repeated (name, file) visit into a `circular` edge.
pub fn trace(index: &SymbolIndex, name: &str, opts: &TraceOptions) -> TraceResult {
    let Some(target) = resolve_target(index, name, None) else {
        return TraceResult { root: None, suggestions: not_found(index, name).suggestions };
    };
    let root = trace_tree(index, &target, opts.depth as usize, opts.include_uncertain);
    TraceResult { root: Some(root), suggestions: Vec::new() }
}

// ---------------------------------------------------------------------
// smart
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct SmartCallee {
    pub symbol: SymbolRecord,
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SmartTypeRef {
    pub symbol: SymbolRecord,
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SmartResult {
    pub symbol: Option<SymbolRecord>,
    pub source: Option<String>,
    pub callees: Vec<SmartCallee>,
    pub types: Vec<SmartTypeRef>,
    pub suggestions: Vec<Box<str>>,
}

/// A capitalized identifier token, used to spot type names referenced in a
/// parameter/return type annotation (§4.9 `smart` "withTypes").
fn capitalized_identifiers(text: &str) -> HashSet<String> {
    let re = Regex::new(r"[A-Z][A-Za-z0-9_]*").unwrap();
    re.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

/// §4.9 `smart`: the symbol's verbatim source, plus the source of each
/// first-hop callee that resolves inside the project, plus (with
/// `withTypes`) any referenced type whose name appears in a parameter or
/// return annotation.
pub fn smart(index: &SymbolIndex, name: &str, opts: &SmartOptions) -> SmartResult {
    let Some(target) = resolve_target(index, name, None) else {
        return SmartResult { symbol: None, source: None, callees: Vec::new(), types: Vec::new(), suggestions: not_found(index, name).suggestions };
    };
    let Some(file) = index.file(target.file_id) else {
        return SmartResult { symbol: Some(target), source: None, callees: Vec::new(), types: Vec::new(), suggestions: Vec::new() };
    };
    let source = read_lines(&file.abs_path, target.span.start_line, target.span.end_line);

    let mut seen = HashSet::new();
    let mut callees = Vec::new();
    for (_, callee_sym) in callees_of(index, &target, opts.include_uncertain) {
        if !opts.include_methods && matches!(callee_sym.kind, SymbolKind::Method) {
            continue;
        }
        if !seen.insert(symbol_key(&callee_sym)) {
            continue;
        }
        let callee_source = index
            .file(callee_sym.file_id)
            .and_then(|f| read_lines(&f.abs_path, callee_sym.span.start_line, callee_sym.span.end_line));
        callees.push(SmartCallee { symbol: callee_sym, source: callee_source });
    }

    let mut types = Vec::new();
    if opts.with_types {
        let function = file.functions.iter().find(|f| f.name.as_ref() == target.name.as_ref() && f.span == target.span).or_else(|| {
            file.types.iter().flat_map(|t| &t.members).find(|m| m.name.as_ref() == target.name.as_ref() && m.span == target.span)
        });
        if let Some(function) = function {
            let mut candidates = HashSet::new();
            for param in &function.params {
                if let Some(t) = &param.type_annotation {
                    candidates.extend(capitalized_identifiers(t));
                }
            }
            if let Some(rt) = &function.return_type {
                candidates.extend(capitalized_identifiers(rt));
            }
            let mut type_seen = HashSet::new();
            for candidate in candidates {
                for type_file in index.files_sorted() {
                    if let Some(decl) = type_file.type_named(&candidate) {
                        let sym = SymbolRecord {
                            name: decl.name.clone(),
                            file: type_file.rel_path.clone(),
                            file_id: type_file.id,
                            kind: SymbolKind::Type(decl.kind),
                            span: decl.span,
                            usage_counts: Default::default(),
                            exported: type_file.exports.iter().any(|e| e.name.as_ref() == decl.name.as_ref()),
                            is_test_file: type_file.is_test_file,
                            decorators: decl.modifiers.clone(),
                        };
                        if type_seen.insert(symbol_key(&sym)) {
                            let type_source = read_lines(&type_file.abs_path, decl.span.start_line, decl.span.end_line);
                            types.push(SmartTypeRef { symbol: sym, source: type_source });
                        }
                    }
                }
            }
        }
    }

    SmartResult { symbol: Some(target), source, callees, types, suggestions: Vec::new() }
}

// ---------------------------------------------------------------------
// about
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct AboutResult {
    pub symbol: Option<SymbolRecord>,
    pub source: Option<String>,
    pub callers: Vec<CallerView>,
    pub callees: Vec<CalleeView>,
    pub tests: Vec<SymbolRecord>,
    pub reference_count: usize,
    pub suggestions: Vec<Box<str>>,
}

/// §4.9 `about`: the composite view — symbol + source, its first N
/// callers/callees (as in `context`), its tests, and a reference count.
pub fn about(index: &SymbolIndex, name: &str, opts: &AboutOptions) -> AboutResult {
    let Some(target) = resolve_target(index, name, None) else {
        return AboutResult {
            symbol: None,
            source: None,
            callers: Vec::new(),
            callees: Vec::new(),
            tests: Vec::new(),
            reference_count: 0,
            suggestions: not_found(index, name).suggestions,
        };
    };
    let source = index.file(target.file_id).and_then(|f| read_lines(&f.abs_path, target.span.start_line, target.span.end_line));

    let all_callers = callers_of(index, &target, opts.include_uncertain);
    let reference_count = all_callers.len();
    let callers: Vec<CallerView> = all_callers.iter().take(opts.caller_limit).map(|site| caller_view(index, site)).collect();

    let callees: Vec<CalleeView> = callees_of(index, &target, opts.include_uncertain)
        .into_iter()
        .take(opts.callee_limit)
        .map(|(site, sym)| CalleeView { weight: classify_weight(index, &sym), uncertain: site.uncertain, symbol: sym })
        .collect();

    let tests = tests(index, name, &TestsOptions::default()).items;

    AboutResult { symbol: Some(target), source, callers, callees, tests, reference_count, suggestions: Vec::new() }
}

// ---------------------------------------------------------------------
// related
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct RelatedResult {
    pub items: Vec<SymbolRecord>,
    pub suggestions: Vec<Box<str>>,
}

/// Crude English-suffix stemmer: enough to group `parseFile`/`parseFiles`/
/// `parsing` without a full morphological analyzer (§4.9 `related`
/// "shares a morphological root").
fn morphological_root(name: &str) -> String {
    let lower = name.to_lowercase();
    const SUFFIXES: &[&str] = &["ification", "ing", "ers", "er", "ed", "es", "s"];
    for suffix in SUFFIXES {
        if lower.len() > suffix.len() + 2 && lower.ends_with(suffix) {
            return lower[..lower.len() - suffix.len()].to_string();
        }
    }
    lower
}

/// §4.9 `related`: symbols in the same file, symbols sharing a
/// morphological root, and symbols sharing ≥1 caller or callee with the
/// target.
pub fn related(index: &SymbolIndex, name: &str, _opts: &RelatedOptions) -> RelatedResult {
    let Some(target) = resolve_target(index, name, None) else {
        return RelatedResult { items: Vec::new(), suggestions: not_found(index, name).suggestions };
    };
    let mut seen = HashSet::new();
    seen.insert(symbol_key(&target));
    let mut items = Vec::new();

    if let Some(file) = index.file(target.file_id) {
        for record in file.symbol_records() {
            if seen.insert(symbol_key(&record)) {
                items.push(record);
            }
        }
    }

    let root = morphological_root(&target.name);
    for candidate_name in index.all_names() {
        if morphological_root(candidate_name) != root {
            continue;
        }
        for record in index.symbols_named(candidate_name) {
            if seen.insert(symbol_key(record)) {
                items.push(record.clone());
            }
        }
    }

    for site in callers_of(index, &target, true) {
        let Some(caller_sym) = enclosing_symbol_of(index, &site) else { continue };
        for (_, sibling) in callees_of(index, &caller_sym, true) {
            if seen.insert(symbol_key(&sibling)) {
                items.push(sibling);
            }
        }
    }

    for (_, callee) in callees_of(index, &target, true) {
        for site in callers_of(index, &callee, true) {
            let Some(caller_sym) = enclosing_symbol_of(index, &site) else { continue };
            if seen.insert(symbol_key(&caller_sym)) {
                items.push(caller_sym);
            }
        }
    }

    RelatedResult { items, suggestions: Vec::new() }
}

// ---------------------------------------------------------------------
// tests
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct TestsResult {
    pub items: Vec<SymbolRecord>,
    pub suggestions: Vec<Box<str>>,
}

/// §4.9 `tests`: symbols defined in test files whose code references
/// `name`; with `callsOnly`, restricted to entries that actually call it.
pub fn tests(index: &SymbolIndex, name: &str, opts: &TestsOptions) -> TestsResult {
    let registry = LanguageRegistry::new();
    let mut seen = HashSet::new();
    let mut items = Vec::new();

    for file in index.files_sorted() {
        if !file.is_test_file {
            continue;
        }
        if opts.calls_only {
            for call in &file.calls {
                if call.callee_name.as_ref() != name {
                    continue;
                }
                let Some(enclosing) = call.enclosing_function.as_ref() else { continue };
                if let Some(sym) =
                    file.symbol_records().into_iter().find(|s| s.name.as_ref() == enclosing.name.as_ref() && s.span.start_line == enclosing.start_line)
                {
                    if seen.insert(symbol_key(&sym)) {
                        items.push(sym);
                    }
                }
            }
        } else {
            let Ok(source) = std::fs::read_to_string(&file.abs_path) else { continue };
            let Ok(mut extractor) = registry.extractor_for(file.language) else { continue };
            let usages = extractor.find_usages_in_code(&source, name);
            if usages.is_empty() {
                continue;
            }
            for record in file.symbol_records() {
                if usages.iter().any(|u| record.span.contains_line(u.line)) && seen.insert(symbol_key(&record)) {
                    items.push(record);
                }
            }
        }
    }

    if items.is_empty() {
        return TestsResult { items, suggestions: not_found(index, name).suggestions };
    }
    TestsResult { items, suggestions: Vec::new() }
}

// ---------------------------------------------------------------------
// deadcode
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct DeadcodeResult {
    pub items: Vec<SymbolRecord>,
}

/// Framework-registering decorator/attribute/annotation spellings (§6):
/// symbols bearing one of these are excluded from `deadcode` by default
/// even with zero in-project callers.
const PYTHON_FRAMEWORK_PREFIXES: &[&str] =
    &["route", "app.", "blueprint.", "task", "celery.", "click", "fixture", "api", "register"];
const RUST_FRAMEWORK_ATTRS: &[&str] = &["test", "tokio::main", "bench", "cfg(test)"];
const JAVA_FRAMEWORK_ANNOTATIONS: &[&str] =
    &["Test", "Override", "PostConstruct", "PreDestroy", "GetMapping", "PostMapping", "RequestMapping"];

fn is_framework_decorated(decorators: &[Box<str>]) -> bool {
    decorators.iter().any(|d| {
        let d = d.as_ref();
        PYTHON_FRAMEWORK_PREFIXES.iter().any(|p| d.starts_with(p))
            || RUST_FRAMEWORK_ATTRS.iter().any(|a| d.contains(a))
            || JAVA_FRAMEWORK_ANNOTATIONS.iter().any(|a| d == *a)
    })
}

/// §4.9 `deadcode`: every function/class/type with no resolved in-project
/// caller, excluding (by default) exported symbols, framework-decorated
/// symbols, and symbols in test files.
pub fn deadcode(index: &SymbolIndex, opts: &DeadcodeOptions) -> DeadcodeResult {
    let mut items = Vec::new();
    for file in index.files_sorted() {
        if file.is_test_file && !opts.include_tests {
            continue;
        }
        if !passes_filters(&file.rel_path, None, &opts.exclude, opts.in_.as_deref()) {
            continue;
        }
        for record in file.symbol_records() {
            if matches!(record.kind, SymbolKind::StateConstant) {
                continue;
            }
            if record.exported && !opts.include_exported {
                continue;
            }
            if !opts.include_decorated && is_framework_decorated(&record.decorators) {
                continue;
            }
            if has_no_callers(index, &record, false) {
                items.push(record);
            }
        }
    }
    DeadcodeResult { items }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::index::build_project;
    use std::fs;
    use std::sync::Arc;

    #[test]
    fn context_reports_callers_and_callees() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.rs"),
            "fn helper() {}\nfn main() { helper(); }\n",
        )
        .unwrap();
        let index = build_project(dir.path(), Arc::new(Settings::default())).unwrap();
        let result = context(&index, "helper", &ContextOptions::default());
        assert!(result.symbol.is_some());
        assert_eq!(result.callers.len(), 1);
        assert!(!result.expandable.is_empty());
    }

    #[test]
    fn impact_groups_sites_by_caller_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.rs"),
            "fn greet() {}\nfn one() { greet(); }\nfn two() { greet(); }\n",
        )
        .unwrap();
        let index = build_project(dir.path(), Arc::new(Settings::default())).unwrap();
        let result = impact(&index, "greet", &ImpactOptions::default());
        assert_eq!(result.sites_by_file.get(&PathBuf::from("a.rs")).map(Vec::len), Some(2));
    }

    #[test]
    fn deadcode_finds_uncalled_private_function() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.rs"), "fn unused() {}\nfn used() {}\nfn main() { used(); }\n").unwrap();
        let index = build_project(dir.path(), Arc::new(Settings::default())).unwrap();
        let result = deadcode(&index, &DeadcodeOptions::default());
        assert!(result.items.iter().any(|s| s.name.as_ref() == "unused"));
        assert!(!result.items.iter().any(|s| s.name.as_ref() == "used"));
    }

    #[test]
    fn related_includes_same_file_symbols() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.rs"), "fn one() {}\nfn two() {}\n").unwrap();
        let index = build_project(dir.path(), Arc::new(Settings::default())).unwrap();
        let result = related(&index, "one", &RelatedOptions::default());
        assert!(result.items.iter().any(|s| s.name.as_ref() == "two"));
    }
}
