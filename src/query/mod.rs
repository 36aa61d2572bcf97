//! Query Engine (§4.9): the read-only queries layered on a finished
//! [`SymbolIndex`]. Every query takes `&SymbolIndex` plus a typed options
//! struct (§9 redesign note: "a typed options structure per query
//! carrying only the parameters that query accepts") and returns a plain,
//! serializable result — never an `Err`; resolution/parse/I-O failures
//! are reported data, per §7's error taxonomy.

mod basic;
mod flow;
mod options;
mod refactor;
mod results;
mod runner;
mod stacktrace;

pub use basic::{
    api, exporters, file_exports, find, graph, imports, stats, typedef, usages, ApiResult, ExportersResult,
    FileExportsResult, FileGraphResult, FindResult, ImportsResult, StatsResult, TypedefResult, UsageOccurrence,
    UsagesResult,
};
pub use flow::{
    about, context, deadcode, impact, related, smart, tests as tests_query, trace, AboutResult, ContextResult,
    DeadcodeResult, ImpactResult, ImpactSite, RelatedResult, SmartCallee, SmartResult, SmartTypeRef, TestsResult,
    TraceResult,
};
pub use options::{
    AboutOptions, ApiOptions, ContextOptions, DeadcodeOptions, DiffImpactOptions, FileChange, FindOptions,
    GraphDirectionArg, GraphOptions, ImpactOptions, LineRange, PlanChange, PlanOptions, RelatedOptions,
    SmartOptions, TestsOptions, TraceOptions, TypedefOptions, UsagesOptions, VerifyOptions,
};
pub use refactor::{diff_impact, plan, verify, DiffImpactResult, PlanResult, VerifyResult, VerifySite};
pub use results::{CalleeView, CallerView, NotFound};
pub use runner::{execute, Query, QueryOutput};
pub use stacktrace::{stacktrace, StackFrame, StacktraceResult};

use std::path::Path;

use crate::index::{best_match, disambiguation_score, SymbolIndex};
use crate::types::SymbolRecord;

/// Glob-match when `pattern` contains glob metacharacters, substring-match
/// otherwise — forgiving enough for both `src/**/*.rs` and a bare `utils`
/// fragment.
pub(crate) fn path_matches(pattern: &str, path: &Path) -> bool {
    let path_str = path.to_string_lossy();
    if !pattern.contains(['*', '?', '[']) {
        return path_str.contains(pattern);
    }
    glob::Pattern::new(pattern)
        .map(|p| p.matches(&path_str))
        .unwrap_or(false)
}

pub(crate) fn passes_filters(path: &Path, file: Option<&str>, exclude: &[String], in_dir: Option<&str>) -> bool {
    if let Some(f) = file {
        if !path_matches(f, path) {
            return false;
        }
    }
    if let Some(d) = in_dir {
        if !path_matches(d, path) {
            return false;
        }
    }
    !exclude.iter().any(|p| path_matches(p, path))
}

/// A "did-you-mean" list for a name that didn't resolve (§7 "resolution
/// failure"): every known name containing the query as a substring.
pub(crate) fn not_found(index: &SymbolIndex, name: &str) -> NotFound {
    let mut suggestions: Vec<Box<str>> = index.names_containing(name).into_iter().map(Box::from).collect();
    suggestions.sort();
    suggestions.dedup();
    suggestions.truncate(10);
    NotFound { query: name.into(), suggestions }
}

/// Resolve `name` (optionally narrowed by a `file` glob) to its single
/// best [`SymbolRecord`] via the disambiguator (§4.6).
pub(crate) fn resolve_target(index: &SymbolIndex, name: &str, file: Option<&str>) -> Option<SymbolRecord> {
    let candidates: Vec<SymbolRecord> = index
        .symbols_named(name)
        .iter()
        .filter(|s| file.map(|f| path_matches(f, &s.file)).unwrap_or(true))
        .cloned()
        .collect();
    best_match(&candidates).cloned()
}

/// How many in-project call sites resolve to `symbol` (used to order
/// `find` results by "total usage count desc", §4.9).
pub(crate) fn popularity(index: &SymbolIndex, symbol: &SymbolRecord) -> usize {
    crate::index::callers_of(index, symbol, true).len()
}

pub(crate) fn sort_by_popularity(index: &SymbolIndex, symbols: &mut [SymbolRecord]) {
    symbols.sort_by(|a, b| {
        popularity(index, b)
            .cmp(&popularity(index, a))
            .then_with(|| disambiguation_score(b).cmp(&disambiguation_score(a)))
    });
}

/// Read `start..=end` (1-based, inclusive) lines of `path` verbatim, for
/// queries that produce source snippets (§5 "the file is re-read on
/// demand"). Returns `None` when the file can't be read at query time
/// (§7 "I/O failure") — callers degrade rather than propagate.
pub(crate) fn read_lines(path: &Path, start: u32, end: u32) -> Option<String> {
    let source = std::fs::read_to_string(path).ok()?;
    let start = start.max(1) as usize;
    let end = end as usize;
    let snippet: Vec<&str> = source
        .lines()
        .enumerate()
        .filter(|(idx, _)| {
            let line_no = idx + 1;
            line_no >= start && line_no <= end
        })
        .map(|(_, l)| l)
        .collect();
    Some(snippet.join("\n"))
}
