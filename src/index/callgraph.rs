//! The call graph (§4.6 step 6: "built incrementally on demand (lazy)").
//! Unlike the import and inheritance graphs there is no persistent
//! adjacency structure — every query re-resolves the `Call`s it needs
//! against the name index, so there is nothing to invalidate when files
//! change beyond the file-level replacement §4.6 already performs.

use std::path::PathBuf;

use serde::Serialize;

use crate::types::{Call, SymbolRecord};

use super::{resolve_call, FileRecord, SymbolIndex};

/// One resolved call site: the caller's enclosing symbol (if any) plus
/// the raw [`Call`] and the file it occurred in.
#[derive(Debug, Clone, Serialize)]
pub struct CallSite {
    pub caller_file: PathBuf,
    pub call: Call,
    /// `true` when the callee's receiver type could not be statically
    /// bound (§4.6 method resolution rule 5); excluded from
    /// caller/callee lists unless the query opted in.
    pub uncertain: bool,
}

/// Every call site anywhere in the project whose resolved target matches
/// `symbol` (§4.9 `context`/`impact`: "every Call whose callee resolves
/// to this symbol").
pub fn callers_of(index: &SymbolIndex, symbol: &SymbolRecord, include_uncertain: bool) -> Vec<CallSite> {
    let mut out = Vec::new();
    for file in index.files_sorted() {
        for call in &file.calls {
            let Some(resolution) = resolve_call(index, file, call) else {
                continue;
            };
            if !include_uncertain && resolution.uncertain {
                continue;
            }
            if is_same_symbol(&resolution.symbol, symbol) {
                out.push(CallSite {
                    caller_file: file.rel_path.clone(),
                    call: call.clone(),
                    uncertain: resolution.uncertain,
                });
            }
        }
    }
    out
}

/// Every call site lexically inside `symbol`'s own body, each resolved
/// once to its target (§4.9 `context`: "immediate callees").
pub fn callees_of(index: &SymbolIndex, symbol: &SymbolRecord, include_uncertain: bool) -> Vec<(CallSite, SymbolRecord)> {
    let Some(file) = index.file(symbol.file_id) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for call in calls_within(file, symbol) {
        let Some(resolution) = resolve_call(index, file, call) else {
            continue;
        };
        if !include_uncertain && resolution.uncertain {
            continue;
        }
        out.push((
            CallSite {
                caller_file: file.rel_path.clone(),
                call: call.clone(),
                uncertain: resolution.uncertain,
            },
            resolution.symbol,
        ));
    }
    out
}

/// Calls whose source line falls within `symbol`'s span, in source order
/// (§5 "Call lists are in source order").
fn calls_within<'a>(file: &'a FileRecord, symbol: &SymbolRecord) -> impl Iterator<Item = &'a Call> {
    let span = symbol.span;
    file.calls.iter().filter(move |c| span.contains_line(c.line))
}

fn is_same_symbol(a: &SymbolRecord, b: &SymbolRecord) -> bool {
    a.name == b.name && a.file == b.file && a.span.start_line == b.span.start_line
}

/// DFS callee tree rooted at `symbol`, up to `depth` hops (§4.9 `trace`).
/// Revisiting a (name, file) pair already on the current path collapses
/// the edge and marks it `circular` instead of recursing forever.
#[derive(Debug, Clone, Serialize)]
pub struct TraceNode {
    pub symbol: SymbolRecord,
    pub children: Vec<TraceNode>,
    pub circular: bool,
}

pub fn trace(index: &SymbolIndex, root: &SymbolRecord, depth: usize, include_uncertain: bool) -> TraceNode {
    let mut visiting = vec![(root.name.clone(), root.file.clone())];
    trace_inner(index, root, depth, include_uncertain, &mut visiting)
}

fn trace_inner(
    index: &SymbolIndex,
    symbol: &SymbolRecord,
    depth: usize,
    include_uncertain: bool,
    visiting: &mut Vec<(Box<str>, PathBuf)>,
) -> TraceNode {
    if depth == 0 {
        return TraceNode { symbol: symbol.clone(), children: Vec::new(), circular: false };
    }
    let mut children = Vec::new();
    for (_, callee) in callees_of(index, symbol, include_uncertain) {
        let key = (callee.name.clone(), callee.file.clone());
        if visiting.contains(&key) {
            children.push(TraceNode { symbol: callee, children: Vec::new(), circular: true });
            continue;
        }
        visiting.push(key);
        children.push(trace_inner(index, &callee, depth - 1, include_uncertain, visiting));
        visiting.pop();
    }
    TraceNode { symbol: symbol.clone(), children, circular: false }
}

/// Symbols with no resolved in-project caller anywhere (§4.9 `deadcode`).
pub fn has_no_callers(index: &SymbolIndex, symbol: &SymbolRecord, include_uncertain: bool) -> bool {
    for file in index.files() {
        for call in &file.calls {
            let Some(resolution) = resolve_call(index, file, call) else {
                continue;
            };
            if !include_uncertain && resolution.uncertain {
                continue;
            }
            if is_same_symbol(&resolution.symbol, symbol) {
                return false;
            }
        }
    }
    true
}

/// Low-signal "utility" classification, advisory only. A callee is
/// `Utility` when it's short and widely called, or a short
/// predicate/accessor by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CalleeWeight {
    Utility,
    Normal,
}

const PREDICATE_PREFIXES: &[&str] = &["is", "has", "get", "to"];

pub fn classify_weight(index: &SymbolIndex, symbol: &SymbolRecord) -> CalleeWeight {
    let span = symbol.span.line_span();
    let caller_count = callers_of(index, symbol, true).len();
    if span <= 8 && caller_count >= 3 {
        return CalleeWeight::Utility;
    }
    let name = symbol.name.to_lowercase();
    if span <= 12 && PREDICATE_PREFIXES.iter().any(|p| name.starts_with(p)) {
        return CalleeWeight::Utility;
    }
    CalleeWeight::Normal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::build_project;
    use crate::config::Settings;
    use std::fs;
    use std::sync::Arc;

    #[test]
    fn callers_and_callees_follow_the_chain() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("main.rs"),
            "fn main() { helper(); }\nfn helper() { util(); }\nfn util() {}\n",
        )
        .unwrap();
        let index = build_project(dir.path(), Arc::new(Settings::default())).unwrap();
        let helper = resolve_by_name_for_test(&index, "helper");
        let callers = callers_of(&index, &helper, false);
        assert_eq!(callers.len(), 1);
        let util = resolve_by_name_for_test(&index, "util");
        let callees = callees_of(&index, &helper, false);
        assert_eq!(callees.len(), 1);
        assert_eq!(callees[0].1.name, util.name);
    }

    #[test]
    fn trace_depth_limits_and_detects_cycles() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("m.rs"), "fn a() { b(); }\nfn b() { a(); }\n").unwrap();
        let index = build_project(dir.path(), Arc::new(Settings::default())).unwrap();
        let a = resolve_by_name_for_test(&index, "a");
        let node = trace(&index, &a, 3, false);
        assert_eq!(node.children.len(), 1);
        assert_eq!(node.children[0].symbol.name.as_ref(), "b");
        assert!(node.children[0].children[0].circular);
    }

    fn resolve_by_name_for_test(index: &SymbolIndex, name: &str) -> SymbolRecord {
        super::super::best_match(index.symbols_named(name)).unwrap().clone()
    }
}
