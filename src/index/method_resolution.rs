//! Symbol disambiguation and method/call resolution (§4.6 "Symbol
//! disambiguation", "Method resolution"): walk local bindings first, then
//! fall back through the type's inheritance chain, and never throw on a
//! receiver that can't be bound.

use std::path::Path;

use regex::Regex;

use crate::types::{Call, EnclosingFunction, SymbolKind, SymbolRecord};

use super::{FileRecord, SymbolIndex};

const TEST_PATH_PENALTY: i64 = -500;
const VENDOR_PATH_PENALTY: i64 = -300;
const SRC_PATH_BONUS: i64 = 200;
const TYPE_KIND_BONUS: i64 = 1000;
const MAX_SPAN_BONUS: u32 = 100;

/// §4.6 "Symbol disambiguation" scoring. Deterministic and stable: two
/// calls with the same candidate list must return the same winner.
pub fn disambiguation_score(record: &SymbolRecord) -> i64 {
    let mut score: i64 = 0;
    if matches!(record.kind, SymbolKind::Type(_)) {
        score += TYPE_KIND_BONUS;
    }
    let path = record.file.to_string_lossy().to_lowercase();
    if record.is_test_file
        || path.contains("/test/")
        || path.contains("/tests/")
    {
        score += TEST_PATH_PENALTY;
    } else if ["examples/", "docs/", "vendor/", "third_party/", "third-party/", "benchmarks/", "samples/"]
        .iter()
        .any(|p| path.contains(p))
    {
        score += VENDOR_PATH_PENALTY;
    } else if ["lib/", "src/", "core/", "internal/", "pkg/", "crates/"]
        .iter()
        .any(|p| path.contains(p))
    {
        score += SRC_PATH_BONUS;
    }
    score += record.span.line_span().min(MAX_SPAN_BONUS) as i64;
    score
}

/// The single best candidate by [`disambiguation_score`], ties broken by
/// the candidates' existing (stable) order.
pub fn best_match<'a>(candidates: &'a [SymbolRecord]) -> Option<&'a SymbolRecord> {
    candidates
        .iter()
        .enumerate()
        .max_by_key(|(idx, record)| (disambiguation_score(record), std::cmp::Reverse(*idx)))
        .map(|(_, record)| record)
}

/// Resolve a free (non-method) call or a constructor call purely by name,
/// applying the disambiguator across every file that defines the name.
pub fn resolve_by_name<'a>(index: &'a SymbolIndex, name: &str) -> Option<&'a SymbolRecord> {
    best_match(index.symbols_named(name))
}

#[derive(Debug, Clone)]
pub struct CallResolution {
    pub symbol: SymbolRecord,
    /// Mirrors `Call.uncertain`, or set when the receiver's type could not
    /// be statically bound (§4.6 method resolution rule 5).
    pub uncertain: bool,
}

/// Resolve a single [`Call`] to the [`SymbolRecord`] it invokes, applying
/// §4.6's five-rule receiver-binding order for method calls and plain
/// name lookup for everything else. Returns `None` only when no symbol of
/// that name exists anywhere in the index.
pub fn resolve_call(index: &SymbolIndex, caller_file: &FileRecord, call: &Call) -> Option<CallResolution> {
    // §4.4 item 7: an unconfirmed potential callback is excluded from call
    // graph computation entirely, not merely marked uncertain.
    if call.is_potential_callback {
        return None;
    }
    if !call.is_method {
        let symbol = resolve_by_name(index, &call.callee_name)?;
        return Some(CallResolution { symbol: symbol.clone(), uncertain: call.uncertain });
    }

    match receiver_type(index, caller_file, call) {
        Some(type_name) => match resolve_member(index, &type_name, &call.callee_name) {
            Some(symbol) => Some(CallResolution { symbol, uncertain: call.uncertain }),
            None => {
                // Type known but doesn't define (or inherit) this method:
                // fall back to plain name resolution rather than dropping
                // the call outright.
                let symbol = resolve_by_name(index, &call.callee_name)?;
                Some(CallResolution { symbol: symbol.clone(), uncertain: true })
            }
        },
        None => {
            let symbol = resolve_by_name(index, &call.callee_name)?;
            Some(CallResolution { symbol: symbol.clone(), uncertain: true })
        }
    }
}

/// Find the statically-known type of a method call's receiver, per the
/// binding sources enumerated in §4.6, rules 1-4. `None` means rule 5
/// applies (uncertain).
fn receiver_type(index: &SymbolIndex, caller_file: &FileRecord, call: &Call) -> Option<Box<str>> {
    let receiver = call.receiver.as_deref()?;
    let enclosing = call.enclosing_function.as_ref();

    match receiver {
        "super" => {
            let enclosing = enclosing?;
            let owner = caller_file.type_owning_function(enclosing)?;
            let parent = owner.extends.clone().or_else(|| owner.implements.first().cloned())?;
            Some(parent)
        }
        "self" | "this" | "cls" => {
            let enclosing = enclosing?;
            let owner = caller_file.type_owning_function(enclosing)?;
            Some(owner.name.clone())
        }
        _ => {
            if let Some(attr) = call.self_attribute.as_deref() {
                let enclosing = enclosing?;
                let owner = caller_file.type_owning_function(enclosing)?;
                let attr_type = caller_file
                    .instance_attribute_types
                    .get(owner.name.as_ref())
                    .and_then(|m| m.get(attr))?;
                return Some(attr_type.clone());
            }
            // Rule 4: a local binding `x = Foo(...)` inside the enclosing
            // function. Source is re-read on demand (§5 memory discipline)
            // since the index never retains it.
            let enclosing = enclosing?;
            local_constructor_binding(&caller_file.abs_path, enclosing, receiver)
        }
    }
}

/// Resolve `type_name.method_name`, walking the inheritance chain when the
/// type itself doesn't define the method directly (§4.6 rules 1-2 "walk
/// T's parent chain").
fn resolve_member(index: &SymbolIndex, type_name: &str, method_name: &str) -> Option<SymbolRecord> {
    if let Some(symbol) = member_of(index, type_name, method_name) {
        return Some(symbol);
    }
    for ancestor in index.inheritance_graph().ancestor_chain(type_name) {
        if let Some(symbol) = member_of(index, &ancestor, method_name) {
            return Some(symbol);
        }
    }
    None
}

fn member_of(index: &SymbolIndex, type_name: &str, method_name: &str) -> Option<SymbolRecord> {
    let type_candidates: Vec<SymbolRecord> = index
        .symbols_named(type_name)
        .iter()
        .filter(|s| matches!(s.kind, SymbolKind::Type(_)))
        .cloned()
        .collect();
    let best = best_match(&type_candidates)?;
    let file = index.file(best.file_id)?;
    let type_decl = file.type_named(type_name)?;
    let member = type_decl.members.iter().find(|m| m.name.as_ref() == method_name)?;
    Some(file.symbol_record_for_function(member, SymbolKind::Method))
}

/// Best-effort regex scan for `receiver = Constructor(...)` within the
/// enclosing function's line span — a lexical, not a typed, binding.
fn local_constructor_binding(path: &Path, enclosing: &EnclosingFunction, receiver: &str) -> Option<Box<str>> {
    let source = std::fs::read_to_string(path).ok()?;
    // `(?:new\s+)?` so `const x = new Foo()` (JS/TS/Java) resolves the
    // same way as `x = Foo()` (Python) or `let x = Foo::new()` callers
    // that already strip to the last `::`/`.` segment below.
    let pattern = format!(r"\b{}\s*=\s*(?:new\s+)?([A-Za-z_][A-Za-z0-9_:.]*)\s*\(", regex::escape(receiver));
    let re = Regex::new(&pattern).ok()?;
    for (idx, line) in source.lines().enumerate() {
        let line_no = idx as u32 + 1;
        if line_no < enclosing.start_line || line_no > enclosing.end_line {
            continue;
        }
        if let Some(caps) = re.captures(line) {
            let ctor = caps.get(1)?.as_str();
            let last_segment = ctor.rsplit(|c| c == ':' || c == '.').next().unwrap_or(ctor);
            return Some(last_segment.into());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FileId, Span, SymbolKind, TypeKind, UsageCounts};
    use std::path::PathBuf;

    fn record(name: &str, file: &str, kind: SymbolKind, span_len: u32) -> SymbolRecord {
        SymbolRecord {
            name: name.into(),
            file: PathBuf::from(file),
            file_id: FileId::new(1).unwrap(),
            kind,
            span: Span::new(1, 0, 1 + span_len, 0),
            usage_counts: UsageCounts::default(),
            exported: false,
            is_test_file: file.contains("test"),
            decorators: Vec::new(),
        }
    }

    #[test]
    fn type_kind_outscores_function_with_same_name() {
        let func = record("Widget", "src/widget.rs", SymbolKind::Function, 5);
        let ty = record("Widget", "src/widget.rs", SymbolKind::Type(TypeKind::Struct), 5);
        let candidates = vec![func, ty.clone()];
        assert_eq!(best_match(&candidates).unwrap().kind, ty.kind);
    }

    #[test]
    fn test_file_is_penalized_below_src_file() {
        let in_src = record("helper", "src/lib.rs", SymbolKind::Function, 5);
        let in_test = record("helper", "tests/lib_test.rs", SymbolKind::Function, 5);
        let candidates = vec![in_test, in_src.clone()];
        assert_eq!(best_match(&candidates).unwrap().file, in_src.file);
    }

    #[test]
    fn disambiguator_is_stable_across_calls() {
        let a = record("x", "src/a.rs", SymbolKind::Function, 10);
        let b = record("x", "src/b.rs", SymbolKind::Function, 10);
        let candidates = vec![a, b];
        let first = best_match(&candidates).unwrap().file.clone();
        let second = best_match(&candidates).unwrap().file.clone();
        assert_eq!(first, second);
    }
}
