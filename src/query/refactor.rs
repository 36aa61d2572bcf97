//! The refactor-support queries (§4.9): `verify`, `plan`, `diffImpact`.
//! All three reuse [`callers_of`] rather than re-walking `Call` lists, and
//! none of them mutate source — each returns a description of what a
//! caller would need to do, not a patch.

use std::path::PathBuf;

use serde::Serialize;

use crate::index::{callers_of, SymbolIndex};
use crate::types::{Parameter, SymbolRecord};

use super::options::{DiffImpactOptions, PlanChange, PlanOptions, VerifyOptions};
use super::{not_found, resolve_target, CallerView};

fn caller_view(site: &crate::index::CallSite) -> CallerView {
    CallerView {
        enclosing: site.call.enclosing_function.as_ref().map(|e| e.name.clone()),
        file: site.caller_file.clone(),
        line: site.call.line,
        is_method: site.call.is_method,
        uncertain: site.uncertain,
    }
}

/// The declared parameter list of the [`Function`](crate::types::Function)
/// a [`SymbolRecord`] names, found by (name, span) match against its file.
fn function_params(index: &SymbolIndex, symbol: &SymbolRecord) -> Option<Vec<Parameter>> {
    let file = index.file(symbol.file_id)?;
    file.functions
        .iter()
        .chain(file.types.iter().flat_map(|t| t.members.iter()))
        .find(|f| f.name.as_ref() == symbol.name.as_ref() && f.span == symbol.span)
        .map(|f| f.params.clone())
}

/// Parameters a caller is actually expected to supply: an implicit
/// receiver parameter (`self`/`this`/`cls`) is bound by the call syntax
/// itself, not passed as an argument.
fn expected_arg_count(params: &[Parameter]) -> usize {
    params.iter().filter(|p| !matches!(p.name.as_ref(), "self" | "this" | "cls")).count()
}

// ---------------------------------------------------------------------
// verify
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct VerifySite {
    pub caller_file: PathBuf,
    pub line: u32,
    pub enclosing: Option<Box<str>>,
    pub arguments_text: Box<str>,
    pub expected_params: usize,
    pub provided_args: usize,
    pub mismatched: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyResult {
    pub symbol: Option<SymbolRecord>,
    pub sites: Vec<VerifySite>,
    pub suggestions: Vec<Box<str>>,
}

/// §4.9 `verify`: every call site of a symbol, flagged where the provided
/// argument count disagrees with its declared parameter count. A call
/// carrying a spread/rest argument is never flagged, since its true
/// argument count can't be known statically.
pub fn verify(index: &SymbolIndex, name: &str, opts: &VerifyOptions) -> VerifyResult {
    let Some(target) = resolve_target(index, name, opts.file.as_deref()) else {
        return VerifyResult { symbol: None, sites: Vec::new(), suggestions: not_found(index, name).suggestions };
    };
    let expected = function_params(index, &target).map(|p| expected_arg_count(&p));

    let mut sites = Vec::new();
    for site in callers_of(index, &target, true) {
        let provided = (site.call.positional_args + site.call.named_args) as usize;
        let mismatched = !site.call.has_spread_arg && expected.is_some_and(|n| n != provided);
        sites.push(VerifySite {
            caller_file: site.caller_file.clone(),
            line: site.call.line,
            enclosing: site.call.enclosing_function.as_ref().map(|e| e.name.clone()),
            arguments_text: site.call.arguments_text.clone(),
            expected_params: expected.unwrap_or(0),
            provided_args: provided,
            mismatched,
        });
    }
    VerifyResult { symbol: Some(target), sites, suggestions: Vec::new() }
}

// ---------------------------------------------------------------------
// plan
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct PlanSite {
    pub caller_file: PathBuf,
    pub line: u32,
    pub enclosing: Option<Box<str>>,
    pub instruction: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanResult {
    pub symbol: Option<SymbolRecord>,
    pub sites: Vec<PlanSite>,
    pub suggestions: Vec<Box<str>>,
}

fn plan_instruction(change: &PlanChange, site: &crate::index::CallSite) -> String {
    let at = format!("{}:{}", site.caller_file.display(), site.call.line);
    match change {
        PlanChange::AddParam { name, default_value: Some(v), .. } => {
            format!("add argument `{name}` (defaults to `{v}`, so existing call sites keep compiling) at {at}")
        }
        PlanChange::AddParam { name, default_value: None, .. } => {
            format!("add required argument `{name}` at {at}")
        }
        PlanChange::RemoveParam { name } => format!("remove argument `{name}` from the call at {at}"),
        PlanChange::RenameTo { name } => format!("rename this call to `{name}` at {at}"),
    }
}

/// §4.9 `plan`: a dry-run of a proposed signature change — every existing
/// call site, paired with the textual instruction needed to keep it
/// correct under the change. Never edits anything.
pub fn plan(index: &SymbolIndex, name: &str, opts: &PlanOptions) -> PlanResult {
    let Some(target) = resolve_target(index, name, opts.file.as_deref()) else {
        return PlanResult { symbol: None, sites: Vec::new(), suggestions: not_found(index, name).suggestions };
    };
    let sites = callers_of(index, &target, true)
        .iter()
        .map(|site| PlanSite {
            caller_file: site.caller_file.clone(),
            line: site.call.line,
            enclosing: site.call.enclosing_function.as_ref().map(|e| e.name.clone()),
            instruction: plan_instruction(&opts.change, site),
        })
        .collect();
    PlanResult { symbol: Some(target), sites, suggestions: Vec::new() }
}

// ---------------------------------------------------------------------
// diffImpact
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct DiffImpactEntry {
    pub file: PathBuf,
    pub symbol: SymbolRecord,
    pub callers: Vec<CallerView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiffImpactResult {
    pub base: Option<String>,
    pub staged: Option<String>,
    pub entries: Vec<DiffImpactEntry>,
}

fn ranges_overlap(a_start: u32, a_end: u32, b_start: u32, b_end: u32) -> bool {
    a_start <= b_end && b_start <= a_end
}

/// §4.9 `diffImpact`: given a set of changed line ranges per file (as a
/// VCS collaborator would report them), every symbol whose span overlaps
/// a changed range, paired with its current callers — the blast radius of
/// an uncommitted edit.
pub fn diff_impact(index: &SymbolIndex, opts: &DiffImpactOptions) -> DiffImpactResult {
    let mut entries = Vec::new();
    for change in &opts.changes {
        let Some(file) = index.file_by_rel_path(&change.file).or_else(|| index.file_by_abs_path(&change.file)) else {
            continue;
        };
        for record in file.symbol_records() {
            let touched = change
                .ranges
                .iter()
                .any(|r| ranges_overlap(record.span.start_line, record.span.end_line, r.start, r.end));
            if !touched {
                continue;
            }
            let callers = callers_of(index, &record, true).iter().map(caller_view).collect();
            entries.push(DiffImpactEntry { file: file.rel_path.clone(), symbol: record, callers });
        }
    }
    DiffImpactResult { base: opts.base.clone(), staged: opts.staged.clone(), entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::index::build_project;
    use crate::query::options::{FileChange, LineRange};
    use std::fs;
    use std::sync::Arc;

    #[test]
    fn verify_flags_mismatched_argument_count() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.rs"),
            "fn greet(name: &str) {}\nfn main() { greet(\"a\", \"b\"); }\n",
        )
        .unwrap();
        let index = build_project(dir.path(), Arc::new(Settings::default())).unwrap();
        let result = verify(&index, "greet", &VerifyOptions::default());
        assert_eq!(result.sites.len(), 1);
        assert!(result.sites[0].mismatched);
    }

    #[test]
    fn plan_describes_every_call_site() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.rs"), "fn greet() {}\nfn main() { greet(); greet(); }\n").unwrap();
        let index = build_project(dir.path(), Arc::new(Settings::default())).unwrap();
        let opts = PlanOptions {
            change: PlanChange::RenameTo { name: "hello".to_string() },
            file: None,
        };
        let result = plan(&index, "greet", &opts);
        assert_eq!(result.sites.len(), 2);
        assert!(result.sites[0].instruction.contains("hello"));
    }

    #[test]
    fn diff_impact_finds_symbols_touching_changed_ranges() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.rs"), "fn one() {}\nfn two() {}\nfn three() { two(); }\n").unwrap();
        let index = build_project(dir.path(), Arc::new(Settings::default())).unwrap();
        let opts = DiffImpactOptions {
            base: None,
            staged: None,
            changes: vec![FileChange { file: PathBuf::from("a.rs"), ranges: vec![LineRange { start: 2, end: 2 }] }],
        };
        let result = diff_impact(&index, &opts);
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].symbol.name.as_ref(), "two");
        assert_eq!(result.entries[0].callers.len(), 1);
    }
}
