//! The typed query dispatcher (§9 redesign note: "replace the ad-hoc
//! `query_type: &str` + free-form JSON arguments with an explicit enum of
//! query kinds, dispatched exhaustively"). [`Query`] is the wire shape a
//! caller (the CLI, an embedder) sends in; [`execute`] matches on it
//! exhaustively and hands back the matching result wrapped in
//! [`QueryOutput`] — a compiler error the day a new query variant is
//! added without a matching arm, rather than a runtime `UnknownArgument`.

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, Result};
use crate::index::SymbolIndex;

use super::options::{
    AboutOptions, ApiOptions, ContextOptions, DeadcodeOptions, DiffImpactOptions, FindOptions, GraphOptions,
    ImpactOptions, PlanOptions, RelatedOptions, SmartOptions, TestsOptions, TraceOptions, TypedefOptions,
    UsagesOptions, VerifyOptions,
};
use super::{
    about, api, context, deadcode, diff_impact, exporters, file_exports, find, graph, imports, impact, plan,
    related, smart, stacktrace, stats, tests_query, trace, typedef, usages, verify, AboutResult, ApiResult,
    ContextResult, DeadcodeResult, DiffImpactResult, ExportersResult, FileExportsResult, FileGraphResult,
    FindResult, ImpactResult, ImportsResult, PlanResult, RelatedResult, SmartResult, StacktraceResult,
    StatsResult, TestsResult, TraceResult, TypedefResult, UsagesResult, VerifyResult,
};

/// Every supported query, tagged by name on the wire (§9: "a typed options
/// structure per query"). A query that needs no name (`stats`) or no
/// options (`imports`/`exporters`/`fileExports`/`stacktrace`) just omits
/// those fields.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "query", rename_all = "camelCase")]
pub enum Query {
    Find { name: String, #[serde(default)] options: FindOptions },
    Usages { name: String, #[serde(default)] options: UsagesOptions },
    Typedef { name: String, #[serde(default)] options: TypedefOptions },
    Api { #[serde(default)] options: ApiOptions },
    Imports { file: String },
    Exporters { file: String },
    FileExports { file: String },
    Graph { file: String, #[serde(default)] options: GraphOptions },
    Stats,
    Context { name: String, #[serde(default)] options: ContextOptions },
    Impact { name: String, #[serde(default)] options: ImpactOptions },
    Trace { name: String, #[serde(default)] options: TraceOptions },
    Smart { name: String, #[serde(default)] options: SmartOptions },
    About { name: String, #[serde(default)] options: AboutOptions },
    Related { name: String, #[serde(default)] options: RelatedOptions },
    Tests { name: String, #[serde(default)] options: TestsOptions },
    Deadcode { #[serde(default)] options: DeadcodeOptions },
    Verify { name: String, #[serde(default)] options: VerifyOptions },
    Plan { name: String, options: PlanOptions },
    DiffImpact { options: DiffImpactOptions },
    Stacktrace { text: String },
}

/// The result of [`execute`], one variant per [`Query`] arm. Serializes as
/// the bare inner result — the `query` tag lives only on the request side.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
#[allow(clippy::large_enum_variant)]
pub enum QueryOutput {
    Find(FindResult),
    Usages(UsagesResult),
    Typedef(TypedefResult),
    Api(ApiResult),
    Imports(ImportsResult),
    Exporters(ExportersResult),
    FileExports(FileExportsResult),
    Graph(FileGraphResult),
    Stats(StatsResult),
    Context(ContextResult),
    Impact(ImpactResult),
    Trace(TraceResult),
    Smart(SmartResult),
    About(AboutResult),
    Related(RelatedResult),
    Tests(TestsResult),
    Deadcode(DeadcodeResult),
    Verify(VerifyResult),
    Plan(PlanResult),
    DiffImpact(DiffImpactResult),
    Stacktrace(StacktraceResult),
}

/// Dispatch a [`Query`] against a finished index. The only `Err` this ever
/// returns is [`QueryError::InvalidOptions`] for a request whose shape is
/// self-contradictory (e.g. a `plan` with an empty rename); every
/// resolvable-but-empty case (unknown symbol, unknown file) is reported as
/// data inside the matching `QueryOutput`, per §7.
pub fn execute(index: &SymbolIndex, query: Query) -> Result<QueryOutput> {
    let output = match query {
        Query::Find { name, options } => QueryOutput::Find(find(index, &name, &options)),
        Query::Usages { name, options } => QueryOutput::Usages(usages(index, &name, &options)),
        Query::Typedef { name, options } => QueryOutput::Typedef(typedef(index, &name, &options)),
        Query::Api { options } => QueryOutput::Api(api(index, &options)),
        Query::Imports { file } => QueryOutput::Imports(imports(index, &file)),
        Query::Exporters { file } => QueryOutput::Exporters(exporters(index, &file)),
        Query::FileExports { file } => QueryOutput::FileExports(file_exports(index, &file)),
        Query::Graph { file, options } => QueryOutput::Graph(graph(index, &file, &options)),
        Query::Stats => QueryOutput::Stats(stats(index)),
        Query::Context { name, options } => QueryOutput::Context(context(index, &name, &options)),
        Query::Impact { name, options } => QueryOutput::Impact(impact(index, &name, &options)),
        Query::Trace { name, options } => QueryOutput::Trace(trace(index, &name, &options)),
        Query::Smart { name, options } => QueryOutput::Smart(smart(index, &name, &options)),
        Query::About { name, options } => QueryOutput::About(about(index, &name, &options)),
        Query::Related { name, options } => QueryOutput::Related(related(index, &name, &options)),
        Query::Tests { name, options } => QueryOutput::Tests(tests_query(index, &name, &options)),
        Query::Deadcode { options } => QueryOutput::Deadcode(deadcode(index, &options)),
        Query::Verify { name, options } => QueryOutput::Verify(verify(index, &name, &options)),
        Query::Plan { name, options } => {
            if matches!(&options.change, super::options::PlanChange::RenameTo { name } if name.trim().is_empty()) {
                return Err(QueryError::InvalidOptions("renameTo requires a non-empty name".into()).into());
            }
            QueryOutput::Plan(plan(index, &name, &options))
        }
        Query::DiffImpact { options } => QueryOutput::DiffImpact(diff_impact(index, &options)),
        Query::Stacktrace { text } => QueryOutput::Stacktrace(stacktrace(index, &text)),
    };
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::index::build_project;
    use std::fs;
    use std::sync::Arc;

    #[test]
    fn dispatches_find_by_tag() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.rs"), "fn greet() {}\n").unwrap();
        let index = build_project(dir.path(), Arc::new(Settings::default())).unwrap();
        let query = Query::Find { name: "greet".to_string(), options: FindOptions::default() };
        let output = execute(&index, query).unwrap();
        match output {
            QueryOutput::Find(result) => assert_eq!(result.items.len(), 1),
            other => panic!("unexpected output variant: {other:?}"),
        }
    }

    #[test]
    fn rejects_empty_rename() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.rs"), "fn greet() {}\n").unwrap();
        let index = build_project(dir.path(), Arc::new(Settings::default())).unwrap();
        let query = Query::Plan {
            name: "greet".to_string(),
            options: PlanOptions { change: super::super::options::PlanChange::RenameTo { name: "  ".to_string() }, file: None },
        };
        assert!(execute(&index, query).is_err());
    }
}
