//! Typed per-query option structures ("a typed options structure per
//! query carrying only the parameters that query accepts"), one struct
//! per query. Every field defaults to the documented behavior when the
//! parameter is omitted.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::index::Direction;

fn default_depth() -> u32 {
    3
}

fn default_limit() -> usize {
    5
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FindOptions {
    pub file: Option<String>,
    #[serde(default)]
    pub exact: bool,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(rename = "in")]
    pub in_: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UsagesOptions {
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(rename = "in")]
    pub in_: Option<String>,
    #[serde(default)]
    pub code_only: bool,
    pub context: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContextOptions {
    #[serde(default)]
    pub include_methods: bool,
    #[serde(default)]
    pub include_uncertain: bool,
    pub file: Option<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self { include_methods: false, include_uncertain: false, file: None, exclude: Vec::new() }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ImpactOptions {
    pub file: Option<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TraceOptions {
    #[serde(default = "default_depth")]
    pub depth: u32,
    #[serde(default)]
    pub include_methods: bool,
    #[serde(default)]
    pub include_uncertain: bool,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self { depth: default_depth(), include_methods: false, include_uncertain: false }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SmartOptions {
    #[serde(default)]
    pub with_types: bool,
    #[serde(default)]
    pub include_methods: bool,
    #[serde(default)]
    pub include_uncertain: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AboutOptions {
    #[serde(default)]
    pub include_uncertain: bool,
    #[serde(default = "default_limit")]
    pub caller_limit: usize,
    #[serde(default = "default_limit")]
    pub callee_limit: usize,
}

impl Default for AboutOptions {
    fn default() -> Self {
        Self { include_uncertain: false, caller_limit: default_limit(), callee_limit: default_limit() }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RelatedOptions {}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TestsOptions {
    #[serde(default)]
    pub calls_only: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeadcodeOptions {
    #[serde(default)]
    pub include_exported: bool,
    #[serde(default)]
    pub include_decorated: bool,
    #[serde(default)]
    pub include_tests: bool,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(rename = "in")]
    pub in_: Option<String>,
}

impl Default for DeadcodeOptions {
    fn default() -> Self {
        Self { include_exported: false, include_decorated: false, include_tests: false, exclude: Vec::new(), in_: None }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GraphOptions {
    #[serde(default)]
    pub direction: GraphDirectionArg,
    #[serde(default = "default_graph_depth")]
    pub max_depth: usize,
}

fn default_graph_depth() -> usize {
    3
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self { direction: GraphDirectionArg::default(), max_depth: default_graph_depth() }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphDirectionArg {
    #[default]
    Imports,
    Importers,
    Both,
}

impl From<GraphDirectionArg> for Direction {
    fn from(value: GraphDirectionArg) -> Self {
        match value {
            GraphDirectionArg::Imports => Direction::Imports,
            GraphDirectionArg::Importers => Direction::Importers,
            GraphDirectionArg::Both => Direction::Both,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TypedefOptions {}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VerifyOptions {
    pub file: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PlanChange {
    AddParam {
        name: String,
        #[serde(default)]
        type_annotation: Option<String>,
        #[serde(default)]
        default_value: Option<String>,
    },
    RemoveParam {
        name: String,
    },
    RenameTo {
        name: String,
    },
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlanOptions {
    pub change: PlanChange,
    pub file: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LineRange {
    pub start: u32,
    pub end: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FileChange {
    pub file: PathBuf,
    pub ranges: Vec<LineRange>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DiffImpactOptions {
    /// Changed hunks per file, as produced by the VCS collaborator (§1
    /// "reduced to a small interface"); `base`/`staged` are opaque labels
    /// carried through to the result for display only.
    pub base: Option<String>,
    pub staged: Option<String>,
    pub changes: Vec<FileChange>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiOptions {
    pub file: Option<String>,
}
