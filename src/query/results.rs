//! Small result fragments shared by more than one query (§4.9 `context`,
//! `about`): a caller/callee view pairs a resolved call site with enough
//! context to render it without a second index lookup.

use std::path::PathBuf;

use serde::Serialize;

use crate::index::CalleeWeight;
use crate::types::SymbolRecord;

/// A name that didn't resolve to any symbol (§7 "resolution failure"):
/// reported as data, never as an error.
#[derive(Debug, Clone, Serialize)]
pub struct NotFound {
    pub query: Box<str>,
    pub suggestions: Vec<Box<str>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CallerView {
    /// The caller's own enclosing function/method name, if the call site
    /// sits inside one; `None` for a module-level call.
    pub enclosing: Option<Box<str>>,
    pub file: PathBuf,
    pub line: u32,
    pub is_method: bool,
    pub uncertain: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalleeView {
    pub symbol: SymbolRecord,
    pub weight: CalleeWeight,
    pub uncertain: bool,
}
