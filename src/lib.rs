//! `ucn` — polyglot source-code navigator. Parses a project's source files
//! into syntax trees via per-language tree-sitter grammars, derives a
//! project-wide symbol index with call/import/inheritance graphs, and
//! exposes a family of read-only structural queries on top of it.
//!
//! The crate is organized leaves-first: [`parsing`]
//! (Language Registry, Parse Layer, per-language extractors), [`discovery`]
//! (File Discovery), [`resolve`] (Import Resolver), [`index`] (Symbol Index
//! & Graphs), [`query`] (the Query Engine), and [`cache`] (the Persistent
//! Cache). [`config`], [`error`], and [`logging`] are the ambient stack.

pub mod cache;
pub mod config;
pub mod discovery;
pub mod error;
pub mod index;
pub mod logging;
pub mod parsing;
pub mod query;
pub mod resolve;
pub mod types;

pub use config::Settings;
pub use error::{Result, UcnError};
pub use index::{build_project, IndexBuilder, SymbolIndex};
