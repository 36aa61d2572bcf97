//! Structured error types, one enum per subsystem: a `thiserror` enum per
//! concern rather than one catch-all, with `recovery_suggestions` for the
//! ones a human is likely to hit at the CLI boundary.

use crate::types::FileId;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("failed to initialize {language} parser: {reason}")]
    GrammarInit { language: String, reason: String },

    #[error("buffer escalation exhausted at {attempted_bytes} bytes parsing '{path}'")]
    BufferExhausted {
        path: PathBuf,
        attempted_bytes: usize,
    },

    #[error("file '{path}' is too large to parse ({size} bytes, ceiling is {ceiling} bytes)")]
    FileTooLarge {
        path: PathBuf,
        size: usize,
        ceiling: usize,
    },
}

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("import specifier '{specifier}' in '{importer}' did not resolve inside the project")]
    Unresolved {
        specifier: String,
        importer: PathBuf,
    },
}

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file type '{extension}' for file '{path}'")]
    UnsupportedFileType { path: PathBuf, extension: String },

    #[error("file id {id:?} not found in index")]
    FileNotFound { id: FileId },

    #[error("maximum file count reached, cannot allocate a new FileId")]
    FileIdExhausted,

    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("failed to write cache to '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read cache from '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode cache contents: {0}")]
    Decode(#[from] bincode::Error),

    #[error("cache format version {found} is newer than the {supported} this build understands")]
    VersionTooNew { found: u32, supported: u32 },
}

/// A programmer error at the query-engine interface (unknown argument,
/// mismatched option): per §7 these abort rather than being reported.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("unknown argument '{0}' for this query")]
    UnknownArgument(String),

    #[error("invalid option combination: {0}")]
    InvalidOptions(String),
}

#[derive(Error, Debug)]
pub enum UcnError {
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, UcnError>;
