//! Parse Layer, Language Registry, and per-language extractors (§4.1-4.4).

mod extractor;
mod go_lang;
mod html_lang;
mod java_lang;
mod javascript_lang;
mod parser;
mod python_lang;
mod registry;
mod rust_lang;
mod typescript_lang;

pub use extractor::{
    check_recursion_depth, safe_truncate_str, Extractor, ParseOutcome, MAX_AST_DEPTH,
};
pub use parser::ParseLayer;
pub use registry::LanguageRegistry;

pub(crate) use go_lang::GoExtractor;
pub(crate) use html_lang::HtmlExtractor;
pub(crate) use java_lang::JavaExtractor;
pub(crate) use javascript_lang::JavaScriptExtractor;
pub(crate) use python_lang::PythonExtractor;
pub(crate) use rust_lang::RustExtractor;
pub(crate) use typescript_lang::TypeScriptExtractor;
