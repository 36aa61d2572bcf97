//! Language Registry (§4.1): resolves file paths to a [`Language`], and
//! lazily produces the matching [`Extractor`]. Parser/grammar handles are
//! a compile-time table (§9 "dynamic import of language grammars" note):
//! no runtime dynamic loading, just lazy construction.

use crate::types::Language;
use std::path::Path;

use super::extractor::Extractor;
use super::{GoExtractor, HtmlExtractor, JavaExtractor, JavaScriptExtractor, PythonExtractor, RustExtractor, TypeScriptExtractor};

pub struct LanguageRegistry {
    extra_extensions: Vec<(String, Language)>,
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageRegistry {
    pub fn new() -> Self {
        Self {
            extra_extensions: Vec::new(),
        }
    }

    /// Build a registry with each language's configured `extra_extensions`
    /// (§4.1) registered up front.
    pub fn from_settings(settings: &crate::config::Settings) -> Self {
        let mut registry = Self::new();
        for lang in Language::all() {
            if let Some(config) = settings.languages.get(lang.name()) {
                for ext in &config.extra_extensions {
                    registry.register_extension(ext, *lang);
                }
            }
        }
        registry
    }

    pub fn register_extension(&mut self, extension: &str, language: Language) {
        self.extra_extensions
            .push((extension.trim_start_matches('.').to_lowercase(), language));
    }

    /// Resolve a file extension to a language. Returns `None` for
    /// unsupported extensions; callers skip such files, they never fail.
    pub fn language_for_extension(&self, extension: &str) -> Option<Language> {
        let ext = extension.to_lowercase();
        if let Some((_, lang)) = self.extra_extensions.iter().find(|(e, _)| *e == ext) {
            return Some(*lang);
        }
        match ext.as_str() {
            "rs" => Some(Language::Rust),
            "py" | "pyi" => Some(Language::Python),
            "js" | "jsx" | "mjs" | "cjs" => Some(Language::JavaScript),
            "ts" | "tsx" | "mts" | "cts" => Some(Language::TypeScript),
            "go" => Some(Language::Go),
            "java" => Some(Language::Java),
            "html" | "htm" => Some(Language::Html),
            _ => None,
        }
    }

    pub fn language_for_path(&self, path: &Path) -> Option<Language> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| self.language_for_extension(e))
    }

    /// The grammar handle for `language`, used by [`super::ParseLayer`] to
    /// validate a file is parseable (with buffer escalation) before the
    /// extractor re-walks it per-operation.
    pub fn ts_language_for(&self, language: Language) -> tree_sitter::Language {
        match language {
            Language::Rust => tree_sitter_rust::LANGUAGE.into(),
            Language::Python => tree_sitter_python::LANGUAGE.into(),
            Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Language::TypeScript => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Language::Go => tree_sitter_go::LANGUAGE.into(),
            Language::Java => tree_sitter_java::LANGUAGE.into(),
            Language::Html => tree_sitter_html::LANGUAGE.into(),
        }
    }

    /// Construct a fresh extractor for `language`. The registry itself is
    /// stateless between calls; the bulk-build worker pool creates one
    /// extractor per worker thread per language to avoid lock contention
    /// on a shared `tree_sitter::Parser` (§5 concurrency model).
    pub fn extractor_for(&self, language: Language) -> Result<Box<dyn Extractor>, String> {
        match language {
            Language::Rust => Ok(Box::new(RustExtractor::new()?)),
            Language::Python => Ok(Box::new(PythonExtractor::new()?)),
            Language::JavaScript => Ok(Box::new(JavaScriptExtractor::new()?)),
            Language::TypeScript => Ok(Box::new(TypeScriptExtractor::new()?)),
            Language::Go => Ok(Box::new(GoExtractor::new()?)),
            Language::Java => Ok(Box::new(JavaExtractor::new()?)),
            Language::Html => Ok(Box::new(HtmlExtractor::new()?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_extension_yields_none() {
        let registry = LanguageRegistry::new();
        assert_eq!(registry.language_for_extension("md"), None);
    }

    #[test]
    fn registers_extra_extension() {
        let mut registry = LanguageRegistry::new();
        registry.register_extension(".mjsx", Language::JavaScript);
        assert_eq!(
            registry.language_for_extension("mjsx"),
            Some(Language::JavaScript)
        );
    }

    #[test]
    fn path_extension_is_case_insensitive() {
        let registry = LanguageRegistry::new();
        assert_eq!(
            registry.language_for_path(Path::new("Main.RS")),
            Some(Language::Rust)
        );
    }
}
