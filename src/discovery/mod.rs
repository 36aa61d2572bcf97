//! File Discovery (§4.1): walks a project root respecting `.gitignore`-style
//! ignore rules, maps paths to languages via the [`LanguageRegistry`], and
//! applies a test-file heuristic per language (§6).

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::config::Settings;
use crate::parsing::LanguageRegistry;
use crate::types::Language;

/// A discovered source file, already classified by language and test-ness.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub language: Language,
    pub is_test_file: bool,
}

/// Default directory names skipped even when not listed in a `.gitignore`
/// — build output and vendored dependency trees most projects never want
/// indexed.
const DEFAULT_IGNORE_DIRS: &[&str] = &[
    "target", "node_modules", "dist", "build", ".git", "vendor", "__pycache__", ".venv", "venv",
];

pub struct Discovery<'a> {
    registry: &'a LanguageRegistry,
    settings: &'a Settings,
}

impl<'a> Discovery<'a> {
    pub fn new(registry: &'a LanguageRegistry, settings: &'a Settings) -> Self {
        Self { registry, settings }
    }

    /// Detect the project root: walk upward from `start` until a VCS
    /// directory (`.git`) or a recognized manifest file is found, else
    /// fall back to `start` itself (§4.1 "project root detection").
    pub fn detect_project_root(&self, start: &Path) -> PathBuf {
        let manifests = [
            "Cargo.toml",
            "go.mod",
            "package.json",
            "pyproject.toml",
            "setup.py",
            "pom.xml",
            "build.gradle",
        ];
        let mut current = start;
        loop {
            if current.join(".git").exists() {
                return current.to_path_buf();
            }
            if manifests.iter().any(|m| current.join(m).exists()) {
                return current.to_path_buf();
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => return start.to_path_buf(),
            }
        }
    }

    pub fn discover(&self, root: &Path) -> Vec<DiscoveredFile> {
        let mut walker = WalkBuilder::new(root);
        walker
            .hidden(false)
            .follow_links(self.settings.indexing.follow_symlinks)
            .filter_entry(|entry| {
                !entry
                    .file_name()
                    .to_str()
                    .map(|name| DEFAULT_IGNORE_DIRS.contains(&name))
                    .unwrap_or(false)
            });

        let mut files = Vec::new();
        for entry in walker.build().flatten() {
            let path = entry.path();
            if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
                continue;
            }
            let Some(language) = self.registry.language_for_path(path) else {
                continue;
            };
            if !self.settings.language_enabled(language) {
                continue;
            }
            files.push(DiscoveredFile {
                path: path.to_path_buf(),
                language,
                is_test_file: is_test_file(path, language),
            });
        }
        files
    }
}

/// Per-language test-file heuristic (§6): name/suffix/directory patterns
/// that mark a file as tests rather than production source.
pub fn is_test_file(path: &Path, language: Language) -> bool {
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    let in_tests_dir = path.components().any(|c| {
        matches!(c.as_os_str().to_str(), Some("tests") | Some("test") | Some("__tests__") | Some("spec"))
    });
    let path_lower = path.to_string_lossy().to_lowercase();
    let has_fixture_marker =
        ["__mocks__", "fixture", "mock"].iter().any(|marker| path_lower.contains(marker));
    if has_fixture_marker {
        return true;
    }

    match language {
        Language::Rust => in_tests_dir || stem.ends_with("_test") || stem.starts_with("test_"),
        Language::Python => file_name.starts_with("test_") || file_name.ends_with("_test.py") || in_tests_dir,
        Language::JavaScript | Language::TypeScript => {
            file_name.contains(".test.") || file_name.contains(".spec.") || in_tests_dir
        }
        Language::Go => stem.ends_with("_test"),
        Language::Java => stem.ends_with("Test") || stem.ends_with("Tests") || stem.starts_with("Test"),
        Language::Html => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rust_test_file_heuristic() {
        assert!(is_test_file(Path::new("src/parser_test.rs"), Language::Rust));
        assert!(is_test_file(Path::new("tests/basic.rs"), Language::Rust));
        assert!(!is_test_file(Path::new("src/parser.rs"), Language::Rust));
    }

    #[test]
    fn python_test_file_heuristic() {
        assert!(is_test_file(Path::new("tests/test_models.py"), Language::Python));
        assert!(!is_test_file(Path::new("app/models.py"), Language::Python));
    }

    #[test]
    fn go_test_file_heuristic() {
        assert!(is_test_file(Path::new("handler_test.go"), Language::Go));
        assert!(!is_test_file(Path::new("handler.go"), Language::Go));
    }
}
