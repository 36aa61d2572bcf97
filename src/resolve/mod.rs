//! Import Resolver (§4.5): turns an [`Import`]'s `source` specifier into a
//! concrete file path inside the project, or leaves it unresolved (a
//! third-party package, a stdlib module, an unreadable alias). Each
//! language gets its own resolution strategy; none of them touch the
//! filesystem beyond `exists()`/read of a manifest file.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{Import, Language};

/// The project-wide facts a resolver needs beyond the importing file's own
/// path: the root directory, and (for Go) the module path declared in
/// `go.mod`.
pub struct ResolverContext {
    pub project_root: PathBuf,
    go_module_path: Option<String>,
    java_source_roots: Vec<PathBuf>,
}

impl ResolverContext {
    pub fn new(project_root: PathBuf) -> Self {
        let go_module_path = read_go_module_path(&project_root);
        let java_source_roots = detect_java_source_roots(&project_root);
        Self {
            project_root,
            go_module_path,
            java_source_roots,
        }
    }
}

fn read_go_module_path(root: &Path) -> Option<String> {
    let content = fs::read_to_string(root.join("go.mod")).ok()?;
    content
        .lines()
        .find_map(|line| line.trim().strip_prefix("module ").map(|m| m.trim().to_string()))
}

fn detect_java_source_roots(root: &Path) -> Vec<PathBuf> {
    let maven = root.join("src").join("main").join("java");
    let mut roots = Vec::new();
    if maven.is_dir() {
        roots.push(maven);
    }
    roots.push(root.to_path_buf());
    roots
}

const JS_EXTENSIONS: &[&str] = &["", ".ts", ".tsx", ".js", ".jsx", ".mjs", ".cjs"];

/// Resolve `import.source`, written from `importer`'s directory, to an
/// absolute path in the project when it can be determined lexically.
/// Returns `None` for anything resolution can't settle without a package
/// manager (bare specifiers, stdlib modules, unknown Go modules) — callers
/// treat that as "external", not an error (§4.5 edge case).
pub fn resolve_import(ctx: &ResolverContext, importer: &Path, import: &Import, language: Language) -> Option<PathBuf> {
    match language {
        Language::JavaScript | Language::TypeScript => resolve_js_like(importer, &import.source),
        Language::Python => resolve_python(ctx, importer, &import.source),
        Language::Go => resolve_go(ctx, &import.source),
        Language::Rust => resolve_rust(ctx, importer, &import.source),
        Language::Java => resolve_java(ctx, &import.source),
        Language::Html => resolve_js_like(importer, &import.source),
    }
}

fn resolve_js_like(importer: &Path, source: &str) -> Option<PathBuf> {
    if !(source.starts_with('.') || source.starts_with('/')) {
        return None; // bare specifier: node_modules/package, unresolved
    }
    let base = importer.parent()?;
    let candidate_root = if source.starts_with('/') {
        PathBuf::from(source.trim_start_matches('/'))
    } else {
        base.join(source)
    };
    for ext in JS_EXTENSIONS {
        let candidate = append_ext(&candidate_root, ext);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    for ext in JS_EXTENSIONS {
        let candidate = candidate_root.join(format!("index{ext}"));
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

fn append_ext(path: &Path, ext: &str) -> PathBuf {
    if ext.is_empty() {
        path.to_path_buf()
    } else {
        let mut s = path.as_os_str().to_owned();
        s.push(ext);
        PathBuf::from(s)
    }
}

fn resolve_python(ctx: &ResolverContext, importer: &Path, source: &str) -> Option<PathBuf> {
    let dots = source.chars().take_while(|c| *c == '.').count();
    let rest = &source[dots..];
    let segments: Vec<&str> = if rest.is_empty() { Vec::new() } else { rest.split('.').collect() };

    let base = if dots > 0 {
        let mut dir = importer.parent()?.to_path_buf();
        for _ in 1..dots {
            dir = dir.parent()?.to_path_buf();
        }
        dir
    } else {
        ctx.project_root.clone()
    };

    let mut candidate = base;
    for segment in &segments {
        candidate = candidate.join(segment);
    }

    let module_file = candidate.with_extension("py");
    if module_file.is_file() {
        return Some(module_file);
    }
    let package_init = candidate.join("__init__.py");
    if package_init.is_file() {
        return Some(package_init);
    }
    if dots == 0 {
        None
    } else {
        None
    }
}

fn resolve_go(ctx: &ResolverContext, source: &str) -> Option<PathBuf> {
    let module_path = ctx.go_module_path.as_deref()?;
    let suffix = source.strip_prefix(module_path)?.trim_start_matches('/');
    Some(ctx.project_root.join(suffix))
}

fn resolve_rust(_ctx: &ResolverContext, importer: &Path, source: &str) -> Option<PathBuf> {
    if source.starts_with("crate::") || source.starts_with("self::") || source.starts_with("super::") {
        let relative = source
            .trim_start_matches("crate::")
            .trim_start_matches("self::")
            .trim_start_matches("super::");
        let src_root = find_src_root(importer)?;
        let mut candidate = src_root;
        for segment in relative.split("::") {
            candidate = candidate.join(segment);
        }
        let as_file = candidate.with_extension("rs");
        if as_file.is_file() {
            return Some(as_file);
        }
        let as_mod = candidate.join("mod.rs");
        if as_mod.is_file() {
            return Some(as_mod);
        }
        None
    } else {
        None // external crate: resolution stops at the crate-graph boundary
    }
}

fn find_src_root(from: &Path) -> Option<PathBuf> {
    let mut current = from.parent();
    while let Some(dir) = current {
        if dir.file_name().and_then(|n| n.to_str()) == Some("src") {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}

fn resolve_java(ctx: &ResolverContext, source: &str) -> Option<PathBuf> {
    let relative: PathBuf = source.split('.').collect::<Vec<_>>().join("/").into();
    for root in &ctx.java_source_roots {
        let candidate = root.join(&relative).with_extension("java");
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

/// Names exposed by a file, built from its own `Export`s, used to turn an
/// unqualified `import { x } from './m'` into a check that `x` is actually
/// exported (surfaced by `verify`, §4.9).
pub fn index_exported_names(exports: &[crate::types::Export]) -> HashMap<Box<str>, crate::types::ExportKind> {
    exports.iter().map(|e| (e.name.clone(), e.kind)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ImportKind};

    fn import(source: &str) -> Import {
        Import {
            source: source.into(),
            names: Vec::new(),
            kind: ImportKind::Relative,
            line: 1,
            aliases: HashMap::new(),
            dynamic: false,
        }
    }

    #[test]
    fn go_resolves_module_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("go.mod"), "module example.com/widget\n\ngo 1.22\n").unwrap();
        std::fs::create_dir_all(dir.path().join("internal/store")).unwrap();
        let ctx = ResolverContext::new(dir.path().to_path_buf());
        let resolved = resolve_import(
            &ctx,
            &dir.path().join("main.go"),
            &import("example.com/widget/internal/store"),
            Language::Go,
        );
        assert_eq!(resolved, Some(dir.path().join("internal/store")));
    }

    #[test]
    fn js_bare_specifier_is_unresolved() {
        let ctx = ResolverContext::new(PathBuf::from("/proj"));
        let resolved = resolve_import(&ctx, Path::new("/proj/src/app.ts"), &import("react"), Language::TypeScript);
        assert_eq!(resolved, None);
    }

    #[test]
    fn js_relative_specifier_resolves_with_extension_probe() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/util.ts"), "export const x = 1;").unwrap();
        let ctx = ResolverContext::new(dir.path().to_path_buf());
        let resolved = resolve_import(&ctx, &dir.path().join("src/app.ts"), &import("./util"), Language::TypeScript);
        assert_eq!(resolved, Some(dir.path().join("src/util.ts")));
    }
}
