//! Symbol Index & Graphs (§4.6): owns every parsed [`FileRecord`], the
//! name -> [`SymbolRecord`] secondary index, the import graph, and the
//! inheritance graph. Single-writer construction: `IndexBuilder` owns all
//! mutable state during a bulk build or incremental update; finished
//! indices are handed to readers behind `Arc` so queries never see a
//! half-built index.

mod callgraph;
mod graph;
mod method_resolution;

pub use callgraph::{callees_of, callers_of, classify_weight, has_no_callers, trace, CalleeWeight, CallSite, TraceNode};
pub use graph::{Direction, GraphResult, InheritanceGraph};
pub use method_resolution::{best_match, disambiguation_score, resolve_by_name, resolve_call, CallResolution};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use rayon::prelude::*;

use crate::config::Settings;
use crate::discovery::{is_test_file, DiscoveredFile, Discovery};
use crate::error::{IndexError, Result, UcnError};
use crate::parsing::LanguageRegistry;
use crate::resolve::{self, ResolverContext};
use crate::types::{
    Call, Confidence, Export, FileId, Function, Import, ImportEdge, InheritanceEdge, Language,
    StateConstant, SymbolKind, SymbolRecord, TypeDecl, UsageCounts,
};

use graph::ImportGraph;

/// A single parsed file's artifacts (§3 "FileRecord"). Source text itself
/// is never retained (§5 "memory discipline") — it is re-read from disk
/// whenever a query needs a verbatim snippet.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FileRecord {
    pub id: FileId,
    pub abs_path: PathBuf,
    pub rel_path: PathBuf,
    pub language: Language,
    pub total_lines: u32,
    pub mtime_ms: u64,
    pub size_bytes: u64,
    pub is_test_file: bool,
    pub functions: Vec<Function>,
    pub types: Vec<TypeDecl>,
    pub state_constants: Vec<StateConstant>,
    pub imports: Vec<Import>,
    pub exports: Vec<Export>,
    pub calls: Vec<Call>,
    /// Import specifiers that did not resolve inside the project (§3
    /// "unresolved imports ... do not produce edges").
    pub unresolved_imports: Vec<Import>,
    /// Python-only: `self.attr -> TypeName` (§4.3 `findInstanceAttributeTypes`).
    pub instance_attribute_types: HashMap<Box<str>, HashMap<Box<str>, Box<str>>>,
    /// Set when the grammar could not parse the file even after buffer
    /// escalation (§7 "parse failure"); the record carries empty artifacts.
    pub parse_error: bool,
    /// Set at query time when a re-read of the file fails (§7 "I/O failure").
    pub stale: bool,
}

impl FileRecord {
    /// A flat view of every symbol this file defines, used to build the
    /// name index (§4.6 step 3) and by `deadcode`/`stats`.
    pub fn symbol_records(&self) -> Vec<SymbolRecord> {
        let mut out = Vec::new();
        for function in &self.functions {
            if function.is_method {
                continue; // emitted only as a member, per §4.3 common rules
            }
            out.push(self.symbol_record_for_function(function, SymbolKind::Function));
        }
        for type_decl in &self.types {
            out.push(SymbolRecord {
                name: type_decl.name.clone(),
                file: self.rel_path.clone(),
                file_id: self.id,
                kind: SymbolKind::Type(type_decl.kind),
                span: type_decl.span,
                usage_counts: UsageCounts::default(),
                exported: self.is_exported(&type_decl.name),
                is_test_file: self.is_test_file,
                decorators: type_decl.modifiers.clone(),
            });
            for member in &type_decl.members {
                out.push(self.symbol_record_for_function(member, SymbolKind::Method));
            }
        }
        for constant in &self.state_constants {
            out.push(SymbolRecord {
                name: constant.name.clone(),
                file: self.rel_path.clone(),
                file_id: self.id,
                kind: SymbolKind::StateConstant,
                span: constant.span,
                usage_counts: UsageCounts::default(),
                exported: self.is_exported(&constant.name),
                is_test_file: self.is_test_file,
                decorators: Vec::new(),
            });
        }
        out
    }

    pub(crate) fn symbol_record_for_function(&self, function: &Function, kind: SymbolKind) -> SymbolRecord {
        SymbolRecord {
            name: function.name.clone(),
            file: self.rel_path.clone(),
            file_id: self.id,
            kind,
            span: function.span,
            usage_counts: UsageCounts::default(),
            exported: self.is_exported(&function.name),
            is_test_file: self.is_test_file,
            decorators: function.decorators.clone(),
        }
    }

    pub fn type_named(&self, name: &str) -> Option<&TypeDecl> {
        self.types.iter().find(|t| t.name.as_ref() == name)
    }

    /// The [`TypeDecl`] whose member list contains a function at the same
    /// span as `enclosing` — used to map a call's enclosing-function stack
    /// entry back to "which type is this a method of" (§4.6 method
    /// resolution rules 1-2).
    pub fn type_owning_function(&self, enclosing: &crate::types::EnclosingFunction) -> Option<&TypeDecl> {
        self.types.iter().find(|t| {
            t.members
                .iter()
                .any(|m| m.name.as_ref() == enclosing.name.as_ref() && m.span.start_line == enclosing.start_line)
        })
    }

    fn is_exported(&self, name: &str) -> bool {
        self.exports.iter().any(|e| e.name.as_ref() == name)
    }

    /// Confidence heuristic (§4.6 "Confidence"): advisory only, degrades
    /// for long bodies/files and deep generics.
    pub fn confidence_for(&self, function: &Function) -> Confidence {
        let span = function.span.line_span();
        let generic_depth = function
            .generics
            .as_deref()
            .map(|g| g.matches('<').count())
            .unwrap_or(0);
        if span > 500 || self.size_bytes > 1024 * 1024 {
            Confidence::Low
        } else if span > 200 || generic_depth > 2 {
            Confidence::Medium
        } else {
            Confidence::High
        }
    }
}

/// The finished, read-only index (§4.6). Queries take `&SymbolIndex` or
/// `Arc<SymbolIndex>`; only [`IndexBuilder`] ever mutates the underlying
/// maps.
#[derive(Debug)]
pub struct SymbolIndex {
    pub project_root: PathBuf,
    files: HashMap<FileId, FileRecord>,
    path_to_file: HashMap<PathBuf, FileId>,
    rel_to_file: HashMap<PathBuf, FileId>,
    symbols_by_name: HashMap<Box<str>, Vec<SymbolRecord>>,
    import_graph: ImportGraph,
    inheritance_graph: InheritanceGraph,
}

impl SymbolIndex {
    pub fn file(&self, id: FileId) -> Option<&FileRecord> {
        self.files.get(&id)
    }

    pub fn files(&self) -> impl Iterator<Item = &FileRecord> {
        self.files.values()
    }

    /// Every [`FileRecord`], owned — the payload the persistent cache
    /// serializes (§4.8).
    pub fn file_records(&self) -> Vec<FileRecord> {
        self.files.values().cloned().collect()
    }

    /// Files in deterministic, lexicographic project-relative order
    /// (§5 "ordering guarantees").
    pub fn files_sorted(&self) -> Vec<&FileRecord> {
        let mut files: Vec<&FileRecord> = self.files.values().collect();
        files.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
        files
    }

    pub fn file_by_rel_path(&self, rel: &Path) -> Option<&FileRecord> {
        self.rel_to_file.get(rel).and_then(|id| self.files.get(id))
    }

    pub fn file_by_abs_path(&self, abs: &Path) -> Option<&FileRecord> {
        self.path_to_file.get(abs).and_then(|id| self.files.get(id))
    }

    pub fn import_graph(&self) -> &ImportGraph {
        &self.import_graph
    }

    pub fn inheritance_graph(&self) -> &InheritanceGraph {
        &self.inheritance_graph
    }

    /// Every [`SymbolRecord`] sharing `name`, in insertion (file-then-line)
    /// order; disambiguation/sorting is a query concern (§4.6).
    pub fn symbols_named(&self, name: &str) -> &[SymbolRecord] {
        self.symbols_by_name.get(name).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn all_names(&self) -> impl Iterator<Item = &str> {
        self.symbols_by_name.keys().map(|k| k.as_ref())
    }

    /// Case-insensitive substring search over every known name, used by
    /// `find` and by "did-you-mean" suggestions (§7 "resolution failure").
    pub fn names_containing(&self, needle: &str) -> Vec<&str> {
        let needle = needle.to_lowercase();
        self.symbols_by_name
            .keys()
            .filter(|name| name.to_lowercase().contains(&needle))
            .map(|k| k.as_ref())
            .collect()
    }
}

/// The project-wide facts a bulk build needs: discovery, parse, extract,
/// resolve, merge (§4.6 "Construction"). Consumed into a [`SymbolIndex`]
/// via [`IndexBuilder::finish`].
pub struct IndexBuilder {
    project_root: PathBuf,
    settings: Arc<Settings>,
    registry: LanguageRegistry,
    resolver_ctx: ResolverContext,
    files: HashMap<FileId, FileRecord>,
    path_to_file: HashMap<PathBuf, FileId>,
    rel_to_file: HashMap<PathBuf, FileId>,
    import_graph: ImportGraph,
    inheritance_graph: InheritanceGraph,
    next_file_id: u32,
}

impl IndexBuilder {
    pub fn new(project_root: PathBuf, settings: Arc<Settings>) -> Self {
        let resolver_ctx = ResolverContext::new(project_root.clone());
        let registry = LanguageRegistry::from_settings(&settings);
        Self {
            project_root,
            settings,
            registry,
            resolver_ctx,
            files: HashMap::new(),
            path_to_file: HashMap::new(),
            rel_to_file: HashMap::new(),
            import_graph: ImportGraph::new(),
            inheritance_graph: InheritanceGraph::new(),
            next_file_id: 1,
        }
    }

    /// Bulk build (§4.6 "Construction"): discover every supported file,
    /// parse+extract them in parallel (the only embarrassingly-parallel
    /// phase, §5), then merge under this single writer and build the
    /// graphs.
    pub fn build_all(&mut self) -> Result<()> {
        let discovery = Discovery::new(&self.registry, &self.settings);
        let discovered = discovery.discover(&self.project_root);
        self.ingest(discovered)
    }

    /// Incremental update (§4.6 "Incremental update"): remove the named
    /// files' contributed records, re-parse only those files, and
    /// invalidate just the graph edges that touch them.
    pub fn update(&mut self, changed_abs_paths: &[PathBuf]) -> Result<()> {
        for path in changed_abs_paths {
            self.remove_file(path);
        }
        let mut discovered = Vec::new();
        for path in changed_abs_paths {
            if !path.is_file() {
                continue; // deleted: removal above already handled it
            }
            let Some(language) = self.registry.language_for_path(path) else {
                continue;
            };
            if !self.settings.language_enabled(language) {
                continue;
            }
            discovered.push(DiscoveredFile {
                path: path.clone(),
                language,
                is_test_file: is_test_file(path, language),
            });
        }
        self.ingest(discovered)?;
        self.reresolve_dangling_imports(changed_abs_paths);
        Ok(())
    }

    fn remove_file(&mut self, abs_path: &Path) {
        if let Some(id) = self.path_to_file.remove(abs_path) {
            if let Some(record) = self.files.remove(&id) {
                self.rel_to_file.remove(&record.rel_path);
                self.import_graph.remove_file(&record.rel_path);
                self.inheritance_graph.remove_file(&record.rel_path);
            }
        }
    }

    /// After adding/changing files, other files' previously-unresolved
    /// imports may now resolve into one of them (§4.6 incremental update,
    /// "both incoming and outgoing"). Re-probe just those.
    fn reresolve_dangling_imports(&mut self, changed_abs_paths: &[PathBuf]) {
        let changed: std::collections::HashSet<&PathBuf> = changed_abs_paths.iter().collect();
        let candidates: Vec<(PathBuf, Import, Language)> = self
            .files
            .values()
            .filter(|f| !changed.contains(&f.abs_path))
            .flat_map(|f| {
                f.unresolved_imports
                    .iter()
                    .map(move |imp| (f.abs_path.clone(), imp.clone(), f.language))
            })
            .collect();
        for (importer_abs, import, language) in candidates {
            if let Some(target) = resolve::resolve_import(&self.resolver_ctx, &importer_abs, &import, language) {
                if let Some(target_id) = self.path_to_file.get(&target) {
                    let to_rel = self.files[target_id].rel_path.clone();
                    let from_rel = self.files[&self.path_to_file[&importer_abs]].rel_path.clone();
                    self.import_graph.add_edge(ImportEdge {
                        from: from_rel,
                        to: to_rel,
                        names: import.names.clone(),
                        dynamic: import.dynamic,
                    });
                }
            }
        }
    }

    fn ingest(&mut self, discovered: Vec<DiscoveredFile>) -> Result<()> {
        let buffer_floor = self.settings.indexing.buffer_size;
        let registry = &self.registry;
        let project_root = self.project_root.clone();

        let parsed: Vec<Option<(DiscoveredFile, ParsedFile)>> = discovered
            .into_par_iter()
            .map(|file| {
                let outcome = parse_one(registry, &project_root, &file, buffer_floor);
                outcome.map(|parsed| (file, parsed))
            })
            .collect();

        for entry in parsed.into_iter().flatten() {
            let (discovered, parsed) = entry;
            self.insert_parsed(discovered, parsed)?;
        }
        Ok(())
    }

    fn insert_parsed(&mut self, discovered: DiscoveredFile, parsed: ParsedFile) -> Result<()> {
        let id = FileId::new(self.next_file_id).ok_or(IndexError::FileIdExhausted)?;
        self.next_file_id += 1;

        let rel_path = discovered
            .path
            .strip_prefix(&self.project_root)
            .unwrap_or(&discovered.path)
            .to_path_buf();

        let mut unresolved = Vec::new();
        let mut resolved_edges = Vec::new();
        for import in &parsed.imports {
            match resolve::resolve_import(&self.resolver_ctx, &discovered.path, import, discovered.language) {
                Some(target_abs) => resolved_edges.push((import.clone(), target_abs)),
                None => unresolved.push(import.clone()),
            }
        }

        let record = FileRecord {
            id,
            abs_path: discovered.path.clone(),
            rel_path: rel_path.clone(),
            language: discovered.language,
            total_lines: parsed.total_lines,
            mtime_ms: parsed.mtime_ms,
            size_bytes: parsed.size_bytes,
            is_test_file: discovered.is_test_file,
            functions: parsed.functions,
            types: parsed.types,
            state_constants: parsed.state_constants,
            imports: parsed.imports,
            exports: parsed.exports,
            calls: parsed.calls,
            unresolved_imports: unresolved,
            instance_attribute_types: parsed.instance_attribute_types,
            parse_error: parsed.parse_error,
            stale: false,
        };

        for type_decl in &record.types {
            for parent in type_decl.extends.iter().chain(type_decl.implements.iter()) {
                self.inheritance_graph.add_edge(InheritanceEdge {
                    child: type_decl.name.clone(),
                    parent: parent.clone(),
                    file: rel_path.clone(),
                });
            }
        }

        self.path_to_file.insert(discovered.path.clone(), id);
        self.rel_to_file.insert(rel_path.clone(), id);
        self.files.insert(id, record);

        for (import, target_abs) in resolved_edges {
            if let Some(target_id) = self.path_to_file.get(&target_abs) {
                let to_rel = self.files[target_id].rel_path.clone();
                self.import_graph.add_edge(ImportEdge {
                    from: rel_path.clone(),
                    to: to_rel,
                    names: import.names,
                    dynamic: import.dynamic,
                });
            }
        }

        Ok(())
    }

    /// Finalize the build into a read-only [`SymbolIndex`], building the
    /// name index from every file's flattened symbol records (§4.6 step 3).
    pub fn finish(self) -> SymbolIndex {
        let mut symbols_by_name: HashMap<Box<str>, Vec<SymbolRecord>> = HashMap::new();
        let mut seen = std::collections::HashSet::new();
        for file in self.files.values() {
            for record in file.symbol_records() {
                let key = (record.file.clone(), record.name.clone(), record.span.start_line);
                if seen.insert(key) {
                    symbols_by_name.entry(record.name.clone()).or_default().push(record);
                }
            }
        }
        SymbolIndex {
            project_root: self.project_root,
            files: self.files,
            path_to_file: self.path_to_file,
            rel_to_file: self.rel_to_file,
            symbols_by_name,
            import_graph: self.import_graph,
            inheritance_graph: self.inheritance_graph,
        }
    }

    /// Load already-parsed records straight from the persistent cache
    /// (§4.8), skipping re-parsing entirely. The import/inheritance
    /// graphs are still re-derived — pure path resolution, no grammar
    /// work — which keeps the cache blob itself small (§4.8 "forward
    /// compatible version field" covers only [`FileRecord`]s).
    pub fn load_file_records(&mut self, files: Vec<FileRecord>) {
        for record in &files {
            self.path_to_file.insert(record.abs_path.clone(), record.id);
            self.rel_to_file.insert(record.rel_path.clone(), record.id);
            self.next_file_id = self.next_file_id.max(record.id.value() + 1);
        }
        let rel_by_id: HashMap<FileId, PathBuf> =
            files.iter().map(|f| (f.id, f.rel_path.clone())).collect();
        for record in &files {
            for type_decl in &record.types {
                for parent in type_decl.extends.iter().chain(type_decl.implements.iter()) {
                    self.inheritance_graph.add_edge(InheritanceEdge {
                        child: type_decl.name.clone(),
                        parent: parent.clone(),
                        file: record.rel_path.clone(),
                    });
                }
            }
            for import in &record.imports {
                let Some(target_abs) =
                    resolve::resolve_import(&self.resolver_ctx, &record.abs_path, import, record.language)
                else {
                    continue;
                };
                let Some(target_id) = self.path_to_file.get(&target_abs) else {
                    continue;
                };
                let Some(to_rel) = rel_by_id.get(target_id) else {
                    continue;
                };
                self.import_graph.add_edge(ImportEdge {
                    from: record.rel_path.clone(),
                    to: to_rel.clone(),
                    names: import.names.clone(),
                    dynamic: import.dynamic,
                });
            }
        }
        for record in files {
            self.files.insert(record.id, record);
        }
    }

    /// Rebuild an [`IndexBuilder`] from a finished index (used when the
    /// persistent cache reloads a prior build and needs to run an
    /// incremental `update` against it).
    pub fn from_index(index: SymbolIndex, settings: Arc<Settings>) -> Self {
        let resolver_ctx = ResolverContext::new(index.project_root.clone());
        let next_file_id = index.files.keys().map(|id| id.value()).max().unwrap_or(0) + 1;
        let registry = LanguageRegistry::from_settings(&settings);
        Self {
            project_root: index.project_root,
            settings,
            registry,
            resolver_ctx,
            files: index.files,
            path_to_file: index.path_to_file,
            rel_to_file: index.rel_to_file,
            import_graph: index.import_graph,
            inheritance_graph: index.inheritance_graph,
            next_file_id,
        }
    }
}

struct ParsedFile {
    total_lines: u32,
    mtime_ms: u64,
    size_bytes: u64,
    functions: Vec<Function>,
    types: Vec<TypeDecl>,
    state_constants: Vec<StateConstant>,
    imports: Vec<Import>,
    exports: Vec<Export>,
    calls: Vec<Call>,
    instance_attribute_types: HashMap<Box<str>, HashMap<Box<str>, Box<str>>>,
    parse_error: bool,
}

/// Read, validate-parseable (with buffer escalation, §4.2), and extract a
/// single file. Never panics or propagates on malformed source (§7): a
/// parse failure becomes `parse_error: true` with empty artifacts, not an
/// `Err`. Returns `None` only when the file genuinely could not be read
/// (skipped, logged by the caller — not a query-time concern).
fn parse_one(
    registry: &LanguageRegistry,
    project_root: &Path,
    file: &DiscoveredFile,
    buffer_floor: usize,
) -> Option<ParsedFile> {
    let _ = project_root;
    let source = match std::fs::read_to_string(&file.path) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(path = %file.path.display(), error = %e, "failed to read file, skipping");
            return None;
        }
    };
    let metadata = std::fs::metadata(&file.path).ok();
    let mtime_ms = metadata
        .as_ref()
        .and_then(|m| m.modified().ok())
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let size_bytes = metadata.map(|m| m.len()).unwrap_or(source.len() as u64);

    let mut parse_layer = match crate::parsing::ParseLayer::new(registry.ts_language_for(file.language), buffer_floor) {
        Ok(layer) => layer,
        Err(e) => {
            tracing::warn!(path = %file.path.display(), error = %e, "grammar init failed, skipping");
            return None;
        }
    };

    let parse_error = parse_layer.parse(&file.path, &source, None).is_err();
    if parse_error {
        tracing::warn!(path = %file.path.display(), "parse failed after buffer escalation");
        return Some(ParsedFile {
            total_lines: source.lines().count() as u32,
            mtime_ms,
            size_bytes,
            functions: Vec::new(),
            types: Vec::new(),
            state_constants: Vec::new(),
            imports: Vec::new(),
            exports: Vec::new(),
            calls: Vec::new(),
            instance_attribute_types: HashMap::new(),
            parse_error: true,
        });
    }

    let mut extractor = match registry.extractor_for(file.language) {
        Ok(e) => e,
        Err(e) => {
            tracing::warn!(path = %file.path.display(), error = %e, "extractor init failed, skipping");
            return None;
        }
    };

    let outcome = extractor.parse(&source);
    let imports = extractor.find_imports_in_code(&source);
    let exports = extractor.find_exports_in_code(&source);
    let calls = extractor.find_calls_in_code(&source);
    let instance_attribute_types = extractor.find_instance_attribute_types(&source);

    Some(ParsedFile {
        total_lines: outcome.total_lines,
        mtime_ms,
        size_bytes,
        functions: outcome.functions,
        types: outcome.types,
        state_constants: outcome.state_constants,
        imports,
        exports,
        calls,
        instance_attribute_types,
        parse_error: false,
    })
}

/// Build (or rebuild) a project's index from scratch, convenience entry
/// point used by the CLI and by cache-miss fallback.
pub fn build_project(project_root: &Path, settings: Arc<Settings>) -> Result<SymbolIndex> {
    let mut builder = IndexBuilder::new(project_root.to_path_buf(), settings);
    builder.build_all().map_err(UcnError::from)?;
    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn settings() -> Arc<Settings> {
        Arc::new(Settings::default())
    }

    #[test]
    fn bulk_build_indexes_a_small_rust_project() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("main.rs"),
            "fn main() { helper(); }\nfn helper() { util(); }\nfn util() {}\n",
        )
        .unwrap();
        let index = build_project(dir.path(), settings()).unwrap();
        assert!(!index.symbols_named("helper").is_empty());
        assert!(!index.symbols_named("util").is_empty());
    }

    #[test]
    fn incremental_update_reflects_file_changes() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("a.rs");
        fs::write(&file_path, "fn one() {}\n").unwrap();
        let mut builder = IndexBuilder::new(dir.path().to_path_buf(), settings());
        builder.build_all().unwrap();
        assert!(!builder.finish().symbols_named("one").is_empty());

        let mut builder = IndexBuilder::new(dir.path().to_path_buf(), settings());
        builder.build_all().unwrap();
        fs::write(&file_path, "fn two() {}\n").unwrap();
        builder.update(&[file_path.clone()]).unwrap();
        let index = builder.finish();
        assert!(index.symbols_named("one").is_empty());
        assert!(!index.symbols_named("two").is_empty());
    }

    #[test]
    fn zero_byte_file_contributes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("empty.py"), "").unwrap();
        let index = build_project(dir.path(), settings()).unwrap();
        let file = index.files().next().unwrap();
        assert_eq!(file.functions.len(), 0);
        assert_eq!(file.total_lines, 0);
    }

    #[test]
    fn import_edge_created_between_project_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/util.py"), "def helper():\n    pass\n").unwrap();
        fs::write(dir.path().join("src/main.py"), "from . import util\nutil.helper()\n").unwrap();
        let index = build_project(dir.path(), settings()).unwrap();
        let main_rel = PathBuf::from("src/main.py");
        let edges = index.import_graph().edges_from(&main_rel);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].to, PathBuf::from("src/util.py"));
    }
}
