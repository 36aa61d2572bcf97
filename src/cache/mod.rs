//! Persistent Cache (§4.8): serializes every [`FileRecord`] to a single
//! `bincode` blob under `.ucn-cache/`, validates it against file identity
//! (mtime + size) before trusting it, and otherwise triggers a full
//! rebuild.
//!
//! A second, much smaller structure — [`ExpandCache`] — is *not*
//! persisted: it holds the numbered "expandable items" from the last
//! `context` query per project, for the `expand N` follow-up (§4.8,
//! glossary "Expandable item").

mod expand;

pub use expand::{ExpandCache, ExpandCacheKey, ExpandableItem};

use std::collections::HashSet;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::discovery::{DiscoveredFile, Discovery};
use crate::error::{CacheError, Result, UcnError};
use crate::index::{FileRecord, IndexBuilder, SymbolIndex};
use crate::parsing::LanguageRegistry;

/// Bumped whenever the on-disk shape of [`FileRecord`] (or this envelope)
/// changes incompatibly. A cache written by a newer version than this
/// build understands is treated as absent (§4.8: "causes a full rebuild
/// rather than an error").
pub const CACHE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct CacheEnvelope {
    version: u32,
    project_root: PathBuf,
    files: Vec<FileRecord>,
}

pub fn default_cache_path(project_root: &Path, settings: &Settings) -> PathBuf {
    project_root.join(&settings.cache_dir).join("index.bin")
}

/// Write the index to `path`, creating parent directories as needed.
pub fn save(index: &SymbolIndex, path: &Path) -> Result<()> {
    let envelope = CacheEnvelope {
        version: CACHE_VERSION,
        project_root: index.project_root.clone(),
        files: index.file_records(),
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| CacheError::Write { path: path.to_path_buf(), source })?;
    }
    let encoded = bincode::serialize(&envelope).map_err(CacheError::Decode)?;
    let mut file = fs::File::create(path).map_err(|source| CacheError::Write { path: path.to_path_buf(), source })?;
    file.write_all(&encoded)
        .map_err(|source| CacheError::Write { path: path.to_path_buf(), source })?;
    Ok(())
}

/// Attempt to load a still-valid cache. Returns `Ok(None)` for "absent or
/// stale" — both are ordinary, expected outcomes (§4.8), never an error;
/// `Err` is reserved for I/O failures reading a cache file that does
/// exist and decodes successfully, yet is unusable.
fn try_load(path: &Path, discovered: &[DiscoveredFile]) -> Result<Option<SymbolIndex>> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(UcnError::from(CacheError::Read { path: path.to_path_buf(), source })),
    };
    let envelope: CacheEnvelope = match bincode::deserialize(&bytes) {
        Ok(e) => e,
        Err(_) => return Ok(None), // corrupt/unrecognized blob: rebuild rather than fail
    };
    if envelope.version > CACHE_VERSION {
        return Ok(None);
    }
    if !is_fresh(&envelope, discovered) {
        return Ok(None);
    }

    let mut builder = IndexBuilder::new(envelope.project_root.clone(), Arc::new(Settings::default()));
    builder.load_file_records(envelope.files);
    Ok(Some(builder.finish()))
}

/// §4.8: "accepted only if every on-disk file's mtime+size matches its
/// recorded pair and no new file has appeared in discovery. A single
/// mismatch triggers a full rebuild."
fn is_fresh(envelope: &CacheEnvelope, discovered: &[DiscoveredFile]) -> bool {
    if envelope.files.len() != discovered.len() {
        return false;
    }
    let cached_paths: HashSet<&Path> = envelope.files.iter().map(|f| f.abs_path.as_path()).collect();
    if discovered.iter().any(|d| !cached_paths.contains(d.path.as_path())) {
        return false;
    }
    for record in &envelope.files {
        let Ok(metadata) = fs::metadata(&record.abs_path) else {
            return false;
        };
        let mtime_ms = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        if mtime_ms != record.mtime_ms || metadata.len() != record.size_bytes {
            return false;
        }
    }
    true
}

/// Load a valid cache, or perform a full bulk build and persist the
/// result. Returns whether the cache was used, for CLI/telemetry
/// purposes.
pub fn load_or_build(project_root: &Path, settings: Arc<Settings>) -> Result<(SymbolIndex, bool)> {
    let cache_path = default_cache_path(project_root, &settings);
    let registry = LanguageRegistry::from_settings(&settings);
    let discovery = Discovery::new(&registry, &settings);
    let discovered = discovery.discover(project_root);

    if let Some(index) = try_load(&cache_path, &discovered)? {
        return Ok((index, true));
    }

    let mut builder = IndexBuilder::new(project_root.to_path_buf(), settings);
    builder.build_all()?;
    let index = builder.finish();
    save(&index, &cache_path)?;
    Ok((index, false))
}

/// Round-trip a cache file without a filesystem round-trip, used by
/// tests that want to assert on the encoded bytes directly.
#[cfg(test)]
fn roundtrip(index: &SymbolIndex) -> SymbolIndex {
    let envelope = CacheEnvelope {
        version: CACHE_VERSION,
        project_root: index.project_root.clone(),
        files: index.file_records(),
    };
    let encoded = bincode::serialize(&envelope).unwrap();
    let decoded: CacheEnvelope = bincode::deserialize(&encoded).unwrap();
    let mut builder = IndexBuilder::new(decoded.project_root, Arc::new(Settings::default()));
    builder.load_file_records(decoded.files);
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::build_project;
    use std::fs;

    #[test]
    fn cache_round_trip_preserves_symbols() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.rs"), "fn one() {}\nfn two() { one(); }\n").unwrap();
        let index = build_project(dir.path(), Arc::new(Settings::default())).unwrap();
        let restored = roundtrip(&index);
        assert_eq!(
            index.symbols_named("one").len(),
            restored.symbols_named("one").len()
        );
        assert_eq!(
            index.symbols_named("two").len(),
            restored.symbols_named("two").len()
        );
    }

    #[test]
    fn stale_cache_triggers_rebuild_on_touch() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.rs");
        fs::write(&file, "fn one() {}\n").unwrap();
        let settings = Arc::new(Settings::default());
        let (first, hit) = load_or_build(dir.path(), settings.clone()).unwrap();
        assert!(!hit);
        assert!(!first.symbols_named("one").is_empty());

        // Touch the file so mtime/size change, forcing staleness.
        std::thread::sleep(std::time::Duration::from_millis(10));
        fs::write(&file, "fn one() {}\nfn two() {}\n").unwrap();

        let (second, hit) = load_or_build(dir.path(), settings).unwrap();
        assert!(!hit, "changed file must not be served from a stale cache");
        assert!(!second.symbols_named("two").is_empty());
    }

    #[test]
    fn fresh_cache_is_reused_without_reparsing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.rs"), "fn one() {}\n").unwrap();
        let settings = Arc::new(Settings::default());
        load_or_build(dir.path(), settings.clone()).unwrap();
        let (_, hit) = load_or_build(dir.path(), settings).unwrap();
        assert!(hit);
    }
}
