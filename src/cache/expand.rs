//! The "expandable items" cache (§4.8, glossary "Expandable item"): the
//! last `context` query numbers a handful of truncated sections so a
//! follow-up `expand N` can retrieve the full text without re-running the
//! query. Scoped per project, never persisted to disk, and capped at a
//! small capacity since it only ever needs to outlive one CLI session.

use std::collections::HashMap;
use std::path::PathBuf;

use parking_lot::Mutex;
use serde::Serialize;

/// One numbered, truncated section offered by a `context` query result.
#[derive(Debug, Clone, Serialize)]
pub struct ExpandableItem {
    pub file: PathBuf,
    pub start_line: u32,
    pub end_line: u32,
    pub label: String,
}

/// Identifies a single `context` call's result set, so a later `expand N`
/// can be checked against the call that produced it (§4.8: "scoped per
/// project").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpandCacheKey {
    pub project_root: PathBuf,
    pub symbol: String,
    pub file_pattern: Option<String>,
}

struct Entry {
    items: Vec<ExpandableItem>,
}

/// In-memory, process-lifetime cache of the most recent `context` result
/// per project. Not `Clone`: callers share one instance behind an `Arc`.
pub struct ExpandCache {
    capacity: usize,
    entries: Mutex<HashMap<ExpandCacheKey, Entry>>,
    last_key: Mutex<HashMap<PathBuf, ExpandCacheKey>>,
}

impl ExpandCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(HashMap::new()),
            last_key: Mutex::new(HashMap::new()),
        }
    }

    /// Record the numbered items from a `context` call, evicting the
    /// oldest entry once over capacity (insertion order, not LRU: a
    /// project this size rarely issues enough concurrent `context` calls
    /// to make recency tracking worth the bookkeeping).
    pub fn store(&self, key: ExpandCacheKey, items: Vec<ExpandableItem>) {
        let mut entries = self.entries.lock();
        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            if let Some(oldest) = entries.keys().next().cloned() {
                entries.remove(&oldest);
            }
        }
        self.last_key.lock().insert(key.project_root.clone(), key.clone());
        entries.insert(key, Entry { items });
    }

    /// The item at `index` (1-based, matching the numbering shown to the
    /// user) from a previously stored result.
    pub fn get(&self, key: &ExpandCacheKey, index: usize) -> Option<ExpandableItem> {
        let entries = self.entries.lock();
        let entry = entries.get(key)?;
        if index == 0 {
            return None;
        }
        entry.items.get(index - 1).cloned()
    }

    /// The key of the most recent `context` call for `project_root`, used
    /// when `expand N` is issued without repeating the symbol/pattern
    /// (§5 "a second cache tracks most recent context call per project").
    pub fn latest_key_for(&self, project_root: &PathBuf) -> Option<ExpandCacheKey> {
        self.last_key.lock().get(project_root).cloned()
    }

    /// Convenience for the common case: resolve `expand N` against
    /// whatever `context` call was last made for this project.
    pub fn expand(&self, project_root: &PathBuf, index: usize) -> Option<ExpandableItem> {
        let key = self.latest_key_for(project_root)?;
        self.get(&key, index)
    }
}

impl Default for ExpandCache {
    fn default() -> Self {
        Self::new(16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(label: &str) -> ExpandableItem {
        ExpandableItem { file: PathBuf::from("a.rs"), start_line: 1, end_line: 2, label: label.into() }
    }

    #[test]
    fn stores_and_retrieves_by_one_based_index() {
        let cache = ExpandCache::new(4);
        let key = ExpandCacheKey { project_root: PathBuf::from("/proj"), symbol: "foo".into(), file_pattern: None };
        cache.store(key.clone(), vec![item("a"), item("b")]);
        assert_eq!(cache.get(&key, 1).unwrap().label, "a");
        assert_eq!(cache.get(&key, 2).unwrap().label, "b");
        assert!(cache.get(&key, 0).is_none());
        assert!(cache.get(&key, 3).is_none());
    }

    #[test]
    fn expand_uses_latest_call_for_project() {
        let cache = ExpandCache::new(4);
        let root = PathBuf::from("/proj");
        let key = ExpandCacheKey { project_root: root.clone(), symbol: "foo".into(), file_pattern: None };
        cache.store(key, vec![item("only")]);
        let found = cache.expand(&root, 1).unwrap();
        assert_eq!(found.label, "only");
        assert!(cache.expand(&PathBuf::from("/other"), 1).is_none());
    }

    #[test]
    fn eviction_drops_oldest_entry_once_over_capacity() {
        let cache = ExpandCache::new(1);
        let key_a = ExpandCacheKey { project_root: PathBuf::from("/a"), symbol: "a".into(), file_pattern: None };
        let key_b = ExpandCacheKey { project_root: PathBuf::from("/b"), symbol: "b".into(), file_pattern: None };
        cache.store(key_a.clone(), vec![item("a")]);
        cache.store(key_b.clone(), vec![item("b")]);
        assert!(cache.get(&key_a, 1).is_none());
        assert!(cache.get(&key_b, 1).is_some());
    }
}
