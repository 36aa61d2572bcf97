//! Import graph and inheritance graph (§3 "Edge"/"InheritanceEdge", §4.6
//! steps 4-5). Both are directed, possibly cyclic adjacency maps keyed by
//! the lightweight identifiers the rest of the index already uses (file
//! paths for imports, bare type names for inheritance) rather than a
//! generic graph crate. Traversals maintain a visited set and surface
//! circular edges instead of looping.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::types::{ImportEdge, InheritanceEdge};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Imports,
    Importers,
    Both,
}

/// One level of a file-level BFS (§4.9 `graph`).
#[derive(Debug, Clone, Serialize)]
pub struct GraphLevel {
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphResult {
    pub levels: Vec<GraphLevel>,
    /// Edges that would have revisited an already-seen node.
    pub circular: Vec<(PathBuf, PathBuf)>,
}

#[derive(Debug, Default)]
pub struct ImportGraph {
    /// importer -> edges out of it.
    outgoing: HashMap<PathBuf, Vec<ImportEdge>>,
    /// imported file -> files that import it.
    incoming: HashMap<PathBuf, Vec<PathBuf>>,
}

impl ImportGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_edge(&mut self, edge: ImportEdge) {
        self.incoming.entry(edge.to.clone()).or_default().push(edge.from.clone());
        self.outgoing.entry(edge.from.clone()).or_default().push(edge);
    }

    /// Drop every edge touching `file`, as either endpoint (§4.6
    /// incremental update step 3: "invalidate ... both incoming and
    /// outgoing").
    pub fn remove_file(&mut self, file: &Path) {
        self.outgoing.remove(file);
        self.incoming.remove(file);
        for edges in self.outgoing.values_mut() {
            edges.retain(|e| e.to != file);
        }
        for importers in self.incoming.values_mut() {
            importers.retain(|p| p != file);
        }
    }

    pub fn edges_from(&self, file: &Path) -> &[ImportEdge] {
        self.outgoing.get(file).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn importers_of(&self, file: &Path) -> &[PathBuf] {
        self.incoming.get(file).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Depth-limited BFS from `start` (§4.9 `graph`). Self-cycles and
    /// longer cycles are both recorded rather than followed.
    pub fn bfs(&self, start: &Path, direction: Direction, max_depth: usize) -> GraphResult {
        let mut levels = Vec::new();
        let mut circular = Vec::new();
        let mut visited: HashSet<PathBuf> = HashSet::new();
        visited.insert(start.to_path_buf());
        let mut frontier = vec![start.to_path_buf()];

        for _ in 0..max_depth {
            if frontier.is_empty() {
                break;
            }
            let mut next = Vec::new();
            for node in &frontier {
                let neighbors = self.neighbors(node, direction);
                for neighbor in neighbors {
                    if visited.contains(&neighbor) {
                        circular.push((node.clone(), neighbor));
                        continue;
                    }
                    visited.insert(neighbor.clone());
                    next.push(neighbor);
                }
            }
            if next.is_empty() {
                break;
            }
            levels.push(GraphLevel { files: next.clone() });
            frontier = next;
        }

        GraphResult { levels, circular }
    }

    fn neighbors(&self, file: &Path, direction: Direction) -> Vec<PathBuf> {
        match direction {
            Direction::Imports => self.edges_from(file).iter().map(|e| e.to.clone()).collect(),
            Direction::Importers => self.importers_of(file).to_vec(),
            Direction::Both => {
                let mut out: Vec<PathBuf> = self.edges_from(file).iter().map(|e| e.to.clone()).collect();
                out.extend(self.importers_of(file).iter().cloned());
                out
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct InheritanceGraph {
    /// child name -> (parent name, file) pairs contributed by that file.
    children: HashMap<Box<str>, Vec<InheritanceEdge>>,
    /// parent name -> child names, used by `deadcode`/method resolution
    /// walking down as well as up.
    parents: HashMap<Box<str>, Vec<Box<str>>>,
}

impl InheritanceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_edge(&mut self, edge: InheritanceEdge) {
        self.parents.entry(edge.parent.clone()).or_default().push(edge.child.clone());
        self.children.entry(edge.child.clone()).or_default().push(edge);
    }

    pub fn remove_file(&mut self, file: &Path) {
        for edges in self.children.values_mut() {
            edges.retain(|e| e.file != file);
        }
        self.children.retain(|_, edges| !edges.is_empty());
        self.parents.clear();
        for edges in self.children.values() {
            for edge in edges {
                self.parents.entry(edge.parent.clone()).or_default().push(edge.child.clone());
            }
        }
    }

    /// Direct parents of `child`, in declaration order.
    pub fn parents_of(&self, child: &str) -> Vec<&str> {
        self.children
            .get(child)
            .map(|edges| edges.iter().map(|e| e.parent.as_ref()).collect())
            .unwrap_or_default()
    }

    /// Walk the parent chain of `child`, stopping on a cycle.
    pub fn ancestor_chain(&self, child: &str) -> Vec<Box<str>> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut frontier: Vec<Box<str>> = self.parents_of(child).into_iter().map(Box::from).collect();
        while let Some(name) = frontier.pop() {
            if !visited.insert(name.clone()) {
                continue;
            }
            let next = self.parents_of(&name);
            chain.push(name);
            frontier.extend(next.into_iter().map(Box::from));
        }
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(from: &str, to: &str) -> ImportEdge {
        ImportEdge {
            from: PathBuf::from(from),
            to: PathBuf::from(to),
            names: Vec::new(),
            dynamic: false,
        }
    }

    #[test]
    fn self_cycle_is_reported_not_followed() {
        let mut graph = ImportGraph::new();
        graph.add_edge(edge("a.rs", "a.rs"));
        let result = graph.bfs(Path::new("a.rs"), Direction::Imports, 5);
        assert!(result.levels.is_empty());
        assert_eq!(result.circular, vec![(PathBuf::from("a.rs"), PathBuf::from("a.rs"))]);
    }

    #[test]
    fn bfs_respects_max_depth() {
        let mut graph = ImportGraph::new();
        graph.add_edge(edge("a.rs", "b.rs"));
        graph.add_edge(edge("b.rs", "c.rs"));
        graph.add_edge(edge("c.rs", "d.rs"));
        let result = graph.bfs(Path::new("a.rs"), Direction::Imports, 2);
        assert_eq!(result.levels.len(), 2);
        assert_eq!(result.levels[1].files, vec![PathBuf::from("c.rs")]);
    }

    #[test]
    fn remove_file_drops_incoming_and_outgoing() {
        let mut graph = ImportGraph::new();
        graph.add_edge(edge("a.rs", "b.rs"));
        graph.add_edge(edge("b.rs", "c.rs"));
        graph.remove_file(Path::new("b.rs"));
        assert!(graph.edges_from(Path::new("a.rs")).is_empty());
        assert!(graph.edges_from(Path::new("b.rs")).is_empty());
    }

    #[test]
    fn inheritance_chain_walks_multiple_levels() {
        let mut graph = InheritanceGraph::new();
        graph.add_edge(InheritanceEdge { child: "Child".into(), parent: "Base".into(), file: PathBuf::from("a.rs") });
        graph.add_edge(InheritanceEdge { child: "Base".into(), parent: "Root".into(), file: PathBuf::from("a.rs") });
        let chain = graph.ancestor_chain("Child");
        assert_eq!(chain, vec![Box::<str>::from("Base"), Box::<str>::from("Root")]);
    }
}
