//! Import dependency graph
//!
//! Tracks which documents import which and provides:
//! - Dependency-first ordering that tolerates cycles
//! - Cycle discovery (Solidity permits import cycles, so they are reported,
//!   not rejected)
//!
//! Both walks use an explicit stack; import chains can be arbitrarily deep.

use rustc_hash::{FxHashMap, FxHashSet};
use std::path::{Path, PathBuf};

/// A node in the import graph
#[derive(Debug, Clone)]
pub struct ImportNode {
    /// Canonical path of the document
    pub path: PathBuf,
    /// Documents this document imports
    pub imports: Vec<PathBuf>,
}

impl ImportNode {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            imports: Vec::new(),
        }
    }
}

/// Import graph over canonical paths, remembering insertion order
#[derive(Debug, Default)]
pub struct ImportGraph {
    nodes: FxHashMap<PathBuf, ImportNode>,
    order: Vec<PathBuf>,
}

impl ImportGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document to the graph
    pub fn add_module(&mut self, path: PathBuf) {
        if !self.nodes.contains_key(&path) {
            self.order.push(path.clone());
            self.nodes.insert(path.clone(), ImportNode::new(path));
        }
    }

    /// Add an edge: `from` imports `to`
    pub fn add_dependency(&mut self, from: PathBuf, to: PathBuf) {
        self.add_module(from.clone());
        self.add_module(to.clone());

        if let Some(node) = self.nodes.get_mut(&from) {
            if !node.imports.contains(&to) {
                node.imports.push(to);
            }
        }
    }

    /// Get a node by path
    pub fn get(&self, path: &Path) -> Option<&ImportNode> {
        self.nodes.get(path)
    }

    /// Number of documents in the graph
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All documents, dependencies before the documents importing them
    ///
    /// Roots are visited in insertion order and imports in declaration order,
    /// so the result is deterministic. An edge closing a cycle is skipped,
    /// which places the cycle's members in discovery order.
    pub fn dependency_order(&self) -> Vec<PathBuf> {
        let mut result = Vec::with_capacity(self.nodes.len());
        let mut visited: FxHashSet<&Path> = FxHashSet::default();

        for root in &self.order {
            if !visited.insert(root.as_path()) {
                continue;
            }

            // (node, index of the next import to visit)
            let mut stack: Vec<(&Path, usize)> = vec![(root.as_path(), 0)];
            while let Some((path, next)) = stack.pop() {
                let imports = &self.nodes[path].imports;
                if let Some(dep) = imports.get(next) {
                    stack.push((path, next + 1));
                    if visited.insert(dep.as_path()) {
                        stack.push((dep.as_path(), 0));
                    }
                } else {
                    result.push(path.to_path_buf());
                }
            }
        }

        result
    }

    /// Find one import cycle, if any
    ///
    /// The returned path starts and ends with the same document.
    pub fn find_cycle(&self) -> Option<Vec<PathBuf>> {
        let mut visited: FxHashSet<&Path> = FxHashSet::default();

        for root in &self.order {
            if !visited.insert(root.as_path()) {
                continue;
            }

            // The stack doubles as the current DFS path
            let mut stack: Vec<(&Path, usize)> = vec![(root.as_path(), 0)];
            let mut on_stack: FxHashSet<&Path> = FxHashSet::default();
            on_stack.insert(root.as_path());

            while let Some(frame) = stack.last_mut() {
                let (path, next) = *frame;
                frame.1 += 1;
                let Some(dep) = self.nodes[path].imports.get(next) else {
                    on_stack.remove(path);
                    stack.pop();
                    continue;
                };

                if on_stack.contains(dep.as_path()) {
                    let start = stack.iter().position(|(p, _)| *p == dep.as_path())?;
                    let mut cycle: Vec<PathBuf> =
                        stack[start..].iter().map(|(p, _)| p.to_path_buf()).collect();
                    cycle.push(dep.clone());
                    return Some(cycle);
                }
                if visited.insert(dep.as_path()) {
                    on_stack.insert(dep.as_path());
                    stack.push((dep.as_path(), 0));
                }
            }
        }

        None
    }
}
