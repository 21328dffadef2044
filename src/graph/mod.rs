//! # Unified World Graph
//!
//! The merged, cross-referenced output of a load. Namespace nodes live
//! in an arena indexed by [`NodeId`]; a resolved reference is just an
//! index into that arena, so cyclic links are safe and own nothing.

pub mod merge;
pub mod resolve;

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostics;
use crate::model::{FileTree, Value};

pub use merge::Format;

/// Stable arena index of a namespace node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One slot inside a namespace node: either a leaf value or a child
/// namespace. Struct values sit on the `Value` side — they are field
/// bags, not namespaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Slot {
    Value(Value),
    Namespace(NodeId),
}

/// Dict-shaped node subject to merge recursion, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Namespace {
    pub entries: IndexMap<String, Slot>,
}

/// Result of a root-relative path walk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Walked<'g> {
    Namespace(NodeId),
    Value(&'g Value),
}

/// The fully merged world graph. Built by the merger, mutated in place
/// once by the resolver, then treated as read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    arena: Vec<Namespace>,
    root: NodeId,
    /// Map-format road-network nodes, keyed by uid. Later records with
    /// the same uid replace earlier ones without a diagnostic — this
    /// mirrors the source format's last-wins policy (flagged for
    /// product-owner confirmation; see DESIGN.md).
    node_index: IndexMap<u64, Value>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    pub fn new() -> Self {
        Self {
            arena: vec![Namespace::default()],
            root: NodeId(0),
            node_index: IndexMap::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of namespace nodes in the arena.
    pub fn namespace_count(&self) -> usize {
        self.arena.len()
    }

    pub fn namespace(&self, id: NodeId) -> Option<&Namespace> {
        self.arena.get(id.0 as usize)
    }

    pub(crate) fn namespace_mut(&mut self, id: NodeId) -> &mut Namespace {
        &mut self.arena[id.0 as usize]
    }

    pub(crate) fn alloc(&mut self) -> NodeId {
        let id = NodeId(self.arena.len() as u32);
        self.arena.push(Namespace::default());
        id
    }

    /// Slot at `key` directly under the namespace `id`.
    pub fn entry(&self, id: NodeId, key: &str) -> Option<&Slot> {
        self.namespace(id)?.entries.get(key)
    }

    /// Root-relative dotted-path walk. Intermediate segments traverse
    /// child namespaces and already-resolved links; anything else ends
    /// the walk. The final segment may land on any slot.
    pub fn walk(&self, path: &str) -> Option<Walked<'_>> {
        let mut current = self.root;
        let mut pieces = path.split('.').peekable();
        while let Some(piece) = pieces.next() {
            let slot = self.namespace(current)?.entries.get(piece)?;
            let last = pieces.peek().is_none();
            match slot {
                Slot::Namespace(id) | Slot::Value(Value::Link(id)) => {
                    if last {
                        return Some(Walked::Namespace(*id));
                    }
                    current = *id;
                }
                Slot::Value(value) => {
                    return last.then_some(Walked::Value(value));
                }
            }
        }
        None
    }

    /// Leaf value at a dotted path, if the walk ends on one.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        match self.walk(path)? {
            Walked::Value(value) => Some(value),
            Walked::Namespace(_) => None,
        }
    }

    /// Map-format road-network nodes, uid → record.
    pub fn nodes(&self) -> &IndexMap<u64, Value> {
        &self.node_index
    }

    pub fn node(&self, uid: u64) -> Option<&Value> {
        self.node_index.get(&uid)
    }

    /// Map-format placed items, in cross-file encounter order.
    pub fn items(&self) -> &[Value] {
        match self.entry(self.root, "items") {
            Some(Slot::Value(Value::List(items))) => items,
            _ => &[],
        }
    }

    pub(crate) fn insert_node_record(&mut self, uid: u64, record: Value) {
        self.node_index.insert(uid, record);
    }

    /// Fold one structuralized file into the graph. Files must be fed
    /// in the deterministic merge order chosen by the loader.
    pub fn merge_file_tree(
        &mut self,
        tree: FileTree,
        format: Format,
        path: &std::path::Path,
        diagnostics: &mut Diagnostics,
    ) {
        merge::merge_file(self, tree, format, path, diagnostics);
    }

    /// Turn every reference placeholder into a direct link (or report
    /// it unresolved). Runs exactly once per load, strictly after all
    /// files are merged; running it again on a fully resolved graph is
    /// a no-op.
    pub fn resolve(&mut self, diagnostics: &mut Diagnostics) {
        resolve::resolve(self, diagnostics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_graph_has_root() {
        let graph = Graph::new();
        assert_eq!(graph.namespace_count(), 1);
        assert!(graph.namespace(graph.root()).unwrap().entries.is_empty());
        assert!(graph.items().is_empty());
    }

    #[test]
    fn test_walk_through_namespaces() {
        let mut graph = Graph::new();
        let a = graph.alloc();
        let b = graph.alloc();
        let root = graph.root();
        graph
            .namespace_mut(root)
            .entries
            .insert("a".into(), Slot::Namespace(a));
        graph
            .namespace_mut(a)
            .entries
            .insert("b".into(), Slot::Namespace(b));
        graph
            .namespace_mut(b)
            .entries
            .insert("leaf".into(), Slot::Value(Value::Int(7)));

        assert_eq!(graph.walk("a.b"), Some(Walked::Namespace(b)));
        assert_eq!(graph.lookup("a.b.leaf"), Some(&Value::Int(7)));
        assert_eq!(graph.walk("a.missing.leaf"), None);
        assert_eq!(graph.walk(""), None);
    }

    #[test]
    fn test_walk_follows_links_mid_path() {
        let mut graph = Graph::new();
        let target = graph.alloc();
        let root = graph.root();
        graph
            .namespace_mut(target)
            .entries
            .insert("leaf".into(), Slot::Value(Value::Bool(true)));
        graph
            .namespace_mut(root)
            .entries
            .insert("alias".into(), Slot::Value(Value::Link(target)));

        assert_eq!(graph.lookup("alias.leaf"), Some(&Value::Bool(true)));
        assert_eq!(graph.walk("alias"), Some(Walked::Namespace(target)));
    }
}
