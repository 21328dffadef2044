//! Per-file tree produced by the structuralizer and consumed by the merger.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Value;

/// One slot inside a per-file tree.
///
/// `Nested` marks namespace nesting (subject to recursive merge),
/// which is distinct from a [`Value::Struct`] field bag (which is not).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Entry {
    Value(Value),
    Nested(FileTree),
}

/// The structuralized content of a single world file, keyed by
/// identifier in source order. Built once per file, then moved into
/// the unified graph by the merger and dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileTree {
    pub entries: IndexMap<String, Entry>,
}

impl FileTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    pub fn insert_value(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), Entry::Value(value));
    }

    /// Get or create the nested tree at `key`. An existing non-nested
    /// slot is replaced, mirroring the source behavior of dotted-name
    /// decomposition.
    pub fn nested_mut(&mut self, key: &str) -> &mut FileTree {
        let entry = self
            .entries
            .entry(key.to_owned())
            .or_insert_with(|| Entry::Nested(FileTree::new()));
        if !matches!(entry, Entry::Nested(_)) {
            *entry = Entry::Nested(FileTree::new());
        }
        match entry {
            Entry::Nested(tree) => tree,
            Entry::Value(_) => unreachable!("slot was just replaced with a nested tree"),
        }
    }

    /// Descend a dotted path, creating intermediate namespaces, and
    /// return the tree for the final segment.
    pub fn nested_path_mut(&mut self, dotted: &str) -> &mut FileTree {
        let mut tree = self;
        for piece in dotted.split('.') {
            tree = tree.nested_mut(piece);
        }
        tree
    }
}
