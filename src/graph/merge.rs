//! Merger — folds per-file trees into the unified graph.
//!
//! Per key: absent inserts; namespace meets namespace recurses; list
//! meets list concatenates; anything else is a conflict (diagnostic,
//! later value wins). The map format additionally routes top-level
//! `nodes` records into the uid-keyed node index (silent last-wins)
//! while `items` concatenates like any other list.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::model::{Entry, FileTree, Value};

use super::{Graph, NodeId, Slot};

/// Which grammar produced a file tree; decides the top-level special
/// cases during merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Format {
    Definition,
    Map,
}

pub(crate) fn merge_file(
    graph: &mut Graph,
    tree: FileTree,
    format: Format,
    path: &Path,
    diagnostics: &mut Diagnostics,
) {
    debug!(path = %path.display(), ?format, entries = tree.entries.len(), "merging file tree");

    let root = graph.root();
    for (key, entry) in tree.entries {
        if format == Format::Map && key == "nodes" {
            if let Entry::Value(Value::List(records)) = entry {
                merge_node_records(graph, records, path, diagnostics);
                continue;
            }
        }
        merge_entry(graph, root, key, entry, path, "", diagnostics);
    }
}

/// Road-network node records are keyed by their `uid` field; a later
/// record with the same uid replaces the earlier one without a
/// diagnostic (deliberate last-wins policy of the source format).
fn merge_node_records(
    graph: &mut Graph,
    records: Vec<Value>,
    path: &Path,
    diagnostics: &mut Diagnostics,
) {
    for record in records {
        let uid = record
            .as_struct()
            .and_then(|fields| fields.get("uid"))
            .and_then(Value::as_u64);
        match uid {
            Some(uid) => graph.insert_node_record(uid, record),
            None => diagnostics.push(
                Diagnostic::warning(
                    DiagnosticKind::MergeConflict,
                    "node record without a `uid` field discarded",
                )
                .with_path(path),
            ),
        }
    }
}

fn merge_entry(
    graph: &mut Graph,
    node: NodeId,
    key: String,
    entry: Entry,
    path: &Path,
    prefix: &str,
    diagnostics: &mut Diagnostics,
) {
    let key_path = if prefix.is_empty() {
        key.clone()
    } else {
        format!("{prefix}.{key}")
    };

    match entry {
        Entry::Nested(subtree) => {
            let child = match graph.namespace_mut(node).entries.get(&key) {
                Some(Slot::Namespace(id)) => *id,
                Some(Slot::Value(_)) => {
                    diagnostics.merge_conflict(path, &key_path);
                    let id = graph.alloc();
                    graph
                        .namespace_mut(node)
                        .entries
                        .insert(key, Slot::Namespace(id));
                    id
                }
                None => {
                    let id = graph.alloc();
                    graph
                        .namespace_mut(node)
                        .entries
                        .insert(key, Slot::Namespace(id));
                    id
                }
            };
            for (sub_key, sub_entry) in subtree.entries {
                merge_entry(graph, child, sub_key, sub_entry, path, &key_path, diagnostics);
            }
        }

        Entry::Value(incoming) => match graph.namespace_mut(node).entries.get_mut(&key) {
            None => {
                graph
                    .namespace_mut(node)
                    .entries
                    .insert(key, Slot::Value(incoming));
            }
            Some(Slot::Value(Value::List(unified))) if incoming.is_list() => {
                // unified ++ incoming, preserving encounter order.
                let Value::List(rest) = incoming else { unreachable!() };
                unified.extend(rest);
            }
            Some(slot) => {
                diagnostics.merge_conflict(path, &key_path);
                *slot = Slot::Value(incoming);
            }
        },
    }
}
