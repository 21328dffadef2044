//! Resolver — the single post-merge pass that swaps reference
//! placeholders for direct links.
//!
//! The pass scans the arena linearly, so every namespace is visited
//! exactly once and cycles between resolved links can never loop the
//! walk. Patches are collected against the immutable graph first and
//! applied after, which keeps every path lookup root-relative and
//! independent of visit order.

use tracing::debug;

use crate::diagnostics::Diagnostics;
use crate::model::Value;

use super::{Graph, NodeId, Slot, Walked};

/// Where a patched value lives: a namespace entry or a road-network
/// node record.
enum Location {
    Entry { node: NodeId, key: String },
    NodeRecord { uid: u64 },
}

/// Path from that location down into nested lists and struct fields.
#[derive(Clone)]
enum Step {
    Index(usize),
    Field(String),
}

struct Patch {
    location: Location,
    steps: Vec<Step>,
    replacement: Value,
}

pub(crate) fn resolve(graph: &mut Graph, diagnostics: &mut Diagnostics) {
    let mut patches = Vec::new();

    for index in 0..graph.namespace_count() {
        let id = NodeId(index as u32);
        let Some(namespace) = graph.namespace(id) else {
            continue;
        };
        for (key, slot) in &namespace.entries {
            if let Slot::Value(value) = slot {
                let mut steps = Vec::new();
                scan(
                    graph,
                    value,
                    &mut steps,
                    &mut |steps, replacement| {
                        patches.push(Patch {
                            location: Location::Entry { node: id, key: key.clone() },
                            steps,
                            replacement,
                        });
                    },
                    diagnostics,
                );
            }
        }
    }

    for (uid, record) in graph.nodes() {
        let mut steps = Vec::new();
        scan(
            graph,
            record,
            &mut steps,
            &mut |steps, replacement| {
                patches.push(Patch {
                    location: Location::NodeRecord { uid: *uid },
                    steps,
                    replacement,
                });
            },
            diagnostics,
        );
    }

    debug!(patches = patches.len(), "applying reference resolutions");
    for patch in patches {
        apply(graph, patch);
    }
}

/// Walk one value top-down, reporting each resolvable placeholder.
/// Already-minted links are left alone, so a second pass over a fully
/// resolved graph finds nothing to do.
fn scan(
    graph: &Graph,
    value: &Value,
    steps: &mut Vec<Step>,
    found: &mut impl FnMut(Vec<Step>, Value),
    diagnostics: &mut Diagnostics,
) {
    match value {
        Value::Unresolved(path) => match graph.walk(path) {
            Some(Walked::Namespace(id)) => found(steps.clone(), Value::Link(id)),
            // A scalar target is cloned into place; links are only
            // minted for namespaces, which is where cycles can form.
            Some(Walked::Value(target)) if !target.is_unresolved() => {
                found(steps.clone(), target.clone());
            }
            _ => diagnostics.unresolved_reference(path),
        },
        Value::List(items) => {
            for (index, item) in items.iter().enumerate() {
                steps.push(Step::Index(index));
                scan(graph, item, steps, found, diagnostics);
                steps.pop();
            }
        }
        Value::Struct(fields) => {
            for (key, field) in fields {
                steps.push(Step::Field(key.clone()));
                scan(graph, field, steps, found, diagnostics);
                steps.pop();
            }
        }
        _ => {}
    }
}

fn apply(graph: &mut Graph, patch: Patch) {
    let root_value = match patch.location {
        Location::Entry { node, key } => {
            match graph.namespace_mut(node).entries.get_mut(&key) {
                Some(Slot::Value(value)) => value,
                _ => return,
            }
        }
        Location::NodeRecord { uid } => match graph.node_index.get_mut(&uid) {
            Some(record) => record,
            None => return,
        },
    };
    if let Some(slot) = navigate(root_value, &patch.steps) {
        *slot = patch.replacement;
    }
}

fn navigate<'v>(value: &'v mut Value, steps: &[Step]) -> Option<&'v mut Value> {
    let mut current = value;
    for step in steps {
        current = match (step, current) {
            (Step::Index(index), Value::List(items)) => items.get_mut(*index)?,
            (Step::Field(key), Value::Struct(fields)) => fields.get_mut(key)?,
            _ => return None,
        };
    }
    Some(current)
}
