//! Structuralizer — turns one file's flat property stream into a
//! nested per-file tree.
//!
//! Array-tagged properties accumulate into ordered lists (a single
//! occurrence still yields a one-element list). Non-array duplicates
//! emit a duplicate-value diagnostic and the later value wins.

use std::path::Path;

use crate::diagnostics::Diagnostics;
use crate::grammar::{Property, PropertyKind, PropertyValue, SiiEntry};
use crate::model::{Entry, FileTree, StructFields, Value};

/// Structuralize a definition file: each entry's property map lands at
/// its dotted name, decomposed into nested namespace nodes.
pub fn structuralize_definition(
    entries: Vec<SiiEntry>,
    path: &Path,
    diagnostics: &mut Diagnostics,
) -> FileTree {
    let mut tree = FileTree::new();
    for entry in entries {
        let context = format!("{}:{}", entry.group, entry.name);
        let mut properties = FileTree::new();
        for property in entry.properties {
            store(&mut properties, property, path, &context, diagnostics);
        }

        // Descend all but the final segment, then (re)place the
        // property map there — a repeated entry name replaces the
        // earlier entry wholesale.
        let mut container = &mut tree;
        let mut pieces = entry.name.split('.').peekable();
        while let Some(piece) = pieces.next() {
            if pieces.peek().is_some() {
                container = container.nested_mut(piece);
            } else {
                container
                    .entries
                    .insert(piece.to_owned(), Entry::Nested(properties));
                break;
            }
        }
    }
    tree
}

/// Structuralize an annotated map file: a flat identifier → value map,
/// with `struct`/`array_struct` groups recursively wrapped as struct
/// values first.
pub fn structuralize_map(
    properties: Vec<Property>,
    path: &Path,
    diagnostics: &mut Diagnostics,
) -> FileTree {
    let mut tree = FileTree::new();
    for property in properties {
        store(&mut tree, property, path, "", diagnostics);
    }
    tree
}

fn store(
    tree: &mut FileTree,
    property: Property,
    path: &Path,
    context: &str,
    diagnostics: &mut Diagnostics,
) {
    let Property { kind, identifier, value } = property;
    let value = build_value(value, path, context, diagnostics);

    if kind == PropertyKind::Array {
        // First occurrence initializes the list; every occurrence
        // (first included) appends one element.
        match tree.entries.get_mut(&identifier) {
            Some(Entry::Value(Value::List(items))) => items.push(value),
            _ => {
                tree.entries
                    .insert(identifier, Entry::Value(Value::List(vec![value])));
            }
        }
        return;
    }

    if tree.entries.contains_key(&identifier) {
        diagnostics.duplicate_value(path, context, &identifier);
    }
    tree.entries.insert(identifier, Entry::Value(value));
}

fn build_value(
    value: PropertyValue,
    path: &Path,
    context: &str,
    diagnostics: &mut Diagnostics,
) -> Value {
    match value {
        PropertyValue::Scalar(value) => value,
        PropertyValue::Struct(members) => {
            Value::Struct(struct_fields(members, path, context, diagnostics))
        }
        PropertyValue::StructList(groups) => Value::List(
            groups
                .into_iter()
                .map(|members| Value::Struct(struct_fields(members, path, context, diagnostics)))
                .collect(),
        ),
    }
}

fn struct_fields(
    members: Vec<Property>,
    path: &Path,
    context: &str,
    diagnostics: &mut Diagnostics,
) -> StructFields {
    let mut fields = StructFields::new();
    for member in members {
        let Property { kind: _, identifier, value } = member;
        let value = build_value(value, path, context, diagnostics);
        if fields.contains_key(&identifier) {
            diagnostics.duplicate_value(path, context, &identifier);
        }
        fields.insert(identifier, value);
    }
    fields
}
