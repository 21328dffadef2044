//! # World-File Grammars
//!
//! Two hand-written lexer/parser pairs sharing one typed token model:
//! the definition format (`.sii`) and the annotated map format
//! (`.mbd`/`.aux`/`.base`/`.desc`). Each produces properties in strict
//! source order; the structuralizer turns them into a per-file tree.
//!
//! Pure functions — no I/O, no state, no graph dependency.

pub mod definition;
pub mod map;
pub mod numeric;

use serde::{Deserialize, Serialize};

use crate::model::Value;

pub use definition::{SiiEntry, parse_definition};
pub use map::parse_map;

/// Declared kind of a property, as tagged in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyKind {
    // Definition format
    Int,
    Float,
    Bool,
    Text,
    Tuple,
    Reference,
    Array,

    // Map format
    U8,
    U16,
    S16,
    U32,
    S32,
    U64,
    S64,
    Token,
    String,
    Fixed2,
    Fixed3,
    Float4,
    Quaternion,
    Struct,
    ArrayFloat,
    ArrayStruct,
}

/// Payload of one parsed property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Scalar(Value),
    /// Members of a `struct name { … }` group, in source order.
    Struct(Vec<Property>),
    /// Anonymous members of an `array_struct name [ … ]` group.
    StructList(Vec<Vec<Property>>),
}

/// One typed `(kind, identifier, value)` token, produced in source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub kind: PropertyKind,
    pub identifier: String,
    pub value: PropertyValue,
}

impl Property {
    pub fn scalar(kind: PropertyKind, identifier: impl Into<String>, value: Value) -> Self {
        Self {
            kind,
            identifier: identifier.into(),
            value: PropertyValue::Scalar(value),
        }
    }
}

/// Source span in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// The full source line containing `pos`, for grammar-error reports.
pub(crate) fn line_at(source: &str, pos: usize) -> &str {
    let pos = pos.min(source.len());
    let start = source[..pos].rfind('\n').map_or(0, |i| i + 1);
    let end = source[pos..].find('\n').map_or(source.len(), |i| pos + i);
    source[start..end].trim()
}
