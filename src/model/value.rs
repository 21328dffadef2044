//! Universal value type shared by the definition and map grammars.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::graph::NodeId;

use super::{Float2, Float3, Float4, Quaternion};

/// Ordered field map of a `struct` record.
///
/// Field order is the order the fields appeared in the source file.
/// Unlike a namespace node, a struct is a closed field bag: the merger
/// never recurses into it.
pub type StructFields = IndexMap<String, Value>;

/// A typed value parsed from a world file.
///
/// Covers both grammars:
/// - definition format: generic 64-bit ints, decimal doubles, `&`-hex
///   singles, bools, text, tuples, references, arrays
/// - map format: width-tagged ints, singles, fixed-point vectors,
///   interned-string tokens, structs, float/struct arrays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    // Width-tagged integers (map format)
    U8(u8),
    U16(u16),
    S16(i16),
    U32(u32),
    S32(i32),
    U64(u64),
    S64(i64),

    /// Generic integer (definition format).
    Int(i64),
    /// Single-precision float — every `&`-hex or fixed-point decode.
    Float(f32),
    /// Double-precision float — definition-format decimal literals.
    Double(f64),
    Bool(bool),
    String(String),

    // Fixed-arity vectors
    Float2(Float2),
    Float3(Float3),
    Float4(Float4),
    Quaternion(Quaternion),

    /// Dotted-path cross reference awaiting resolution.
    Unresolved(String),
    /// Resolved cross reference: an index into the graph arena.
    Link(NodeId),

    /// Ordered list (array accumulation, `array_float`, `array_struct`).
    List(Vec<Value>),
    /// Closed field bag; not subject to namespace merge recursion.
    Struct(StructFields),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::S16(_) => "s16",
            Value::U32(_) => "u32",
            Value::S32(_) => "s32",
            Value::U64(_) => "u64",
            Value::S64(_) => "s64",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Bool(_) => "bool",
            Value::String(_) => "string",
            Value::Float2(_) => "float2",
            Value::Float3(_) => "float3",
            Value::Float4(_) => "float4",
            Value::Quaternion(_) => "quaternion",
            Value::Unresolved(_) => "unresolved",
            Value::Link(_) => "link",
            Value::List(_) => "list",
            Value::Struct(_) => "struct",
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, Value::Unresolved(_))
    }

    /// Extract any integer variant widened to u64.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::U8(v) => Some(u64::from(*v)),
            Value::U16(v) => Some(u64::from(*v)),
            Value::U32(v) => Some(u64::from(*v)),
            Value::U64(v) => Some(*v),
            Value::S16(v) => u64::try_from(*v).ok(),
            Value::S32(v) => u64::try_from(*v).ok(),
            Value::S64(v) | Value::Int(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Extract any integer variant widened to i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::U8(v) => Some(i64::from(*v)),
            Value::U16(v) => Some(i64::from(*v)),
            Value::S16(v) => Some(i64::from(*v)),
            Value::U32(v) => Some(i64::from(*v)),
            Value::S32(v) => Some(i64::from(*v)),
            Value::U64(v) => i64::try_from(*v).ok(),
            Value::S64(v) | Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Extract either float variant narrowed to f32.
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Double(v) => Some(*v as f32),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(f64::from(*v)),
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The dotted path of an unresolved reference placeholder.
    pub fn as_reference(&self) -> Option<&str> {
        match self {
            Value::Unresolved(path) => Some(path),
            _ => None,
        }
    }

    pub fn as_link(&self) -> Option<NodeId> {
        match self {
            Value::Link(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructFields> {
        match self {
            Value::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_float3(&self) -> Option<Float3> {
        match self {
            Value::Float3(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_quaternion(&self) -> Option<Quaternion> {
        match self {
            Value::Quaternion(q) => Some(*q),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}
impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}
impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}
impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}
impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}
impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}
impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}
impl From<Float2> for Value {
    fn from(v: Float2) -> Self {
        Value::Float2(v)
    }
}
impl From<Float3> for Value {
    fn from(v: Float3) -> Self {
        Value::Float3(v)
    }
}
impl From<Float4> for Value {
    fn from(v: Float4) -> Self {
        Value::Float4(v)
    }
}
impl From<Quaternion> for Value {
    fn from(v: Quaternion) -> Self {
        Value::Quaternion(v)
    }
}
impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::U8(v) => write!(f, "{v}"),
            Value::U16(v) => write!(f, "{v}"),
            Value::S16(v) => write!(f, "{v}"),
            Value::U32(v) => write!(f, "{v}"),
            Value::S32(v) => write!(f, "{v}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::S64(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::String(s) => write!(f, "\"{s}\""),
            Value::Float2(v) => write!(f, "{v}"),
            Value::Float3(v) => write!(f, "{v}"),
            Value::Float4(v) => write!(f, "{v}"),
            Value::Quaternion(v) => write!(f, "{v}"),
            Value::Unresolved(path) => write!(f, "?{path}"),
            Value::Link(id) => write!(f, "->{id}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
            Value::Struct(fields) => {
                write!(f, "{{")?;
                for (i, (k, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}
