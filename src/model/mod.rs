//! # World-File Value Model
//!
//! The typed value model shared by both grammars and the graph.
//! These types cross every boundary: grammar ↔ structuralizer ↔ merger
//! ↔ resolver ↔ user.
//!
//! Design rule: pure data — no I/O, no parsing, no graph state here.

pub mod tree;
pub mod value;
pub mod vector;

pub use tree::{Entry, FileTree};
pub use value::{StructFields, Value};
pub use vector::{Float2, Float3, Float4, Quaternion};
