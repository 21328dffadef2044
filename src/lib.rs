//! # scs-world-rs — SCS World-File Parser and Graph
//!
//! Parses the two declarative text formats of SCS truck simulators —
//! definition files (`.sii`) and annotated map files
//! (`.mbd`/`.aux`/`.base`/`.desc`) — and merges them into a single
//! in-memory, cross-referenced world graph.
//!
//! ## Design Principles
//!
//! 1. **Closed value model**: every parsed datum is a [`Value`] variant;
//!    resolution state is statically visible (`Unresolved` vs `Link`)
//! 2. **Parser owns nothing**: source text → typed properties is a pure
//!    function per file
//! 3. **Arena graph**: a resolved reference is an index into the node
//!    arena, so cyclic links are safe and own nothing
//! 4. **Explicit diagnostics**: duplicate values, merge conflicts and
//!    unresolved references are collected and returned, never dropped
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use scs_world::{load_definitions, Value};
//!
//! # fn example() -> scs_world::Result<()> {
//! let loaded = load_definitions(Path::new("def/world"), true)?;
//!
//! // Typed lookups over the dotted namespace
//! if let Some(size) = loaded.graph.lookup("road.look3.road_size") {
//!     println!("road size: {size}");
//! }
//!
//! // Resolved cross references are links into the graph arena
//! if let Some(Value::Link(target)) = loaded.graph.lookup("road.look5.reference") {
//!     println!("link -> {target}");
//! }
//!
//! for diagnostic in &loaded.diagnostics {
//!     eprintln!("{diagnostic}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Pipeline
//!
//! | Phase | Parallelism | Module |
//! |-------|-------------|--------|
//! | Lex + parse + structuralize | one task per file | [`grammar`], [`structure`] |
//! | Merge (largest file first) | sequential | [`graph::merge`] |
//! | Resolve references | sequential, exactly once | [`graph::resolve`] |

// ============================================================================
// Modules
// ============================================================================

pub mod diagnostics;
pub mod grammar;
pub mod graph;
pub mod load;
pub mod model;
pub mod structure;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{Entry, FileTree, Float2, Float3, Float4, Quaternion, StructFields, Value};

// ============================================================================
// Re-exports: Graph
// ============================================================================

pub use graph::{Format, Graph, Namespace, NodeId, Slot, Walked};

// ============================================================================
// Re-exports: Diagnostics and loading
// ============================================================================

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use load::{Loaded, load_definitions, load_map, parse_definition_str, parse_map_str};

// ============================================================================
// Error Types
// ============================================================================

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed token stream; fatal for the named file only.
    #[error("syntax error in {path}: {message}\n  entry: \"{line}\"")]
    Syntax {
        path: PathBuf,
        line: String,
        message: String,
    },

    /// `@include` is recognized but inclusion is not implemented.
    #[error("{path} uses @include \"{target}\", which is not supported")]
    IncludeUnsupported { path: PathBuf, target: String },

    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// One or more files failed; every failure is attempted and
    /// reported before the load as a whole gives up.
    #[error("{} world file(s) failed to load", failures.len())]
    LoadFailed { failures: Vec<Error> },
}

pub type Result<T> = std::result::Result<T, Error>;
