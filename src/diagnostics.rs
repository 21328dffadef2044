//! Structured, non-fatal findings from structuralization, merge and
//! resolution. Collected explicitly — no ambient warning state.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Note,
}

/// What kind of non-fatal condition was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// A non-array identifier occurred twice within one file.
    DuplicateValue,
    /// A scalar/struct key collided during the cross-file merge.
    MergeConflict,
    /// A reference path could not be walked to completion.
    UnresolvedReference,
}

/// A single non-fatal finding. The load never aborts on these; they
/// are returned alongside the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
    /// Source file, where one can be attributed (merge-phase findings
    /// carry the incoming file).
    pub path: Option<PathBuf>,
}

impl Diagnostic {
    pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            message: message.into(),
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Note => "note",
        };
        let kind = match self.kind {
            DiagnosticKind::DuplicateValue => "duplicate-value",
            DiagnosticKind::MergeConflict => "merge-conflict",
            DiagnosticKind::UnresolvedReference => "unresolved-reference",
        };
        write!(f, "{severity}[{kind}]: {}", self.message)?;
        if let Some(path) = &self.path {
            write!(f, " ({})", path.display())?;
        }
        Ok(())
    }
}

/// Collector threaded through every structuralize/merge/resolve call.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(%diagnostic, "world-file diagnostic");
        self.entries.push(diagnostic);
    }

    pub fn duplicate_value(&mut self, path: &Path, context: &str, identifier: &str) {
        self.push(
            Diagnostic::warning(
                DiagnosticKind::DuplicateValue,
                format!("duplicate value `{identifier}` in `{context}`"),
            )
            .with_path(path),
        );
    }

    pub fn merge_conflict(&mut self, path: &Path, key_path: &str) {
        self.push(
            Diagnostic::warning(
                DiagnosticKind::MergeConflict,
                format!("`{key_path}` already defined, keeping later value"),
            )
            .with_path(path),
        );
    }

    pub fn unresolved_reference(&mut self, reference: &str) {
        self.push(Diagnostic::warning(
            DiagnosticKind::UnresolvedReference,
            format!("reference `{reference}` does not name a known entry"),
        ));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Count of findings of one kind.
    pub fn count_of(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    /// Fold another collector's findings into this one.
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
