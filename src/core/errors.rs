/*!
# Error System

Typed errors for every failure the patch engine can produce. All kinds except
`MapLookupMissing` are fatal to a run: the driver aborts and no partial output
is written. `MapLookupMissing` is informational; callers proceed with the
untranslated identifier.
*/

use crate::core::position::Span;
use thiserror::Error;

/// Convenience alias used throughout the engine.
pub type Result<T> = std::result::Result<T, PatchError>;

#[derive(Debug, Error)]
pub enum PatchError {
    /// The front-end could not produce a syntax tree for a file.
    #[error("failed to build AST for {file}: {reason}")]
    AstBuildFailed { file: String, reason: String },

    /// A script line did not match the edit-script grammar.
    #[error("script parse error at line {line_number}: {reason} in {line:?}")]
    ScriptParse {
        line_number: usize,
        line: String,
        reason: String,
    },

    /// A node id referenced by the script is out of range in the named tree.
    #[error("node {id} not found in tree {tree}")]
    NodeNotFound { tree: String, id: u32 },

    /// The script named a kind that disagrees with the resolved node.
    #[error("script kind mismatch for node {id}: script says {expected}, tree has {found}")]
    ScriptKindMismatch {
        id: u32,
        expected: String,
        found: String,
    },

    /// A byte range is not usable in the named buffer (macro-only or
    /// header-only material, or a range off the buffer).
    #[error("source range {span} unavailable in {file}")]
    RangeUnavailable { file: String, span: Span },

    /// Two accumulated text edits intersect.
    #[error("replacement overlap in {file}: {existing} intersects {conflicting}")]
    ReplacementOverlap {
        file: String,
        existing: Span,
        conflicting: Span,
    },

    /// An identifier needing translation had no mapping. Non-fatal.
    #[error("no variable mapping for {key:?}")]
    MapLookupMissing { key: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PatchError {
    /// Whether the run must abort on this error.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, PatchError::MapLookupMissing { .. })
    }
}
