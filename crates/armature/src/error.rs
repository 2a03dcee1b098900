//! Error types for diagram assembly and rendering.

use std::io;

use thiserror::Error;

use armature_core::error::ValueError;

/// The main error type for Armature operations.
///
/// Validation variants are raised synchronously at the point of misuse,
/// before any backend graph state is touched. Rendering is the only
/// external fallible operation and is fatal when it fails; removal of the
/// intermediate DOT file is non-fatal bookkeeping and is only logged.
#[derive(Debug, Error)]
pub enum ArmatureError {
    /// An option value failed validation at construction time.
    #[error(transparent)]
    Value(#[from] ValueError),

    /// An operation needed an ambient scope that was not active.
    #[error("{0} requires an active diagram scope")]
    NoActiveScope(&'static str),

    /// A connection was attempted with an operand that cannot form an edge.
    #[error("invalid connection operand: {0}")]
    InvalidOperand(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The external layout engine failed to produce an artifact.
    #[error("graphviz rendering failed: {0}")]
    Render(String),
}
