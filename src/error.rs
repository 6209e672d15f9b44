//! Error types for position queries.
//!
//! Structural errors (unknown names, positions outside recognized regions)
//! surface verbatim from the query layer. Local no-match conditions during
//! recursive traversal are not errors: views return empty results so
//! sibling branches of a union keep trying, and malformed expressions
//! during collection passes are skipped per item.

use smol_str::SmolStr;
use thiserror::Error;

use crate::base::Pos;

/// Errors produced by the query surface.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The path has no schema to answer queries against.
    #[error("no schema available")]
    NoSchema,

    /// The file name matches neither the native nor the JSON syntax.
    #[error("unknown file format: {0}")]
    UnknownFileFormat(SmolStr),

    /// The file is not part of this path.
    #[error("file not found: {0}")]
    FileNotFound(SmolStr),

    /// The position lies outside any recognized region, or names an
    /// attribute/block the schema does not declare.
    #[error("{msg}")]
    Positional { pos: Pos, msg: String },

    /// A static value is incompatible with its declared constraint.
    #[error("value does not satisfy the {expected} constraint")]
    ConstraintMismatch { expected: String },

    #[error("no reference found")]
    NoReferenceFound,

    #[error("no origin found at position")]
    NoOriginFound,

    #[error("no target found")]
    NoTargetFound,
}

impl Error {
    pub(crate) fn unknown_attribute(name: &str, pos: Pos) -> Self {
        Error::Positional {
            pos,
            msg: format!("unknown attribute {name:?}"),
        }
    }

    pub(crate) fn unknown_block(block_type: &str, pos: Pos) -> Self {
        Error::Positional {
            pos,
            msg: format!("unknown block type {block_type:?}"),
        }
    }

    pub(crate) fn outside_body(block_type: &str, pos: Pos) -> Self {
        Error::Positional {
            pos,
            msg: format!("position outside of {block_type:?} body"),
        }
    }

    pub(crate) fn unrecognized(pos: Pos) -> Self {
        Error::Positional {
            pos,
            msg: "position outside of any recognized region".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
