//! Error types for resource ID parsing.

use thiserror::Error;

/// Errors that can occur when parsing a resource ID.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The input string is empty.
    #[error("a resource id cannot be empty")]
    Empty,

    /// The input does not start with `/`.
    #[error("parsing {input:?}: a resource id must begin with '/'")]
    NotAbsolute { input: String },

    /// The input has more or fewer segments than the grammar.
    #[error(
        "parsing {input:?}: the number of segments didn't match\n\n\
         Expected a resource id that matches (containing {expected} segments):\n\n> {example}\n\n\
         However this value was provided (which was parsed into {actual} segments):\n\n> {input}"
    )]
    SegmentCount {
        input: String,
        expected: usize,
        actual: usize,
        example: String,
    },

    /// A static segment did not match its literal.
    #[error(
        "parsing {input:?}: the segment at position {position} didn't match\n\n\
         Expected {expected:?} but got {actual:?}"
    )]
    LiteralMismatch {
        input: String,
        position: usize,
        expected: &'static str,
        actual: String,
    },

    /// A variable segment was present but empty.
    #[error("parsing {input:?}: the segment {name:?} at position {position} was empty")]
    EmptyValue {
        input: String,
        position: usize,
        name: &'static str,
    },

    /// The parse result lacks a segment the identifier needs.
    #[error("the segment {name:?} was not found in the resource id {input:?}")]
    MissingSegment { input: String, name: String },
}

impl ParseError {
    /// Returns true if the input was structurally wrong (empty, relative or
    /// with the wrong number of segments).
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            ParseError::Empty | ParseError::NotAbsolute { .. } | ParseError::SegmentCount { .. }
        )
    }
}
