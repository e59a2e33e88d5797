//! Errors raised while compiling a route template
//!
//! Every variant is terminal for the template being compiled: no partial
//! variant list is ever returned alongside an error.

use thiserror::Error;

/// Structural problems found in a route template
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// The number of `[` and `]` does not match
    #[error("number of opening '[' and closing ']' does not match")]
    UnbalancedBrackets,

    /// A `]` appears somewhere other than the trailing run of closers
    #[error("optional segments can only occur at the end of a route")]
    MisplacedOptionalClose,

    /// An optional segment such as `[]` has no content
    #[error("empty optional part at segment {index}")]
    EmptyOptionalSegment { index: usize },

    /// A `{...}` placeholder is malformed
    #[error("invalid placeholder at byte {position}: {reason}")]
    InvalidPlaceholderSyntax { position: usize, reason: String },
}

impl PatternError {
    pub(crate) fn placeholder(position: usize, reason: impl Into<String>) -> Self {
        PatternError::InvalidPlaceholderSyntax {
            position,
            reason: reason.into(),
        }
    }
}
