#![forbid(unsafe_code)]

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ComputedError>;

/// Failure of the brace expansion facility.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpandError {
    #[error("brace expanded properties cannot contain a space: `{pattern}`")]
    ContainsSpace { pattern: String },

    #[error(
        "brace expanded properties have to be balanced and cannot be nested: `{pattern}` (byte {position})"
    )]
    Unbalanced { pattern: String, position: usize },
}

impl ExpandError {
    /// The pattern that failed to expand.
    #[must_use]
    pub fn pattern(&self) -> &str {
        match self {
            Self::ContainsSpace { pattern } | Self::Unbalanced { pattern, .. } => pattern,
        }
    }
}

/// Failure while building a computed property descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComputedError {
    #[error(transparent)]
    Expand(#[from] ExpandError),

    #[error("computed handler supplies neither a getter nor a setter")]
    EmptyHandler,
}
