//! Error types for value construction and mutation.
//!
//! Copyright (c) 2025 Posit, PBC

use thiserror::Error;

/// Errors raised by the value model.
///
/// The message texts are part of the public contract: extension code and
/// tests match on them, so they must stay stable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// A constructor was invoked with an invalid argument count or shape,
    /// or a singleton was constructed directly.
    #[error("{0}")]
    Construction(String),

    /// A setter or coercion received a value of the wrong kind.
    #[error("{0}")]
    Type(String),

    /// A list or map position outside `0..len` was accessed.
    #[error("index {index} is out of range for a {container} of length {len}")]
    Index {
        container: &'static str,
        index: usize,
        len: usize,
    },

    /// A native value kind that has no host representation was used.
    #[error("value of kind `{kind}` is not supported by the value bridge")]
    Unsupported { kind: String },
}

impl ValueError {
    pub(crate) fn construction(message: &str) -> Self {
        ValueError::Construction(message.to_string())
    }

    pub(crate) fn type_error(message: &str) -> Self {
        ValueError::Type(message.to_string())
    }
}

/// Result type for value operations
pub type ValueResult<T> = Result<T, ValueError>;
