//! Error types for identifier parsing and decoding.

use thiserror::Error;

/// Errors that can occur when parsing or decoding identifiers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The text does not satisfy the canonical identifier format.
    #[error("malformed identifier '{text}': {reason}")]
    Malformed { text: String, reason: String },

    /// An external value had a type that cannot represent an identifier.
    #[error("cannot decode identifier from {source_type} value")]
    UnsupportedSource { source_type: String },

    /// A bare identifier received an absent/null external value.
    ///
    /// Only [`NullId`](crate::NullId) can represent "no identifier".
    #[error("identifier cannot be null")]
    Null,
}

impl IdError {
    pub(crate) fn malformed(text: impl Into<String>, reason: impl Into<String>) -> Self {
        IdError::Malformed {
            text: text.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if this error indicates malformed identifier text.
    pub fn is_malformed(&self) -> bool {
        matches!(self, IdError::Malformed { .. })
    }
}
