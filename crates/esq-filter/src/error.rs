//! Error types for filter classification and construction.

use serde_json::Value;
use thiserror::Error;

/// Errors raised while classifying shorthand input or constructing filter nodes.
#[derive(Debug, Error)]
pub enum FilterError {
    /// The input shape matches none of the recognized filter patterns.
    #[error("unrecognized filter shape for field \"{field}\": {value}")]
    Shape {
        /// Field name the offending value was supplied under.
        field: String,
        /// The offending value.
        value: Value,
    },

    /// A structurally recognized node violates a construction invariant.
    #[error("invalid filter for field \"{field}\": {message}")]
    Validation {
        /// Field name of the invalid node.
        field: String,
        /// The invariant that was violated.
        message: String,
    },

    /// A value of the wrong fundamental JSON kind was supplied.
    #[error("expected {expected}, got: {value}")]
    Type {
        /// The kind that was required.
        expected: &'static str,
        /// The value that was supplied instead.
        value: Value,
    },

    /// A canonical `{type, ...}` document failed to decode.
    #[error("invalid canonical filter: {0}")]
    Canonical(String),
}

impl FilterError {
    /// Creates a `Shape` error for a field and the value supplied under it.
    pub(crate) fn shape(field: &str, value: &Value) -> Self {
        Self::Shape {
            field: field.to_string(),
            value: value.clone(),
        }
    }

    /// Creates a `Validation` error for a field.
    pub(crate) fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}
