//! Error types for aggregation parsing and construction.

use serde_json::Value;
use thiserror::Error;

/// Errors raised while building aggregation nodes from shorthand or explicit
/// specs.
#[derive(Debug, Error)]
pub enum AggError {
    /// The spec shape matches no recognized aggregation pattern.
    #[error("unrecognized aggregation spec for \"{name}\": {value}")]
    Shape {
        /// Name of the aggregation entry.
        name: String,
        /// The offending spec value.
        value: Value,
    },

    /// A structurally recognized aggregation violates an invariant.
    #[error("invalid aggregation \"{name}\": {message}")]
    Validation {
        /// Name of the aggregation entry.
        name: String,
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
    #[error("invalid canonical aggregation: {0}")]
    Canonical(String),
}

impl AggError {
    /// Creates a `Shape` error for a named aggregation entry.
    pub(crate) fn shape(name: &str, value: &Value) -> Self {
        Self::Shape {
            name: name.to_string(),
            value: value.clone(),
        }
    }

    /// Creates a `Validation` error for a named aggregation entry.
    pub(crate) fn validation(name: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            name: name.to_string(),
            message: message.into(),
        }
    }
}
