//! Error type for request compilation.

use serde_json::Value;
use thiserror::Error;

/// Errors raised while compiling a shorthand request into a query document.
#[derive(Debug, Error)]
pub enum CompileError {
    /// A filter spec was rejected.
    #[error(transparent)]
    Filter(#[from] esq_filter::FilterError),

    /// An aggregation spec was rejected.
    #[error(transparent)]
    Agg(#[from] esq_agg::AggError),

    /// A sort spec was rejected.
    #[error(transparent)]
    Sort(#[from] esq_sort::SortError),

    /// The request itself has the wrong shape.
    #[error("expected {expected}, got: {value}")]
    Request {
        /// The shape that was required.
        expected: &'static str,
        /// The value that was supplied instead.
        value: Value,
    },

    /// The `size` member is not an unsigned integer.
    #[error("size must be an unsigned integer, got: {0}")]
    Size(Value),
}
