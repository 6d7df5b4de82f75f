//! esq compiles compact shorthand search requests into full query
//! documents for an Elasticsearch-style backend.
//!
//! A request mapping carries up to four sections: `filters` (see
//! [`esq_filter`]), `sorts` ([`esq_sort`]), `aggs` ([`esq_agg`]), and
//! `size`. Compilation is pure: no I/O, no backend connection.
//!
//! ```
//! use esq::compile;
//!
//! let doc = compile(&serde_json::json!({
//!     "filters": {"status": "active"},
//!     "size": 5
//! }))
//! .unwrap();
//! assert_eq!(
//!     doc,
//!     serde_json::json!({"query": {"term": {"status": "active"}}, "size": 5})
//! );
//! ```

mod assemble;
mod error;

pub use assemble::{
    AGGREGATION_ONLY_SIZE, CompileOptions, DEFAULT_SIZE, compile, compile_with,
};
pub use error::CompileError;
