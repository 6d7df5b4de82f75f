//! Aggregation node model and builder for esq.
//!
//! This crate turns named aggregation specs into a closed set of typed
//! aggregation nodes and renders those nodes into the search backend's wire
//! format. Specs come in a compact positional shorthand, an explicit
//! parameter form, or the canonical `{"type": ...}` interchange form:
//!
//! ```
//! use esq_agg::build;
//!
//! let agg = build("client_id", &serde_json::json!(["terms", 50])).unwrap();
//! let (name, body) = agg.render_named();
//! assert_eq!(name, "client_id");
//! assert_eq!(
//!     body,
//!     serde_json::json!({"terms": {"field": "client_id", "size": 50}})
//! );
//! ```

mod build;
mod error;
mod node;

pub use build::{build, build_all};
pub use error::AggError;
pub use node::{
    Aggregation, CANONICAL_TAGS, CardinalityAggregation, CompositeAggregation,
    DEFAULT_BUCKET_SIZE, DateHistogramAggregation, HistogramAggregation, MetricAggregation,
    RangeAggregation, RangeBucket, TermsAggregation,
};
