//! Filter node model and shape classifier for esq.
//!
//! This crate turns loosely-typed shorthand filter specs into a closed set
//! of typed filter nodes, and renders those nodes into the search backend's
//! wire format:
//!
//! - **Scalars** infer intent: `{"status": "active"}` is an exact `term`
//!   match, `{"title": "quick brown fox"}` is a full-text `match`.
//! - **Sequences** are AND: `[{...}, {...}]` becomes `bool.must`.
//! - **Mappings** dispatch on reserved keys (`wildcard`, `match`, range
//!   bounds, `must_not`, ...) in a fixed precedence order.
//!
//! # Example
//!
//! ```
//! use esq_filter::classify;
//!
//! let filter = classify(&serde_json::json!({"price": {"gt": 10, "lt": 100}})).unwrap();
//! assert_eq!(
//!     filter.render(),
//!     serde_json::json!({"range": {"price": {"gt": 10, "lt": 100}}})
//! );
//! ```

mod classify;
mod error;
mod node;

pub use classify::{classify, classify_roots};
pub use error::FilterError;
pub use node::{
    BoolFilter, CANONICAL_TAGS, Filter, IdsFilter, MatchFilter, MatchPhraseFilter,
    MultiMatchFilter, QueryStringFilter, RangeConditions, RangeFilter, TermFilter, TermsFilter,
    WildcardFilter,
};
