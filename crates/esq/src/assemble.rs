//! Assembles compiled filters, sorts, and aggregations into the final
//! query document.
//!
//! A request is a mapping with up to four members: `filters`, `sorts`,
//! `aggs`, and `size`. Each section compiles independently; this module owns
//! the document-level policy: how multiple filter roots combine, when the
//! `sort` and `aggs` keys appear, and what `size` the document gets when the
//! caller didn't say.

use serde_json::{Map, Value, json};

use esq_filter::Filter;
use esq_sort::Sort;

use crate::error::CompileError;

/// Result size when the request doesn't specify one.
pub const DEFAULT_SIZE: u64 = 20;

/// Result size for aggregation-only requests: no hits, buckets only.
pub const AGGREGATION_ONLY_SIZE: u64 = 0;

/// Document-level compilation policy.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Size used when the request carries no explicit `size`.
    pub default_size: u64,
    /// Size used when the request has aggregations but no filters and no
    /// explicit `size`. `None` falls back to `default_size`.
    pub aggregation_only_size: Option<u64>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_SIZE,
            aggregation_only_size: Some(AGGREGATION_ONLY_SIZE),
        }
    }
}

/// Compiles a shorthand request into a query document with default policy.
pub fn compile(request: &Value) -> Result<Value, CompileError> {
    compile_with(request, &CompileOptions::default())
}

/// Compiles a shorthand request into a query document.
pub fn compile_with(request: &Value, options: &CompileOptions) -> Result<Value, CompileError> {
    let Some(members) = request.as_object() else {
        return Err(CompileError::Request {
            expected: "a request mapping",
            value: request.clone(),
        });
    };

    let roots = match members.get("filters") {
        Some(filters) => esq_filter::classify_roots(filters)?,
        None => Vec::new(),
    };
    let sorts = match members.get("sorts") {
        Some(sorts) => esq_sort::build_all(sorts)?,
        None => Vec::new(),
    };
    let aggs = match members.get("aggs") {
        Some(aggs) => esq_agg::build_all(aggs)?,
        None => Default::default(),
    };
    let explicit_size = match members.get("size") {
        Some(size) => Some(size.as_u64().ok_or_else(|| CompileError::Size(size.clone()))?),
        None => None,
    };

    let roots_empty = roots.is_empty();
    let query = match roots.len() {
        0 => json!({"match_all": {}}),
        1 => roots[0].render(),
        _ => Filter::must(roots).render(),
    };

    let size = match explicit_size {
        Some(size) => size,
        None if roots_empty && !aggs.is_empty() => options
            .aggregation_only_size
            .unwrap_or(options.default_size),
        None => options.default_size,
    };

    let mut document = Map::new();
    document.insert("query".to_string(), query);
    if !sorts.is_empty() {
        let rendered = sorts.iter().map(Sort::render).collect();
        document.insert("sort".to_string(), Value::Array(rendered));
    }
    if !aggs.is_empty() {
        let mut rendered = Map::new();
        for agg in aggs.values() {
            let (name, body) = agg.render_named();
            rendered.insert(name, body);
        }
        document.insert("aggs".to_string(), Value::Object(rendered));
    }
    document.insert("size".to_string(), size.into());
    Ok(Value::Object(document))
}
