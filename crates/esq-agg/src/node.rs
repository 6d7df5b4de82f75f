//! Aggregation node model.
//!
//! The closed set of metric and bucket aggregation variants. Like filter
//! nodes, each aggregation has a wire form ([`Aggregation::render_named`])
//! and a canonical `{"type": "<tag>", ...}` interchange form.
//!
//! Every variant carries an output `name` (defaulting to its `field`), an
//! optional `nested_path`/`nested_filter` envelope, and a map of
//! sub-aggregations resolved to unbounded depth. When `nested_path` is set,
//! the rendered aggregation (including its subs) is wrapped inside a nested
//! envelope instead of being emitted directly under its name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::AggError;

/// Canonical type tags, used to recognize already-typed aggregation specs.
pub const CANONICAL_TAGS: &[&str] = &[
    "terms",
    "avg",
    "sum",
    "min",
    "max",
    "cardinality",
    "histogram",
    "date_histogram",
    "range",
    "composite",
];

/// Default bucket count for `terms` and page size for `composite`.
pub const DEFAULT_BUCKET_SIZE: u64 = 10;

/// Serde default helper for bucket/page sizes.
fn default_bucket_size() -> u64 {
    DEFAULT_BUCKET_SIZE
}

/// An aggregation node: one named entry of the `aggs` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Aggregation {
    /// Bucket by distinct field values.
    Terms(TermsAggregation),
    /// Arithmetic mean of a numeric field.
    Avg(MetricAggregation),
    /// Sum of a numeric field.
    Sum(MetricAggregation),
    /// Minimum of a numeric field.
    Min(MetricAggregation),
    /// Maximum of a numeric field.
    Max(MetricAggregation),
    /// Approximate distinct-value count.
    Cardinality(CardinalityAggregation),
    /// Fixed-interval numeric buckets.
    Histogram(HistogramAggregation),
    /// Calendar/fixed-interval date buckets.
    DateHistogram(DateHistogramAggregation),
    /// Explicit numeric bucket boundaries.
    Range(RangeAggregation),
    /// Paginated multi-source buckets.
    Composite(CompositeAggregation),
}

/// Bucket aggregation over distinct field values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermsAggregation {
    /// Field to bucket on.
    pub field: String,
    /// Output key; defaults to `field`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Maximum number of buckets.
    #[serde(default = "default_bucket_size")]
    pub size: u64,
    /// Bucket ordering spec, echoed verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Value>,
    /// Minimum documents for a bucket to appear.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_doc_count: Option<u64>,
    /// Emit an overflow bucket for values beyond `size`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_bucket: Option<bool>,
    /// Value inclusion pattern, echoed verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Value>,
    /// Substitute for documents missing the field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing: Option<Value>,
    /// Nested sub-document path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested_path: Option<String>,
    /// Pre-filter for the nested envelope, echoed verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested_filter: Option<Value>,
    /// Sub-aggregations keyed by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aggs: BTreeMap<String, Aggregation>,
}

/// Single-value metric aggregation (`avg`, `sum`, `min`, `max`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricAggregation {
    /// Field the metric is computed over.
    pub field: String,
    /// Output key; defaults to `field`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Nested sub-document path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested_path: Option<String>,
    /// Pre-filter for the nested envelope, echoed verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested_filter: Option<Value>,
    /// Sub-aggregations keyed by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aggs: BTreeMap<String, Aggregation>,
}

/// Approximate distinct-value count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardinalityAggregation {
    /// Field to count distinct values of.
    pub field: String,
    /// Output key; defaults to `field`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Accuracy/memory trade-off threshold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision_threshold: Option<u64>,
    /// Nested sub-document path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested_path: Option<String>,
    /// Pre-filter for the nested envelope, echoed verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested_filter: Option<Value>,
    /// Sub-aggregations keyed by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aggs: BTreeMap<String, Aggregation>,
}

/// Fixed-interval numeric bucket aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramAggregation {
    /// Field to bucket on.
    pub field: String,
    /// Output key; defaults to `field`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Bucket width (a JSON number).
    pub interval: Value,
    /// Forced bucket range `{min, max}`, echoed verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_bounds: Option<Value>,
    /// Minimum documents for a bucket to appear.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_doc_count: Option<u64>,
    /// Key buckets by value instead of array position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyed: Option<bool>,
    /// Nested sub-document path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested_path: Option<String>,
    /// Pre-filter for the nested envelope, echoed verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested_filter: Option<Value>,
    /// Sub-aggregations keyed by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aggs: BTreeMap<String, Aggregation>,
}

/// Calendar/fixed-interval date bucket aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateHistogramAggregation {
    /// Field to bucket on.
    pub field: String,
    /// Output key; defaults to `field`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Legacy interval expression (e.g. `"1d"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    /// Calendar-aware interval expression; preferred over `interval`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar_interval: Option<String>,
    /// Bucket key date format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Time zone for bucket boundaries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    /// Minimum documents for a bucket to appear.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_doc_count: Option<u64>,
    /// Forced bucket range `{min, max}`, echoed verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_bounds: Option<Value>,
    /// Nested sub-document path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested_path: Option<String>,
    /// Pre-filter for the nested envelope, echoed verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested_filter: Option<Value>,
    /// Sub-aggregations keyed by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aggs: BTreeMap<String, Aggregation>,
}

/// One bucket boundary of a [`RangeAggregation`].
///
/// `from` is inclusive, `to` exclusive; either may be open. When both are
/// present, `to` must be strictly greater than `from`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RangeBucket {
    /// Bucket label in the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Inclusive lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<f64>,
    /// Exclusive upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<f64>,
}

impl RangeBucket {
    /// Checks the bound ordering invariant.
    pub fn validate(&self) -> Result<(), AggError> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if to <= from {
                return Err(AggError::validation(
                    "range",
                    format!("bucket \"to\" ({to}) must be greater than \"from\" ({from})"),
                ));
            }
        }
        Ok(())
    }
}

/// Explicit numeric bucket aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeAggregation {
    /// Field to bucket on.
    pub field: String,
    /// Output key; defaults to `field`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Ordered bucket boundaries.
    pub ranges: Vec<RangeBucket>,
    /// Nested sub-document path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested_path: Option<String>,
    /// Pre-filter for the nested envelope, echoed verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested_filter: Option<Value>,
    /// Sub-aggregations keyed by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aggs: BTreeMap<String, Aggregation>,
}

/// Paginated multi-source bucket aggregation.
///
/// Unlike the other variants, `composite` has no single `field`; its named
/// source specs each carry their own. The `after` token is opaque and echoed
/// verbatim for the caller to resubmit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeAggregation {
    /// Output key.
    pub name: String,
    /// Ordered named source specs, echoed verbatim.
    pub sources: Vec<Value>,
    /// Page size.
    #[serde(default = "default_bucket_size")]
    pub size: u64,
    /// Pagination token from a previous response, echoed verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<Value>,
    /// Source ordering mapping, echoed verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Value>,
    /// Nested sub-document path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested_path: Option<String>,
    /// Pre-filter for the nested envelope, echoed verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested_filter: Option<Value>,
    /// Sub-aggregations keyed by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aggs: BTreeMap<String, Aggregation>,
}

impl Aggregation {
    /// The key this aggregation renders under: `name`, falling back to
    /// `field`.
    pub fn output_name(&self) -> &str {
        match self {
            Self::Terms(agg) => agg.name.as_deref().unwrap_or(&agg.field),
            Self::Avg(agg) | Self::Sum(agg) | Self::Min(agg) | Self::Max(agg) => {
                agg.name.as_deref().unwrap_or(&agg.field)
            }
            Self::Cardinality(agg) => agg.name.as_deref().unwrap_or(&agg.field),
            Self::Histogram(agg) => agg.name.as_deref().unwrap_or(&agg.field),
            Self::DateHistogram(agg) => agg.name.as_deref().unwrap_or(&agg.field),
            Self::Range(agg) => agg.name.as_deref().unwrap_or(&agg.field),
            Self::Composite(agg) => &agg.name,
        }
    }

    /// Fills in the output name when the node doesn't carry one. Composite
    /// nodes always carry a name.
    pub fn default_name(&mut self, name: &str) {
        let slot = match self {
            Self::Terms(agg) => &mut agg.name,
            Self::Avg(agg) | Self::Sum(agg) | Self::Min(agg) | Self::Max(agg) => &mut agg.name,
            Self::Cardinality(agg) => &mut agg.name,
            Self::Histogram(agg) => &mut agg.name,
            Self::DateHistogram(agg) => &mut agg.name,
            Self::Range(agg) => &mut agg.name,
            Self::Composite(_) => return,
        };
        if slot.is_none() {
            *slot = Some(name.to_string());
        }
    }

    /// Common envelope attributes: nested path, nested filter,
    /// sub-aggregations.
    fn envelope(&self) -> (&Option<String>, &Option<Value>, &BTreeMap<String, Self>) {
        match self {
            Self::Terms(agg) => (&agg.nested_path, &agg.nested_filter, &agg.aggs),
            Self::Avg(agg) | Self::Sum(agg) | Self::Min(agg) | Self::Max(agg) => {
                (&agg.nested_path, &agg.nested_filter, &agg.aggs)
            }
            Self::Cardinality(agg) => (&agg.nested_path, &agg.nested_filter, &agg.aggs),
            Self::Histogram(agg) => (&agg.nested_path, &agg.nested_filter, &agg.aggs),
            Self::DateHistogram(agg) => (&agg.nested_path, &agg.nested_filter, &agg.aggs),
            Self::Range(agg) => (&agg.nested_path, &agg.nested_filter, &agg.aggs),
            Self::Composite(agg) => (&agg.nested_path, &agg.nested_filter, &agg.aggs),
        }
    }

    /// Renders the aggregation as a `(output key, body)` pair, applying the
    /// nested envelope when `nested_path` is set.
    pub fn render_named(&self) -> (String, Value) {
        let name = self.output_name().to_string();
        let body = self.render_body();
        let (nested_path, nested_filter, _) = self.envelope();
        let Some(path) = nested_path else {
            return (name, body);
        };

        let mut nested = Map::new();
        nested.insert("path".to_string(), Value::String(path.clone()));
        if let Some(filter) = nested_filter {
            nested.insert("filter".to_string(), filter.clone());
        }
        let mut outer = Map::new();
        outer.insert("nested".to_string(), Value::Object(nested));
        outer.insert("aggs".to_string(), json!({ name.clone(): body }));
        (name, Value::Object(outer))
    }

    /// Renders the aggregation body: `{tag: params}` plus a sibling `aggs`
    /// object when sub-aggregations are present.
    fn render_body(&self) -> Value {
        let (tag, params) = match self {
            Self::Terms(agg) => ("terms", render_terms(agg)),
            Self::Avg(agg) => ("avg", render_metric(agg)),
            Self::Sum(agg) => ("sum", render_metric(agg)),
            Self::Min(agg) => ("min", render_metric(agg)),
            Self::Max(agg) => ("max", render_metric(agg)),
            Self::Cardinality(agg) => ("cardinality", render_cardinality(agg)),
            Self::Histogram(agg) => ("histogram", render_histogram(agg)),
            Self::DateHistogram(agg) => ("date_histogram", render_date_histogram(agg)),
            Self::Range(agg) => ("range", render_range(agg)),
            Self::Composite(agg) => ("composite", render_composite(agg)),
        };
        let mut body = Map::new();
        body.insert(tag.to_string(), params);

        let (_, _, subs) = self.envelope();
        if !subs.is_empty() {
            let mut rendered = Map::new();
            for sub in subs.values() {
                let (sub_name, sub_body) = sub.render_named();
                rendered.insert(sub_name, sub_body);
            }
            body.insert("aggs".to_string(), Value::Object(rendered));
        }
        Value::Object(body)
    }

    /// Serializes the node into its canonical `{"type": "<tag>", ...}` form.
    pub fn to_canonical(&self) -> Value {
        // A tagged enum of field structs always serializes to a JSON object.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Reconstructs a node from its canonical form, validating construction
    /// invariants on the result.
    pub fn from_canonical(value: &Value) -> Result<Self, AggError> {
        let agg: Self = serde_json::from_value(value.clone())
            .map_err(|err| AggError::Canonical(err.to_string()))?;
        agg.validate()?;
        Ok(agg)
    }

    /// Checks construction invariants recursively.
    pub fn validate(&self) -> Result<(), AggError> {
        let name = self.output_name().to_string();
        match self {
            Self::Range(agg) => {
                if agg.ranges.is_empty() {
                    return Err(AggError::validation(&name, "ranges must be non-empty"));
                }
                for bucket in &agg.ranges {
                    bucket.validate()?;
                }
            }
            Self::Histogram(agg) => {
                if !agg.interval.is_number() {
                    return Err(AggError::validation(&name, "interval must be a number"));
                }
            }
            Self::DateHistogram(agg) => {
                if agg.interval.is_none() && agg.calendar_interval.is_none() {
                    return Err(AggError::validation(
                        &name,
                        "an interval or calendar_interval is required",
                    ));
                }
            }
            Self::Composite(agg) => {
                if agg.sources.is_empty() {
                    return Err(AggError::validation(&name, "sources must be non-empty"));
                }
            }
            _ => {}
        }
        let (_, _, subs) = self.envelope();
        for sub in subs.values() {
            sub.validate()?;
        }
        Ok(())
    }
}

/// Inserts `key` when the option is set.
fn insert_opt<T: Serialize>(map: &mut Map<String, Value>, key: &str, value: &Option<T>) {
    if let Some(value) = value {
        if let Ok(value) = serde_json::to_value(value) {
            map.insert(key.to_string(), value);
        }
    }
}

/// Renders `terms` params. `size` is always present.
fn render_terms(agg: &TermsAggregation) -> Value {
    let mut params = Map::new();
    params.insert("field".to_string(), Value::String(agg.field.clone()));
    params.insert("size".to_string(), agg.size.into());
    insert_opt(&mut params, "order", &agg.order);
    insert_opt(&mut params, "min_doc_count", &agg.min_doc_count);
    insert_opt(&mut params, "other_bucket", &agg.other_bucket);
    insert_opt(&mut params, "include", &agg.include);
    insert_opt(&mut params, "missing", &agg.missing);
    Value::Object(params)
}

/// Renders single-value metric params.
fn render_metric(agg: &MetricAggregation) -> Value {
    json!({ "field": agg.field })
}

/// Renders `cardinality` params.
fn render_cardinality(agg: &CardinalityAggregation) -> Value {
    let mut params = Map::new();
    params.insert("field".to_string(), Value::String(agg.field.clone()));
    insert_opt(&mut params, "precision_threshold", &agg.precision_threshold);
    Value::Object(params)
}

/// Renders `histogram` params.
fn render_histogram(agg: &HistogramAggregation) -> Value {
    let mut params = Map::new();
    params.insert("field".to_string(), Value::String(agg.field.clone()));
    params.insert("interval".to_string(), agg.interval.clone());
    insert_opt(&mut params, "extended_bounds", &agg.extended_bounds);
    insert_opt(&mut params, "min_doc_count", &agg.min_doc_count);
    insert_opt(&mut params, "keyed", &agg.keyed);
    Value::Object(params)
}

/// Renders `date_histogram` params, preferring `calendar_interval`.
fn render_date_histogram(agg: &DateHistogramAggregation) -> Value {
    let mut params = Map::new();
    params.insert("field".to_string(), Value::String(agg.field.clone()));
    if agg.calendar_interval.is_some() {
        insert_opt(&mut params, "calendar_interval", &agg.calendar_interval);
    } else {
        insert_opt(&mut params, "interval", &agg.interval);
    }
    insert_opt(&mut params, "format", &agg.format);
    insert_opt(&mut params, "time_zone", &agg.time_zone);
    insert_opt(&mut params, "min_doc_count", &agg.min_doc_count);
    insert_opt(&mut params, "extended_bounds", &agg.extended_bounds);
    Value::Object(params)
}

/// Renders `range` params with the ordered bucket list.
fn render_range(agg: &RangeAggregation) -> Value {
    let mut params = Map::new();
    params.insert("field".to_string(), Value::String(agg.field.clone()));
    let buckets = agg
        .ranges
        .iter()
        .map(|bucket| serde_json::to_value(bucket).unwrap_or(Value::Null))
        .collect();
    params.insert("ranges".to_string(), Value::Array(buckets));
    Value::Object(params)
}

/// Renders `composite` params; `after` and `order` are echoed verbatim.
fn render_composite(agg: &CompositeAggregation) -> Value {
    let mut params = Map::new();
    params.insert("sources".to_string(), Value::Array(agg.sources.clone()));
    params.insert("size".to_string(), agg.size.into());
    insert_opt(&mut params, "after", &agg.after);
    insert_opt(&mut params, "order", &agg.order);
    Value::Object(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A terms aggregation with only the required attributes set.
    fn bare_terms(field: &str) -> TermsAggregation {
        TermsAggregation {
            field: field.to_string(),
            name: None,
            size: DEFAULT_BUCKET_SIZE,
            order: None,
            min_doc_count: None,
            other_bucket: None,
            include: None,
            missing: None,
            nested_path: None,
            nested_filter: None,
            aggs: BTreeMap::new(),
        }
    }

    /// A metric aggregation with only the required attributes set.
    fn bare_metric(field: &str) -> MetricAggregation {
        MetricAggregation {
            field: field.to_string(),
            name: None,
            nested_path: None,
            nested_filter: None,
            aggs: BTreeMap::new(),
        }
    }

    #[test]
    fn terms_renders_field_and_size() {
        let mut agg = bare_terms("client_id");
        agg.size = 50;
        let (name, body) = Aggregation::Terms(agg).render_named();
        assert_eq!(name, "client_id");
        assert_eq!(body, json!({"terms": {"field": "client_id", "size": 50}}));
    }

    #[test]
    fn name_defaults_to_field() {
        let agg = Aggregation::Avg(bare_metric("price"));
        assert_eq!(agg.output_name(), "price");
    }

    #[test]
    fn explicit_name_wins() {
        let mut metric = bare_metric("price");
        metric.name = Some("avg_price".to_string());
        assert_eq!(Aggregation::Avg(metric).output_name(), "avg_price");
    }

    #[test]
    fn sub_aggregations_render_under_aggs() {
        let mut outer = bare_terms("category");
        let mut inner = bare_metric("price");
        inner.name = Some("avg_price".to_string());
        outer
            .aggs
            .insert("avg_price".to_string(), Aggregation::Avg(inner));
        let (_, body) = Aggregation::Terms(outer).render_named();
        assert_eq!(
            body["aggs"]["avg_price"],
            json!({"avg": {"field": "price"}})
        );
    }

    #[test]
    fn nested_path_wraps_rendered_body() {
        let mut agg = bare_metric("product.price");
        agg.name = Some("avg_price".to_string());
        agg.nested_path = Some("product".to_string());
        agg.nested_filter = Some(json!({"term": {"product.category": "electronics"}}));
        let (name, body) = Aggregation::Avg(agg).render_named();
        assert_eq!(name, "avg_price");
        assert_eq!(
            body,
            json!({
                "nested": {
                    "path": "product",
                    "filter": {"term": {"product.category": "electronics"}}
                },
                "aggs": {
                    "avg_price": {"avg": {"field": "product.price"}}
                }
            })
        );
    }

    #[test]
    fn range_renders_ordered_bucket_list() {
        let agg = Aggregation::Range(RangeAggregation {
            field: "price".to_string(),
            name: Some("price_range".to_string()),
            ranges: vec![
                RangeBucket {
                    key: None,
                    from: None,
                    to: Some(50.0),
                },
                RangeBucket {
                    key: None,
                    from: Some(50.0),
                    to: Some(100.0),
                },
                RangeBucket {
                    key: None,
                    from: Some(100.0),
                    to: None,
                },
            ],
            nested_path: None,
            nested_filter: None,
            aggs: BTreeMap::new(),
        });
        let (name, body) = agg.render_named();
        assert_eq!(name, "price_range");
        assert_eq!(
            body,
            json!({"range": {"field": "price", "ranges": [
                {"to": 50.0},
                {"from": 50.0, "to": 100.0},
                {"from": 100.0}
            ]}})
        );
    }

    #[test]
    fn inverted_bucket_bounds_fail_validation() {
        let bucket = RangeBucket {
            key: None,
            from: Some(60.0),
            to: Some(50.0),
        };
        assert!(matches!(bucket.validate(), Err(AggError::Validation { .. })));
    }

    #[test]
    fn composite_echoes_after_verbatim() {
        let agg = Aggregation::Composite(CompositeAggregation {
            name: "pager".to_string(),
            sources: vec![json!({"category_terms": {"terms": {"field": "category"}}})],
            size: 20,
            after: Some(json!({"category": "some_category", "price": 100})),
            order: None,
            nested_path: None,
            nested_filter: None,
            aggs: BTreeMap::new(),
        });
        let (_, body) = agg.render_named();
        assert_eq!(
            body["composite"]["after"],
            json!({"category": "some_category", "price": 100})
        );
    }

    #[test]
    fn date_histogram_prefers_calendar_interval() {
        let agg = Aggregation::DateHistogram(DateHistogramAggregation {
            field: "timestamp".to_string(),
            name: None,
            interval: Some("1h".to_string()),
            calendar_interval: Some("1d".to_string()),
            format: None,
            time_zone: None,
            min_doc_count: None,
            extended_bounds: None,
            nested_path: None,
            nested_filter: None,
            aggs: BTreeMap::new(),
        });
        let (_, body) = agg.render_named();
        assert_eq!(body["date_histogram"]["calendar_interval"], "1d");
        assert!(body["date_histogram"].get("interval").is_none());
    }

    #[test]
    fn canonical_round_trip_all_variants() {
        let mut terms = bare_terms("category");
        terms.order = Some(json!({"_count": "desc"}));
        let aggregations = vec![
            Aggregation::Terms(terms),
            Aggregation::Avg(bare_metric("price")),
            Aggregation::Sum(bare_metric("price")),
            Aggregation::Min(bare_metric("price")),
            Aggregation::Max(bare_metric("price")),
            Aggregation::Cardinality(CardinalityAggregation {
                field: "user_id".to_string(),
                name: None,
                precision_threshold: Some(3000),
                nested_path: None,
                nested_filter: None,
                aggs: BTreeMap::new(),
            }),
            Aggregation::Histogram(HistogramAggregation {
                field: "price".to_string(),
                name: None,
                interval: json!(20),
                extended_bounds: None,
                min_doc_count: None,
                keyed: None,
                nested_path: None,
                nested_filter: None,
                aggs: BTreeMap::new(),
            }),
            Aggregation::DateHistogram(DateHistogramAggregation {
                field: "timestamp".to_string(),
                name: None,
                interval: Some("1d".to_string()),
                calendar_interval: None,
                format: None,
                time_zone: None,
                min_doc_count: None,
                extended_bounds: None,
                nested_path: None,
                nested_filter: None,
                aggs: BTreeMap::new(),
            }),
            Aggregation::Range(RangeAggregation {
                field: "price".to_string(),
                name: None,
                ranges: vec![RangeBucket {
                    key: Some("cheap".to_string()),
                    from: None,
                    to: Some(50.0),
                }],
                nested_path: None,
                nested_filter: None,
                aggs: BTreeMap::new(),
            }),
            Aggregation::Composite(CompositeAggregation {
                name: "pager".to_string(),
                sources: vec![json!({"cat": {"terms": {"field": "category"}}})],
                size: DEFAULT_BUCKET_SIZE,
                after: None,
                order: None,
                nested_path: None,
                nested_filter: None,
                aggs: BTreeMap::new(),
            }),
        ];
        for agg in aggregations {
            let canonical = agg.to_canonical();
            assert_eq!(
                Aggregation::from_canonical(&canonical).unwrap(),
                agg,
                "round trip failed for {canonical}"
            );
        }
    }

    #[test]
    fn canonical_rejects_unknown_tag() {
        let result = Aggregation::from_canonical(&json!({"type": "percentiles", "field": "a"}));
        assert!(matches!(result, Err(AggError::Canonical(_))));
    }

    #[test]
    fn nested_sub_aggregations_round_trip() {
        let mut outer = bare_terms("category");
        outer
            .aggs
            .insert("avg_price".to_string(), Aggregation::Avg(bare_metric("price")));
        let agg = Aggregation::Terms(outer);
        let canonical = agg.to_canonical();
        assert_eq!(Aggregation::from_canonical(&canonical).unwrap(), agg);
    }
}
