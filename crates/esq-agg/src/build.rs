//! Builds aggregation nodes from shorthand and explicit specs.
//!
//! The `aggs` section of a request maps output names to specs. Each spec
//! takes one of three shapes:
//!
//! - **Shorthand**: a sequence whose head is the aggregation tag followed by
//!   positional parameters, e.g. `["terms", 50]` or `["avg", "price"]`. The
//!   field defaults to the entry name.
//! - **Explicit**: a mapping of tag to a parameter object, optionally with
//!   `nested_path`/`nested_filter` alongside, e.g.
//!   `{"terms": {"field": "category", "size": 5, "aggs": {...}}}`.
//!   Sub-aggregations recurse to unbounded depth.
//! - **Canonical**: a mapping carrying a recognized `type` tag, decoded via
//!   [`Aggregation::from_canonical`].

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::AggError;
use crate::node::{
    Aggregation, CANONICAL_TAGS, CardinalityAggregation, CompositeAggregation,
    DEFAULT_BUCKET_SIZE, DateHistogramAggregation, HistogramAggregation, MetricAggregation,
    RangeAggregation, RangeBucket, TermsAggregation,
};

/// Builds the full `aggs` section: a mapping of entry name to spec.
pub fn build_all(value: &Value) -> Result<BTreeMap<String, Aggregation>, AggError> {
    let Some(entries) = value.as_object() else {
        return Err(AggError::Type {
            expected: "an aggregation mapping",
            value: value.clone(),
        });
    };
    let mut built = BTreeMap::new();
    for (name, spec) in entries {
        built.insert(name.clone(), build(name, spec)?);
    }
    Ok(built)
}

/// Builds a single named aggregation from its spec.
pub fn build(name: &str, spec: &Value) -> Result<Aggregation, AggError> {
    let agg = match spec {
        Value::Array(elements) => build_shorthand(name, elements, spec)?,
        Value::Object(members) => {
            if is_canonical(members) {
                let mut agg = Aggregation::from_canonical(spec)?;
                agg.default_name(name);
                return Ok(agg);
            }
            build_explicit(name, members, spec)?
        }
        _ => return Err(AggError::shape(name, spec)),
    };
    agg.validate()?;
    Ok(agg)
}

/// True when the mapping carries a recognized canonical `type` tag.
fn is_canonical(members: &Map<String, Value>) -> bool {
    members
        .get("type")
        .and_then(Value::as_str)
        .is_some_and(|tag| CANONICAL_TAGS.contains(&tag))
}

/// Builds from the positional shorthand sequence. The head names the tag;
/// the field defaults to the entry name.
fn build_shorthand(name: &str, elements: &[Value], spec: &Value) -> Result<Aggregation, AggError> {
    let Some(tag) = elements.first().and_then(Value::as_str) else {
        return Err(AggError::shape(name, spec));
    };
    match tag {
        "terms" => {
            let mut agg = bare_terms(name);
            if let Some(size) = elements.get(1) {
                agg.size = as_u64(name, "size", size)?;
            }
            Ok(Aggregation::Terms(agg))
        }
        "avg" | "sum" | "min" | "max" => {
            let field = match elements.get(1) {
                Some(field) => as_str(name, "field", field)?.to_string(),
                None => name.to_string(),
            };
            let metric = MetricAggregation {
                name: Some(name.to_string()),
                ..bare_metric(&field)
            };
            Ok(match tag {
                "avg" => Aggregation::Avg(metric),
                "sum" => Aggregation::Sum(metric),
                "min" => Aggregation::Min(metric),
                _ => Aggregation::Max(metric),
            })
        }
        "cardinality" => {
            let precision_threshold = elements
                .get(1)
                .map(|value| as_u64(name, "precision_threshold", value))
                .transpose()?;
            Ok(Aggregation::Cardinality(CardinalityAggregation {
                field: name.to_string(),
                name: None,
                precision_threshold,
                nested_path: None,
                nested_filter: None,
                aggs: BTreeMap::new(),
            }))
        }
        "range" => {
            let Some(buckets) = elements.get(1) else {
                return Err(AggError::validation(name, "a bucket list is required"));
            };
            Ok(Aggregation::Range(RangeAggregation {
                field: name.to_string(),
                name: None,
                ranges: decode_buckets(name, buckets)?,
                nested_path: None,
                nested_filter: None,
                aggs: BTreeMap::new(),
            }))
        }
        "histogram" => {
            let Some(interval) = elements.get(1) else {
                return Err(AggError::validation(name, "an interval is required"));
            };
            Ok(Aggregation::Histogram(HistogramAggregation {
                field: name.to_string(),
                name: None,
                interval: interval.clone(),
                extended_bounds: elements.get(2).cloned(),
                min_doc_count: elements
                    .get(3)
                    .map(|value| as_u64(name, "min_doc_count", value))
                    .transpose()?,
                keyed: elements
                    .get(4)
                    .map(|value| as_bool(name, "keyed", value))
                    .transpose()?,
                nested_path: None,
                nested_filter: None,
                aggs: BTreeMap::new(),
            }))
        }
        "date_histogram" => {
            let interval = elements
                .get(1)
                .map(|value| as_str(name, "interval", value))
                .transpose()?
                .map(str::to_string);
            Ok(Aggregation::DateHistogram(DateHistogramAggregation {
                field: name.to_string(),
                name: None,
                interval,
                calendar_interval: None,
                format: None,
                time_zone: None,
                min_doc_count: None,
                extended_bounds: None,
                nested_path: None,
                nested_filter: None,
                aggs: BTreeMap::new(),
            }))
        }
        "composite" => {
            let Some(params) = elements.get(1).and_then(Value::as_object) else {
                return Err(AggError::validation(name, "a parameter mapping is required"));
            };
            build_composite(name, params, &Map::new())
        }
        _ => Err(AggError::shape(name, spec)),
    }
}

/// Builds from the explicit `{tag: params}` form. `nested_path` and
/// `nested_filter` sit alongside the tag; everything else lives inside the
/// parameter object.
fn build_explicit(
    name: &str,
    members: &Map<String, Value>,
    spec: &Value,
) -> Result<Aggregation, AggError> {
    let Some(tag) = CANONICAL_TAGS.iter().find(|tag| members.contains_key(**tag)) else {
        return Err(AggError::shape(name, spec));
    };
    let Some(params) = members.get(*tag).and_then(Value::as_object) else {
        return Err(AggError::validation(
            name,
            format!("\"{tag}\" parameters must be a mapping"),
        ));
    };

    if *tag == "composite" {
        return build_composite(name, params, members);
    }

    let field = require_field(name, params)?;
    let aggs = sub_aggregations(params)?;
    let nested_path = opt_string(name, members, "nested_path")?;
    let nested_filter = members.get("nested_filter").cloned();

    let agg = match *tag {
        "terms" => Aggregation::Terms(TermsAggregation {
            name: Some(name.to_string()),
            size: opt_u64(name, params, "size")?.unwrap_or(DEFAULT_BUCKET_SIZE),
            order: params.get("order").cloned(),
            min_doc_count: opt_u64(name, params, "min_doc_count")?,
            other_bucket: opt_bool(name, params, "other_bucket")?,
            include: params.get("include").cloned(),
            missing: params.get("missing").cloned(),
            nested_path,
            nested_filter,
            aggs,
            ..bare_terms(&field)
        }),
        "avg" | "sum" | "min" | "max" => {
            let metric = MetricAggregation {
                name: Some(name.to_string()),
                nested_path,
                nested_filter,
                aggs,
                ..bare_metric(&field)
            };
            match *tag {
                "avg" => Aggregation::Avg(metric),
                "sum" => Aggregation::Sum(metric),
                "min" => Aggregation::Min(metric),
                _ => Aggregation::Max(metric),
            }
        }
        "cardinality" => Aggregation::Cardinality(CardinalityAggregation {
            field,
            name: Some(name.to_string()),
            precision_threshold: opt_u64(name, params, "precision_threshold")?,
            nested_path,
            nested_filter,
            aggs,
        }),
        "histogram" => Aggregation::Histogram(HistogramAggregation {
            field,
            name: Some(name.to_string()),
            interval: params.get("interval").cloned().unwrap_or(Value::Null),
            extended_bounds: params.get("extended_bounds").cloned(),
            min_doc_count: opt_u64(name, params, "min_doc_count")?,
            keyed: opt_bool(name, params, "keyed")?,
            nested_path,
            nested_filter,
            aggs,
        }),
        "date_histogram" => Aggregation::DateHistogram(DateHistogramAggregation {
            field,
            name: Some(name.to_string()),
            interval: opt_string(name, params, "interval")?,
            calendar_interval: opt_string(name, params, "calendar_interval")?,
            format: opt_string(name, params, "format")?,
            time_zone: opt_string(name, params, "time_zone")?,
            min_doc_count: opt_u64(name, params, "min_doc_count")?,
            extended_bounds: params.get("extended_bounds").cloned(),
            nested_path,
            nested_filter,
            aggs,
        }),
        "range" => {
            let Some(buckets) = params.get("ranges") else {
                return Err(AggError::validation(name, "a bucket list is required"));
            };
            Aggregation::Range(RangeAggregation {
                field,
                name: Some(name.to_string()),
                ranges: decode_buckets(name, buckets)?,
                nested_path,
                nested_filter,
                aggs,
            })
        }
        _ => return Err(AggError::shape(name, spec)),
    };
    Ok(agg)
}

/// Builds a composite aggregation from its parameter mapping. `wrapper`
/// carries the optional nested envelope in the explicit form.
fn build_composite(
    name: &str,
    params: &Map<String, Value>,
    wrapper: &Map<String, Value>,
) -> Result<Aggregation, AggError> {
    let Some(sources) = params.get("sources").and_then(Value::as_array) else {
        return Err(AggError::validation(name, "a sources sequence is required"));
    };
    let agg = Aggregation::Composite(CompositeAggregation {
        name: name.to_string(),
        sources: sources.clone(),
        size: opt_u64(name, params, "size")?.unwrap_or(DEFAULT_BUCKET_SIZE),
        after: params.get("after").cloned(),
        order: params.get("order").cloned(),
        nested_path: opt_string(name, wrapper, "nested_path")?,
        nested_filter: wrapper.get("nested_filter").cloned(),
        aggs: sub_aggregations(params)?,
    });
    agg.validate()?;
    Ok(agg)
}

/// Recursively builds the `aggs` member of a parameter mapping.
fn sub_aggregations(params: &Map<String, Value>) -> Result<BTreeMap<String, Aggregation>, AggError> {
    match params.get("aggs") {
        Some(value) => build_all(value),
        None => Ok(BTreeMap::new()),
    }
}

/// Decodes a bucket list, surfacing unknown bucket keys as Validation
/// errors.
fn decode_buckets(name: &str, value: &Value) -> Result<Vec<RangeBucket>, AggError> {
    serde_json::from_value(value.clone())
        .map_err(|err| AggError::validation(name, format!("invalid bucket list: {err}")))
}

/// A terms aggregation carrying only the entry name.
fn bare_terms(name: &str) -> TermsAggregation {
    TermsAggregation {
        field: name.to_string(),
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

/// A metric aggregation carrying only its field.
fn bare_metric(field: &str) -> MetricAggregation {
    MetricAggregation {
        field: field.to_string(),
        name: None,
        nested_path: None,
        nested_filter: None,
        aggs: BTreeMap::new(),
    }
}

/// The required string `field` parameter.
fn require_field(name: &str, params: &Map<String, Value>) -> Result<String, AggError> {
    match params.get("field") {
        Some(Value::String(field)) if !field.is_empty() => Ok(field.clone()),
        _ => Err(AggError::validation(name, "a string field is required")),
    }
}

/// An optional string member.
fn opt_string(
    name: &str,
    members: &Map<String, Value>,
    key: &str,
) -> Result<Option<String>, AggError> {
    members
        .get(key)
        .map(|value| as_str(name, key, value).map(str::to_string))
        .transpose()
}

/// An optional unsigned integer member.
fn opt_u64(name: &str, members: &Map<String, Value>, key: &str) -> Result<Option<u64>, AggError> {
    members
        .get(key)
        .map(|value| as_u64(name, key, value))
        .transpose()
}

/// An optional boolean member.
fn opt_bool(name: &str, members: &Map<String, Value>, key: &str) -> Result<Option<bool>, AggError> {
    members
        .get(key)
        .map(|value| as_bool(name, key, value))
        .transpose()
}

/// Requires a string value, naming the aggregation and key on failure.
fn as_str<'a>(name: &str, key: &str, value: &'a Value) -> Result<&'a str, AggError> {
    value
        .as_str()
        .ok_or_else(|| AggError::validation(name, format!("\"{key}\" must be a string")))
}

/// Requires an unsigned integer value.
fn as_u64(name: &str, key: &str, value: &Value) -> Result<u64, AggError> {
    value
        .as_u64()
        .ok_or_else(|| AggError::validation(name, format!("\"{key}\" must be an unsigned integer")))
}

/// Requires a boolean value.
fn as_bool(name: &str, key: &str, value: &Value) -> Result<bool, AggError> {
    value
        .as_bool()
        .ok_or_else(|| AggError::validation(name, format!("\"{key}\" must be a boolean")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn shorthand_terms_takes_size() {
        let agg = build("client_id", &json!(["terms", 50])).unwrap();
        let (name, body) = agg.render_named();
        assert_eq!(name, "client_id");
        assert_eq!(body, json!({"terms": {"field": "client_id", "size": 50}}));
    }

    #[test]
    fn shorthand_terms_defaults_size() {
        let agg = build("category", &json!(["terms"])).unwrap();
        let (_, body) = agg.render_named();
        assert_eq!(body["terms"]["size"], 10);
    }

    #[test]
    fn shorthand_metric_takes_field() {
        let agg = build("avg_price", &json!(["avg", "price"])).unwrap();
        let (name, body) = agg.render_named();
        assert_eq!(name, "avg_price");
        assert_eq!(body, json!({"avg": {"field": "price"}}));
    }

    #[test]
    fn shorthand_metric_field_defaults_to_name() {
        let agg = build("price", &json!(["sum"])).unwrap();
        let (name, body) = agg.render_named();
        assert_eq!(name, "price");
        assert_eq!(body, json!({"sum": {"field": "price"}}));
    }

    #[test]
    fn shorthand_cardinality_takes_precision() {
        let agg = build("user_id", &json!(["cardinality", 3000])).unwrap();
        let (_, body) = agg.render_named();
        assert_eq!(
            body,
            json!({"cardinality": {"field": "user_id", "precision_threshold": 3000}})
        );
    }

    #[test]
    fn shorthand_histogram_positional_params() {
        let agg = build(
            "price",
            &json!(["histogram", 20, {"min": 0, "max": 1000}, 1, true]),
        )
        .unwrap();
        let (_, body) = agg.render_named();
        assert_eq!(
            body,
            json!({"histogram": {
                "field": "price",
                "interval": 20,
                "extended_bounds": {"min": 0, "max": 1000},
                "min_doc_count": 1,
                "keyed": true
            }})
        );
    }

    #[test]
    fn shorthand_date_histogram_takes_interval() {
        let agg = build("timestamp", &json!(["date_histogram", "1d"])).unwrap();
        let (_, body) = agg.render_named();
        assert_eq!(
            body,
            json!({"date_histogram": {"field": "timestamp", "interval": "1d"}})
        );
    }

    #[test]
    fn shorthand_range_takes_buckets() {
        let agg = build("price", &json!(["range", [{"to": 50}, {"from": 50}]])).unwrap();
        let (_, body) = agg.render_named();
        assert_eq!(
            body,
            json!({"range": {"field": "price", "ranges": [{"to": 50.0}, {"from": 50.0}]}})
        );
    }

    #[test]
    fn shorthand_composite_takes_params() {
        let agg = build(
            "pager",
            &json!(["composite", {
                "sources": [{"cat": {"terms": {"field": "category"}}}],
                "size": 25,
                "after": {"cat": "books"}
            }]),
        )
        .unwrap();
        let (name, body) = agg.render_named();
        assert_eq!(name, "pager");
        assert_eq!(body["composite"]["size"], 25);
        assert_eq!(body["composite"]["after"], json!({"cat": "books"}));
    }

    #[test]
    fn shorthand_unknown_tag_is_shape_error() {
        let result = build("a", &json!(["percentiles"]));
        assert!(matches!(result, Err(AggError::Shape { .. })));
    }

    #[test]
    fn explicit_terms_with_options() {
        let agg = build(
            "top_categories",
            &json!({"terms": {"field": "category", "size": 5, "order": {"_count": "desc"}}}),
        )
        .unwrap();
        let (name, body) = agg.render_named();
        assert_eq!(name, "top_categories");
        assert_eq!(
            body,
            json!({"terms": {
                "field": "category",
                "size": 5,
                "order": {"_count": "desc"}
            }})
        );
    }

    #[test]
    fn explicit_missing_field_is_validation_error() {
        let result = build("bad", &json!({"avg": {"size": 3}}));
        assert!(
            matches!(result, Err(AggError::Validation { ref name, .. }) if name == "bad")
        );
    }

    #[test]
    fn explicit_unknown_tag_is_shape_error() {
        let result = build("bad", &json!({"percentiles": {"field": "price"}}));
        assert!(matches!(result, Err(AggError::Shape { .. })));
    }

    #[test]
    fn explicit_nested_envelope() {
        let agg = build(
            "avg_price",
            &json!({
                "avg": {"field": "product.price"},
                "nested_path": "product",
                "nested_filter": {"term": {"product.category": "electronics"}}
            }),
        )
        .unwrap();
        let (_, body) = agg.render_named();
        assert_eq!(body["nested"]["path"], "product");
        assert_eq!(
            body["aggs"]["avg_price"],
            json!({"avg": {"field": "product.price"}})
        );
    }

    #[test]
    fn explicit_sub_aggregations_recurse() {
        let agg = build(
            "categories",
            &json!({"terms": {
                "field": "category",
                "aggs": {
                    "avg_price": {"avg": {"field": "price"}},
                    "brands": {"terms": {"field": "brand", "aggs": {
                        "max_price": {"max": {"field": "price"}}
                    }}}
                }
            }}),
        )
        .unwrap();
        let (_, body) = agg.render_named();
        assert_eq!(
            body["aggs"]["avg_price"],
            json!({"avg": {"field": "price"}})
        );
        assert_eq!(
            body["aggs"]["brands"]["aggs"]["max_price"],
            json!({"max": {"field": "price"}})
        );
    }

    #[test]
    fn inverted_range_bucket_is_validation_error() {
        let result = build("price", &json!(["range", [{"to": 50, "from": 60}]]));
        assert!(matches!(result, Err(AggError::Validation { .. })));
    }

    #[test]
    fn empty_bucket_list_is_validation_error() {
        let result = build("price", &json!(["range", []]));
        assert!(matches!(result, Err(AggError::Validation { .. })));
    }

    #[test]
    fn empty_composite_sources_is_validation_error() {
        let result = build("pager", &json!(["composite", {"sources": []}]));
        assert!(matches!(result, Err(AggError::Validation { .. })));
    }

    #[test]
    fn unknown_bucket_key_is_validation_error() {
        let result = build("price", &json!(["range", [{"upto": 50}]]));
        assert!(matches!(result, Err(AggError::Validation { .. })));
    }

    #[test]
    fn canonical_spec_decodes_directly() {
        let agg = build(
            "price",
            &json!({"type": "avg", "field": "price"}),
        )
        .unwrap();
        let (name, body) = agg.render_named();
        assert_eq!(name, "price");
        assert_eq!(body, json!({"avg": {"field": "price"}}));
    }

    #[test]
    fn canonical_spec_takes_the_entry_name() {
        let agg = build("my_avg", &json!({"type": "avg", "field": "price"})).unwrap();
        let (name, body) = agg.render_named();
        assert_eq!(name, "my_avg");
        assert_eq!(body, json!({"avg": {"field": "price"}}));
    }

    #[test]
    fn canonical_spec_keeps_its_own_name() {
        let agg = build(
            "entry",
            &json!({"type": "avg", "field": "price", "name": "explicit"}),
        )
        .unwrap();
        assert_eq!(agg.render_named().0, "explicit");
    }

    #[test]
    fn build_all_collects_entries() {
        let aggs = build_all(&json!({
            "client_id": ["terms", 50],
            "avg_price": ["avg", "price"]
        }))
        .unwrap();
        assert_eq!(aggs.len(), 2);
        assert!(aggs.contains_key("client_id"));
        assert!(aggs.contains_key("avg_price"));
    }

    #[test]
    fn build_all_rejects_non_mapping() {
        let result = build_all(&json!(["terms"]));
        assert!(matches!(result, Err(AggError::Type { .. })));
    }

    #[test]
    fn date_histogram_without_interval_is_validation_error() {
        let result = build("timestamp", &json!(["date_histogram"]));
        assert!(matches!(result, Err(AggError::Validation { .. })));
    }
}
