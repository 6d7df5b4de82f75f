//! End-to-end compilation tests: shorthand request in, query document out.

// Integration tests live outside cfg(test) by design
#![allow(clippy::tests_outside_test_module)]

use esq::{CompileOptions, compile, compile_with};
use serde_json::json;

#[test]
fn empty_request_compiles_to_match_all() {
    let doc = compile(&json!({})).unwrap();
    assert_eq!(doc, json!({"query": {"match_all": {}}, "size": 20}));
}

#[test]
fn scalar_filters_infer_term_and_match() {
    let doc = compile(&json!({"filters": [
        {"status": "active"},
        {"product_name": "phone case"}
    ]}))
    .unwrap();
    assert_eq!(
        doc["query"],
        json!({"bool": {"must": [
            {"term": {"status": "active"}},
            {"match": {"product_name": {"query": "phone case"}}}
        ]}})
    );
}

#[test]
fn single_filter_is_unwrapped() {
    let doc = compile(&json!({"filters": {"category": "books"}})).unwrap();
    assert_eq!(doc["query"], json!({"term": {"category": "books"}}));
}

#[test]
fn range_bounds_merge_into_one_clause() {
    let doc = compile(&json!({"filters": {"price": {"gte": 10, "lt": 100}}})).unwrap();
    assert_eq!(
        doc["query"],
        json!({"range": {"price": {"lt": 100, "gte": 10}}})
    );
}

#[test]
fn value_sequence_is_terms() {
    let doc = compile(&json!({"filters": {"status": ["active", "pending"]}})).unwrap();
    assert_eq!(
        doc["query"],
        json!({"terms": {"status": ["active", "pending"]}})
    );
}

#[test]
fn or_sequence_with_threshold() {
    let doc = compile(&json!({"filters": {
        "tag": ["urgent", "critical", {"minimum_should_match": 1}]
    }}))
    .unwrap();
    assert_eq!(
        doc["query"],
        json!({"bool": {
            "should": [
                {"term": {"tag": "urgent"}},
                {"term": {"tag": "critical"}}
            ],
            "minimum_should_match": 1
        }})
    );
}

#[test]
fn wildcard_with_boost_inside_clause() {
    let doc = compile(&json!({"filters": {
        "event.provider": {"wildcard": {"value": "security*", "boost": 1.5}}
    }}))
    .unwrap();
    assert_eq!(
        doc["query"],
        json!({"wildcard": {"event.provider": {"value": "security*", "boost": 1.5}}})
    );
}

#[test]
fn must_not_wraps_negated_members() {
    let doc = compile(&json!({"filters": {
        "status": {"must_not": ["archived"]}
    }}))
    .unwrap();
    assert_eq!(
        doc["query"],
        json!({"bool": {"must_not": [{"term": {"status": "archived"}}]}})
    );
}

#[test]
fn sorts_preserve_input_order() {
    let doc = compile(&json!({"sorts": [
        {"field": "price", "order": "desc"},
        {"field": "_score"},
        {"field": "created_at", "order": "asc"}
    ]}))
    .unwrap();
    assert_eq!(
        doc["sort"],
        json!([
            {"price": {"order": "desc"}},
            {"_score": {"order": "asc"}},
            {"created_at": {"order": "asc"}}
        ])
    );
}

#[test]
fn shorthand_aggregations_compile() {
    let doc = compile(&json!({"aggs": {
        "client_id": ["terms", 50],
        "avg_price": ["avg", "price"]
    }}))
    .unwrap();
    assert_eq!(
        doc["aggs"],
        json!({
            "client_id": {"terms": {"field": "client_id", "size": 50}},
            "avg_price": {"avg": {"field": "price"}}
        })
    );
    assert_eq!(doc["size"], 0);
}

#[test]
fn nested_explicit_aggregations_compile() {
    let doc = compile(&json!({"aggs": {
        "categories": {"terms": {
            "field": "category",
            "size": 5,
            "aggs": {"avg_price": {"avg": {"field": "price"}}}
        }}
    }}))
    .unwrap();
    assert_eq!(
        doc["aggs"]["categories"],
        json!({
            "terms": {"field": "category", "size": 5},
            "aggs": {"avg_price": {"avg": {"field": "price"}}}
        })
    );
}

#[test]
fn composite_after_token_passes_through() {
    let doc = compile(&json!({"aggs": {
        "pager": {"composite": {
            "sources": [{"cat": {"terms": {"field": "category"}}}],
            "after": {"cat": "books"}
        }}
    }}))
    .unwrap();
    assert_eq!(doc["aggs"]["pager"]["composite"]["after"], json!({"cat": "books"}));
}

#[test]
fn full_request_has_stable_key_order() {
    let doc = compile(&json!({
        "filters": {"status": "active"},
        "sorts": [{"field": "price", "order": "desc"}],
        "aggs": {"category": ["terms"]},
        "size": 10
    }))
    .unwrap();
    let keys: Vec<&String> = doc.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["query", "sort", "aggs", "size"]);
}

#[test]
fn custom_default_size_applies() {
    let options = CompileOptions {
        default_size: 100,
        aggregation_only_size: Some(0),
    };
    let doc = compile_with(&json!({"filters": {"status": "active"}}), &options).unwrap();
    assert_eq!(doc["size"], 100);
}

#[test]
fn classification_is_idempotent_on_canonical_input() {
    let canonical = json!({"filters": {
        "type": "term",
        "field": "status",
        "value": "active"
    }});
    let doc = compile(&canonical).unwrap();
    assert_eq!(doc["query"], json!({"term": {"status": "active"}}));
}
