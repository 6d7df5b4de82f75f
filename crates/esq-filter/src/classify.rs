//! Shape-based filter classification.
//!
//! Converts loosely-typed shorthand input into [`Filter`] nodes by pattern
//! matching on the JSON shape of each element:
//!
//! ```text
//! element       → sequence                  AND: Bool(must = members)
//!               | {"type": <tag>, ...}      canonical node, returned as-is
//!               | {field: value, ...}       one node per field/value pair
//! field: value  → "ids": sequence           Ids
//!               | sequence + threshold      OR: Bool(should, minimum_should_match)
//!               | sequence                  Terms
//!               | mapping                   reserved-key dispatch (fixed order)
//!               | text with whitespace      Match
//!               | other scalar              Term
//! ```
//!
//! Reserved keys inside a mapping value are checked in a fixed, literal
//! order — `wildcard`, `match`, `match_phrase`, `multi_match`,
//! `query_string`, `term`, `terms`, range bounds, `must_not` — never in
//! mapping iteration order. All range bounds present in one mapping merge
//! into a single `Range` node.

use serde_json::{Map, Value};

use crate::{
    error::FilterError,
    node::{
        CANONICAL_TAGS, Filter, IdsFilter, MatchFilter, MatchPhraseFilter, MultiMatchFilter,
        QueryStringFilter, RangeConditions, RangeFilter, TermFilter, TermsFilter, WildcardFilter,
    },
};

/// Range bound operators, the closed set a mapping may carry.
const RANGE_OPERATORS: [&str; 4] = ["gt", "lt", "gte", "lte"];

/// Operator keys allowed inside the OR-mapping form (a mapping that carries
/// `minimum_should_match` next to operator entries).
const OR_OPERATORS: [&str; 7] = ["term", "terms", "gt", "lt", "gte", "lte", "wildcard"];

/// Classifies the top-level `filters` value into root nodes.
///
/// A sequence classifies each element in order (the roots are combined with
/// AND semantics by the assembler); a mapping classifies each field/value
/// pair in order. Each element may contribute several roots.
pub fn classify_roots(input: &Value) -> Result<Vec<Filter>, FilterError> {
    match input {
        Value::Array(elements) => {
            let mut roots = Vec::new();
            for element in elements {
                roots.extend(classify_element(element)?);
            }
            Ok(roots)
        }
        Value::Object(_) => classify_element(input),
        other => Err(FilterError::Type {
            expected: "filters as an array or object",
            value: other.clone(),
        }),
    }
}

/// Classifies one shorthand element into a single node.
///
/// A sequence becomes `Bool(must = members)`; a mapping with several
/// field/value pairs becomes `Bool(must = pairs)`; a mapping with one pair
/// becomes that pair's node directly.
pub fn classify(input: &Value) -> Result<Filter, FilterError> {
    let mut nodes = classify_element(input)?;
    if nodes.len() == 1 {
        return Ok(nodes.remove(0));
    }
    Ok(Filter::must(nodes))
}

/// Classifies one element into its nodes (one per field/value pair).
fn classify_element(element: &Value) -> Result<Vec<Filter>, FilterError> {
    match element {
        Value::Array(members) => {
            let mut clauses = Vec::new();
            for member in members {
                clauses.extend(classify_element(member)?);
            }
            Ok(vec![Filter::must(clauses)])
        }
        Value::Object(map) => {
            if is_canonical(map) {
                return Ok(vec![Filter::from_canonical(element)?]);
            }
            let mut nodes = Vec::new();
            for (field, value) in map {
                nodes.push(classify_field(field, value)?);
            }
            Ok(nodes)
        }
        other => Err(FilterError::Type {
            expected: "a filter element (array or object)",
            value: other.clone(),
        }),
    }
}

/// Returns true when the mapping is an already-typed canonical node.
fn is_canonical(map: &Map<String, Value>) -> bool {
    map.get("type")
        .and_then(Value::as_str)
        .is_some_and(|tag| CANONICAL_TAGS.contains(&tag))
}

/// Classifies one `field → value` pair into a node.
fn classify_field(field: &str, value: &Value) -> Result<Filter, FilterError> {
    if field == "ids" {
        if let Some(filter) = classify_ids(value)? {
            return Ok(filter);
        }
    }
    match value {
        Value::Array(members) => classify_sequence(field, members),
        Value::Object(map) => classify_mapping(field, value, map),
        Value::String(text) => classify_text(field, text),
        Value::Number(_) | Value::Bool(_) => Ok(Filter::Term(TermFilter::new(field, value.clone())?)),
        Value::Null => Err(FilterError::shape(field, value)),
    }
}

/// Classifies the reserved `ids` field: a bare identifier sequence, or a
/// mapping with `values` and an optional `type`.
fn classify_ids(value: &Value) -> Result<Option<Filter>, FilterError> {
    match value {
        Value::Array(values) => Ok(Some(Filter::Ids(IdsFilter::new(values.clone())?))),
        Value::Object(map) => match map.get("values") {
            Some(Value::Array(values)) => {
                let mut filter = IdsFilter::new(values.clone())?;
                filter.type_name = get_string(map, "type");
                Ok(Some(Filter::Ids(filter)))
            }
            _ => Ok(None),
        },
        _ => Ok(None),
    }
}

/// Classifies a sequence value: OR-with-threshold when the last member is a
/// mapping carrying `minimum_should_match`, otherwise an exact multi-value
/// `Terms` match.
fn classify_sequence(field: &str, members: &[Value]) -> Result<Filter, FilterError> {
    if let Some((last, rest)) = members.split_last() {
        if let Value::Object(map) = last {
            if let Some(threshold) = map.get("minimum_should_match") {
                let threshold = require_integer(threshold)?;
                let mut should = Vec::with_capacity(rest.len());
                for member in rest {
                    should.push(classify_field(field, member)?);
                }
                return Ok(Filter::should(should, Some(threshold)));
            }
        }
    }
    Ok(Filter::Terms(TermsFilter::new(field, members.to_vec())?))
}

/// Classifies a mapping value by reserved key, in fixed precedence order.
fn classify_mapping(
    field: &str,
    value: &Value,
    map: &Map<String, Value>,
) -> Result<Filter, FilterError> {
    if map.contains_key("minimum_should_match") {
        return classify_or_mapping(field, value, map);
    }
    if let Some(pattern) = map.get("wildcard") {
        return wildcard_filter(field, pattern);
    }
    if let Some(params) = map.get("match") {
        return match_filter(field, params);
    }
    if let Some(params) = map.get("match_phrase") {
        return match_phrase_filter(field, params);
    }
    if let Some(params) = map.get("multi_match") {
        return multi_match_filter(field, params);
    }
    if let Some(params) = map.get("query_string") {
        return query_string_filter(field, params);
    }
    if let Some(params) = map.get("term") {
        return term_filter(field, params);
    }
    if let Some(values) = map.get("terms") {
        return terms_filter(field, values);
    }
    if RANGE_OPERATORS.iter().any(|op| map.contains_key(*op)) {
        return range_filter(field, map);
    }
    if let Some(members) = map.get("must_not") {
        return must_not_filter(field, members);
    }
    Err(FilterError::shape(field, value))
}

/// Classifies the OR-mapping form: operator entries next to a
/// `minimum_should_match` threshold become `Bool(should=...)`.
///
/// Operators are collected in a fixed order, not mapping order.
fn classify_or_mapping(
    field: &str,
    value: &Value,
    map: &Map<String, Value>,
) -> Result<Filter, FilterError> {
    let threshold = require_integer(&map["minimum_should_match"])?;
    let mut should = Vec::new();
    for operator in OR_OPERATORS {
        if let Some(operand) = map.get(operator) {
            let mut single = Map::new();
            single.insert(operator.to_string(), operand.clone());
            should.push(classify_field(field, &Value::Object(single))?);
        }
    }
    if should.is_empty() {
        return Err(FilterError::shape(field, value));
    }
    Ok(Filter::should(should, Some(threshold)))
}

/// Classifies whitespace-bearing text as full-text intent, anything else as
/// exact-match intent.
fn classify_text(field: &str, text: &str) -> Result<Filter, FilterError> {
    if text.trim().contains(char::is_whitespace) {
        return Ok(Filter::Match(MatchFilter::new(field, text)?));
    }
    Ok(Filter::Term(TermFilter::new(
        field,
        Value::String(text.to_string()),
    )?))
}

/// Builds a `Wildcard` from a bare pattern or an option mapping.
fn wildcard_filter(field: &str, params: &Value) -> Result<Filter, FilterError> {
    match params {
        Value::String(pattern) => Ok(Filter::Wildcard(WildcardFilter::new(field, pattern)?)),
        Value::Object(options) => {
            let pattern = require_string(field, options, "value")?;
            let mut filter = WildcardFilter::new(field, &pattern)?;
            filter.boost = get_f64(options, "boost");
            filter.case_insensitive = get_bool(options, "case_insensitive");
            filter.rewrite = get_string(options, "rewrite");
            Ok(Filter::Wildcard(filter))
        }
        other => Err(FilterError::shape(field, other)),
    }
}

/// Builds a `Match` from a bare query string or an option mapping.
fn match_filter(field: &str, params: &Value) -> Result<Filter, FilterError> {
    match params {
        Value::String(query) => Ok(Filter::Match(MatchFilter::new(field, query)?)),
        Value::Object(options) => {
            let query = require_string(field, options, "query")?;
            let mut filter = MatchFilter::new(field, &query)?;
            filter.analyzer = get_string(options, "analyzer");
            filter.boost = get_f64(options, "boost");
            filter.fuzziness = options.get("fuzziness").cloned();
            filter.operator = get_string(options, "operator");
            filter.minimum_should_match = options.get("minimum_should_match").cloned();
            filter.zero_terms_query = get_string(options, "zero_terms_query");
            Ok(Filter::Match(filter))
        }
        other => Err(FilterError::shape(field, other)),
    }
}

/// Builds a `MatchPhrase` from a bare phrase or an option mapping.
fn match_phrase_filter(field: &str, params: &Value) -> Result<Filter, FilterError> {
    match params {
        Value::String(query) => Ok(Filter::MatchPhrase(MatchPhraseFilter::new(field, query)?)),
        Value::Object(options) => {
            let query = require_string(field, options, "query")?;
            let mut filter = MatchPhraseFilter::new(field, &query)?;
            filter.analyzer = get_string(options, "analyzer");
            filter.boost = get_f64(options, "boost");
            filter.slop = get_u64(options, "slop");
            Ok(Filter::MatchPhrase(filter))
        }
        other => Err(FilterError::shape(field, other)),
    }
}

/// Builds a `MultiMatch`. The shorthand field name is a comma-separated
/// field list; a single name degenerates to one field.
fn multi_match_filter(field: &str, params: &Value) -> Result<Filter, FilterError> {
    let fields: Vec<String> = field
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect();
    match params {
        Value::String(query) => Ok(Filter::MultiMatch(MultiMatchFilter::new(query, fields)?)),
        Value::Object(options) => {
            let query = require_string(field, options, "query")?;
            let mut filter = MultiMatchFilter::new(&query, fields)?;
            filter.type_name = get_string(options, "type");
            filter.analyzer = get_string(options, "analyzer");
            filter.boost = get_f64(options, "boost");
            filter.fuzziness = options.get("fuzziness").cloned();
            filter.operator = get_string(options, "operator");
            filter.cutoff_frequency = get_f64(options, "cutoff_frequency");
            filter.fuzzy_prefix_length = get_u64(options, "fuzzy_prefix_length");
            filter.max_expansions = get_u64(options, "max_expansions");
            filter.minimum_should_match = options.get("minimum_should_match").cloned();
            filter.tie_breaker = get_f64(options, "tie_breaker");
            Ok(Filter::MultiMatch(filter))
        }
        other => Err(FilterError::shape(field, other)),
    }
}

/// Builds a `QueryString` from a bare query or an option mapping.
fn query_string_filter(field: &str, params: &Value) -> Result<Filter, FilterError> {
    match params {
        Value::String(query) => Ok(Filter::QueryString(QueryStringFilter::new(query)?)),
        Value::Object(options) => {
            let query = require_string(field, options, "query")?;
            let mut filter = QueryStringFilter::new(&query)?;
            filter.default_field = get_string(options, "default_field");
            filter.fields = get_string_list(options, "fields");
            filter.analyzer = get_string(options, "analyzer");
            filter.boost = get_f64(options, "boost");
            filter.default_operator = get_string(options, "default_operator");
            filter.allow_leading_wildcard = get_bool(options, "allow_leading_wildcard");
            filter.lowercase_expanded_terms = get_bool(options, "lowercase_expanded_terms");
            filter.enable_position_increments = get_bool(options, "enable_position_increments");
            filter.fuzziness = options.get("fuzziness").cloned();
            filter.fuzzy_max_expansions = get_u64(options, "fuzzy_max_expansions");
            filter.fuzzy_prefix_length = get_u64(options, "fuzzy_prefix_length");
            filter.lenient = get_bool(options, "lenient");
            filter.max_determinized_states = get_u64(options, "max_determinized_states");
            filter.minimum_should_match = options.get("minimum_should_match").cloned();
            filter.phrase_slop = get_u64(options, "phrase_slop");
            filter.quote_analyzer = get_string(options, "quote_analyzer");
            filter.rewrite = get_string(options, "rewrite");
            filter.tie_breaker = get_f64(options, "tie_breaker");
            Ok(Filter::QueryString(filter))
        }
        other => Err(FilterError::shape(field, other)),
    }
}

/// Builds a `Term` from a bare value or an option mapping.
fn term_filter(field: &str, params: &Value) -> Result<Filter, FilterError> {
    match params {
        Value::Object(options) => {
            let value = options
                .get("value")
                .ok_or_else(|| FilterError::shape(field, params))?;
            let mut filter = TermFilter::new(field, value.clone())?;
            filter.boost = get_f64(options, "boost");
            filter.case_insensitive = get_bool(options, "case_insensitive");
            Ok(Filter::Term(filter))
        }
        scalar => Ok(Filter::Term(TermFilter::new(field, scalar.clone())?)),
    }
}

/// Builds a `Terms` from an explicit value list.
fn terms_filter(field: &str, values: &Value) -> Result<Filter, FilterError> {
    match values {
        Value::Array(values) => Ok(Filter::Terms(TermsFilter::new(field, values.clone())?)),
        single => Ok(Filter::Terms(TermsFilter::new(field, vec![single.clone()])?)),
    }
}

/// Builds a single `Range` merging every bound present in the mapping.
fn range_filter(field: &str, map: &Map<String, Value>) -> Result<Filter, FilterError> {
    let conditions = RangeConditions {
        gt: map.get("gt").cloned(),
        lt: map.get("lt").cloned(),
        gte: map.get("gte").cloned(),
        lte: map.get("lte").cloned(),
    };
    Ok(Filter::Range(RangeFilter::new(field, conditions)?))
}

/// Builds a `Bool(must_not=...)`: each member classified as `{field: member}`.
fn must_not_filter(field: &str, members: &Value) -> Result<Filter, FilterError> {
    let members = members.as_array().ok_or_else(|| FilterError::Type {
        expected: "must_not as an array",
        value: members.clone(),
    })?;
    let mut clauses = Vec::with_capacity(members.len());
    for member in members {
        clauses.push(classify_field(field, member)?);
    }
    Ok(Filter::must_not(clauses))
}

/// Reads an optional string option.
fn get_string(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(String::from)
}

/// Reads an optional string list option.
fn get_string_list(map: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    let list = map.get(key)?.as_array()?;
    Some(
        list.iter()
            .filter_map(Value::as_str)
            .map(String::from)
            .collect(),
    )
}

/// Reads an optional float option.
fn get_f64(map: &Map<String, Value>, key: &str) -> Option<f64> {
    map.get(key).and_then(Value::as_f64)
}

/// Reads an optional unsigned integer option.
fn get_u64(map: &Map<String, Value>, key: &str) -> Option<u64> {
    map.get(key).and_then(Value::as_u64)
}

/// Reads an optional boolean option.
fn get_bool(map: &Map<String, Value>, key: &str) -> Option<bool> {
    map.get(key).and_then(Value::as_bool)
}

/// Requires a string value under `key`.
fn require_string(
    field: &str,
    map: &Map<String, Value>,
    key: &str,
) -> Result<String, FilterError> {
    match map.get(key) {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(other) => Err(FilterError::Type {
            expected: "a string",
            value: other.clone(),
        }),
        None => Err(FilterError::validation(
            field,
            format!("missing required \"{key}\""),
        )),
    }
}

/// Requires an integer threshold value.
fn require_integer(value: &Value) -> Result<i64, FilterError> {
    value.as_i64().ok_or_else(|| FilterError::Type {
        expected: "an integer minimum_should_match",
        value: value.clone(),
    })
}
