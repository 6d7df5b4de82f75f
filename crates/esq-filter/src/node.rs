//! Filter node model.
//!
//! The closed set of filter variants the classifier can produce, each with
//! two serialized representations:
//!
//! - the **wire form** ([`Filter::render`]): the verbose structure the search
//!   backend consumes, e.g. `{"range": {"price": {"gt": 10}}}`;
//! - the **canonical form** ([`Filter::to_canonical`] /
//!   [`Filter::from_canonical`]): a flat `{"type": "<tag>", ...}` document
//!   used for interchange round trips, e.g.
//!   `{"type": "range", "field": "price", "gt": 10}`.
//!
//! Nodes are immutable once constructed; rendering never mutates and never
//! fails on a validly constructed node.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::FilterError;

/// Canonical type tags, used to recognize already-typed input during
/// classification. Doubles as the deserialization dispatch table: each tag
/// maps to exactly one [`Filter`] variant.
pub const CANONICAL_TAGS: &[&str] = &[
    "ids",
    "term",
    "terms",
    "range",
    "match",
    "match_phrase",
    "multi_match",
    "query_string",
    "wildcard",
    "bool",
];

/// A filter node: one clause of a search query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Filter {
    /// Match documents by identifier.
    Ids(IdsFilter),
    /// Exact single-value match.
    Term(TermFilter),
    /// Exact multi-value match (any of the listed values).
    Terms(TermsFilter),
    /// Bounded comparison over a field.
    Range(RangeFilter),
    /// Analyzed full-text match.
    Match(MatchFilter),
    /// Analyzed exact-phrase match.
    MatchPhrase(MatchPhraseFilter),
    /// Full-text match across several fields.
    MultiMatch(MultiMatchFilter),
    /// Query-string syntax passthrough.
    QueryString(QueryStringFilter),
    /// Pattern match with `*` and `?` wildcards.
    Wildcard(WildcardFilter),
    /// Boolean composition of other filters.
    Bool(BoolFilter),
}

/// Identifier filter: `{"ids": {"values": [...]}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdsFilter {
    /// Document identifiers to match.
    pub values: Vec<Value>,
    /// Optional document type restriction. Named `type` on the wire; the
    /// canonical key avoids colliding with the variant tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

/// Exact-match filter for a single value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermFilter {
    /// Field to match against.
    pub field: String,
    /// Value that must match exactly.
    pub value: Value,
    /// Score multiplier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boost: Option<f64>,
    /// Case-insensitive matching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_insensitive: Option<bool>,
}

/// Exact-match filter for any of several values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermsFilter {
    /// Field to match against.
    pub field: String,
    /// Values of which at least one must match.
    pub values: Vec<Value>,
    /// Score multiplier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boost: Option<f64>,
}

/// Bound operators for a [`RangeFilter`], restricted to the closed set
/// `gt`/`lt`/`gte`/`lte`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RangeConditions {
    /// Strictly greater than.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<Value>,
    /// Strictly less than.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<Value>,
    /// Greater than or equal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gte: Option<Value>,
    /// Less than or equal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lte: Option<Value>,
}

impl RangeConditions {
    /// Returns true when no bound is set.
    pub fn is_empty(&self) -> bool {
        self.gt.is_none() && self.lt.is_none() && self.gte.is_none() && self.lte.is_none()
    }
}

/// Range filter: all bounds present in the source mapping merge into one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeFilter {
    /// Field the bounds apply to.
    pub field: String,
    /// The merged bound operators.
    #[serde(flatten)]
    pub conditions: RangeConditions,
}

/// Analyzed full-text match filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchFilter {
    /// Field to search.
    pub field: String,
    /// Query text.
    pub query: String,
    /// Analyzer override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzer: Option<String>,
    /// Score multiplier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boost: Option<f64>,
    /// Fuzziness setting (`"AUTO"` or an edit distance).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuzziness: Option<Value>,
    /// Term combination operator (`and`/`or`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    /// Minimum number or percentage of terms that must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_should_match: Option<Value>,
    /// Behavior when analysis removes all terms (`none`/`all`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zero_terms_query: Option<String>,
}

/// Analyzed exact-phrase match filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchPhraseFilter {
    /// Field to search.
    pub field: String,
    /// Phrase text.
    pub query: String,
    /// Analyzer override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzer: Option<String>,
    /// Score multiplier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boost: Option<f64>,
    /// Allowed positional slop between phrase terms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slop: Option<u64>,
}

/// Full-text match across several fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiMatchFilter {
    /// Query text.
    pub query: String,
    /// Fields to search, in priority order.
    pub fields: Vec<String>,
    /// Match strategy (`best_fields`, `phrase`, ...). Named `type` on the
    /// wire; the canonical key avoids colliding with the variant tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Analyzer override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzer: Option<String>,
    /// Score multiplier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boost: Option<f64>,
    /// Fuzziness setting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuzziness: Option<Value>,
    /// Term combination operator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    /// Frequency cutoff for low-importance terms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cutoff_frequency: Option<f64>,
    /// Prefix length exempt from fuzzy matching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuzzy_prefix_length: Option<u64>,
    /// Maximum term expansions for fuzzy matching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_expansions: Option<u64>,
    /// Minimum number or percentage of terms that must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_should_match: Option<Value>,
    /// Score blending factor across matching fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tie_breaker: Option<f64>,
}

/// Query-string syntax filter: the query text uses the backend's own mini
/// search language and is passed through with its tuning options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryStringFilter {
    /// Query text in query-string syntax.
    pub query: String,
    /// Default field when the query names none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_field: Option<String>,
    /// Fields to search when the query names none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    /// Analyzer override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzer: Option<String>,
    /// Score multiplier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boost: Option<f64>,
    /// Default boolean operator between terms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_operator: Option<String>,
    /// Whether `*` may start a term.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_leading_wildcard: Option<bool>,
    /// Lowercase expanded terms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lowercase_expanded_terms: Option<bool>,
    /// Honor position increments in analysis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_position_increments: Option<bool>,
    /// Fuzziness setting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuzziness: Option<Value>,
    /// Maximum term expansions for fuzzy matching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuzzy_max_expansions: Option<u64>,
    /// Prefix length exempt from fuzzy matching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuzzy_prefix_length: Option<u64>,
    /// Ignore format-based failures (e.g. text against a numeric field).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lenient: Option<bool>,
    /// Automaton state budget for wildcard/regex expansion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_determinized_states: Option<u64>,
    /// Minimum number or percentage of clauses that must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_should_match: Option<Value>,
    /// Allowed positional slop for phrases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phrase_slop: Option<u64>,
    /// Analyzer for quoted phrases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_analyzer: Option<String>,
    /// Multi-term rewrite method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewrite: Option<String>,
    /// Score blending factor across fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tie_breaker: Option<f64>,
}

/// Wildcard pattern filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WildcardFilter {
    /// Field to match against.
    pub field: String,
    /// Pattern with `*` (any run) and `?` (any single character).
    pub value: String,
    /// Score multiplier, applied inside the wildcard clause.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boost: Option<f64>,
    /// Case-insensitive matching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_insensitive: Option<bool>,
    /// Multi-term rewrite method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewrite: Option<String>,
}

/// Boolean composition: AND (`must`), NOT (`must_not`), OR (`should`).
///
/// `minimum_should_match` is meaningful only when `should` is non-empty and
/// is rendered only in that case.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoolFilter {
    /// Clauses that must all match.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub must: Vec<Filter>,
    /// Clauses that must not match.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub must_not: Vec<Filter>,
    /// Clauses of which at least `minimum_should_match` must match.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub should: Vec<Filter>,
    /// How many `should` clauses must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_should_match: Option<i64>,
}

impl IdsFilter {
    /// Creates an identifier filter. The value list must be non-empty.
    pub fn new(values: Vec<Value>) -> Result<Self, FilterError> {
        let filter = Self {
            values,
            type_name: None,
        };
        filter.validate()?;
        Ok(filter)
    }

    /// Checks construction invariants.
    fn validate(&self) -> Result<(), FilterError> {
        if self.values.is_empty() {
            return Err(FilterError::validation("ids", "values must be non-empty"));
        }
        Ok(())
    }
}

impl TermFilter {
    /// Creates an exact-match filter.
    pub fn new(field: &str, value: Value) -> Result<Self, FilterError> {
        let filter = Self {
            field: field.to_string(),
            value,
            boost: None,
            case_insensitive: None,
        };
        filter.validate()?;
        Ok(filter)
    }

    /// Checks construction invariants.
    fn validate(&self) -> Result<(), FilterError> {
        require_field(&self.field)
    }
}

impl TermsFilter {
    /// Creates a multi-value exact-match filter. The value list must be
    /// non-empty.
    pub fn new(field: &str, values: Vec<Value>) -> Result<Self, FilterError> {
        let filter = Self {
            field: field.to_string(),
            values,
            boost: None,
        };
        filter.validate()?;
        Ok(filter)
    }

    /// Checks construction invariants.
    fn validate(&self) -> Result<(), FilterError> {
        require_field(&self.field)?;
        if self.values.is_empty() {
            return Err(FilterError::validation(
                &self.field,
                "terms values must be non-empty",
            ));
        }
        Ok(())
    }
}

impl RangeFilter {
    /// Creates a range filter. An empty condition set is allowed; it renders
    /// to an empty bound object.
    pub fn new(field: &str, conditions: RangeConditions) -> Result<Self, FilterError> {
        let filter = Self {
            field: field.to_string(),
            conditions,
        };
        filter.validate()?;
        Ok(filter)
    }

    /// Checks construction invariants.
    fn validate(&self) -> Result<(), FilterError> {
        require_field(&self.field)
    }
}

impl MatchFilter {
    /// Creates a full-text match filter. The query text must be non-empty.
    pub fn new(field: &str, query: &str) -> Result<Self, FilterError> {
        let filter = Self {
            field: field.to_string(),
            query: query.to_string(),
            analyzer: None,
            boost: None,
            fuzziness: None,
            operator: None,
            minimum_should_match: None,
            zero_terms_query: None,
        };
        filter.validate()?;
        Ok(filter)
    }

    /// Checks construction invariants.
    fn validate(&self) -> Result<(), FilterError> {
        require_field(&self.field)?;
        require_query(&self.field, &self.query)
    }
}

impl MatchPhraseFilter {
    /// Creates a phrase match filter. The phrase text must be non-empty.
    pub fn new(field: &str, query: &str) -> Result<Self, FilterError> {
        let filter = Self {
            field: field.to_string(),
            query: query.to_string(),
            analyzer: None,
            boost: None,
            slop: None,
        };
        filter.validate()?;
        Ok(filter)
    }

    /// Checks construction invariants.
    fn validate(&self) -> Result<(), FilterError> {
        require_field(&self.field)?;
        require_query(&self.field, &self.query)
    }
}

impl MultiMatchFilter {
    /// Creates a multi-field match filter. Query text and the field list
    /// must be non-empty.
    pub fn new(query: &str, fields: Vec<String>) -> Result<Self, FilterError> {
        let filter = Self {
            query: query.to_string(),
            fields,
            type_name: None,
            analyzer: None,
            boost: None,
            fuzziness: None,
            operator: None,
            cutoff_frequency: None,
            fuzzy_prefix_length: None,
            max_expansions: None,
            minimum_should_match: None,
            tie_breaker: None,
        };
        filter.validate()?;
        Ok(filter)
    }

    /// Checks construction invariants.
    fn validate(&self) -> Result<(), FilterError> {
        if self.fields.is_empty() || self.fields.iter().any(String::is_empty) {
            return Err(FilterError::validation(
                "multi_match",
                "fields must be a non-empty list of field names",
            ));
        }
        require_query(&self.fields.join(","), &self.query)
    }
}

impl QueryStringFilter {
    /// Creates a query-string filter. The query text must be non-empty.
    pub fn new(query: &str) -> Result<Self, FilterError> {
        let filter = Self {
            query: query.to_string(),
            default_field: None,
            fields: None,
            analyzer: None,
            boost: None,
            default_operator: None,
            allow_leading_wildcard: None,
            lowercase_expanded_terms: None,
            enable_position_increments: None,
            fuzziness: None,
            fuzzy_max_expansions: None,
            fuzzy_prefix_length: None,
            lenient: None,
            max_determinized_states: None,
            minimum_should_match: None,
            phrase_slop: None,
            quote_analyzer: None,
            rewrite: None,
            tie_breaker: None,
        };
        filter.validate()?;
        Ok(filter)
    }

    /// Checks construction invariants.
    fn validate(&self) -> Result<(), FilterError> {
        require_query("query_string", &self.query)
    }
}

impl WildcardFilter {
    /// Creates a wildcard filter. The pattern must be non-empty.
    pub fn new(field: &str, value: &str) -> Result<Self, FilterError> {
        let filter = Self {
            field: field.to_string(),
            value: value.to_string(),
            boost: None,
            case_insensitive: None,
            rewrite: None,
        };
        filter.validate()?;
        Ok(filter)
    }

    /// Checks construction invariants.
    fn validate(&self) -> Result<(), FilterError> {
        require_field(&self.field)?;
        require_query(&self.field, &self.value)
    }
}

/// Rejects an empty field name.
fn require_field(field: &str) -> Result<(), FilterError> {
    if field.is_empty() {
        return Err(FilterError::validation("", "field name must be non-empty"));
    }
    Ok(())
}

/// Rejects empty query text.
fn require_query(field: &str, query: &str) -> Result<(), FilterError> {
    if query.is_empty() {
        return Err(FilterError::validation(field, "query text must be non-empty"));
    }
    Ok(())
}

impl Filter {
    /// Creates a `Bool(must=...)` node: AND over the given filters.
    pub fn must(filters: Vec<Self>) -> Self {
        Self::Bool(BoolFilter {
            must: filters,
            ..BoolFilter::default()
        })
    }

    /// Creates a `Bool(must_not=...)` node: NOT over the given filters.
    pub fn must_not(filters: Vec<Self>) -> Self {
        Self::Bool(BoolFilter {
            must_not: filters,
            ..BoolFilter::default()
        })
    }

    /// Creates a `Bool(should=...)` node: OR over the given filters, with an
    /// optional match threshold.
    pub fn should(filters: Vec<Self>, minimum_should_match: Option<i64>) -> Self {
        Self::Bool(BoolFilter {
            should: filters,
            minimum_should_match,
            ..BoolFilter::default()
        })
    }

    /// Renders the node into the backend wire form.
    ///
    /// Pure and total over a validly constructed node.
    pub fn render(&self) -> Value {
        match self {
            Self::Ids(filter) => render_ids(filter),
            Self::Term(filter) => render_term(filter),
            Self::Terms(filter) => render_terms(filter),
            Self::Range(filter) => render_range(filter),
            Self::Match(filter) => render_match(filter),
            Self::MatchPhrase(filter) => render_match_phrase(filter),
            Self::MultiMatch(filter) => render_multi_match(filter),
            Self::QueryString(filter) => render_query_string(filter),
            Self::Wildcard(filter) => render_wildcard(filter),
            Self::Bool(filter) => render_bool(filter),
        }
    }

    /// Serializes the node into its canonical `{"type": "<tag>", ...}` form.
    pub fn to_canonical(&self) -> Value {
        // A tagged enum of field structs always serializes to a JSON object.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Reconstructs a node from its canonical form, validating construction
    /// invariants on the result.
    pub fn from_canonical(value: &Value) -> Result<Self, FilterError> {
        let filter: Self = serde_json::from_value(value.clone())
            .map_err(|err| FilterError::Canonical(err.to_string()))?;
        filter.validate()?;
        Ok(filter)
    }

    /// Checks construction invariants recursively.
    pub fn validate(&self) -> Result<(), FilterError> {
        match self {
            Self::Ids(filter) => filter.validate(),
            Self::Term(filter) => filter.validate(),
            Self::Terms(filter) => filter.validate(),
            Self::Range(filter) => filter.validate(),
            Self::Match(filter) => filter.validate(),
            Self::MatchPhrase(filter) => filter.validate(),
            Self::MultiMatch(filter) => filter.validate(),
            Self::QueryString(filter) => filter.validate(),
            Self::Wildcard(filter) => filter.validate(),
            Self::Bool(filter) => {
                for clause in filter
                    .must
                    .iter()
                    .chain(&filter.must_not)
                    .chain(&filter.should)
                {
                    clause.validate()?;
                }
                Ok(())
            }
        }
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

/// Renders `{"ids": {"values": [...], "type"?}}`.
fn render_ids(filter: &IdsFilter) -> Value {
    let mut body = Map::new();
    body.insert("values".to_string(), Value::Array(filter.values.clone()));
    insert_opt(&mut body, "type", &filter.type_name);
    json!({ "ids": body })
}

/// Renders `{"term": {field: value}}`, or the nested option object when
/// tuning options are present.
fn render_term(filter: &TermFilter) -> Value {
    if filter.boost.is_none() && filter.case_insensitive.is_none() {
        return json!({ "term": { &filter.field: filter.value } });
    }
    let mut body = Map::new();
    body.insert("value".to_string(), filter.value.clone());
    insert_opt(&mut body, "boost", &filter.boost);
    insert_opt(&mut body, "case_insensitive", &filter.case_insensitive);
    json!({ "term": { &filter.field: body } })
}

/// Renders `{"terms": {field: [...], "boost"?}}`.
fn render_terms(filter: &TermsFilter) -> Value {
    let mut body = Map::new();
    body.insert(filter.field.clone(), Value::Array(filter.values.clone()));
    insert_opt(&mut body, "boost", &filter.boost);
    json!({ "terms": body })
}

/// Renders `{"range": {field: {gt?, lt?, gte?, lte?}}}`.
fn render_range(filter: &RangeFilter) -> Value {
    let mut bounds = Map::new();
    insert_opt(&mut bounds, "gt", &filter.conditions.gt);
    insert_opt(&mut bounds, "lt", &filter.conditions.lt);
    insert_opt(&mut bounds, "gte", &filter.conditions.gte);
    insert_opt(&mut bounds, "lte", &filter.conditions.lte);
    json!({ "range": { &filter.field: bounds } })
}

/// Renders `{"match": {field: {"query": ..., options...}}}`.
fn render_match(filter: &MatchFilter) -> Value {
    let mut body = Map::new();
    body.insert("query".to_string(), Value::String(filter.query.clone()));
    insert_opt(&mut body, "analyzer", &filter.analyzer);
    insert_opt(&mut body, "boost", &filter.boost);
    insert_opt(&mut body, "fuzziness", &filter.fuzziness);
    insert_opt(&mut body, "operator", &filter.operator);
    insert_opt(&mut body, "minimum_should_match", &filter.minimum_should_match);
    insert_opt(&mut body, "zero_terms_query", &filter.zero_terms_query);
    json!({ "match": { &filter.field: body } })
}

/// Renders `{"match_phrase": {field: query}}` bare, or the nested option
/// object when tuning options are present.
fn render_match_phrase(filter: &MatchPhraseFilter) -> Value {
    if filter.analyzer.is_none() && filter.boost.is_none() && filter.slop.is_none() {
        return json!({ "match_phrase": { &filter.field: filter.query } });
    }
    let mut body = Map::new();
    body.insert("query".to_string(), Value::String(filter.query.clone()));
    insert_opt(&mut body, "analyzer", &filter.analyzer);
    insert_opt(&mut body, "boost", &filter.boost);
    insert_opt(&mut body, "slop", &filter.slop);
    json!({ "match_phrase": { &filter.field: body } })
}

/// Renders `{"multi_match": {"query", "fields", options...}}`.
fn render_multi_match(filter: &MultiMatchFilter) -> Value {
    let mut body = Map::new();
    body.insert("query".to_string(), Value::String(filter.query.clone()));
    body.insert(
        "fields".to_string(),
        Value::Array(filter.fields.iter().cloned().map(Value::String).collect()),
    );
    insert_opt(&mut body, "type", &filter.type_name);
    insert_opt(&mut body, "analyzer", &filter.analyzer);
    insert_opt(&mut body, "boost", &filter.boost);
    insert_opt(&mut body, "fuzziness", &filter.fuzziness);
    insert_opt(&mut body, "operator", &filter.operator);
    insert_opt(&mut body, "cutoff_frequency", &filter.cutoff_frequency);
    insert_opt(&mut body, "fuzzy_prefix_length", &filter.fuzzy_prefix_length);
    insert_opt(&mut body, "max_expansions", &filter.max_expansions);
    insert_opt(&mut body, "minimum_should_match", &filter.minimum_should_match);
    insert_opt(&mut body, "tie_breaker", &filter.tie_breaker);
    json!({ "multi_match": body })
}

/// Renders `{"query_string": {"query", options...}}`.
fn render_query_string(filter: &QueryStringFilter) -> Value {
    let mut body = Map::new();
    body.insert("query".to_string(), Value::String(filter.query.clone()));
    insert_opt(&mut body, "default_field", &filter.default_field);
    insert_opt(&mut body, "fields", &filter.fields);
    insert_opt(&mut body, "analyzer", &filter.analyzer);
    insert_opt(&mut body, "boost", &filter.boost);
    insert_opt(&mut body, "default_operator", &filter.default_operator);
    insert_opt(&mut body, "allow_leading_wildcard", &filter.allow_leading_wildcard);
    insert_opt(&mut body, "lowercase_expanded_terms", &filter.lowercase_expanded_terms);
    insert_opt(&mut body, "enable_position_increments", &filter.enable_position_increments);
    insert_opt(&mut body, "fuzziness", &filter.fuzziness);
    insert_opt(&mut body, "fuzzy_max_expansions", &filter.fuzzy_max_expansions);
    insert_opt(&mut body, "fuzzy_prefix_length", &filter.fuzzy_prefix_length);
    insert_opt(&mut body, "lenient", &filter.lenient);
    insert_opt(&mut body, "max_determinized_states", &filter.max_determinized_states);
    insert_opt(&mut body, "minimum_should_match", &filter.minimum_should_match);
    insert_opt(&mut body, "phrase_slop", &filter.phrase_slop);
    insert_opt(&mut body, "quote_analyzer", &filter.quote_analyzer);
    insert_opt(&mut body, "rewrite", &filter.rewrite);
    insert_opt(&mut body, "tie_breaker", &filter.tie_breaker);
    json!({ "query_string": body })
}

/// Renders `{"wildcard": {field: pattern}}` bare, or the nested option
/// object when tuning options are present. Boost stays inside the clause.
fn render_wildcard(filter: &WildcardFilter) -> Value {
    if filter.boost.is_none() && filter.case_insensitive.is_none() && filter.rewrite.is_none() {
        return json!({ "wildcard": { &filter.field: filter.value } });
    }
    let mut body = Map::new();
    body.insert("value".to_string(), Value::String(filter.value.clone()));
    insert_opt(&mut body, "boost", &filter.boost);
    insert_opt(&mut body, "case_insensitive", &filter.case_insensitive);
    insert_opt(&mut body, "rewrite", &filter.rewrite);
    json!({ "wildcard": { &filter.field: body } })
}

/// Renders `{"bool": {...}}`, omitting empty clause lists.
/// `minimum_should_match` appears only alongside a non-empty `should`.
fn render_bool(filter: &BoolFilter) -> Value {
    let mut body = Map::new();
    if !filter.must.is_empty() {
        body.insert("must".to_string(), render_clauses(&filter.must));
    }
    if !filter.must_not.is_empty() {
        body.insert("must_not".to_string(), render_clauses(&filter.must_not));
    }
    if !filter.should.is_empty() {
        body.insert("should".to_string(), render_clauses(&filter.should));
        insert_opt(&mut body, "minimum_should_match", &filter.minimum_should_match);
    }
    json!({ "bool": body })
}

/// Renders a clause list in order.
fn render_clauses(clauses: &[Filter]) -> Value {
    Value::Array(clauses.iter().map(Filter::render).collect())
}
