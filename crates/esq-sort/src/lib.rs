//! Sort spec builder for esq.
//!
//! Turns a sequence of sort specs into typed sort clauses, preserving input
//! order. A spec sorting on the reserved `_score` field becomes a score
//! sort; a spec carrying a `script` key becomes a script sort; everything
//! else sorts on a document field, optionally inside a nested envelope.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;

/// Errors raised while building sort clauses from specs.
#[derive(Debug, Error)]
pub enum SortError {
    /// The spec shape matches no recognized sort pattern.
    #[error("unrecognized sort spec: {0}")]
    Shape(Value),

    /// A structurally recognized sort violates an invariant.
    #[error("invalid sort on \"{field}\": {message}")]
    Validation {
        /// The sort target (field name, `_score`, or `_script`).
        field: String,
        /// The invariant that was violated.
        message: String,
    },

    /// A value of the wrong fundamental JSON kind was supplied.
    #[error("expected {expected}, got: {value}")]
    Type {
        /// The kind that was required.
        expected: &'static str,
        /// The value that was supplied instead.
        value: Value,
    },

    /// A canonical `{type, ...}` document failed to decode.
    #[error("invalid canonical sort: {0}")]
    Canonical(String),
}

impl SortError {
    /// Creates a `Validation` error for a sort target.
    fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending (the default).
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl SortOrder {
    /// The wire-format spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// Parses the wire-format spelling, naming `field` on failure.
    fn parse(field: &str, value: &Value) -> Result<Self, SortError> {
        match value.as_str() {
            Some("asc") => Ok(Self::Asc),
            Some("desc") => Ok(Self::Desc),
            _ => Err(SortError::validation(
                field,
                format!("order must be \"asc\" or \"desc\", got: {value}"),
            )),
        }
    }
}

/// A sort clause: one element of the output `sort` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Sort {
    /// Sort on a document field.
    Field(FieldSort),
    /// Sort on relevance score.
    Score(ScoreSort),
    /// Sort on a computed script value.
    Script(ScriptSort),
}

/// Sort on a document field, with optional tuning and nested envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSort {
    /// Field to sort on.
    pub field: String,
    /// Sort direction.
    #[serde(default)]
    pub order: SortOrder,
    /// Multi-valued field reduction (`min`, `max`, `avg`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Date format for the sort values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Numeric coercion for the sort values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_type: Option<String>,
    /// Placement of documents missing the field (`_first`, `_last`, or a
    /// substitute value).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing: Option<Value>,
    /// Type assumed for indices where the field is unmapped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unmapped_type: Option<String>,
    /// Nested sub-document path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested_path: Option<String>,
    /// Pre-filter for the nested envelope, echoed verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested_filter: Option<Value>,
}

/// Sort on relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSort {
    /// Sort direction.
    #[serde(default)]
    pub order: SortOrder,
}

/// Sort on a computed script value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptSort {
    /// Script source text.
    pub source: String,
    /// Script language.
    pub lang: String,
    /// Script parameters, echoed verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// Type of the computed value (`number` or `string`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    /// Sort direction.
    #[serde(default)]
    pub order: SortOrder,
}

/// Default script language.
pub const DEFAULT_SCRIPT_LANG: &str = "painless";

impl Sort {
    /// Renders the clause into its wire form.
    pub fn render(&self) -> Value {
        match self {
            Self::Field(sort) => render_field(sort),
            Self::Score(sort) => json!({"_score": {"order": sort.order.as_str()}}),
            Self::Script(sort) => render_script(sort),
        }
    }

    /// Serializes the clause into its canonical `{"type": "<tag>", ...}`
    /// form.
    pub fn to_canonical(&self) -> Value {
        // A tagged enum of field structs always serializes to a JSON object.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Reconstructs a clause from its canonical form.
    pub fn from_canonical(value: &Value) -> Result<Self, SortError> {
        serde_json::from_value(value.clone()).map_err(|err| SortError::Canonical(err.to_string()))
    }
}

/// Renders `{field: {"order", options..., "nested"?}}`.
fn render_field(sort: &FieldSort) -> Value {
    let mut params = Map::new();
    params.insert("order".to_string(), sort.order.as_str().into());
    insert_opt(&mut params, "mode", &sort.mode);
    insert_opt(&mut params, "format", &sort.format);
    insert_opt(&mut params, "numeric_type", &sort.numeric_type);
    insert_opt(&mut params, "missing", &sort.missing);
    insert_opt(&mut params, "unmapped_type", &sort.unmapped_type);
    if let Some(path) = &sort.nested_path {
        let mut nested = Map::new();
        nested.insert("path".to_string(), Value::String(path.clone()));
        if let Some(filter) = &sort.nested_filter {
            nested.insert("filter".to_string(), filter.clone());
        }
        params.insert("nested".to_string(), Value::Object(nested));
    }
    json!({ &sort.field: params })
}

/// Renders `{"_script": {"script": {...}, "type"?, "order"}}`.
fn render_script(sort: &ScriptSort) -> Value {
    let mut script = Map::new();
    script.insert("source".to_string(), Value::String(sort.source.clone()));
    script.insert("lang".to_string(), Value::String(sort.lang.clone()));
    if let Some(params) = &sort.params {
        script.insert("params".to_string(), params.clone());
    }
    let mut body = Map::new();
    body.insert("script".to_string(), Value::Object(script));
    insert_opt(&mut body, "type", &sort.value_type);
    body.insert("order".to_string(), sort.order.as_str().into());
    json!({ "_script": body })
}

/// Inserts `key` when the option is set.
fn insert_opt<T: Serialize>(map: &mut Map<String, Value>, key: &str, value: &Option<T>) {
    if let Some(value) = value {
        if let Ok(value) = serde_json::to_value(value) {
            map.insert(key.to_string(), value);
        }
    }
}

/// Builds the sort clause list from a sequence of specs, preserving order.
pub fn build_all(value: &Value) -> Result<Vec<Sort>, SortError> {
    let Some(specs) = value.as_array() else {
        return Err(SortError::Type {
            expected: "a sort sequence",
            value: value.clone(),
        });
    };
    specs.iter().map(build).collect()
}

/// Builds a single sort clause from its spec.
pub fn build(spec: &Value) -> Result<Sort, SortError> {
    let Some(members) = spec.as_object() else {
        return Err(SortError::Shape(spec.clone()));
    };

    if let Some(script) = members.get("script") {
        return build_script(members, script);
    }

    let Some(field) = members.get("field").and_then(Value::as_str) else {
        return Err(SortError::Shape(spec.clone()));
    };
    let order = parse_order(field, members)?;
    if field == "_score" {
        return Ok(Sort::Score(ScoreSort { order }));
    }

    let nested_path = opt_string(field, members, "nested_path")?;
    let nested_filter = members.get("nested_filter").cloned();
    if nested_filter.is_some() && nested_path.is_none() {
        return Err(SortError::validation(
            field,
            "nested_filter requires nested_path",
        ));
    }
    Ok(Sort::Field(FieldSort {
        field: field.to_string(),
        order,
        mode: opt_string(field, members, "mode")?,
        format: opt_string(field, members, "format")?,
        numeric_type: opt_string(field, members, "numeric_type")?,
        missing: members.get("missing").cloned(),
        unmapped_type: opt_string(field, members, "unmapped_type")?,
        nested_path,
        nested_filter,
    }))
}

/// Builds a script sort from a spec carrying a `script` key.
fn build_script(members: &Map<String, Value>, script: &Value) -> Result<Sort, SortError> {
    let Some(source) = script.as_str() else {
        return Err(SortError::validation(
            "_script",
            format!("script source must be a string, got: {script}"),
        ));
    };
    Ok(Sort::Script(ScriptSort {
        source: source.to_string(),
        lang: opt_string("_script", members, "lang")?
            .unwrap_or_else(|| DEFAULT_SCRIPT_LANG.to_string()),
        params: members.get("params").cloned(),
        value_type: opt_string("_script", members, "type")?,
        order: parse_order("_script", members)?,
    }))
}

/// The `order` member, defaulting to ascending.
fn parse_order(field: &str, members: &Map<String, Value>) -> Result<SortOrder, SortError> {
    members
        .get("order")
        .map(|value| SortOrder::parse(field, value))
        .transpose()
        .map(Option::unwrap_or_default)
}

/// An optional string member, rejecting non-string values.
fn opt_string(
    field: &str,
    members: &Map<String, Value>,
    key: &str,
) -> Result<Option<String>, SortError> {
    match members.get(key) {
        None => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(value) => Err(SortError::validation(
            field,
            format!("\"{key}\" must be a string, got: {value}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_sort_defaults_to_asc() {
        let sort = build(&json!({"field": "created_at"})).unwrap();
        assert_eq!(sort.render(), json!({"created_at": {"order": "asc"}}));
    }

    #[test]
    fn field_sort_descending() {
        let sort = build(&json!({"field": "price", "order": "desc"})).unwrap();
        assert_eq!(sort.render(), json!({"price": {"order": "desc"}}));
    }

    #[test]
    fn field_sort_with_tuning_options() {
        let sort = build(&json!({
            "field": "price",
            "order": "desc",
            "mode": "avg",
            "missing": "_last",
            "unmapped_type": "long"
        }))
        .unwrap();
        assert_eq!(
            sort.render(),
            json!({"price": {
                "order": "desc",
                "mode": "avg",
                "missing": "_last",
                "unmapped_type": "long"
            }})
        );
    }

    #[test]
    fn invalid_order_is_validation_error() {
        let result = build(&json!({"field": "price", "order": "sideways"}));
        assert!(matches!(result, Err(SortError::Validation { .. })));
    }

    #[test]
    fn score_sort_uses_reserved_key() {
        let sort = build(&json!({"field": "_score", "order": "desc"})).unwrap();
        assert_eq!(sort.render(), json!({"_score": {"order": "desc"}}));
    }

    #[test]
    fn script_sort_defaults_lang() {
        let sort = build(&json!({
            "script": "doc['price'].value * params.factor",
            "params": {"factor": 1.1},
            "type": "number",
            "order": "desc"
        }))
        .unwrap();
        assert_eq!(
            sort.render(),
            json!({"_script": {
                "script": {
                    "source": "doc['price'].value * params.factor",
                    "lang": "painless",
                    "params": {"factor": 1.1}
                },
                "type": "number",
                "order": "desc"
            }})
        );
    }

    #[test]
    fn nested_envelope_is_a_sub_object() {
        let sort = build(&json!({
            "field": "offer.price",
            "order": "asc",
            "nested_path": "offer",
            "nested_filter": {"term": {"offer.color": "blue"}}
        }))
        .unwrap();
        assert_eq!(
            sort.render(),
            json!({"offer.price": {
                "order": "asc",
                "nested": {
                    "path": "offer",
                    "filter": {"term": {"offer.color": "blue"}}
                }
            }})
        );
    }

    #[test]
    fn nested_filter_without_path_is_validation_error() {
        let result = build(&json!({
            "field": "offer.price",
            "nested_filter": {"term": {"offer.color": "blue"}}
        }));
        assert!(matches!(result, Err(SortError::Validation { .. })));
    }

    #[test]
    fn build_all_preserves_input_order() {
        let sorts = build_all(&json!([
            {"field": "price", "order": "desc"},
            {"field": "_score"},
            {"field": "created_at"}
        ]))
        .unwrap();
        let rendered: Vec<Value> = sorts.iter().map(Sort::render).collect();
        assert_eq!(
            rendered,
            vec![
                json!({"price": {"order": "desc"}}),
                json!({"_score": {"order": "asc"}}),
                json!({"created_at": {"order": "asc"}}),
            ]
        );
    }

    #[test]
    fn build_all_rejects_non_sequence() {
        let result = build_all(&json!({"field": "price"}));
        assert!(matches!(result, Err(SortError::Type { .. })));
    }

    #[test]
    fn missing_field_is_shape_error() {
        let result = build(&json!({"order": "asc"}));
        assert!(matches!(result, Err(SortError::Shape(_))));
    }

    #[test]
    fn canonical_round_trip() {
        let sorts = vec![
            build(&json!({"field": "price", "order": "desc", "mode": "min"})).unwrap(),
            build(&json!({"field": "_score"})).unwrap(),
            build(&json!({"script": "doc['a'].value", "type": "number"})).unwrap(),
        ];
        for sort in sorts {
            let canonical = sort.to_canonical();
            assert_eq!(Sort::from_canonical(&canonical).unwrap(), sort);
        }
    }
}
