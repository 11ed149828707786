//! Searchable field documentation.
//!
//! Built from a domain's static default tree and its schema descriptions,
//! never from the live store, so the output is the same for every user.

use crate::schema::Schema;
use crate::tree;
use serde::Serialize;
use serde_json::Value;

/// Documentation for one leaf setting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDoc {
    pub path: String,
    /// Value kind of the default (`string`, `number`, ...).
    pub kind: String,
    pub default: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Allowed values, when the schema closes the field.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Value>,
}

/// One entry per leaf of `defaults`, sorted by path.
pub fn describe(defaults: &Value, schema: Option<&Schema>) -> Vec<FieldDoc> {
    tree::flatten(defaults)
        .into_iter()
        .map(|(path, default)| {
            let prop = schema.and_then(|s| s.property(&path).ok());
            FieldDoc {
                kind: kind_of(&default).to_string(),
                description: prop.and_then(|p| p.description.clone()),
                choices: prop
                    .and_then(|p| p.enum_values.clone())
                    .unwrap_or_default(),
                default,
                path,
            }
        })
        .collect()
}

/// Fields whose path or description contains `query`, case-insensitively.
pub fn search<'a>(docs: &'a [FieldDoc], query: &str) -> Vec<&'a FieldDoc> {
    let query = query.to_lowercase();
    docs.iter()
        .filter(|doc| {
            doc.path.to_lowercase().contains(&query)
                || doc
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&query))
        })
        .collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
