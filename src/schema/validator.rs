//! Recursive value-against-schema validation.
//!
//! `null` always passes: it models a setting that is intentionally unset.
//! Keys without a matching property are accepted unless the enclosing node
//! sets `additionalProperties: false`. String patterns use search semantics
//! (`Regex::is_match`); anchor a pattern with `^...$` to require a full match.

use super::{Property, Schema};
use crate::error::{ConfigError, Result};
use crate::tree::join_path;
use serde_json::Value;

impl Schema {
    /// Validate a whole domain tree against this schema.
    pub fn validate(&self, root: &Value) -> Result<()> {
        if !root.is_object() {
            return Err(ConfigError::violation(
                "",
                format!("configuration root must be an object, got {}", kind_name(root)),
            ));
        }
        validate_node("", root, &self.root)
    }

    /// Validate a value about to be stored at `path`.
    ///
    /// Paths the schema does not describe are accepted unless the deepest
    /// described ancestor forbids additional properties.
    pub fn validate_value(&self, path: &str, value: &Value) -> Result<()> {
        match self.deepest(path) {
            (prop, true) => validate_node(path, value, prop),
            (parent, false) if parent.additional_properties == Some(false) => Err(
                ConfigError::violation(path, format!("property '{}' is not allowed", path)),
            ),
            _ => Ok(()),
        }
    }
}

/// Validate `value` at `path` against one schema node.
pub(crate) fn validate_node(path: &str, value: &Value, prop: &Property) -> Result<()> {
    if value.is_null() {
        return Ok(());
    }

    if let Some(kind) = &prop.kind {
        let names = kind.names();
        if !names.iter().any(|name| matches_type(value, name)) {
            return Err(ConfigError::violation(
                path,
                format!(
                    "value at '{}' must be of type {}, got {}",
                    path,
                    names.join(" or "),
                    kind_name(value)
                ),
            ));
        }
    }

    if let Some(allowed) = &prop.enum_values
        && !allowed.iter().any(|choice| same_value(choice, value))
    {
        let choices: Vec<String> = allowed.iter().map(display_value).collect();
        return Err(ConfigError::violation(
            path,
            format!(
                "value at '{}' must be one of [{}], got {}",
                path,
                choices.join(", "),
                display_value(value)
            ),
        ));
    }

    match value {
        Value::String(s) => check_string(path, s, prop),
        Value::Number(n) => check_number(path, n.as_f64().unwrap_or(f64::NAN), prop),
        Value::Array(items) => {
            if let Some(item_prop) = &prop.items {
                for (i, item) in items.iter().enumerate() {
                    validate_node(&format!("{}[{}]", path, i), item, item_prop)?;
                }
            }
            Ok(())
        }
        Value::Object(map) => {
            for key in &prop.required {
                if !map.contains_key(key) {
                    return Err(ConfigError::violation(
                        path,
                        format!("missing required property '{}'", join_path(path, key)),
                    ));
                }
            }
            for (key, child) in map {
                let child_path = join_path(path, key);
                match prop.properties.get(key) {
                    Some(child_prop) => validate_node(&child_path, child, child_prop)?,
                    None if prop.additional_properties == Some(false) => {
                        return Err(ConfigError::violation(
                            &child_path,
                            format!("property '{}' is not allowed", child_path),
                        ));
                    }
                    None => {}
                }
            }
            Ok(())
        }
        Value::Bool(_) | Value::Null => Ok(()),
    }
}

fn check_string(path: &str, s: &str, prop: &Property) -> Result<()> {
    let len = s.chars().count();
    if let Some(min) = prop.min_length
        && len < min
    {
        return Err(ConfigError::violation(
            path,
            format!("value at '{}' must be at least {} characters", path, min),
        ));
    }
    if let Some(max) = prop.max_length
        && len > max
    {
        return Err(ConfigError::violation(
            path,
            format!("value at '{}' must be at most {} characters", path, max),
        ));
    }
    if let Some(pattern) = &prop.pattern {
        let re = regex_lite::Regex::new(pattern).map_err(|e| {
            ConfigError::InvalidSchema(format!("bad pattern at '{}': {}", path, e))
        })?;
        if !re.is_match(s) {
            return Err(ConfigError::violation(
                path,
                format!("value at '{}' must match pattern '{}'", path, pattern),
            ));
        }
    }
    Ok(())
}

fn check_number(path: &str, n: f64, prop: &Property) -> Result<()> {
    if let Some(min) = prop.minimum
        && n < min
    {
        return Err(ConfigError::violation(
            path,
            format!("value at '{}' must be >= {}, got {}", path, min, n),
        ));
    }
    if let Some(max) = prop.maximum
        && n > max
    {
        return Err(ConfigError::violation(
            path,
            format!("value at '{}' must be <= {}, got {}", path, max, n),
        ));
    }
    Ok(())
}

/// Enum membership. Numbers compare by value so `1.0` matches `1`, as the
/// `integer` type does.
fn same_value(choice: &Value, value: &Value) -> bool {
    match (choice, value) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => choice == value,
    }
}

fn matches_type(value: &Value, name: &str) -> bool {
    match (name, value) {
        ("string", Value::String(_)) => true,
        ("number", Value::Number(_)) => true,
        ("integer", Value::Number(n)) => {
            n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
        }
        ("boolean", Value::Bool(_)) => true,
        ("array", Value::Array(_)) => true,
        ("object", Value::Object(_)) => true,
        ("null", Value::Null) => true,
        _ => false,
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
