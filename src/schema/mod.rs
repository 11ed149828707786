//! JSON-Schema-like documents describing one configuration domain.
//!
//! Only the subset the configuration layer needs is understood: `type`
//! (single or union), `enum`, `default`, `properties`, `items`, numeric and
//! string bounds, `pattern`, `required` and `additionalProperties`. Unknown
//! keywords are ignored.

mod registry;
mod validator;

pub use registry::SchemaRegistry;

use crate::error::{ConfigError, Result};
use crate::tree;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Key of the tool-specific metadata extension in schema documents.
pub const METADATA_KEY: &str = "x-deskcfg";

/// Declared type of a property: one name or a union of names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSpec {
    Single(String),
    Union(Vec<String>),
}

impl TypeSpec {
    pub fn names(&self) -> Vec<&str> {
        match self {
            TypeSpec::Single(name) => vec![name.as_str()],
            TypeSpec::Union(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

/// One schema node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<TypeSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Property>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Property>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<bool>,
}

impl Property {
    /// Child node for one path segment: a named property, or `items` when
    /// the segment is an array index.
    fn child(&self, segment: &str) -> Option<&Property> {
        if let Some(prop) = self.properties.get(segment) {
            return Some(prop);
        }
        if segment.parse::<usize>().is_ok() {
            return self.items.as_deref();
        }
        None
    }

    /// Value tree built from `default`s, descending into nested properties
    /// when the node itself has no default.
    pub fn default_tree(&self) -> Option<Value> {
        if let Some(default) = &self.default {
            return Some(default.clone());
        }
        if self.properties.is_empty() {
            return None;
        }
        let map: Map<String, Value> = self
            .properties
            .iter()
            .filter_map(|(key, prop)| prop.default_tree().map(|v| (key.clone(), v)))
            .collect();
        Some(Value::Object(map))
    }
}

/// Document-level fields that sit beside the root property.
#[derive(Debug, Clone, Default, Deserialize)]
struct Header {
    #[serde(rename = "$schema")]
    schema_uri: Option<String>,
    #[serde(rename = "$id")]
    id: Option<String>,
    title: Option<String>,
    version: Option<String>,
    #[serde(rename = "x-deskcfg")]
    metadata: Option<Value>,
}

/// A parsed schema for one domain.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub schema_uri: Option<String>,
    pub id: Option<String>,
    pub title: Option<String>,
    pub version: Option<String>,
    /// Contents of the `x-deskcfg` extension, if any.
    pub metadata: Option<Value>,
    pub root: Property,
    raw: Option<String>,
}

impl Schema {
    /// Build a schema around an in-memory root property.
    pub fn new(root: Property) -> Result<Self> {
        check_root(&root)?;
        Ok(Self {
            schema_uri: None,
            id: None,
            title: None,
            version: None,
            metadata: None,
            root,
            raw: None,
        })
    }

    /// Parse a schema document, keeping the original text for `to_json`.
    pub fn parse(raw: &str) -> Result<Self> {
        let doc: Value = serde_json::from_str(raw)
            .map_err(|e| ConfigError::InvalidSchema(format!("malformed document: {}", e)))?;
        let mut schema = Self::from_value(doc)?;
        schema.raw = Some(raw.to_string());
        Ok(schema)
    }

    /// Build a schema from an already-parsed document.
    pub fn from_value(doc: Value) -> Result<Self> {
        if !doc.is_object() {
            return Err(ConfigError::InvalidSchema(
                "schema document must be an object".to_string(),
            ));
        }
        let header: Header = serde_json::from_value(doc.clone())
            .map_err(|e| ConfigError::InvalidSchema(e.to_string()))?;
        let root: Property =
            serde_json::from_value(doc).map_err(|e| ConfigError::InvalidSchema(e.to_string()))?;
        check_root(&root)?;
        Ok(Self {
            schema_uri: header.schema_uri,
            id: header.id,
            title: header.title,
            version: header.version,
            metadata: header.metadata,
            root,
            raw: None,
        })
    }

    pub fn description(&self) -> Option<&str> {
        self.root.description.as_deref()
    }

    /// Top-level required keys.
    pub fn required(&self) -> &[String] {
        &self.root.required
    }

    /// Resolve the property at a dot-path. The empty path is the root.
    pub fn property(&self, path: &str) -> Result<&Property> {
        let mut current = &self.root;
        let mut resolved: Vec<&str> = Vec::new();
        for segment in tree::split_path(path) {
            current = current
                .child(segment)
                .ok_or_else(|| ConfigError::SchemaPathNotFound {
                    path: path.to_string(),
                    resolved: resolved.join("."),
                })?;
            resolved.push(segment);
        }
        Ok(current)
    }

    /// Deepest property on the way to `path` and whether the whole path
    /// resolved.
    pub(crate) fn deepest(&self, path: &str) -> (&Property, bool) {
        let mut current = &self.root;
        for segment in tree::split_path(path) {
            match current.child(segment) {
                Some(next) => current = next,
                None => return (current, false),
            }
        }
        (current, true)
    }

    /// Defaults declared by this schema as a value tree.
    pub fn default_tree(&self) -> Value {
        self.root
            .default_tree()
            .unwrap_or_else(|| Value::Object(Map::new()))
    }

    /// The original document text if parsed from text, else a re-serialization.
    pub fn to_json(&self) -> Result<String> {
        if let Some(raw) = &self.raw {
            return Ok(raw.clone());
        }
        let mut doc = serde_json::to_value(&self.root)
            .map_err(|e| ConfigError::InvalidSchema(e.to_string()))?;
        if let Value::Object(map) = &mut doc {
            let header = [
                ("$schema", self.schema_uri.clone().map(Value::String)),
                ("$id", self.id.clone().map(Value::String)),
                ("title", self.title.clone().map(Value::String)),
                ("version", self.version.clone().map(Value::String)),
                (METADATA_KEY, self.metadata.clone()),
            ];
            for (key, value) in header {
                if let Some(value) = value {
                    map.insert(key.to_string(), value);
                }
            }
        }
        serde_json::to_string_pretty(&doc).map_err(|e| ConfigError::InvalidSchema(e.to_string()))
    }
}

fn check_root(root: &Property) -> Result<()> {
    match &root.kind {
        None => Ok(()),
        Some(TypeSpec::Single(name)) if name == "object" => Ok(()),
        Some(other) => Err(ConfigError::InvalidSchema(format!(
            "root type must be \"object\", found {:?}",
            other.names()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SAMPLE: &str = r#"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "title": "sample",
  "version": "2",
  "type": "object",
  "required": ["theme"],
  "x-deskcfg": {"consumer": "tests"},
  "properties": {
    "theme": {"type": "string", "enum": ["dark", "light"], "default": "dark"},
    "bar": {
      "type": "object",
      "properties": {
        "height": {"type": "integer", "minimum": 16, "default": 32},
        "modules": {"type": "array", "items": {"type": "string"}}
      }
    }
  }
}"#;

    #[test]
    fn test_parse_header_and_root() {
        let schema = Schema::parse(SAMPLE).unwrap();
        assert_eq!(schema.title.as_deref(), Some("sample"));
        assert_eq!(schema.version.as_deref(), Some("2"));
        assert_eq!(schema.required(), ["theme".to_string()]);
        assert_eq!(schema.metadata, Some(json!({"consumer": "tests"})));
        assert_eq!(schema.root.properties.len(), 2);
    }

    #[test]
    fn test_property_lookup() {
        let schema = Schema::parse(SAMPLE).unwrap();
        let height = schema.property("bar.height").unwrap();
        assert_eq!(height.minimum, Some(16.0));
        let item = schema.property("bar.modules.0").unwrap();
        assert_eq!(item.kind, Some(TypeSpec::Single("string".into())));
    }

    #[test]
    fn test_property_lookup_reports_resolved_prefix() {
        let schema = Schema::parse(SAMPLE).unwrap();
        match schema.property("bar.width.px").unwrap_err() {
            ConfigError::SchemaPathNotFound { path, resolved } => {
                assert_eq!(path, "bar.width.px");
                assert_eq!(resolved, "bar");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_root_must_be_object() {
        let err = Schema::parse(r#"{"type": "array"}"#).unwrap_err();
        assert!(err.to_string().contains("root type must be"));
        assert!(Schema::parse(r#"{"properties": {}}"#).is_ok());
    }

    #[test]
    fn test_to_json_preserves_raw_text() {
        let schema = Schema::parse(SAMPLE).unwrap();
        assert_eq!(schema.to_json().unwrap(), SAMPLE);
    }

    #[test]
    fn test_to_json_reserializes_built_schema() {
        let mut root = Property::default();
        root.kind = Some(TypeSpec::Single("object".into()));
        let mut schema = Schema::new(root).unwrap();
        schema.title = Some("built".into());
        let doc: Value = serde_json::from_str(&schema.to_json().unwrap()).unwrap();
        assert_eq!(doc, json!({"type": "object", "title": "built"}));
    }

    #[test]
    fn test_default_tree() {
        let schema = Schema::parse(SAMPLE).unwrap();
        assert_eq!(
            schema.default_tree(),
            json!({"theme": "dark", "bar": {"height": 32}})
        );
    }
}
