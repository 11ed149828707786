//! Output formatting for command results.

use crate::describe::FieldDoc;
use serde_json::Value;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "text" | "plain" => Some(OutputFormat::Text),
            _ => None,
        }
    }
}

/// Render a configuration value.
///
/// Text output prints strings bare and scalars as-is; structured values are
/// flattened to one `path = value` line per leaf.
pub fn format_value(value: &Value, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        OutputFormat::Text => match value {
            Value::String(s) => s.clone(),
            Value::Object(_) => crate::tree::flatten(value)
                .iter()
                .map(|(path, leaf)| format!("{} = {}", path, leaf))
                .collect::<Vec<_>>()
                .join("\n"),
            other => other.to_string(),
        },
    }
}

/// Render field documentation.
pub fn format_docs(docs: &[&FieldDoc], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(docs).unwrap_or_default(),
        OutputFormat::Text => {
            let mut out = String::new();
            for doc in docs {
                out.push_str(&format!("{} ({}) = {}\n", doc.path, doc.kind, doc.default));
                if let Some(desc) = &doc.description {
                    out.push_str(&format!("    {}\n", desc));
                }
                if !doc.choices.is_empty() {
                    let choices: Vec<String> = doc.choices.iter().map(|c| c.to_string()).collect();
                    out.push_str(&format!("    one of: {}\n", choices.join(", ")));
                }
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_str() {
        assert_eq!(OutputFormat::from_str("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("plain"), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::from_str("yaml"), None);
    }

    #[test]
    fn test_text_scalars_and_objects() {
        assert_eq!(format_value(&json!("nord"), OutputFormat::Text), "nord");
        assert_eq!(format_value(&json!(0.5), OutputFormat::Text), "0.5");
        assert_eq!(
            format_value(&json!({"b": 2, "a": {"c": "x"}}), OutputFormat::Text),
            "a.c = \"x\"\nb = 2"
        );
    }

    #[test]
    fn test_json_output() {
        assert_eq!(
            format_value(&json!({"a": 1}), OutputFormat::Json),
            "{\n  \"a\": 1\n}"
        );
    }
}
