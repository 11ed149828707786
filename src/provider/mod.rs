//! The contract every configuration domain implements.
//!
//! A provider owns one domain's in-memory value tree and its on-disk
//! artifact. Providers guard their own state so they can be shared behind an
//! `Arc` and driven through `&self`.

mod file;

pub use file::{FileLayout, FileProvider};

use crate::error::{ConfigError, Result};
use crate::paths::ConfigPaths;
use crate::schema::Schema;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Per-domain configuration backend.
pub trait Provider: Send + Sync {
    /// Name of the domain this provider serves.
    fn domain(&self) -> &str;

    /// Location of the domain's on-disk artifact.
    fn config_path(&self) -> PathBuf;

    /// One-time setup, run by the manager on registration.
    fn initialize(&self) -> Result<()>;

    /// The domain's schema, if it has one.
    fn schema(&self) -> Result<Option<Schema>>;

    /// Read the on-disk artifact. On failure the previous state is kept.
    fn load(&self) -> Result<()>;

    /// Write the on-disk artifact.
    fn save(&self) -> Result<()>;

    fn get(&self, path: &str) -> Result<Value>;

    /// Store a value, creating intermediate objects as needed.
    fn set(&self, path: &str, value: Value) -> Result<()>;

    fn get_all(&self) -> Result<Value>;

    /// Replace the whole tree.
    fn set_all(&self, tree: Value) -> Result<()>;

    /// Check the current tree against the domain's rules.
    fn validate(&self) -> Result<()>;
}

/// Load a domain schema: `{schema_dir}/{domain}.schema.json` when present,
/// otherwise the built-in document.
pub fn load_schema(paths: &ConfigPaths, domain: &str, builtin: Option<&str>) -> Result<Option<Schema>> {
    let override_file = paths.schema_file(domain);
    if override_file.is_file() {
        let raw = std::fs::read_to_string(&override_file)
            .map_err(|e| ConfigError::io(&override_file, e))?;
        debug!(domain, file = %override_file.display(), "Using schema override");
        return Schema::parse(&raw).map(Some);
    }
    builtin.map(Schema::parse).transpose()
}

/// Read and parse a JSON file. `Ok(None)` when the file does not exist.
pub(crate) fn read_json(path: &Path) -> Result<Option<Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ConfigError::io(path, e)),
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| ConfigError::parse(path, e))
}

/// Write `value` as pretty JSON, going through a sibling temp file so a
/// failed write never leaves a truncated artifact.
pub(crate) fn write_json(path: &Path, value: &Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
    }
    let mut content = serde_json::to_string_pretty(value).map_err(|e| ConfigError::parse(path, e))?;
    content.push('\n');

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);
    std::fs::write(&tmp, content).map_err(|e| ConfigError::io(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        ConfigError::io(path, e)
    })
}

/// Create the parent directory of a domain file.
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_read_missing_file_is_none() {
        let temp = TempDir::new().unwrap();
        assert!(read_json(&temp.path().join("absent.json")).unwrap().is_none());
    }

    #[test]
    fn test_read_malformed_file_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("bad.json");
        std::fs::write(&file, "{not json").unwrap();
        assert!(matches!(
            read_json(&file).unwrap_err(),
            ConfigError::Parse { .. }
        ));
    }

    #[test]
    fn test_write_creates_parents_and_leaves_no_temp() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("nested/dir/out.json");
        write_json(&file, &json!({"a": 1})).unwrap();
        assert_eq!(read_json(&file).unwrap(), Some(json!({"a": 1})));
        assert!(!temp.path().join("nested/dir/out.json.tmp").exists());
    }

    #[test]
    fn test_schema_override_file_wins() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::with_base_dir(temp.path());
        let builtin = r#"{"title": "builtin", "type": "object"}"#;

        let schema = load_schema(&paths, "shell", Some(builtin)).unwrap().unwrap();
        assert_eq!(schema.title.as_deref(), Some("builtin"));

        std::fs::create_dir_all(&paths.schema_dir).unwrap();
        std::fs::write(
            paths.schema_file("shell"),
            r#"{"title": "override", "type": "object"}"#,
        )
        .unwrap();
        let schema = load_schema(&paths, "shell", Some(builtin)).unwrap().unwrap();
        assert_eq!(schema.title.as_deref(), Some("override"));

        assert!(load_schema(&paths, "none", None).unwrap().is_none());
    }
}
