//! Generic JSON-file provider.
//!
//! Holds a value tree seeded from the schema's declared defaults and merges
//! the domain file over it on load. The on-disk layout is either a nested
//! JSON document or a flat `dot.path -> value` object, the shape the shell
//! daemon reads.

use super::{Provider, ensure_parent_dir, load_schema, read_json, write_json};
use crate::config::deep_merge;
use crate::error::{ConfigError, Result};
use crate::paths::ConfigPaths;
use crate::schema::Schema;
use crate::tree;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

/// How a domain tree is laid out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileLayout {
    /// The tree as a nested JSON document.
    Nested,
    /// One object keyed by dot-path, leaves only.
    Flattened,
}

/// Provider backed by a single JSON file.
pub struct FileProvider {
    domain: String,
    path: PathBuf,
    layout: FileLayout,
    paths: ConfigPaths,
    builtin_schema: Option<&'static str>,
    state: RwLock<FileState>,
}

struct FileState {
    schema: Option<Schema>,
    tree: Value,
}

impl FileProvider {
    pub fn new(domain: impl Into<String>, paths: &ConfigPaths, layout: FileLayout) -> Self {
        let domain = domain.into();
        Self {
            path: paths.file_for(&domain),
            domain,
            layout,
            paths: paths.clone(),
            builtin_schema: None,
            state: RwLock::new(FileState {
                schema: None,
                tree: Value::Object(Map::new()),
            }),
        }
    }

    /// Use `schema` when no override exists in the schema directory.
    pub fn with_builtin_schema(mut self, schema: &'static str) -> Self {
        self.builtin_schema = Some(schema);
        self
    }

    pub fn layout(&self) -> FileLayout {
        self.layout
    }

    fn defaults(state: &FileState) -> Value {
        state
            .schema
            .as_ref()
            .map(Schema::default_tree)
            .unwrap_or_else(|| Value::Object(Map::new()))
    }

    fn decode(&self, on_disk: Value) -> Result<Value> {
        match (self.layout, on_disk) {
            (FileLayout::Nested, value @ Value::Object(_)) => Ok(value),
            (FileLayout::Nested, _) => Err(ConfigError::parse(
                &self.path,
                "configuration root must be a JSON object",
            )),
            (FileLayout::Flattened, Value::Object(flat)) => tree::unflatten(&flat),
            (FileLayout::Flattened, _) => Err(ConfigError::parse(
                &self.path,
                "flattened configuration must be a JSON object",
            )),
        }
    }

    fn encode(&self, tree: &Value) -> Value {
        match self.layout {
            FileLayout::Nested => tree.clone(),
            FileLayout::Flattened => Value::Object(tree::flatten(tree)),
        }
    }
}

impl Provider for FileProvider {
    fn domain(&self) -> &str {
        &self.domain
    }

    fn config_path(&self) -> PathBuf {
        self.path.clone()
    }

    fn initialize(&self) -> Result<()> {
        ensure_parent_dir(&self.path)?;
        let schema = load_schema(&self.paths, &self.domain, self.builtin_schema)?;
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.tree = schema
            .as_ref()
            .map(Schema::default_tree)
            .unwrap_or_else(|| Value::Object(Map::new()));
        state.schema = schema;
        Ok(())
    }

    fn schema(&self) -> Result<Option<Schema>> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Ok(state.schema.clone())
    }

    fn load(&self) -> Result<()> {
        let on_disk = read_json(&self.path)?;
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let defaults = Self::defaults(&state);
        state.tree = match on_disk {
            Some(value) => deep_merge(defaults, self.decode(value)?),
            None => defaults,
        };
        debug!(domain = %self.domain, file = %self.path.display(), "Loaded domain");
        Ok(())
    }

    fn save(&self) -> Result<()> {
        let encoded = {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            self.encode(&state.tree)
        };
        write_json(&self.path, &encoded)?;
        debug!(domain = %self.domain, file = %self.path.display(), "Saved domain");
        Ok(())
    }

    fn get(&self, path: &str) -> Result<Value> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        tree::get_path(&state.tree, path)
            .cloned()
            .ok_or_else(|| ConfigError::PathNotFound(path.to_string()))
    }

    fn set(&self, path: &str, value: Value) -> Result<()> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        tree::set_path(&mut state.tree, path, value)
    }

    fn get_all(&self) -> Result<Value> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Ok(state.tree.clone())
    }

    fn set_all(&self, tree: Value) -> Result<()> {
        if !tree.is_object() {
            return Err(ConfigError::InvalidPath {
                path: String::new(),
                reason: "configuration root must be an object".to_string(),
            });
        }
        // A dotted key would come back nested after a flattened round trip.
        if self.layout == FileLayout::Flattened
            && let Some(key) = dotted_key(&tree, "")
        {
            return Err(ConfigError::InvalidPath {
                path: key,
                reason: "keys may not contain '.' in a flattened domain".to_string(),
            });
        }
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.tree = tree;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        match &state.schema {
            Some(schema) => schema.validate(&state.tree),
            None => Ok(()),
        }
    }
}

/// Path of the first object key that itself contains a dot.
fn dotted_key(value: &Value, prefix: &str) -> Option<String> {
    let Value::Object(map) = value else {
        return None;
    };
    map.iter().find_map(|(key, child)| {
        let path = tree::join_path(prefix, key);
        if key.contains('.') {
            Some(path)
        } else {
            dotted_key(child, &path)
        }
    })
}
