//! Default-layering store for the `cli` domain.
//!
//! Every load recomputes the full default tree and merges the user's file
//! over it, so fields added in newer versions are always present. The store
//! remembers which dot-paths the user's file actually contained and, on save,
//! writes back only the top-level sections holding such a path. Untouched
//! sections never reach disk, which keeps later default changes visible.

use super::checks::{ValidationReport, run_checks};
use super::merge::deep_merge;
use super::types::CliConfig;
use crate::error::{ConfigError, Result};
use crate::paths::{ConfigPaths, PRIMARY_DOMAIN};
use crate::provider::{Provider, ensure_parent_dir, load_schema, read_json, write_json};
use crate::schema::Schema;
use crate::tree::{self, collect_paths, join_path};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};
use tracing::{debug, warn};

/// Built-in schema for the `cli` domain.
pub const CLI_SCHEMA: &str = include_str!("../../schemas/cli.schema.json");

/// The tool's own configuration: defaults plus sparse user overrides.
pub struct CliStore {
    path: PathBuf,
    paths: ConfigPaths,
    schema: RwLock<Option<Schema>>,
    state: RwLock<StoreState>,
}

#[derive(Debug, Clone)]
struct StoreState {
    defaults: Value,
    effective: Value,
    /// Dot-paths present in the user's file, plus paths set this session.
    user_set: BTreeSet<String>,
}

impl StoreState {
    fn fresh() -> Self {
        let defaults = CliConfig::default_tree();
        Self {
            effective: defaults.clone(),
            defaults,
            user_set: BTreeSet::new(),
        }
    }

    fn section_touched(&self, section: &str) -> bool {
        let prefix = format!("{}.", section);
        self.user_set
            .iter()
            .any(|key| key == section || key.starts_with(&prefix))
    }

    /// Mark `path`, its ancestors, and everything under `value` as user-set.
    fn mark(&mut self, path: &str, value: &Value) {
        let segments = tree::split_path(path);
        for depth in 1..=segments.len() {
            self.user_set.insert(segments[..depth].join("."));
        }
        for child in collect_paths(value) {
            self.user_set.insert(join_path(path, &child));
        }
    }

    /// Forget `path` and everything beneath it, then any ancestor left with
    /// no marked descendants.
    fn unmark(&mut self, path: &str) {
        let prefix = format!("{}.", path);
        self.user_set
            .retain(|key| key != path && !key.starts_with(&prefix));
        let segments = tree::split_path(path);
        for depth in (1..segments.len()).rev() {
            let ancestor = segments[..depth].join(".");
            let ancestor_prefix = format!("{}.", ancestor);
            if !self.user_set.iter().any(|k| k.starts_with(&ancestor_prefix)) {
                self.user_set.remove(&ancestor);
            }
        }
    }
}

impl CliStore {
    pub fn new(paths: &ConfigPaths) -> Self {
        Self {
            path: paths.file_for(PRIMARY_DOMAIN),
            paths: paths.clone(),
            schema: RwLock::new(None),
            state: RwLock::new(StoreState::fresh()),
        }
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether `path` was present in the user's file or set this session.
    pub fn is_user_set(&self, path: &str) -> bool {
        self.read_state().user_set.contains(path)
    }

    /// All user-set dot-paths, sorted.
    pub fn user_set_keys(&self) -> Vec<String> {
        self.read_state().user_set.iter().cloned().collect()
    }

    /// The default tree computed at the last load.
    pub fn defaults(&self) -> Value {
        self.read_state().defaults.clone()
    }

    /// User-set leaf paths whose value differs from the default.
    pub fn modified_paths(&self) -> Vec<String> {
        let state = self.read_state();
        tree::flatten(&state.effective)
            .into_iter()
            .filter(|(path, value)| {
                state.user_set.contains(path)
                    && tree::get_path(&state.defaults, path) != Some(value)
            })
            .map(|(path, _)| path)
            .collect()
    }

    /// Restore the default at `path` and drop its user-set marks. The empty
    /// path resets everything.
    pub fn reset(&self, path: &str) -> Result<()> {
        let mut state = self.write_state();
        if path.is_empty() {
            state.effective = state.defaults.clone();
            state.user_set.clear();
            return Ok(());
        }
        match tree::get_path(&state.defaults, path).cloned() {
            Some(default) => tree::set_path(&mut state.effective, path, default)?,
            None => {
                if tree::remove_path(&mut state.effective, path).is_none() {
                    return Err(ConfigError::PathNotFound(path.to_string()));
                }
            }
        }
        state.unmark(path);
        debug!(path, "Reset to default");
        Ok(())
    }

    /// Schema and semantic checks without logging.
    pub fn check(&self) -> ValidationReport {
        let state = self.read_state();
        let mut report = run_checks(&state.effective, |p| state.user_set.contains(p));
        let schema = self.schema.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(schema) = schema.as_ref()
            && let Err(e) = schema.validate(&state.effective)
        {
            report.errors.insert(0, e.to_string());
        }
        report
    }

    /// The document `save` would write: every touched section, whole.
    pub fn persisted_view(&self) -> Value {
        let state = self.read_state();
        let sections: Map<String, Value> = state
            .effective
            .as_object()
            .into_iter()
            .flatten()
            .filter(|(section, _)| state.section_touched(section))
            .map(|(section, value)| (section.clone(), value.clone()))
            .collect();
        Value::Object(sections)
    }
}

impl Provider for CliStore {
    fn domain(&self) -> &str {
        PRIMARY_DOMAIN
    }

    fn config_path(&self) -> PathBuf {
        self.path.clone()
    }

    fn initialize(&self) -> Result<()> {
        ensure_parent_dir(&self.path)?;
        let schema = load_schema(&self.paths, PRIMARY_DOMAIN, Some(CLI_SCHEMA))?;
        *self.schema.write().unwrap_or_else(PoisonError::into_inner) = schema;
        Ok(())
    }

    fn schema(&self) -> Result<Option<Schema>> {
        Ok(self
            .schema
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn load(&self) -> Result<()> {
        let mut next = StoreState::fresh();
        match read_json(&self.path)? {
            None => {
                debug!(file = %self.path.display(), "No user config, using defaults");
            }
            Some(user @ Value::Object(_)) => {
                if let Some(path) = shape_conflict(&next.defaults, &user, "") {
                    return Err(ConfigError::parse(
                        &self.path,
                        format!("'{}' must be an object", path),
                    ));
                }
                next.user_set = collect_paths(&user);
                next.effective = deep_merge(next.defaults.clone(), user);
                debug!(
                    file = %self.path.display(),
                    user_keys = next.user_set.len(),
                    "Loaded user config"
                );
            }
            Some(_) => {
                return Err(ConfigError::parse(
                    &self.path,
                    "configuration root must be a JSON object",
                ));
            }
        }
        *self.write_state() = next;
        Ok(())
    }

    fn save(&self) -> Result<()> {
        let view = self.persisted_view();
        write_json(&self.path, &view)?;
        debug!(
            file = %self.path.display(),
            sections = view.as_object().map(Map::len).unwrap_or(0),
            "Saved user config"
        );
        Ok(())
    }

    fn get(&self, path: &str) -> Result<Value> {
        tree::get_path(&self.read_state().effective, path)
            .cloned()
            .ok_or_else(|| ConfigError::PathNotFound(path.to_string()))
    }

    fn set(&self, path: &str, value: Value) -> Result<()> {
        let mut state = self.write_state();
        tree::set_path(&mut state.effective, path, value.clone())?;
        state.mark(path, &value);
        Ok(())
    }

    fn get_all(&self) -> Result<Value> {
        Ok(self.read_state().effective.clone())
    }

    fn set_all(&self, new_tree: Value) -> Result<()> {
        let Value::Object(sections) = &new_tree else {
            return Err(ConfigError::InvalidPath {
                path: String::new(),
                reason: "configuration root must be an object".to_string(),
            });
        };
        let mut state = self.write_state();
        let existing: Vec<String> = state
            .user_set
            .iter()
            .filter(|key| tree::get_path(&new_tree, key).is_some())
            .cloned()
            .collect();
        state.user_set = existing.into_iter().collect();
        for (section, value) in sections {
            if state.defaults.get(section) != Some(value) {
                state.mark(section, value);
            }
        }
        state.effective = new_tree;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let report = self.check();
        for warning in &report.warnings {
            warn!(domain = PRIMARY_DOMAIN, "{}", warning);
        }
        if report.is_ok() {
            Ok(())
        } else {
            Err(ConfigError::Semantic(report.errors))
        }
    }
}

/// First path where `user` puts a non-object over a default section or
/// group. Null is allowed; the merge keeps the default for it.
fn shape_conflict(defaults: &Value, user: &Value, prefix: &str) -> Option<String> {
    let (Value::Object(defaults), Value::Object(user)) = (defaults, user) else {
        return None;
    };
    user.iter().find_map(|(key, value)| {
        let path = join_path(prefix, key);
        match (defaults.get(key), value) {
            (Some(section @ Value::Object(_)), Value::Object(_)) => {
                shape_conflict(section, value, &path)
            }
            (Some(Value::Object(_)), Value::Null) => None,
            (Some(Value::Object(_)), _) => Some(path),
            _ => None,
        }
    })
}
