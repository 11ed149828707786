//! Filesystem locations for configuration domains.
//!
//! Resolution order (lowest to highest):
//! 1. Built-in defaults under the platform config directory
//! 2. A bootstrap document named by `DESKCFG_BOOTSTRAP`
//! 3. `DESKCFG_CONFIG_DIR`, `DESKCFG_SCHEMA_DIR`, `DESKCFG_BACKUP_DIR`

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const ENV_CONFIG_DIR: &str = "DESKCFG_CONFIG_DIR";
pub const ENV_SCHEMA_DIR: &str = "DESKCFG_SCHEMA_DIR";
pub const ENV_BACKUP_DIR: &str = "DESKCFG_BACKUP_DIR";
pub const ENV_BOOTSTRAP: &str = "DESKCFG_BOOTSTRAP";

/// Placeholder for the domain name in `file_pattern`.
const DOMAIN_PLACEHOLDER: &str = "%s";

/// Domain whose file uses the canonical name instead of the pattern.
pub const PRIMARY_DOMAIN: &str = "cli";
pub const PRIMARY_FILE_NAME: &str = "config.json";

/// Where each domain's files live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigPaths {
    pub base_dir: PathBuf,
    /// File name pattern; `%s` is replaced with the domain name.
    pub file_pattern: String,
    pub schema_dir: PathBuf,
    pub backup_dir: PathBuf,
    /// Per-domain file overrides.
    pub output_paths: BTreeMap<String, PathBuf>,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        let base_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("deskcfg");
        Self::with_base_dir(base_dir)
    }
}

/// Partial paths document accepted from the bootstrap file.
#[derive(Debug, Default, Deserialize)]
struct PathsOverlay {
    base_dir: Option<PathBuf>,
    file_pattern: Option<String>,
    schema_dir: Option<PathBuf>,
    backup_dir: Option<PathBuf>,
    #[serde(default)]
    output_paths: BTreeMap<String, PathBuf>,
}

impl ConfigPaths {
    /// Layout rooted at `base_dir` with `schemas/` and `backups/` beneath it.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Self {
            schema_dir: base_dir.join("schemas"),
            backup_dir: base_dir.join("backups"),
            file_pattern: format!("{}.json", DOMAIN_PLACEHOLDER),
            output_paths: BTreeMap::new(),
            base_dir,
        }
    }

    /// Resolve paths from the process environment.
    pub fn discover() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve paths using `lookup` in place of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut paths = Self::default();

        if let Some(bootstrap) = lookup(ENV_BOOTSTRAP) {
            paths.apply_bootstrap(Path::new(&bootstrap))?;
        }

        // A new base dir moves the derived dirs with it unless they were
        // set explicitly.
        if let Some(base) = lookup(ENV_CONFIG_DIR) {
            let rebased = Self::with_base_dir(&base);
            if paths.schema_dir == paths.base_dir.join("schemas") {
                paths.schema_dir = rebased.schema_dir;
            }
            if paths.backup_dir == paths.base_dir.join("backups") {
                paths.backup_dir = rebased.backup_dir;
            }
            paths.base_dir = rebased.base_dir;
        }
        if let Some(dir) = lookup(ENV_SCHEMA_DIR) {
            paths.schema_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(ENV_BACKUP_DIR) {
            paths.backup_dir = PathBuf::from(dir);
        }

        debug!(base_dir = %paths.base_dir.display(), "Resolved configuration paths");
        Ok(paths)
    }

    /// Overlay a bootstrap paths document (YAML or JSON) onto these paths.
    pub fn apply_bootstrap(&mut self, file: &Path) -> Result<()> {
        let content =
            std::fs::read_to_string(file).map_err(|e| ConfigError::io(file, e))?;
        let overlay: PathsOverlay =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::parse(file, e))?;

        if let Some(base) = overlay.base_dir {
            let rebased = Self::with_base_dir(base);
            self.schema_dir = overlay.schema_dir.unwrap_or(rebased.schema_dir);
            self.backup_dir = overlay.backup_dir.unwrap_or(rebased.backup_dir);
            self.base_dir = rebased.base_dir;
        } else {
            if let Some(dir) = overlay.schema_dir {
                self.schema_dir = dir;
            }
            if let Some(dir) = overlay.backup_dir {
                self.backup_dir = dir;
            }
        }
        if let Some(pattern) = overlay.file_pattern {
            if !pattern.contains(DOMAIN_PLACEHOLDER) {
                return Err(ConfigError::parse(
                    file,
                    format!("file_pattern '{}' must contain '%s'", pattern),
                ));
            }
            self.file_pattern = pattern;
        }
        self.output_paths.extend(overlay.output_paths);
        debug!(file = %file.display(), "Applied bootstrap paths");
        Ok(())
    }

    /// On-disk file for `domain`.
    pub fn file_for(&self, domain: &str) -> PathBuf {
        if let Some(path) = self.output_paths.get(domain) {
            return path.clone();
        }
        if domain == PRIMARY_DOMAIN {
            return self.base_dir.join(PRIMARY_FILE_NAME);
        }
        self.base_dir
            .join(self.file_pattern.replace(DOMAIN_PLACEHOLDER, domain))
    }

    /// Optional schema override file for `domain`.
    pub fn schema_file(&self, domain: &str) -> PathBuf {
        self.schema_dir.join(format!("{}.schema.json", domain))
    }
}
