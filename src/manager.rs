//! Orchestration of all configuration domains.
//!
//! The manager owns the domain → provider map and the schema registry.
//! Lookups take the read lock just long enough to clone the provider's
//! `Arc`; provider I/O always runs with the lock released, so a slow save in
//! one domain never blocks access to another.

use crate::error::{ConfigError, DomainFailure, Result};
use crate::paths::ConfigPaths;
use crate::provider::Provider;
use crate::schema::{Schema, SchemaRegistry};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Registry and dispatcher for configuration domains.
pub struct Manager {
    paths: RwLock<ConfigPaths>,
    initialized: AtomicBool,
    providers: RwLock<BTreeMap<String, Arc<dyn Provider>>>,
    schemas: SchemaRegistry,
}

impl Manager {
    /// Create a manager with paths resolved from the environment.
    pub fn new() -> Result<Self> {
        Ok(Self::with_paths(ConfigPaths::discover()?))
    }

    /// Create a manager with explicit paths.
    pub fn with_paths(paths: ConfigPaths) -> Self {
        Self {
            paths: RwLock::new(paths),
            initialized: AtomicBool::new(false),
            providers: RwLock::new(BTreeMap::new()),
            schemas: SchemaRegistry::new(),
        }
    }

    /// Prepare the base directory. Later calls do nothing.
    pub fn initialize(&self) -> Result<()> {
        // Hold the paths write lock so set_paths cannot race the transition.
        let paths = self.paths.write().unwrap_or_else(PoisonError::into_inner);
        if self.initialized.load(Ordering::Acquire) {
            return Ok(());
        }
        std::fs::create_dir_all(&paths.base_dir)
            .map_err(|e| ConfigError::io(&paths.base_dir, e))?;
        self.initialized.store(true, Ordering::Release);
        info!(base_dir = %paths.base_dir.display(), "Configuration manager initialized");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Current paths.
    pub fn paths(&self) -> ConfigPaths {
        self.paths
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the paths. Only allowed before `initialize`.
    pub fn set_paths(&self, paths: ConfigPaths) -> Result<()> {
        let mut current = self.paths.write().unwrap_or_else(PoisonError::into_inner);
        if self.initialized.load(Ordering::Acquire) {
            return Err(ConfigError::PathsLocked);
        }
        *current = paths;
        Ok(())
    }

    /// Initialize `provider`, register its schema and bind it to `domain`.
    ///
    /// Nothing is kept for the domain if any step fails.
    pub fn register_provider(&self, domain: &str, provider: Arc<dyn Provider>) -> Result<()> {
        if self.contains(domain) {
            return Err(ConfigError::DomainExists(domain.to_string()));
        }

        provider.initialize()?;
        let schema = provider.schema()?;

        let mut providers = self.providers.write().unwrap_or_else(PoisonError::into_inner);
        if providers.contains_key(domain) {
            return Err(ConfigError::DomainExists(domain.to_string()));
        }
        if let Some(schema) = schema {
            self.schemas.register(domain, schema)?;
        }
        providers.insert(domain.to_string(), provider);
        debug!(domain, "Registered configuration domain");
        Ok(())
    }

    fn contains(&self, domain: &str) -> bool {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(domain)
    }

    /// Provider for `domain`, cloned out from under the lock.
    pub fn provider(&self, domain: &str) -> Result<Arc<dyn Provider>> {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(domain)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownDomain(domain.to_string()))
    }

    fn snapshot(&self) -> Vec<(String, Arc<dyn Provider>)> {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(domain, provider)| (domain.clone(), Arc::clone(provider)))
            .collect()
    }

    /// Registered domain names, sorted.
    pub fn list_domains(&self) -> Vec<String> {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    pub fn schema(&self, domain: &str) -> Option<Arc<Schema>> {
        self.schemas.get(domain)
    }

    pub fn get(&self, domain: &str, path: &str) -> Result<Value> {
        self.provider(domain)?.get(path)
    }

    /// Validate `value` against the domain schema, then store it.
    pub fn set(&self, domain: &str, path: &str, value: Value) -> Result<()> {
        let provider = self.provider(domain)?;
        if let Some(schema) = self.schemas.get(domain) {
            schema
                .validate_value(path, &value)
                .map_err(|e| ConfigError::ValidationFailed(Box::new(e)))?;
        }
        provider.set(path, value)
    }

    pub fn get_all(&self, domain: &str) -> Result<Value> {
        self.provider(domain)?.get_all()
    }

    /// Validate a whole tree against the domain schema, then replace it.
    pub fn set_all(&self, domain: &str, tree: Value) -> Result<()> {
        let provider = self.provider(domain)?;
        if let Some(schema) = self.schemas.get(domain) {
            schema
                .validate(&tree)
                .map_err(|e| ConfigError::ValidationFailed(Box::new(e)))?;
        }
        provider.set_all(tree)
    }

    pub fn load(&self, domain: &str) -> Result<()> {
        self.provider(domain)?.load()
    }

    pub fn save(&self, domain: &str) -> Result<()> {
        self.provider(domain)?.save()
    }

    pub fn validate(&self, domain: &str) -> Result<()> {
        self.provider(domain)?.validate()
    }

    /// Run `op` on every domain, collecting failures instead of stopping.
    pub fn apply_all<F>(&self, mut op: F) -> Result<()>
    where
        F: FnMut(&str, &dyn Provider) -> Result<()>,
    {
        let providers = self.snapshot();
        let total = providers.len();
        let mut failures = Vec::new();
        for (domain, provider) in providers {
            if let Err(cause) = op(&domain, provider.as_ref()) {
                warn!(domain = %domain, error = %cause, "Domain operation failed");
                failures.push(DomainFailure { domain, cause });
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Aggregate { total, failures })
        }
    }

    pub fn load_all(&self) -> Result<()> {
        self.apply_all(|_, provider| provider.load())
    }

    pub fn save_all(&self) -> Result<()> {
        self.apply_all(|_, provider| provider.save())
    }

    pub fn validate_all(&self) -> Result<()> {
        self.apply_all(|_, provider| provider.validate())
    }

    /// Every domain's tree keyed by domain. Domains that fail to read are
    /// reported through the aggregate error.
    pub fn get_all_domains(&self) -> Result<BTreeMap<String, Value>> {
        let mut trees = BTreeMap::new();
        self.apply_all(|domain, provider| {
            trees.insert(domain.to_string(), provider.get_all()?);
            Ok(())
        })?;
        Ok(trees)
    }

    /// Replace several domains' trees at once, keyed by domain. Each tree is
    /// validated and applied independently; failures are aggregated.
    pub fn set_all_domains(&self, trees: BTreeMap<String, Value>) -> Result<()> {
        let total = trees.len();
        let mut failures = Vec::new();
        for (domain, tree) in trees {
            if let Err(cause) = self.set_all(&domain, tree) {
                warn!(domain = %domain, error = %cause, "Domain operation failed");
                failures.push(DomainFailure { domain, cause });
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Aggregate { total, failures })
        }
    }

    /// Copy the domain's on-disk file into the backup directory.
    pub fn backup(&self, domain: &str) -> Result<PathBuf> {
        let provider = self.provider(domain)?;
        let source = provider.config_path();
        let backup_dir = self.paths().backup_dir;
        std::fs::create_dir_all(&backup_dir).map_err(|e| ConfigError::io(&backup_dir, e))?;

        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let target = backup_dir.join(format!("{}-{}.json", domain, stamp));
        std::fs::copy(&source, &target).map_err(|e| ConfigError::io(&source, e))?;
        info!(domain, backup = %target.display(), "Backed up configuration");
        Ok(target)
    }
}
