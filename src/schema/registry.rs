//! Thread-safe map of domain name to schema.

use super::Schema;
use crate::error::{ConfigError, Result};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Domain → schema map guarded by one reader/writer lock.
///
/// Re-registering a domain replaces its schema.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: RwLock<HashMap<String, Arc<Schema>>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, domain: &str, schema: Schema) -> Result<()> {
        if domain.is_empty() {
            return Err(ConfigError::InvalidSchema(
                "cannot register a schema for an empty domain name".to_string(),
            ));
        }
        let schema = Arc::new(schema);
        let mut schemas = self.schemas.write().unwrap_or_else(PoisonError::into_inner);
        schemas.insert(domain.to_string(), schema);
        Ok(())
    }

    pub fn get(&self, domain: &str) -> Option<Arc<Schema>> {
        let schemas = self.schemas.read().unwrap_or_else(PoisonError::into_inner);
        schemas.get(domain).cloned()
    }

    pub fn contains(&self, domain: &str) -> bool {
        let schemas = self.schemas.read().unwrap_or_else(PoisonError::into_inner);
        schemas.contains_key(domain)
    }

    /// Remove a domain's schema. Returns `true` if one was present.
    pub fn remove(&self, domain: &str) -> bool {
        let mut schemas = self.schemas.write().unwrap_or_else(PoisonError::into_inner);
        schemas.remove(domain).is_some()
    }

    /// Registered domain names, sorted.
    pub fn domains(&self) -> Vec<String> {
        let schemas = self.schemas.read().unwrap_or_else(PoisonError::into_inner);
        let mut domains: Vec<String> = schemas.keys().cloned().collect();
        domains.sort();
        domains
    }

    pub fn clear(&self) {
        let mut schemas = self.schemas.write().unwrap_or_else(PoisonError::into_inner);
        schemas.clear();
    }
}
