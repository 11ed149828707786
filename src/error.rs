//! Error types for configuration operations.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A single failed domain inside a fan-out operation.
#[derive(Debug)]
pub struct DomainFailure {
    pub domain: String,
    pub cause: ConfigError,
}

impl fmt::Display for DomainFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.domain, self.cause)
    }
}

/// Errors produced by the schema, providers and the manager.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown configuration domain: {0}")]
    UnknownDomain(String),

    #[error("configuration domain already registered: {0}")]
    DomainExists(String),

    /// A value did not satisfy its schema node.
    #[error("{message}")]
    SchemaViolation { path: String, message: String },

    /// Wraps a schema violation raised while setting a value.
    #[error("validation failed: {0}")]
    ValidationFailed(Box<ConfigError>),

    #[error("path not found: {0}")]
    PathNotFound(String),

    #[error("schema property not found: {path} (resolved up to '{resolved}')")]
    SchemaPathNotFound { path: String, resolved: String },

    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    /// Fatal findings from a domain's semantic checks.
    #[error("configuration validation failed: {}", .0.join("; "))]
    Semantic(Vec<String>),

    #[error("{} of {total} domain(s) failed: {}", .failures.len(), join_failures(.failures))]
    Aggregate {
        total: usize,
        failures: Vec<DomainFailure>,
    },

    #[error("configuration paths cannot change after initialization")]
    PathsLocked,
}

fn join_failures(failures: &[DomainFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ConfigError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, err: impl fmt::Display) -> Self {
        Self::Parse {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub fn violation(path: &str, message: impl Into<String>) -> Self {
        Self::SchemaViolation {
            path: path.to_string(),
            message: message.into(),
        }
    }

    /// Names of the failing domains, if this is an aggregate error.
    pub fn failed_domains(&self) -> Vec<&str> {
        match self {
            Self::Aggregate { failures, .. } => {
                failures.iter().map(|f| f.domain.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
