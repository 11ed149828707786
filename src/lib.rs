//! deskcfg Library
//!
//! Schema-validated, multi-domain configuration for a desktop environment.
//! The [`Manager`] routes requests to one [`Provider`] per domain; the
//! primary `cli` domain is a [`CliStore`] that layers user settings over
//! typed defaults and persists only what the user changed.

pub mod cli;
pub mod config;
pub mod describe;
pub mod domains;
pub mod error;
pub mod format;
pub mod logging;
pub mod manager;
pub mod paths;
pub mod provider;
pub mod schema;
pub mod tree;

pub use config::{CliConfig, CliStore};
pub use domains::{BuiltinDomains, register_builtin_domains};
pub use error::{ConfigError, Result};
pub use manager::Manager;
pub use paths::ConfigPaths;
pub use provider::{FileLayout, FileProvider, Provider};
pub use schema::{Schema, SchemaRegistry};
