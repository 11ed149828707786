//! Built-in configuration domains.

use crate::config::CliStore;
use crate::error::Result;
use crate::manager::Manager;
use crate::paths::PRIMARY_DOMAIN;
use crate::provider::{FileLayout, FileProvider};
use std::sync::Arc;

pub const SHELL_DOMAIN: &str = "shell";

/// Built-in schema for the shell daemon's settings.
pub const SHELL_SCHEMA: &str = include_str!("../schemas/shell.schema.json");

/// Handles to the built-in providers for domain-specific operations.
#[derive(Clone)]
pub struct BuiltinDomains {
    pub cli: Arc<CliStore>,
    pub shell: Arc<FileProvider>,
}

/// Register the `cli` store and the `shell` provider with `manager`.
pub fn register_builtin_domains(manager: &Manager) -> Result<BuiltinDomains> {
    let paths = manager.paths();

    let cli = Arc::new(CliStore::new(&paths));
    manager.register_provider(PRIMARY_DOMAIN, cli.clone())?;

    let shell = Arc::new(
        FileProvider::new(SHELL_DOMAIN, &paths, FileLayout::Flattened)
            .with_builtin_schema(SHELL_SCHEMA),
    );
    manager.register_provider(SHELL_DOMAIN, shell.clone())?;

    Ok(BuiltinDomains { cli, shell })
}
