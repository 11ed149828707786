//! CLI command definitions for deskcfg
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::path::PathBuf;

use crate::format::OutputFormat;

/// Output format selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FormatArg {
    #[default]
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

/// Desktop configuration store
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration directory (overrides DESKCFG_CONFIG_DIR)
    #[arg(short, long, global = true)]
    pub config_dir: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = FormatArg::Text, global = true)]
    pub format: FormatArg,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a value, or the whole domain when no path is given
    Get {
        domain: String,
        path: Option<String>,
    },

    /// Set a value and save the domain
    Set {
        domain: String,
        path: String,
        /// JSON literal; anything that does not parse is taken as a string
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Validate a domain against its schema
    Validate { domain: String },

    /// Write a domain to disk
    Save { domain: String },

    /// Reload a domain from disk
    Load { domain: String },

    /// List registered domains
    List,

    /// Document a domain's settings
    Describe {
        domain: String,
        /// Only fields whose path or description contains this text
        query: Option<String>,
    },

    /// Copy a domain's file into the backup directory
    Backup { domain: String },

    /// Restore the default for a path, or every path when omitted
    Reset { path: Option<String> },

    /// List paths that differ from their defaults
    Modified,

    /// Show the resolved directory layout
    Paths,

    /// Operate on every registered domain
    #[command(subcommand)]
    All(AllCommand),
}

/// Fan-out subcommands
#[derive(Subcommand, Debug)]
pub enum AllCommand {
    /// Print every domain's tree
    Get,
    /// Replace domain trees from a JSON file keyed by domain name
    Set { file: PathBuf },
    /// Validate every domain
    Validate,
    /// Save every domain
    Save,
    /// Reload every domain
    Load,
}

/// Interpret a command-line value: JSON when it parses, a string otherwise.
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
