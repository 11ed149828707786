//! deskcfg command-line interface
//!
//! Reads and writes the schema-validated configuration domains of the
//! desktop environment.

use anyhow::{Context, Result};
use clap::Parser;
use deskcfg::cli::{AllCommand, Cli, Command, parse_value};
use deskcfg::describe::{describe, search};
use deskcfg::domains::{BuiltinDomains, register_builtin_domains};
use deskcfg::format::{OutputFormat, format_docs, format_value};
use deskcfg::logging::{LogTarget, init_logging};
use deskcfg::paths::{ConfigPaths, PRIMARY_DOMAIN};
use deskcfg::provider::Provider;
use deskcfg::{Manager, tree};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use tracing::{debug, warn};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&LogTarget::parse(&cli.log), cli.verbose)?;

    let paths = match &cli.config_dir {
        Some(dir) => ConfigPaths::with_base_dir(dir),
        None => ConfigPaths::discover().context("resolving configuration paths")?,
    };
    let manager = Manager::with_paths(paths);
    manager.initialize()?;
    let builtins = register_builtin_domains(&manager)?;

    // A broken file in one domain should not stop commands on the others.
    if let Err(e) = manager.load_all() {
        warn!("{}", e);
        eprintln!("Warning: {}", e);
    }

    let format = OutputFormat::from(cli.format);
    run(&manager, &builtins, cli.command, format)
}

fn run(
    manager: &Manager,
    builtins: &BuiltinDomains,
    command: Command,
    format: OutputFormat,
) -> Result<()> {
    match command {
        Command::Get { domain, path } => {
            let value = match path.as_deref() {
                Some(path) if !path.is_empty() => manager.get(&domain, path)?,
                _ => manager.get_all(&domain)?,
            };
            println!("{}", format_value(&value, format));
        }
        Command::Set {
            domain,
            path,
            value,
        } => {
            let value = parse_value(&value);
            debug!(domain = %domain, path = %path, "Setting value");
            manager.set(&domain, &path, value)?;
            manager.save(&domain)?;
            if domain == PRIMARY_DOMAIN {
                print_warnings(builtins);
            }
        }
        Command::Validate { domain } => {
            manager.validate(&domain)?;
            if domain == PRIMARY_DOMAIN {
                print_warnings(builtins);
            }
            println!("{}: ok", domain);
        }
        Command::Save { domain } => {
            manager.save(&domain)?;
            println!("Saved {}", manager.provider(&domain)?.config_path().display());
        }
        Command::Load { domain } => {
            manager.load(&domain)?;
            println!("Loaded {}", domain);
        }
        Command::List => {
            let domains = manager.list_domains();
            match format {
                OutputFormat::Json => println!("{}", format_value(&json!(domains), format)),
                OutputFormat::Text => {
                    for domain in domains {
                        println!("{}", domain);
                    }
                }
            }
        }
        Command::Describe { domain, query } => {
            // Surface UnknownDomain for unregistered names.
            manager.provider(&domain)?;
            let defaults = if domain == PRIMARY_DOMAIN {
                builtins.cli.defaults()
            } else {
                manager
                    .schema(&domain)
                    .map(|schema| schema.default_tree())
                    .unwrap_or_else(|| Value::Object(Default::default()))
            };
            let schema = manager.schema(&domain);
            let docs = describe(&defaults, schema.as_deref());
            let shown: Vec<_> = match query.as_deref() {
                Some(query) => search(&docs, query),
                None => docs.iter().collect(),
            };
            print!("{}", format_docs(&shown, format));
            if format == OutputFormat::Json {
                println!();
            }
        }
        Command::Backup { domain } => {
            let target = manager.backup(&domain)?;
            println!("Backed up {} to {}", domain, target.display());
        }
        Command::Reset { path } => {
            let path = path.unwrap_or_default();
            builtins.cli.reset(&path)?;
            builtins.cli.save()?;
            if path.is_empty() {
                println!("Reset all settings");
            } else {
                println!("Reset {}", path);
            }
        }
        Command::Modified => {
            let modified = builtins.cli.modified_paths();
            match format {
                OutputFormat::Json => {
                    let current = builtins.cli.get_all()?;
                    let mut entries = serde_json::Map::new();
                    for path in modified {
                        if let Some(value) = tree::get_path(&current, &path) {
                            entries.insert(path, value.clone());
                        }
                    }
                    println!("{}", format_value(&Value::Object(entries), format));
                }
                OutputFormat::Text => {
                    for path in modified {
                        println!("{}", path);
                    }
                }
            }
        }
        Command::Paths => {
            let paths = manager.paths();
            let mut files = serde_json::Map::new();
            for domain in manager.list_domains() {
                let file = manager.provider(&domain)?.config_path();
                files.insert(domain, json!(file.display().to_string()));
            }
            let report = json!({
                "base_dir": paths.base_dir.display().to_string(),
                "schema_dir": paths.schema_dir.display().to_string(),
                "backup_dir": paths.backup_dir.display().to_string(),
                "files": files,
            });
            println!("{}", format_value(&report, format));
        }
        Command::All(all) => match all {
            AllCommand::Get => {
                let trees = manager.get_all_domains()?;
                let value = serde_json::to_value(trees)?;
                println!("{}", format_value(&value, format));
            }
            AllCommand::Set { file } => {
                let content = std::fs::read_to_string(&file)
                    .with_context(|| format!("reading {}", file.display()))?;
                let trees: BTreeMap<String, Value> = serde_json::from_str(&content)
                    .with_context(|| format!("parsing {}", file.display()))?;
                let domains: Vec<String> = trees.keys().cloned().collect();
                manager.set_all_domains(trees)?;
                for domain in &domains {
                    manager.save(domain)?;
                }
                println!("Updated {}", domains.join(", "));
            }
            AllCommand::Validate => {
                manager.validate_all()?;
                print_warnings(builtins);
                println!("All domains valid");
            }
            AllCommand::Save => {
                manager.save_all()?;
                println!("Saved all domains");
            }
            AllCommand::Load => {
                manager.load_all()?;
                println!("Loaded all domains");
            }
        },
    }
    Ok(())
}

fn print_warnings(builtins: &BuiltinDomains) {
    for warning in builtins.cli.check().warnings {
        eprintln!("Warning: {}", warning);
    }
}
