//! Tracing subscriber setup for the command-line binary.
//!
//! Output goes to one of: nowhere, stdout, stderr, or an append-mode file.
//! The level comes from `DESKCFG_LOG` (an `EnvFilter` directive) when set,
//! otherwise `debug` with `--verbose` and `warn` without.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Environment variable holding an `EnvFilter` directive.
pub const ENV_LOG_FILTER: &str = "DESKCFG_LOG";

/// Where log lines are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Off,
    Stdout,
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    /// Parse `0`/`off`, `1`/`stdout`, `2`/`stderr`, or a file name.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "0" | "off" | "none" => LogTarget::Off,
            "1" | "stdout" => LogTarget::Stdout,
            "2" | "stderr" => LogTarget::Stderr,
            _ => LogTarget::File(PathBuf::from(s)),
        }
    }
}

fn filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(ENV_LOG_FILTER)
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }))
}

/// Install the global subscriber.
pub fn init_logging(target: &LogTarget, verbose: bool) -> Result<()> {
    match target {
        LogTarget::Off => {}
        LogTarget::Stdout => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter(verbose))
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogTarget::Stderr => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter(verbose))
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter(verbose))
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_targets() {
        assert_eq!(LogTarget::parse("0"), LogTarget::Off);
        assert_eq!(LogTarget::parse("OFF"), LogTarget::Off);
        assert_eq!(LogTarget::parse("1"), LogTarget::Stdout);
        assert_eq!(LogTarget::parse("stderr"), LogTarget::Stderr);
        assert_eq!(
            LogTarget::parse("deskcfg.log"),
            LogTarget::File(PathBuf::from("deskcfg.log"))
        );
    }
}
