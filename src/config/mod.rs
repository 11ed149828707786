//! The tool's own configuration domain (`cli`).
//!
//! Layers sparse user overrides from `config.json` over built-in defaults:
//! 1. **Defaults** - recomputed from [`CliConfig`] on every load
//! 2. **User** - whatever the user's file contains, merged field by field
//!
//! ## Persistence
//! Saving writes only the top-level sections the user has touched, each as
//! its whole current value. Sections the user never set stay off disk so
//! future default changes reach them.

mod checks;
mod merge;
mod store;
mod types;

pub use checks::{ValidationReport, run_checks};
pub use merge::deep_merge;
pub use store::{CLI_SCHEMA, CliStore};
pub use types::*;
