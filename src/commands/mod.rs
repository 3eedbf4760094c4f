//! # CLI Command Implementations
//!
//! Each subcommand of `vendor-mirror` lives in its own file with:
//! - an `Args` struct derived with `clap`;
//! - an `execute` function that takes the parsed `Args`, calls into the
//!   `vendor_mirror` library, and prints the outcome.

pub mod completions;
pub mod deps;
pub mod run;
pub mod validate;

use anyhow::{bail, Context, Result};
use std::path::Path;

use vendor_mirror::config::{self, Config};

/// Default configuration file, looked up in the working directory.
pub const DEFAULT_CONFIG: &str = "cfg.json";

/// Load the configuration at `path`, with a clear message when it is missing.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        bail!("Configuration file not found: {}", path.display());
    }
    config::from_file(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}
