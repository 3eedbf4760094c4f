//! # Validate Command Implementation
//!
//! Loads the configuration and prints, for every repository, where it would
//! be mirrored and which addresses would be tried. Nothing is fetched and no
//! file is modified.

use anyhow::{bail, Result};
use clap::Args;
use console::style;
use std::path::PathBuf;

use vendor_mirror::config::Config;

use super::{load_config, DEFAULT_CONFIG};

/// Validate a configuration file
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the configuration file to validate.
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "VENDOR_MIRROR_CONFIG",
        default_value = DEFAULT_CONFIG
    )]
    pub config: PathBuf,
}

/// Execute the `validate` command.
pub fn execute(args: ValidateArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    println!(
        "Validating {} ({} repositories, output {})",
        args.config.display(),
        config.repos.len(),
        config.output.display()
    );

    let problems = report(&config);
    if problems > 0 {
        bail!("{} repositories have configuration errors", problems);
    }
    println!("{}", style("Configuration is valid").green());
    Ok(())
}

/// Print one line per repository and return how many are broken.
fn report(config: &Config) -> usize {
    let mut problems = 0;
    for repo in &config.repos {
        if repo.is_disabled() {
            println!("  {} {}", style("skip").dim(), repo.name);
            continue;
        }
        match config.require_local_repo(&repo.name) {
            Ok(local) => {
                let remote = config.resolve_remote(&repo.name);
                let language = config.language_of(repo).unwrap_or_else(|| "-".to_string());
                println!(
                    "  {} {} [{}] -> {}",
                    style("ok").green(),
                    repo.name,
                    language,
                    local.display()
                );
                println!("       ssh   {}", remote.ssh);
                println!("       https {}", remote.https);
            }
            Err(e) => {
                problems += 1;
                println!("  {} {}", style("error").red(), e);
            }
        }
    }
    problems
}
