//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Vendor Mirror - Mirror repositories and their dependencies into a thinned archive
#[derive(Parser, Debug)]
#[command(name = "vendor-mirror")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Mirror, discover dependencies, and thin every configured repository
    Run(commands::run::RunArgs),

    /// Check the configuration and show where each repository would go
    Validate(commands::validate::ValidateArgs),

    /// Show the manifest dependencies of mirrored repositories
    Deps(commands::deps::DepsArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(self.effective_log_level());
        match self.color.to_lowercase().as_str() {
            "always" => console::set_colors_enabled(true),
            "never" => console::set_colors_enabled(false),
            _ => {}
        }

        match self.command {
            Commands::Run(args) => commands::run::execute(args),
            Commands::Validate(args) => commands::validate::execute(args),
            Commands::Deps(args) => commands::deps::execute(args),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }

    /// `run --quiet` caps logging at warnings.
    fn effective_log_level(&self) -> &str {
        match &self.command {
            Commands::Run(args) if args.quiet => "warn",
            _ => &self.log_level,
        }
    }
}

/// `RUST_LOG` wins over `--log-level` when it is set.
fn init_logging(level: &str) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));
    builder.format_timestamp(None).format_target(false);
    // A second init (e.g. from tests) is harmless.
    let _ = builder.try_init();
}
