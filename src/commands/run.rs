//! Run command implementation
//!
//! Mirrors every configured repository, mirrors the dependencies their
//! manifests declare into `Common Code`, thins everything, and prints the
//! soft errors recorded along the way.

use anyhow::Result;
use clap::Args;
use console::style;
use std::path::PathBuf;
use std::time::Instant;

use vendor_mirror::config::ErrorMode;
use vendor_mirror::git::SystemGit;
use vendor_mirror::pipeline::{self, Options};
use vendor_mirror::steps::Report;

use super::{load_config, DEFAULT_CONFIG};

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to config file
    #[arg(
        short,
        long,
        value_name = "PATH",
        env = "VENDOR_MIRROR_CONFIG",
        default_value = DEFAULT_CONFIG
    )]
    pub config: PathBuf,

    /// Output directory (overrides `output` from the config)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Record failing dependencies and keep going instead of aborting
    #[arg(short, long)]
    pub keep_going: bool,

    /// Pull mirrors that still have `.git` metadata instead of skipping them.
    ///
    /// Thinning removes `.git`, so this only affects mirrors left behind by
    /// an interrupted run.
    #[arg(long)]
    pub update: bool,

    /// Suppress all output except errors (also lowers logging to warnings)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the run command
pub fn execute(args: RunArgs) -> Result<()> {
    let start_time = Instant::now();
    let mut config = load_config(&args.config)?;
    if let Some(output) = args.output {
        config.output = output;
    }

    let options = Options {
        error_mode: args.keep_going.then_some(ErrorMode::BestEffort),
        update_existing: args.update,
    };

    if !args.quiet {
        println!(
            "{} {} repositories into {}",
            style("Mirroring").bold(),
            config.active_repos().count(),
            config.output.display()
        );
    }

    let report = pipeline::execute(&config, &SystemGit, &options)?;

    if !args.quiet {
        print_summary(&report, start_time.elapsed().as_secs_f64());
    }
    print_soft_errors(&report);
    Ok(())
}

fn print_summary(report: &Report, seconds: f64) {
    let files: usize = report.audits.iter().map(|a| a.files).sum();
    let removed: usize = report.audits.iter().map(|a| a.removable_files).sum();
    println!(
        "{} in {:.2}s: {} folders audited, {} files seen, {} removed by extension",
        style("Done").green().bold(),
        seconds,
        report.audits.len(),
        files,
        removed
    );
}

fn print_soft_errors(report: &Report) {
    if report.is_clean() {
        return;
    }
    eprintln!("{}", style("There were errors:").red().bold());
    for err in &report.soft_errors {
        eprintln!("  {}", err);
    }
}
