//! # Pipeline Steps
//!
//! A [`Step`] is one unit of work: clone, check out, copy, delete, audit, or
//! discover dependencies. Steps are composed into ordered lists and run with
//! [`run_steps`]; [`Step::If`] and [`Step::IfElse`] add conditional
//! composition on top of that.
//!
//! ## Execution model
//!
//! - Every step runs against a shared, read-only [`Context`].
//! - A step either fails with an [`Error`], which stops the enclosing
//!   sequence, or succeeds with a [`Report`] of soft diagnostics and audit
//!   results. Reports are merged by whoever ran the step.
//! - Steps keep no state between runs. Everything they learn from each other
//!   goes through the filesystem, so each step can be run on its own against
//!   a stub context.

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::config::{Config, ErrorMode, Repo};
use crate::error::{Error, Result};
use crate::git::GitOperations;
use crate::thinning::Profile;

mod discover;
mod fetch;
mod files;

pub use files::AuditSummary;

/// Name of the shared folder that receives every discovered dependency.
pub const COMMON_FOLDER: &str = "Common Code";

/// Everything a step may read while it runs.
pub struct Context<'a> {
    pub config: &'a Config,
    /// Shared destination for discovered dependencies.
    pub common_folder: PathBuf,
    pub git: &'a dyn GitOperations,
    pub error_mode: ErrorMode,
}

impl<'a> Context<'a> {
    pub fn new(config: &'a Config, git: &'a dyn GitOperations) -> Self {
        Self {
            config,
            common_folder: config.output.join(COMMON_FOLDER),
            git,
            error_mode: config.on_dependency_error,
        }
    }

    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }
}

/// What a successful step (or sequence of steps) has to say.
#[derive(Debug, Default)]
pub struct Report {
    /// Failures recorded instead of aborting, in the order they happened.
    pub soft_errors: Vec<Error>,
    pub audits: Vec<AuditSummary>,
}

impl Report {
    pub fn soft(err: Error) -> Self {
        Self {
            soft_errors: vec![err],
            audits: Vec::new(),
        }
    }

    pub fn merge(&mut self, other: Report) {
        self.soft_errors.extend(other.soft_errors);
        self.audits.extend(other.audits);
    }

    pub fn is_clean(&self) -> bool {
        self.soft_errors.is_empty()
    }
}

/// A zero-argument predicate for conditional steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    PathExists(PathBuf),
    PathMissing(PathBuf),
}

impl Condition {
    pub fn evaluate(&self) -> bool {
        match self {
            Condition::PathExists(path) => path.exists(),
            Condition::PathMissing(path) => !path.exists(),
        }
    }
}

/// A unit of pipeline work.
#[derive(Debug, Clone)]
pub enum Step {
    /// Clone repository `name` into `dest` with transport fallback.
    Clone { name: String, dest: PathBuf },
    /// Clone when `dest` is missing, otherwise pull if it is still a checkout.
    FetchOrUpdate { name: String, dest: PathBuf },
    Checkout { dir: PathBuf, reference: String },
    /// Copy `src` into `dst_parent/<name of src>`.
    CopyTree { src: PathBuf, dst_parent: PathBuf },
    DeleteByExtension { folder: PathBuf, extensions: Vec<String> },
    /// Delete files and folders whose name is one of `names`.
    DeleteNamed { folder: PathBuf, names: Vec<String> },
    /// Delete folders below `folder` that are, or become, empty.
    DeleteEmptyFolders { folder: PathBuf },
    If { condition: Condition, steps: Vec<Step> },
    IfElse {
        condition: Condition,
        then: Vec<Step>,
        otherwise: Vec<Step>,
    },
    /// Read-only summary of what `profile` would remove from `folder`.
    Audit { folder: PathBuf, profile: Profile },
    /// Mirror every dependency in the `go.mod` at the top of `folder`.
    GoModules { repo: Repo, folder: PathBuf },
}

impl Step {
    /// Run `steps` only if `path` does not exist.
    pub fn on_path_missing(path: impl Into<PathBuf>, steps: Vec<Step>) -> Self {
        Step::If {
            condition: Condition::PathMissing(path.into()),
            steps,
        }
    }

    pub fn run(&self, ctx: &Context<'_>) -> Result<Report> {
        match self {
            Step::Clone { name, dest } => fetch::clone(ctx, name, dest),
            Step::FetchOrUpdate { name, dest } => fetch::fetch_or_update(ctx, name, dest),
            Step::Checkout { dir, reference } => {
                info!("checkout {} at {}", dir.display(), reference);
                ctx.git.checkout(dir, reference)?;
                Ok(Report::default())
            }
            Step::CopyTree { src, dst_parent } => files::copy_tree(src, dst_parent),
            Step::DeleteByExtension { folder, extensions } => {
                files::delete_by_extension(folder, extensions)
            }
            Step::DeleteNamed { folder, names } => files::delete_named(folder, names),
            Step::DeleteEmptyFolders { folder } => files::delete_empty_folders(folder),
            Step::If { condition, steps } => {
                if condition.evaluate() {
                    run_steps(ctx, steps)
                } else {
                    Ok(Report::default())
                }
            }
            Step::IfElse {
                condition,
                then,
                otherwise,
            } => {
                if condition.evaluate() {
                    run_steps(ctx, then)
                } else {
                    run_steps(ctx, otherwise)
                }
            }
            Step::Audit { folder, profile } => files::audit(folder, *profile),
            Step::GoModules { repo, folder } => discover::go_modules(ctx, repo, folder),
        }
    }

    /// Short label for logs.
    pub fn describe(&self) -> String {
        match self {
            Step::Clone { name, dest } => format!("clone {} to {}", name, dest.display()),
            Step::FetchOrUpdate { name, dest } => {
                format!("fetch-or-update {} at {}", name, dest.display())
            }
            Step::Checkout { dir, reference } => {
                format!("checkout {} in {}", reference, dir.display())
            }
            Step::CopyTree { src, dst_parent } => {
                format!("copy {} to {}", src.display(), dst_parent.display())
            }
            Step::DeleteByExtension { folder, .. } => {
                format!("delete extensions in {}", folder.display())
            }
            Step::DeleteNamed { folder, names } => {
                format!("delete {} in {}", names.join(", "), folder.display())
            }
            Step::DeleteEmptyFolders { folder } => {
                format!("delete empty folders in {}", folder.display())
            }
            Step::If { condition, steps } => format!("if {:?} ({} steps)", condition, steps.len()),
            Step::IfElse { condition, .. } => format!("if/else {:?}", condition),
            Step::Audit { folder, .. } => format!("audit {}", folder.display()),
            Step::GoModules { folder, .. } => format!("go modules in {}", folder.display()),
        }
    }
}

/// Run `steps` in order, merging their reports. Stops at the first error.
pub fn run_steps(ctx: &Context<'_>, steps: &[Step]) -> Result<Report> {
    let mut report = Report::default();
    for step in steps {
        debug!("step: {}", step.describe());
        report.merge(step.run(ctx)?);
    }
    Ok(report)
}

/// The thinning sequence applied to every mirror.
pub fn thinning_steps(folder: &Path, profile: Profile) -> Vec<Step> {
    vec![
        Step::Audit {
            folder: folder.to_path_buf(),
            profile,
        },
        Step::DeleteNamed {
            folder: folder.to_path_buf(),
            names: crate::thinning::vcs_names(),
        },
        Step::DeleteByExtension {
            folder: folder.to_path_buf(),
            extensions: profile.extensions(),
        },
        Step::DeleteEmptyFolders {
            folder: folder.to_path_buf(),
        },
    ]
}
