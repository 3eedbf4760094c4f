//! # Pipeline Construction and Execution
//!
//! Turns a [`Config`] into the ordered list of [`Step`]s that mirrors and
//! thins every configured repository, then runs it.
//!
//! For each repository that is not disabled:
//!
//! 1. derive the local folder (a name without a path separator is a
//!    configuration defect);
//! 2. clone it, but only when the folder does not exist yet, then check out
//!    the pinned branch if there is one;
//! 3. for Go repositories, discover and mirror the `go.mod` dependencies
//!    into the common dependency folder;
//! 4. thin the mirror.
//!
//! A dependency lives in `<output>/Common Code/<module>@<id>`. The folder
//! name depends only on the module and version, so a dependency shared by
//! several repositories is cloned once and merely re-thinned afterwards.

use std::fs;

use log::info;

use crate::config::{Config, ErrorMode, Repo};
use crate::error::Result;
use crate::git::GitOperations;
use crate::manifest::Dependency;
use crate::steps::{run_steps, thinning_steps, Condition, Context, Report, Step};
use crate::thinning::Profile;

/// Knobs the caller may set on top of the configuration file.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Overrides `on_dependency_error` from the configuration.
    pub error_mode: Option<ErrorMode>,
    /// Pull existing folders that still carry `.git` instead of leaving them
    /// untouched. A completed run has thinned `.git` away, so this only
    /// picks up mirrors from an interrupted run.
    pub update_existing: bool,
}

/// Build the steps for every configured repository.
pub fn build_steps(config: &Config, options: &Options) -> Result<Vec<Step>> {
    let mut steps = Vec::new();
    for repo in &config.repos {
        if repo.is_disabled() {
            info!("skipping repo {}", repo.name);
            continue;
        }
        steps.extend(repo_steps(config, repo, options)?);
    }
    Ok(steps)
}

fn repo_steps(config: &Config, repo: &Repo, options: &Options) -> Result<Vec<Step>> {
    let local = config.require_local_repo(&repo.name)?;
    let language = config.language_of(repo);
    let profile = Profile::for_language(language.as_deref());

    let mut fetch = vec![Step::Clone {
        name: repo.name.clone(),
        dest: local.clone(),
    }];
    if let Some(branch) = repo.branch.as_ref().filter(|b| !b.is_empty()) {
        fetch.push(Step::Checkout {
            dir: local.clone(),
            reference: branch.clone(),
        });
    }

    let mut steps = Vec::new();
    if options.update_existing {
        steps.push(Step::IfElse {
            condition: Condition::PathMissing(local.clone()),
            then: fetch,
            otherwise: vec![Step::FetchOrUpdate {
                name: repo.name.clone(),
                dest: local.clone(),
            }],
        });
    } else {
        steps.push(Step::on_path_missing(&local, fetch));
    }

    if profile == Profile::Go {
        steps.push(Step::GoModules {
            repo: repo.clone(),
            folder: local.clone(),
        });
    }
    steps.extend(thinning_steps(&local, profile));
    Ok(steps)
}

/// Steps that mirror one discovered dependency of `repo`.
pub fn dependency_steps(ctx: &Context<'_>, repo: &Repo, dep: &Dependency) -> Vec<Step> {
    let folder = dep.folder_in(&ctx.common_folder);
    let mut steps = vec![Step::on_path_missing(
        &folder,
        vec![
            Step::Clone {
                name: dep.repository.clone(),
                dest: folder.clone(),
            },
            Step::Checkout {
                dir: folder.clone(),
                reference: dep.version.checkout_ref(),
            },
        ],
    )];
    steps.extend(thinning_steps(&folder, Profile::Go));

    if let (Some(copy), Some(name)) = (repo.copy_from(&dep.repository), folder.file_name()) {
        for to in &copy.to {
            let parent = ctx.config.output.join(to);
            steps.push(Step::on_path_missing(
                parent.join(name),
                vec![Step::CopyTree {
                    src: folder.clone(),
                    dst_parent: parent,
                }],
            ));
        }
    }
    steps
}

/// Mirror everything `config` names.
///
/// Returns the merged report of soft errors and audits. A fatal error stops
/// the run where it happened and leaves the output as it is.
pub fn execute(config: &Config, git: &dyn GitOperations, options: &Options) -> Result<Report> {
    fs::create_dir_all(&config.output)?;
    let ctx = Context::new(config, git)
        .with_error_mode(options.error_mode.unwrap_or(config.on_dependency_error));
    fs::create_dir_all(&ctx.common_folder)?;

    let steps = build_steps(config, options)?;
    info!("running {} steps into {}", steps.len(), config.output.display());
    run_steps(&ctx, &steps)
}
