//! Dependency discovery for Go repositories.

use std::path::Path;

use log::{debug, info, warn};

use super::{run_steps, Context, Report};
use crate::config::{ErrorMode, Repo};
use crate::error::{Error, Result};
use crate::manifest;
use crate::pipeline;

/// Mirror every dependency named by the top-level `go.mod` of `folder`.
///
/// Each dependency gets its own nested pipeline. The first failure aborts
/// under [`ErrorMode::FailFast`]; under [`ErrorMode::BestEffort`] it is
/// recorded and the next dependency is tried.
pub(super) fn go_modules(ctx: &Context<'_>, repo: &Repo, folder: &Path) -> Result<Report> {
    info!("go modules in {}", folder.display());
    let deps = match manifest::discover(folder) {
        Ok(deps) => deps,
        Err(e) => return soften(ctx, e),
    };
    if deps.is_empty() {
        return Ok(Report::default());
    }
    info!("{} dependencies for {}", deps.len(), repo.name);

    let mut report = Report::default();
    for dep in &deps {
        let dep_folder = dep.folder_in(&ctx.common_folder);
        let kind = if dep.version.is_tag() { "tag" } else { "commit" };
        debug!("{} at {} {}", dep.key(), kind, dep.version.checkout_ref());
        let steps = pipeline::dependency_steps(ctx, repo, dep);
        match run_steps(ctx, &steps) {
            Ok(nested) => report.merge(nested),
            Err(e) => {
                let err = Error::Dependency {
                    key: dep.key(),
                    raw: dep.raw.trim().to_string(),
                    folder: dep_folder,
                    source: Box::new(e),
                };
                report.merge(soften(ctx, err)?);
            }
        }
    }
    Ok(report)
}

fn soften(ctx: &Context<'_>, err: Error) -> Result<Report> {
    match ctx.error_mode {
        ErrorMode::FailFast => Err(err),
        ErrorMode::BestEffort => {
            warn!("{}", err);
            Ok(Report::soft(err))
        }
    }
}
