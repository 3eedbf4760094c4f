//! Clone and update steps.

use std::path::Path;

use log::info;

use super::{Context, Report};
use crate::error::Result;
use crate::git;

pub(super) fn clone(ctx: &Context<'_>, name: &str, dest: &Path) -> Result<Report> {
    let remote = ctx.config.resolve_remote(name);
    info!("clone {} to {}", remote.name, dest.display());
    let url = git::clone_with_fallback(ctx.git, &remote, dest)?;
    info!("cloned {} from {}", remote.name, url);
    Ok(Report::default())
}

/// Clone when `dest` is missing. An existing checkout is pulled; a folder
/// without `.git` has already been thinned and is left alone.
pub(super) fn fetch_or_update(ctx: &Context<'_>, name: &str, dest: &Path) -> Result<Report> {
    if !dest.exists() {
        return clone(ctx, name, dest);
    }
    if dest.join(".git").is_dir() {
        info!("pull {}", dest.display());
        ctx.git.pull(dest)?;
    } else {
        info!("{} is already thinned, not updating", dest.display());
    }
    Ok(Report::default())
}
