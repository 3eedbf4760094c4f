//! Filesystem steps: copying, thinning and auditing a mirror.
//!
//! All deletions are permanent. Every function here is a no-op on a folder
//! that does not exist, and running any of them twice in a row changes
//! nothing the second time.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use walkdir::WalkDir;

use super::Report;
use crate::error::{Error, Result};
use crate::thinning::{self, Profile};

/// Read-only statistics for one folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditSummary {
    pub folder: PathBuf,
    pub profile: Profile,
    pub files: usize,
    pub bytes: u64,
    /// Files the profile's extension table would delete.
    pub removable_files: usize,
    pub removable_bytes: u64,
}

/// Copy `src` into `dst_parent/<file name of src>`.
pub(super) fn copy_tree(src: &Path, dst_parent: &Path) -> Result<Report> {
    let name = src.file_name().ok_or_else(|| Error::Filesystem {
        message: format!("cannot copy {}: no folder name", src.display()),
    })?;
    if !src.is_dir() {
        return Err(Error::Filesystem {
            message: format!("cannot copy {}: not a folder", src.display()),
        });
    }
    let dst_root = dst_parent.join(name);
    info!("copy {} to {}", src.display(), dst_root.display());
    fs::create_dir_all(&dst_root)?;

    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| Error::Filesystem {
                message: e.to_string(),
            })?;
        let target = dst_root.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(Report::default())
}

pub(super) fn delete_by_extension(folder: &Path, extensions: &[String]) -> Result<Report> {
    if !folder.exists() {
        return Ok(Report::default());
    }
    let mut removed = 0usize;
    for entry in WalkDir::new(folder).min_depth(1) {
        let entry = entry?;
        if entry.file_type().is_file() && thinning::matches_extension(entry.path(), extensions) {
            fs::remove_file(entry.path())?;
            removed += 1;
        }
    }
    info!("deleted {} files by extension in {}", removed, folder.display());
    Ok(Report::default())
}

pub(super) fn delete_named(folder: &Path, names: &[String]) -> Result<Report> {
    if !folder.exists() {
        return Ok(Report::default());
    }
    let mut matches = Vec::new();
    let mut walk = WalkDir::new(folder).min_depth(1).into_iter();
    while let Some(entry) = walk.next() {
        let entry = entry?;
        let hit = entry
            .file_name()
            .to_str()
            .is_some_and(|n| names.iter().any(|name| name == n));
        if !hit {
            continue;
        }
        let is_dir = entry.file_type().is_dir();
        if is_dir {
            walk.skip_current_dir();
        }
        matches.push((entry.into_path(), is_dir));
    }

    for (path, is_dir) in &matches {
        debug!("delete {}", path.display());
        if *is_dir {
            fs::remove_dir_all(path)?;
        } else {
            fs::remove_file(path)?;
        }
    }
    info!("deleted {} entries by name in {}", matches.len(), folder.display());
    Ok(Report::default())
}

/// Remove every folder below `folder` that is empty once its own children
/// have been visited. `folder` itself is kept.
pub(super) fn delete_empty_folders(folder: &Path) -> Result<Report> {
    if !folder.exists() {
        return Ok(Report::default());
    }
    let mut removed = 0usize;
    for entry in WalkDir::new(folder).min_depth(1).contents_first(true) {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            continue;
        }
        if fs::read_dir(entry.path())?.next().is_none() {
            fs::remove_dir(entry.path())?;
            removed += 1;
        }
    }
    info!("deleted {} empty folders in {}", removed, folder.display());
    Ok(Report::default())
}

pub(super) fn audit(folder: &Path, profile: Profile) -> Result<Report> {
    let mut summary = AuditSummary {
        folder: folder.to_path_buf(),
        profile,
        files: 0,
        bytes: 0,
        removable_files: 0,
        removable_bytes: 0,
    };
    if !folder.exists() {
        return Ok(Report {
            soft_errors: Vec::new(),
            audits: vec![summary],
        });
    }

    let extensions = profile.extensions();
    let mut by_extension: BTreeMap<String, (usize, u64)> = BTreeMap::new();
    let walk = WalkDir::new(folder)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| !thinning::VCS_NAMES.iter().any(|n| e.file_name() == *n));
    for entry in walk {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let len = entry.metadata()?.len();
        summary.files += 1;
        summary.bytes += len;
        if thinning::matches_extension(entry.path(), &extensions) {
            summary.removable_files += 1;
            summary.removable_bytes += len;
        }
        let key = thinning::extension_of(entry.path()).unwrap_or_default();
        let slot = by_extension.entry(key).or_default();
        slot.0 += 1;
        slot.1 += len;
    }

    info!(
        "audit {} ({}): {} files, {} bytes; {} files ({} bytes) removable",
        folder.display(),
        profile.name(),
        summary.files,
        summary.bytes,
        summary.removable_files,
        summary.removable_bytes
    );
    for (ext, (count, bytes)) in &by_extension {
        let ext = if ext.is_empty() { "<none>" } else { ext.as_str() };
        debug!("  .{}: {} files, {} bytes", ext, count, bytes);
    }

    Ok(Report {
        soft_errors: Vec::new(),
        audits: vec![summary],
    })
}
