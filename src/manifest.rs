//! # Manifest Dependency Discovery
//!
//! Reads the `require` blocks of a Go `go.mod` file and turns each entry into
//! a [`Dependency`]. Only the block form is understood:
//!
//! ```text
//! require (
//!     golang.org/x/xerrors v0.0.0-20200804184101-5ec99f83aff1
//!     github.com/pkg/errors v0.9.1 // indirect
//! )
//! ```
//!
//! The markers are matched as exact lines. Discovery is limited to the
//! manifest at the top of a repository and never descends into
//! subdirectories.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, ManifestError, Result};
use crate::version::Version;

/// File name of the manifest dialect the pipeline understands.
pub const MANIFEST_FILE: &str = "go.mod";

const BLOCK_OPEN: &str = "require (";
const BLOCK_CLOSE: &str = ")";

/// Separates repository and version identity in dedup keys and folder names.
pub const IDENTITY_SEPARATOR: char = '@';

/// A single dependency named in a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub repository: String,
    pub version: Version,
    /// The manifest line this came from, kept for diagnostics.
    pub raw: String,
}

impl Dependency {
    /// Decode one interior line of a require block.
    pub fn from_line(raw: &str, line: usize) -> Result<Self> {
        let fields: Vec<&str> = raw.split_whitespace().collect();
        if fields.len() < 2 {
            return Err(Error::manifest(
                MANIFEST_FILE,
                ManifestError::MalformedEntry {
                    line,
                    raw: raw.to_string(),
                },
            ));
        }
        Ok(Self {
            repository: fields[0].to_string(),
            version: Version::parse(fields[1])?,
            raw: raw.to_string(),
        })
    }

    /// Dedup key: `repository@id`.
    pub fn key(&self) -> String {
        format!(
            "{}{}{}",
            self.repository,
            IDENTITY_SEPARATOR,
            self.version.id()
        )
    }

    /// Folder for this dependency below the common dependency folder.
    pub fn folder_in(&self, common: &Path) -> PathBuf {
        common.join(self.key())
    }
}

/// A raw interior line of a require block with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequireLine {
    pub line: usize,
    pub text: String,
}

/// Collect the interior lines of every require block in `text`.
///
/// Lines are returned verbatim, before any validation.
pub fn require_lines(text: &str) -> std::result::Result<Vec<RequireLine>, ManifestError> {
    let mut lines = Vec::new();
    let mut open_at: Option<usize> = None;
    let mut seen_block = false;

    for (idx, line) in text.lines().enumerate() {
        let number = idx + 1;
        match open_at {
            Some(_) if line == BLOCK_CLOSE => open_at = None,
            Some(_) => lines.push(RequireLine {
                line: number,
                text: line.to_string(),
            }),
            None if line == BLOCK_OPEN => {
                open_at = Some(number);
                seen_block = true;
            }
            None => {}
        }
    }

    if let Some(line) = open_at {
        return Err(ManifestError::UnterminatedRequireBlock { line });
    }
    if !seen_block {
        return Err(ManifestError::MissingRequireBlock);
    }
    Ok(lines)
}

/// Parse manifest text into dependencies, deduplicated by [`Dependency::key`]
/// and ordered by key.
pub fn parse(text: &str) -> Result<Vec<Dependency>> {
    let lines = require_lines(text).map_err(|e| Error::manifest(MANIFEST_FILE, e))?;
    let mut deps = BTreeMap::new();
    for entry in lines {
        let dep = Dependency::from_line(&entry.text, entry.line)?;
        deps.entry(dep.key()).or_insert(dep);
    }
    Ok(deps.into_values().collect())
}

/// Find the manifest at the top level of `folder`, if there is one.
pub fn find_manifest(folder: &Path) -> Option<PathBuf> {
    let path = folder.join(MANIFEST_FILE);
    path.is_file().then_some(path)
}

/// Read and parse the top-level manifest of `folder`.
///
/// Returns an empty list when the folder has no manifest. Grammar errors
/// carry the full manifest path.
pub fn discover(folder: &Path) -> Result<Vec<Dependency>> {
    let Some(path) = find_manifest(folder) else {
        return Ok(Vec::new());
    };
    let text = fs::read_to_string(&path)?;
    parse(&text).map_err(|e| match e {
        Error::Manifest { source, .. } => Error::manifest(&path, source),
        other => other,
    })
}
