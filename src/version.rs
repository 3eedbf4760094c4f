//! # Manifest Version Decoding
//!
//! Go manifests name dependency revisions in one of two shapes:
//!
//! - a release tag, `v1.36.29`, optionally marked `v2.0.0+incompatible`
//!   for modules that predate semantic import versioning;
//! - a pseudo-version, `v0.0.0-20200922220541-2c3bb06c6054`, whose last
//!   segment is a commit hash prefix.
//!
//! [`Version::parse`] classifies a token and [`Version::checkout_ref`] turns
//! it into something `git checkout` accepts. Any other shape is rejected
//! rather than guessed at, since a wrong guess would archive the wrong
//! revision.

use std::fmt;

use crate::error::VersionError;

/// Suffix Go appends to tags of modules without a `go.mod` at major >= 2.
pub const INCOMPATIBLE_SUFFIX: &str = "+incompatible";

/// A decoded manifest version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Version {
    /// A literal release tag. `id` has the incompatible marker removed.
    Tag { full: String, id: String },
    /// A pseudo-version pinned to `revision`.
    Commit { full: String, revision: String },
}

impl Version {
    /// Decode a raw version token from a manifest.
    pub fn parse(raw: &str) -> Result<Self, VersionError> {
        if !raw.starts_with('v') {
            return Err(VersionError::Unrecognized(raw.to_string()));
        }
        let stripped = raw.strip_suffix(INCOMPATIBLE_SUFFIX).unwrap_or(raw);
        let segments: Vec<&str> = stripped.split('-').collect();
        match segments.as_slice() {
            [tag] if !tag.is_empty() => Ok(Version::Tag {
                full: raw.to_string(),
                id: (*tag).to_string(),
            }),
            [_, _, revision] if !revision.is_empty() => Ok(Version::Commit {
                full: raw.to_string(),
                revision: (*revision).to_string(),
            }),
            _ => Err(VersionError::Unrecognized(raw.to_string())),
        }
    }

    /// The stable identity used for dedup keys and folder suffixes.
    pub fn id(&self) -> &str {
        match self {
            Version::Tag { id, .. } => id,
            Version::Commit { revision, .. } => revision,
        }
    }

    /// The token exactly as it appeared in the manifest.
    pub fn full(&self) -> &str {
        match self {
            Version::Tag { full, .. } | Version::Commit { full, .. } => full,
        }
    }

    /// The reference to hand to `git checkout`.
    pub fn checkout_ref(&self) -> String {
        match self {
            Version::Tag { id, .. } => format!("tags/{}", id),
            Version::Commit { revision, .. } => revision.clone(),
        }
    }

    pub fn is_tag(&self) -> bool {
        matches!(self, Version::Tag { .. })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.full())
    }
}
