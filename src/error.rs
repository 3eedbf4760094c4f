//! # Error Handling
//!
//! This module defines the centralized error type for `vendor-mirror`. It
//! uses `thiserror` to describe every failure the mirroring pipeline can
//! return to its caller.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. Configuration defects, manifest grammar
//!   violations, version format violations and transport failures each have
//!   their own variant so a caller can decide whether to abort or continue.
//!
//! - **`ManifestError`** and **`VersionError`**: Narrower enums returned by
//!   the manifest parser and the version decoder. They convert into `Error`
//!   through `#[from]`.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Nothing in the library terminates the process. Malformed input is always
//! reported as a value, and the pipeline's error mode decides whether a
//! dependency failure aborts the run or is recorded as a soft diagnostic.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while extracting dependencies from a manifest file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    /// The manifest has no `require (` line at all.
    #[error("no require block in manifest")]
    MissingRequireBlock,

    /// A `require (` line was found but the closing `)` never was.
    #[error("require block opened on line {line} is never closed")]
    UnterminatedRequireBlock { line: usize },

    /// An interior line of a require block has fewer than two fields.
    #[error("invalid require entry on line {line}: {raw:?}")]
    MalformedEntry { line: usize, raw: String },
}

/// Errors raised while decoding a manifest version token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// The token does not match either known version shape.
    #[error("unrecognized version format: {0:?}")]
    Unrecognized(String),
}

/// Main error type for vendor-mirror operations
#[derive(Error, Debug)]
pub enum Error {
    /// The configuration file could not be read or parsed.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// The configuration parsed but describes something the pipeline cannot
    /// act on, such as a repository name without a path separator.
    #[error("Configuration error for {repo}: {message}")]
    Config { repo: String, message: String },

    /// A manifest grammar violation, with the manifest it came from.
    #[error("Manifest error in {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: ManifestError,
    },

    /// A manifest version token that is neither a tag nor a pseudo-version.
    #[error("Version error: {0}")]
    Version(#[from] VersionError),

    /// The SSH transport is unreachable for this remote. Drives the
    /// fallback to HTTPS and is never surfaced on its own.
    #[error("SSH transport unavailable for {url}")]
    TransportInvalid { url: String, output: String },

    /// Every clone attempt for a repository failed.
    #[error("Git clone error for {url}: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    GitClone {
        url: String,
        message: String,
        /// Optional hint for how to resolve the clone issue
        hint: Option<String>,
    },

    /// A git command other than clone failed. `output` holds the combined
    /// stdout and stderr of the process.
    #[error("Git command failed in {}: git {command} - {output}", dir.display())]
    GitCommand {
        command: String,
        dir: PathBuf,
        output: String,
    },

    /// A dependency's nested pipeline failed.
    #[error("Dependency {key} ({raw}) into {}: {source}", folder.display())]
    Dependency {
        key: String,
        raw: String,
        folder: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// A filesystem operation failed outside of plain I/O.
    #[error("Filesystem operation error: {message}")]
    Filesystem { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A directory walk error, wrapped from `walkdir::Error`.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Attach the manifest path to a grammar violation.
    pub fn manifest(path: impl Into<PathBuf>, source: ManifestError) -> Self {
        Error::Manifest {
            path: path.into(),
            source,
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
