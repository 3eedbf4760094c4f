//! Deletion tables used when thinning a mirror.
//!
//! A [`Profile`] is plain data: file extensions that carry nothing worth
//! archiving for a given language, plus the version control metadata every
//! mirror loses. Extensions are stored lower-case without the leading dot
//! and matched case-insensitively.

use std::path::Path;

/// Version control metadata removed from every mirror.
pub const VCS_NAMES: &[&str] = &[".git", ".hg", ".svn", ".gitmodules"];

const MEDIA: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "tga", "tif", "tiff", "psd", "ico", "icns", "webp", "wav",
    "mp3", "ogg", "flac", "mp4", "mov", "avi", "webm", "ttf", "otf", "woff", "woff2", "eot", "pdf",
];

const BINARIES: &[&str] = &[
    "exe", "dll", "so", "dylib", "a", "lib", "o", "obj", "pdb", "bin", "class", "jar", "pyc",
    "zip", "tar", "gz", "tgz", "bz2", "xz", "7z", "rar",
];

const UNITY: &[&str] = &[
    "meta", "unity", "asset", "prefab", "mat", "anim", "controller", "fbx", "physicmaterial",
    "cubemap", "lighting", "unitypackage",
];

const GO: &[&str] = &["test", "out", "prof", "syso"];

const CSHARP: &[&str] = &["nupkg", "snk", "suo", "user", "cache", "vsix"];

/// Extension table for one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Go,
    CSharp,
    /// Anything else, including Unity projects.
    Generic,
}

impl Profile {
    pub fn for_language(language: Option<&str>) -> Self {
        match language {
            Some("go") => Profile::Go,
            Some("c#") | Some("csharp") => Profile::CSharp,
            _ => Profile::Generic,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Profile::Go => "go",
            Profile::CSharp => "c#",
            Profile::Generic => "generic",
        }
    }

    /// Extensions deleted by this profile, sorted and without duplicates.
    pub fn extensions(self) -> Vec<String> {
        let extra: &[&str] = match self {
            Profile::Go => GO,
            Profile::CSharp => CSHARP,
            Profile::Generic => UNITY,
        };
        let mut all: Vec<String> = MEDIA
            .iter()
            .chain(BINARIES)
            .chain(extra)
            .map(|e| e.to_string())
            .collect();
        all.sort();
        all.dedup();
        all
    }
}

/// Lower-cased extension of `path`, if it has one.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Whether `path` has one of `extensions` (already lower-case).
pub fn matches_extension(path: &Path, extensions: &[String]) -> bool {
    extension_of(path).is_some_and(|ext| extensions.iter().any(|e| *e == ext))
}

pub fn vcs_names() -> Vec<String> {
    VCS_NAMES.iter().map(|n| n.to_string()).collect()
}
