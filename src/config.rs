//! # Configuration Schema and Parsing
//!
//! This module defines the JSON configuration file (`cfg.json` by default)
//! and the accessors the pipeline uses to turn repository names into local
//! paths and remote addresses.
//!
//! ```json
//! {
//!   "output": "archive",
//!   "repo_language": "go",
//!   "repo_shortcuts": { "gh/": "github.com/" },
//!   "repo_redirects": [{ "from": "github.com/old/name", "to": "github.com/new/name" }],
//!   "on_dependency_error": "fail-fast",
//!   "repos": [
//!     { "name": "gh/org/app", "branch": "v1.2.0" },
//!     { "name": "//github.com/org/disabled" }
//!   ]
//! }
//! ```
//!
//! The pipeline never inspects these fields directly for naming decisions;
//! it calls [`Config::local_repo`] and [`Config::resolve_remote`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::remote::Remote;

/// Prefix that disables a repository entry without removing it.
pub const DISABLED_PREFIX: &str = "//";

/// What to do when a discovered dependency cannot be mirrored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorMode {
    /// Abort the whole run at the first failing dependency.
    #[default]
    FailFast,
    /// Record the failure as a soft error and keep going.
    BestEffort,
}

/// Copy a dependency folder into extra locations once it is thinned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoCopy {
    /// Dependency repository path, as written in the manifest.
    pub from: String,
    /// Destination parents, relative to `output`.
    #[serde(default)]
    pub to: Vec<String>,
}

/// One configured top-level repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Branch, tag or commit to check out after cloning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub copy: Vec<RepoCopy>,
}

impl Repo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language: None,
            branch: None,
            copy: Vec::new(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn is_disabled(&self) -> bool {
        self.name.starts_with(DISABLED_PREFIX)
    }

    /// Copy rule for dependency `repository`, if one is configured.
    pub fn copy_from(&self, repository: &str) -> Option<&RepoCopy> {
        self.copy.iter().find(|c| c.from == repository)
    }
}

/// An exact-match rename for repositories that moved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRedirect {
    pub from: String,
    pub to: String,
}

/// The whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Root of the mirrored tree.
    pub output: PathBuf,
    /// Language for repositories that do not declare one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_language: Option<String>,
    #[serde(default)]
    pub repo_shortcuts: BTreeMap<String, String>,
    #[serde(default)]
    pub repo_redirects: Vec<RepoRedirect>,
    #[serde(default)]
    pub on_dependency_error: ErrorMode,
    #[serde(default)]
    pub repos: Vec<Repo>,
}

impl Config {
    /// Local mirror folder for `repo`: the last path segment below `output`.
    ///
    /// Returns `None` when the name has no path separator past its first
    /// character.
    pub fn local_repo(&self, repo: &str) -> Option<PathBuf> {
        let pos = repo.rfind('/')?;
        if pos == 0 || pos + 1 == repo.len() {
            return None;
        }
        Some(self.output.join(&repo[pos + 1..]))
    }

    /// Like [`Config::local_repo`], but a missing path is a configuration
    /// defect.
    pub fn require_local_repo(&self, repo: &str) -> Result<PathBuf> {
        self.local_repo(repo).ok_or_else(|| Error::Config {
            repo: repo.to_string(),
            message: "no local folder can be derived from the name".to_string(),
        })
    }

    /// Replace the longest configured shortcut prefix of `repo`.
    pub fn expand_shortcut(&self, repo: &str) -> String {
        self.repo_shortcuts
            .iter()
            .filter(|(prefix, _)| !prefix.is_empty() && repo.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(prefix, expansion)| format!("{}{}", expansion, &repo[prefix.len()..]))
            .unwrap_or_else(|| repo.to_string())
    }

    /// The redirect target for `repo`, or `repo` itself.
    pub fn redirect<'a>(&'a self, repo: &'a str) -> &'a str {
        self.repo_redirects
            .iter()
            .find(|r| r.from == repo)
            .map(|r| r.to.as_str())
            .unwrap_or(repo)
    }

    /// Canonical name after shortcut expansion and redirects.
    pub fn canonical_name(&self, repo: &str) -> String {
        let expanded = self.expand_shortcut(repo);
        self.redirect(&expanded).to_string()
    }

    /// Clone addresses for `repo`.
    pub fn resolve_remote(&self, repo: &str) -> Remote {
        Remote::for_name(&self.canonical_name(repo))
    }

    /// Effective language of a repository entry, lower-cased.
    pub fn language_of(&self, repo: &Repo) -> Option<String> {
        repo.language
            .as_deref()
            .or(self.repo_language.as_deref())
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty())
    }

    /// Repositories that are not disabled, in configuration order.
    pub fn active_repos(&self) -> impl Iterator<Item = &Repo> {
        self.repos.iter().filter(|r| !r.is_disabled())
    }

    /// Anchor a relative `output` at `base`.
    pub fn resolve_output(&mut self, base: &Path) {
        if self.output.is_relative() {
            self.output = base.join(&self.output);
        }
    }
}

/// Parse a JSON configuration string.
pub fn parse(json: &str) -> Result<Config> {
    let config: Config = serde_json::from_str(json).map_err(|e| Error::ConfigParse {
        message: e.to_string(),
        hint: hint_for(&e),
    })?;
    if config.output.as_os_str().is_empty() {
        return Err(Error::ConfigParse {
            message: "`output` must not be empty".to_string(),
            hint: Some("Set \"output\" to the folder that receives the mirrors".to_string()),
        });
    }
    Ok(config)
}

fn hint_for(e: &serde_json::Error) -> Option<String> {
    let text = e.to_string();
    if text.contains("missing field `output`") {
        Some("Add an \"output\" folder at the top level".to_string())
    } else if text.contains("missing field `name`") {
        Some("Every entry in \"repos\" needs a \"name\"".to_string())
    } else if text.contains("unknown variant") {
        Some("on_dependency_error is \"fail-fast\" or \"best-effort\"".to_string())
    } else {
        None
    }
}

/// Load a configuration file. A relative `output` is resolved against the
/// file's directory.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    let mut config = parse(&content)?;
    let base = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    config.resolve_output(base);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        parse(
            r#"{
                "output": "/out",
                "repo_language": "Go",
                "repo_shortcuts": { "gh/": "github.com/", "gh/x/": "gitlab.com/x/" },
                "repo_redirects": [{ "from": "github.com/old/name", "to": "github.com/new/name" }],
                "repos": [
                    { "name": "github.com/org/app" },
                    { "name": "//github.com/org/skipped" },
                    { "name": "github.com/org/tool", "language": "C#", "branch": "main" }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_defaults() {
        let cfg = parse(r#"{ "output": "out" }"#).unwrap();
        assert!(cfg.repos.is_empty());
        assert_eq!(cfg.on_dependency_error, ErrorMode::FailFast);
    }

    #[test]
    fn test_parse_error_mode() {
        let cfg = parse(r#"{ "output": "out", "on_dependency_error": "best-effort" }"#).unwrap();
        assert_eq!(cfg.on_dependency_error, ErrorMode::BestEffort);
    }

    #[test]
    fn test_parse_missing_output_has_hint() {
        match parse(r#"{ "repos": [] }"#).unwrap_err() {
            Error::ConfigParse { hint, .. } => assert!(hint.unwrap().contains("output")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_empty_output() {
        assert!(parse(r#"{ "output": "" }"#).is_err());
    }

    #[test]
    fn test_local_repo() {
        let cfg = config();
        assert_eq!(
            cfg.local_repo("host/org/app"),
            Some(PathBuf::from("/out/app"))
        );
        assert_eq!(cfg.local_repo("noslash"), None);
        assert_eq!(cfg.local_repo("/leading"), None);
        assert_eq!(cfg.local_repo("trailing/"), None);
    }

    #[test]
    fn test_require_local_repo_is_config_error() {
        let err = config().require_local_repo("noslash").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_expand_shortcut_longest_prefix() {
        let cfg = config();
        assert_eq!(cfg.expand_shortcut("gh/org/app"), "github.com/org/app");
        assert_eq!(cfg.expand_shortcut("gh/x/lib"), "gitlab.com/x/lib");
        assert_eq!(cfg.expand_shortcut("example.com/a/b"), "example.com/a/b");
    }

    #[test]
    fn test_redirect() {
        let cfg = config();
        assert_eq!(cfg.redirect("github.com/old/name"), "github.com/new/name");
        assert_eq!(cfg.redirect("github.com/other"), "github.com/other");
    }

    #[test]
    fn test_canonical_name_applies_shortcut_then_redirect() {
        assert_eq!(config().canonical_name("gh/old/name"), "github.com/new/name");
    }

    #[test]
    fn test_language_defaults_and_lowercases() {
        let cfg = config();
        assert_eq!(cfg.language_of(&cfg.repos[0]), Some("go".to_string()));
        assert_eq!(cfg.language_of(&cfg.repos[2]), Some("c#".to_string()));
    }

    #[test]
    fn test_active_repos_skip_disabled() {
        let cfg = config();
        let names: Vec<_> = cfg.active_repos().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["github.com/org/app", "github.com/org/tool"]);
    }

    #[test]
    fn test_copy_from() {
        let mut repo = Repo::new("github.com/org/app");
        repo.copy.push(RepoCopy {
            from: "modpkg/v2".to_string(),
            to: vec!["vendor".to_string()],
        });
        assert!(repo.copy_from("modpkg/v2").is_some());
        assert!(repo.copy_from("other").is_none());
    }

    #[test]
    fn test_from_file_resolves_relative_output() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("cfg.json");
        std::fs::write(&path, r#"{ "output": "archive" }"#).unwrap();
        let cfg = from_file(&path).unwrap();
        assert_eq!(cfg.output, temp.path().join("archive"));
    }
}
