//! Shared test utilities for integration and E2E tests.
//!
//! Add `mod common;` to a test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! let git = FakeGit::new().with_repo("git@host:org/app.git", &[("go.mod", MANIFEST)]);
//! ```

#![allow(dead_code)]

use assert_fs::prelude::*;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use vendor_mirror::error::{Error, Result};
use vendor_mirror::git::GitOperations;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::manifests;
    #[allow(unused_imports)]
    pub use super::{FakeGit, TestFixture};
}

/// Manifest snippets for testing.
#[allow(dead_code)]
pub mod manifests {
    /// One pseudo-version dependency.
    pub const MODPKG: &str = "module host/org/app

go 1.21

require (
\tmodpkg/v2 v0.0.0-20210101000000-abcdef123456
)
";

    /// A tag dependency and a pseudo-version dependency.
    pub const TWO_DEPS: &str = "module host/org/web

go 1.21

require (
\tgithub.com/pkg/errors v0.9.1
\tmodpkg/v2 v0.0.0-20210101000000-abcdef123456
)
";

    /// No require block at all.
    pub const NO_REQUIRE: &str = "module host/org/bare\n\ngo 1.21\n";
}

/// Combined output of an unreachable SSH transport.
#[allow(dead_code)]
pub const SSH_DOWN: &str = "Cloning into 'dest'...
ssh: connect to host host port 22: Connection refused
fatal: Could not read from remote repository.

Please make sure you have the correct access rights
and the repository exists.";

enum Response {
    Files(Vec<(String, Vec<u8>)>),
    Fail(String),
}

/// A [`GitOperations`] that serves clones from in-memory fixtures.
///
/// Unknown URLs fail like a missing repository. Successful clones get a
/// `.git/HEAD` so thinning has metadata to remove.
#[derive(Default)]
pub struct FakeGit {
    remotes: HashMap<String, Response>,
    calls: RefCell<Vec<String>>,
}

#[allow(dead_code)]
impl FakeGit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repo(mut self, url: &str, files: &[(&str, &str)]) -> Self {
        let files = files
            .iter()
            .map(|(p, c)| (p.to_string(), c.as_bytes().to_vec()))
            .collect();
        self.remotes.insert(url.to_string(), Response::Files(files));
        self
    }

    pub fn with_failure(mut self, url: &str, output: &str) -> Self {
        self.remotes
            .insert(url.to_string(), Response::Fail(output.to_string()));
        self
    }

    /// Every call in order, as `clone <url>`, `checkout <ref>` or `pull`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn clones_of(&self, url: &str) -> usize {
        let wanted = format!("clone {}", url);
        self.calls.borrow().iter().filter(|c| **c == wanted).count()
    }
}

impl GitOperations for FakeGit {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        self.calls.borrow_mut().push(format!("clone {}", url));
        match self.remotes.get(url) {
            Some(Response::Files(files)) => {
                fs::create_dir_all(dest.join(".git"))?;
                fs::write(dest.join(".git/HEAD"), "ref: refs/heads/main\n")?;
                for (path, content) in files {
                    let target = dest.join(path);
                    if let Some(parent) = target.parent() {
                        fs::create_dir_all(parent)?;
                    }
                    fs::write(target, content)?;
                }
                Ok(())
            }
            Some(Response::Fail(output)) => Err(Error::GitCommand {
                command: format!("clone {}", url),
                dir: dest.to_path_buf(),
                output: output.clone(),
            }),
            None => Err(Error::GitCommand {
                command: format!("clone {}", url),
                dir: dest.to_path_buf(),
                output: format!("fatal: repository '{}' not found", url),
            }),
        }
    }

    fn checkout(&self, _dir: &Path, reference: &str) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(format!("checkout {}", reference));
        Ok(())
    }

    fn pull(&self, _dir: &Path) -> Result<()> {
        self.calls.borrow_mut().push("pull".to_string());
        Ok(())
    }
}

/// A test fixture that provides a temporary directory with an optional
/// `cfg.json`.
#[allow(dead_code)]
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `cfg.json` with the given content.
    pub fn with_config(self, content: &str) -> Self {
        self.temp_dir
            .child("cfg.json")
            .write_str(content)
            .expect("Failed to write config file");
        self
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path to the config file.
    pub fn config_path(&self) -> std::path::PathBuf {
        self.temp_dir.path().join("cfg.json")
    }

    /// Create a child path in the temp directory.
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command configured to run in this fixture's directory.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("vendor-mirror");
        cmd.current_dir(self.path());
        cmd.env_remove("VENDOR_MIRROR_CONFIG");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
