//! # Git Transport
//!
//! All version control work goes through the system `git` binary, which
//! picks up SSH keys, credential helpers and `~/.gitconfig` on its own. The
//! pipeline only looks at the exit status and the combined output text of
//! each invocation.
//!
//! [`GitOperations`] is the seam the steps call through, so tests can swap
//! in a scripted implementation. [`clone_with_fallback`] implements the
//! transport fallback:
//!
//! 1. clone over SSH;
//! 2. clone over HTTPS;
//! 3. clone from the address the server suggested, if attempt 1 or 2
//!    printed `remote: Use 'git clone <URL>' instead`.
//!
//! Matching on diagnostic text is best-effort. Anything that does not match
//! a known signature is [`CloneFailure::Unclassified`].

use std::fs;
use std::path::Path;
use std::process::Command;
use std::sync::OnceLock;

use log::{debug, info};
use regex::Regex;

use crate::error::{Error, Result};
use crate::remote::Remote;

/// Printed by ssh when the host cannot be reached at all.
const SSH_CONNECT_MARKERS: &[&str] = &["ssh: connect to host", "ssh: Could not resolve hostname"];

/// Printed by git whenever the transport gave up.
const READ_REMOTE_MARKER: &str = "Could not read from remote repository";

/// Trait for git operations - allows mocking in tests
pub trait GitOperations {
    /// Clone `url` into `dest`.
    ///
    /// A failed process is reported as [`Error::GitCommand`] carrying the
    /// combined stdout and stderr, which [`classify`] inspects.
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()>;

    /// Check out `reference` in the repository at `dir`.
    fn checkout(&self, dir: &Path, reference: &str) -> Result<()>;

    /// Fast-forward the repository at `dir` from its upstream.
    fn pull(&self, dir: &Path) -> Result<()>;
}

/// [`GitOperations`] backed by the system `git` command.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemGit;

impl GitOperations for SystemGit {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut cmd = Command::new("git");
        cmd.arg("clone").arg(url).arg(dest);
        run(cmd, &format!("clone {}", url), dest.parent().unwrap_or(dest))
    }

    fn checkout(&self, dir: &Path, reference: &str) -> Result<()> {
        let mut cmd = Command::new("git");
        cmd.args(["checkout", "--quiet", reference]).current_dir(dir);
        run(cmd, &format!("checkout {}", reference), dir)
    }

    fn pull(&self, dir: &Path) -> Result<()> {
        let mut cmd = Command::new("git");
        cmd.args(["pull", "--ff-only", "--quiet"]).current_dir(dir);
        run(cmd, "pull", dir)
    }
}

fn run(mut cmd: Command, command: &str, dir: &Path) -> Result<()> {
    // Fail instead of waiting on a credential prompt for HTTPS remotes.
    cmd.env("GIT_TERMINAL_PROMPT", "0");
    let output = cmd.output().map_err(|e| Error::GitCommand {
        command: command.to_string(),
        dir: dir.to_path_buf(),
        output: e.to_string(),
    })?;

    if output.status.success() {
        return Ok(());
    }

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    Err(Error::GitCommand {
        command: command.to_string(),
        dir: dir.to_path_buf(),
        output: combined.trim().to_string(),
    })
}

/// How a failed clone attempt should steer the fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloneFailure {
    /// SSH could not reach the host; try the next transport.
    TransportInvalid,
    /// The server named a different address to clone from.
    Redirect(String),
    /// No known signature matched.
    Unclassified,
}

fn redirect_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"remote: Use 'git clone ([^'\s]+)' instead").expect("static pattern is valid")
    })
}

/// Classify the combined output of a failed `git clone`.
pub fn classify(output: &str) -> CloneFailure {
    let ssh_down = SSH_CONNECT_MARKERS.iter().any(|m| output.contains(m));
    if ssh_down && output.contains(READ_REMOTE_MARKER) {
        return CloneFailure::TransportInvalid;
    }
    if let Some(caps) = redirect_pattern().captures(output) {
        return CloneFailure::Redirect(caps[1].to_string());
    }
    CloneFailure::Unclassified
}

/// Diagnostic text of a git failure.
fn failure_output(err: &Error) -> String {
    match err {
        Error::GitCommand { output, .. } | Error::TransportInvalid { output, .. } => {
            output.clone()
        }
        other => other.to_string(),
    }
}

/// Clone `remote` into `dest`, trying SSH, then HTTPS, then any redirect
/// address the server suggested. Returns the address that worked.
pub fn clone_with_fallback(git: &dyn GitOperations, remote: &Remote, dest: &Path) -> Result<String> {
    let existed = dest.exists();
    let mut redirect: Option<String> = None;
    let mut last: Option<(String, Error)> = None;

    for (transport, url) in [("ssh", &remote.ssh), ("https", &remote.https)] {
        debug!("Cloning {} over {}: {}", remote.name, transport, url);
        let err = match git.clone_repo(url, dest) {
            Ok(()) => return Ok(url.clone()),
            Err(e) => e,
        };
        let output = failure_output(&err);
        let err = match classify(&output) {
            CloneFailure::TransportInvalid => {
                debug!("{} is unreachable over {}, falling back", remote.name, transport);
                Error::TransportInvalid {
                    url: url.clone(),
                    output,
                }
            }
            CloneFailure::Redirect(candidate) => {
                debug!("{} suggested redirect to {}", url, candidate);
                redirect.get_or_insert(candidate);
                err
            }
            CloneFailure::Unclassified => {
                debug!("Clone over {} failed for {}: {}", transport, remote.name, output);
                err
            }
        };
        discard_partial(dest, existed)?;
        last = Some((url.clone(), err));
    }

    if let Some(url) = redirect {
        info!("Cloning {} from redirected address {}", remote.name, url);
        match git.clone_repo(&url, dest) {
            Ok(()) => return Ok(url),
            Err(e) => {
                discard_partial(dest, existed)?;
                last = Some((url, e));
            }
        }
    }

    let (url, err) = last.ok_or_else(|| Error::GitClone {
        url: remote.https.clone(),
        message: "no clone attempt was made".to_string(),
        hint: None,
    })?;
    let message = failure_output(&err);
    let hint = (message.contains("not found") || message.contains("could not read Username"))
        .then(|| format!("If {} moved, add a repo_redirects entry for it", remote.name));
    Err(Error::GitClone { url, message, hint })
}

/// Remove whatever a failed attempt left behind so the next one starts clean.
fn discard_partial(dest: &Path, existed: bool) -> Result<()> {
    if !existed && dest.exists() {
        fs::remove_dir_all(dest)?;
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedGit;
    use super::*;
    use tempfile::TempDir;

    const SSH_DOWN: &str = "Cloning into 'x'...\nssh: connect to host example.com port 22: Connection refused\nfatal: Could not read from remote repository.\n\nPlease make sure you have the correct access rights";
    const REDIRECT: &str = "Cloning into 'x'...\nremote: Use 'git clone https://example.com/new/place.git' instead\nfatal: repository not found";

    fn remote() -> Remote {
        Remote::for_name("example.com/org/lib")
    }

    #[test]
    fn test_classify_transport_invalid_needs_both_markers() {
        assert_eq!(classify(SSH_DOWN), CloneFailure::TransportInvalid);
        assert_eq!(
            classify("fatal: Could not read from remote repository."),
            CloneFailure::Unclassified
        );
        assert_eq!(
            classify("ssh: connect to host example.com port 22: timed out"),
            CloneFailure::Unclassified
        );
    }

    #[test]
    fn test_classify_unresolvable_host() {
        let out = "ssh: Could not resolve hostname nope: Name or service not known\nfatal: Could not read from remote repository.";
        assert_eq!(classify(out), CloneFailure::TransportInvalid);
    }

    #[test]
    fn test_classify_redirect_extracts_url() {
        assert_eq!(
            classify(REDIRECT),
            CloneFailure::Redirect("https://example.com/new/place.git".to_string())
        );
    }

    #[test]
    fn test_classify_other() {
        assert_eq!(
            classify("fatal: repository 'x' not found"),
            CloneFailure::Unclassified
        );
    }

    #[test]
    fn test_ssh_success_stops() {
        let temp = TempDir::new().unwrap();
        let git = ScriptedGit::new();
        let url = clone_with_fallback(&git, &remote(), &temp.path().join("lib")).unwrap();
        assert_eq!(url, "git@example.com:org/lib.git");
        assert_eq!(git.clone_urls().len(), 1);
    }

    #[test]
    fn test_transport_invalid_falls_back_to_https_once() {
        let temp = TempDir::new().unwrap();
        let git = ScriptedGit::new().fail_clone(SSH_DOWN);
        let url = clone_with_fallback(&git, &remote(), &temp.path().join("lib")).unwrap();
        assert_eq!(url, "https://example.com/org/lib");
        assert_eq!(
            git.clone_urls(),
            vec!["git@example.com:org/lib.git", "https://example.com/org/lib"]
        );
    }

    #[test]
    fn test_https_redirect_is_third_attempt() {
        let temp = TempDir::new().unwrap();
        let git = ScriptedGit::new().fail_clone(SSH_DOWN).fail_clone(REDIRECT);
        let url = clone_with_fallback(&git, &remote(), &temp.path().join("lib")).unwrap();
        assert_eq!(url, "https://example.com/new/place.git");
        assert_eq!(git.clone_urls()[2], "https://example.com/new/place.git");
    }

    #[test]
    fn test_no_redirect_reports_https_failure() {
        let temp = TempDir::new().unwrap();
        let git = ScriptedGit::new()
            .fail_clone("fatal: permission denied")
            .fail_clone("fatal: repository 'https://example.com/org/lib/' not found");
        let err = clone_with_fallback(&git, &remote(), &temp.path().join("lib")).unwrap_err();
        assert_eq!(git.clone_urls().len(), 2);
        match err {
            Error::GitClone { url, message, hint } => {
                assert_eq!(url, "https://example.com/org/lib");
                assert!(message.contains("not found"));
                assert!(hint.is_some());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_failed_redirect_reports_redirect_failure() {
        let temp = TempDir::new().unwrap();
        let git = ScriptedGit::new()
            .fail_clone(REDIRECT)
            .fail_clone("fatal: unable to access")
            .fail_clone("fatal: still broken");
        let err = clone_with_fallback(&git, &remote(), &temp.path().join("lib")).unwrap_err();
        assert_eq!(git.clone_urls().len(), 3);
        match err {
            Error::GitClone { url, message, .. } => {
                assert_eq!(url, "https://example.com/new/place.git");
                assert_eq!(message, "fatal: still broken");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_scp_style_redirect_is_used_verbatim() {
        let temp = TempDir::new().unwrap();
        let git = ScriptedGit::new()
            .fail_clone(SSH_DOWN)
            .fail_clone("remote: Use 'git clone git@example.com:new/place.git' instead\nfatal: moved");
        let url = clone_with_fallback(&git, &remote(), &temp.path().join("lib")).unwrap();
        assert_eq!(url, "git@example.com:new/place.git");
        assert_eq!(
            git.clone_urls(),
            vec![
                "git@example.com:org/lib.git",
                "https://example.com/org/lib",
                "git@example.com:new/place.git",
            ]
        );
    }

    macro_rules! require_program {
        ($name:expr) => {{
            let exists = ::std::process::Command::new($name)
                .arg("--version")
                .stdout(::std::process::Stdio::null())
                .stderr(::std::process::Stdio::null())
                .status()
                .is_ok();
            if !exists {
                eprintln!("Couldn't find \"{}\"", $name);
                return;
            }
        }};
    }

    fn init_repo(dir: &Path) {
        let status = Command::new("git")
            .arg("init")
            .arg("--quiet")
            .arg(dir)
            .status()
            .unwrap();
        assert!(status.success());
    }

    #[test]
    fn test_system_git_clones_local_repo() {
        require_program!("git");

        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source");
        init_repo(&source);
        let dest = temp.path().join("nested/dest");

        SystemGit
            .clone_repo(source.to_str().unwrap(), &dest)
            .unwrap();
        assert!(dest.join(".git").is_dir());
    }

    #[test]
    fn test_system_git_reports_combined_output() {
        require_program!("git");

        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing");
        let err = SystemGit
            .clone_repo(missing.to_str().unwrap(), &temp.path().join("dest"))
            .unwrap_err();
        match err {
            Error::GitCommand { command, output, .. } => {
                assert!(command.starts_with("clone "));
                assert!(!output.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_system_git_checkout_unknown_ref() {
        require_program!("git");

        let temp = TempDir::new().unwrap();
        init_repo(temp.path());
        let err = SystemGit.checkout(temp.path(), "no-such-ref").unwrap_err();
        assert!(matches!(err, Error::GitCommand { .. }));
    }
}
