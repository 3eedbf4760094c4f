//! Clone addresses for a logical repository name.
//!
//! A name such as `github.com/org/project` yields two addresses: an
//! SSH-style `git@github.com:org/project.git` and an HTTPS-style
//! `https://github.com/org/project`. Shortcut expansion and redirects are
//! applied by [`crate::config::Config::resolve_remote`] before formatting.
//! Which address is tried first is decided by [`crate::git::clone_with_fallback`].

use std::fmt;

/// The two transports derivable from one logical name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remote {
    /// Canonical logical name the addresses were formatted from.
    pub name: String,
    pub ssh: String,
    pub https: String,
}

impl Remote {
    pub fn for_name(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ssh: format_ssh(name),
            https: format_https(name),
        }
    }
}

impl fmt::Display for Remote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} | {})", self.name, self.ssh, self.https)
    }
}

/// `host/path` -> `git@host:path.git`
pub fn format_ssh(name: &str) -> String {
    format!("git@{}.git", name.replacen('/', ":", 1))
}

/// `host/path` -> `https://host/path`
pub fn format_https(name: &str) -> String {
    format!("https://{}", name)
}
