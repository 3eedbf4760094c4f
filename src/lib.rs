//! # Vendor Mirror Library
//!
//! This library mirrors a configured list of Git repositories into a local
//! output tree, follows the dependencies declared in their build manifests,
//! mirrors those as well, and thins everything down to a source-only
//! archive. It backs the `vendor-mirror` command-line tool.
//!
//! ## Quick Example
//!
//! ```
//! use vendor_mirror::manifest;
//!
//! let go_mod = "module example.com/app\n\nrequire (\n\tgithub.com/pkg/errors v0.9.1\n)\n";
//! let deps = manifest::parse(go_mod).unwrap();
//! assert_eq!(deps[0].key(), "github.com/pkg/errors@v0.9.1");
//! assert_eq!(deps[0].version.checkout_ref(), "tags/v0.9.1");
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`)**: The JSON file naming the output folder,
//!   the repositories, and the naming rules (shortcuts and redirects).
//! - **Remotes (`remote`, `git`)**: Turning a repository name into SSH and
//!   HTTPS addresses, and cloning with fallback between them.
//! - **Manifests (`manifest`, `version`)**: Reading `go.mod` require blocks
//!   and translating versions into checkout references.
//! - **Steps (`steps`, `thinning`)**: The units of work and the deletion
//!   tables used to thin a mirror.
//! - **Pipeline (`pipeline`)**: Building and running the steps for a whole
//!   configuration.
//!
//! ## Execution Flow
//!
//! `pipeline::execute` creates the output folder and the shared
//! `Common Code` folder, builds the steps for every repository, and runs
//! them in order on a single thread. It returns a report of soft errors and
//! audit results, or the first fatal error.

pub mod config;
pub mod error;
pub mod git;
pub mod manifest;
pub mod pipeline;
pub mod remote;
pub mod steps;
pub mod thinning;
pub mod version;
