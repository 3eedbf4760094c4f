//! # Deps Command Implementation
//!
//! Prints the dependencies declared by the `go.mod` of each mirrored Go
//! repository, as a tree, together with the folder each one is mirrored to
//! and the reference it is checked out at. With `--manifest`, a single
//! manifest file is read instead.
//!
//! This command is read-only.

use anyhow::{Context, Result};
use clap::Args;
use ptree::{print_tree, TreeItem};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

use vendor_mirror::config::Config;
use vendor_mirror::manifest::{self, Dependency};
use vendor_mirror::steps::COMMON_FOLDER;
use vendor_mirror::thinning::Profile;

use super::{load_config, DEFAULT_CONFIG};

/// Show manifest dependencies
#[derive(Args, Debug)]
pub struct DepsArgs {
    /// Path to the configuration file.
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "VENDOR_MIRROR_CONFIG",
        default_value = DEFAULT_CONFIG
    )]
    pub config: PathBuf,

    /// Read this manifest file instead of the mirrored repositories.
    #[arg(short, long, value_name = "FILE")]
    pub manifest: Option<PathBuf>,
}

/// Execute the `deps` command.
pub fn execute(args: DepsArgs) -> Result<()> {
    let root = match &args.manifest {
        Some(path) => manifest_node(path)?,
        None => {
            let config = load_config(&args.config)?;
            config_node(&config)?
        }
    };
    print_tree(&root).context("Failed to display tree")?;
    Ok(())
}

fn manifest_node(path: &Path) -> Result<TreeNode> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let deps = manifest::parse(&text).with_context(|| format!("In {}", path.display()))?;
    Ok(TreeNode {
        label: path.display().to_string(),
        children: deps.iter().map(|d| dependency_node(d, None)).collect(),
    })
}

fn config_node(config: &Config) -> Result<TreeNode> {
    let common = config.output.join(COMMON_FOLDER);
    let mut children = Vec::new();
    for repo in config.active_repos() {
        let language = config.language_of(repo);
        if Profile::for_language(language.as_deref()) != Profile::Go {
            continue;
        }
        let local = config.require_local_repo(&repo.name)?;
        let label = format!("{} ({})", repo.name, local.display());
        if !local.exists() {
            children.push(TreeNode::leaf(format!("{} [not mirrored]", label)));
            continue;
        }
        let deps = manifest::discover(&local)?;
        children.push(TreeNode {
            label,
            children: deps
                .iter()
                .map(|d| dependency_node(d, Some(&common)))
                .collect(),
        });
    }
    Ok(TreeNode {
        label: config.output.display().to_string(),
        children,
    })
}

fn dependency_node(dep: &Dependency, common: Option<&Path>) -> TreeNode {
    let mut label = format!(
        "{} {} -> {}",
        dep.repository,
        dep.version,
        dep.version.checkout_ref()
    );
    if let Some(common) = common {
        let folder = dep.folder_in(common);
        let state = if folder.exists() { "mirrored" } else { "missing" };
        label.push_str(&format!(" [{}]", state));
    }
    TreeNode::leaf(label)
}

/// Tree node structure for ptree visualization
#[derive(Clone, Debug)]
struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
}

impl TreeNode {
    fn leaf(label: String) -> Self {
        Self {
            label,
            children: Vec::new(),
        }
    }
}

impl TreeItem for TreeNode {
    type Child = TreeNode;

    fn write_self<W: std::io::Write>(
        &self,
        f: &mut W,
        _style: &ptree::Style,
    ) -> std::io::Result<()> {
        write!(f, "{}", self.label)
    }

    fn children(&self) -> Cow<'_, [Self::Child]> {
        Cow::Borrowed(&self.children)
    }
}
