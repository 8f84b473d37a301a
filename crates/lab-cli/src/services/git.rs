// crates/lab-cli/src/services/git.rs - Git command integration
//
// The handful of things lab needs from the local repository are read by
// shelling out to `git`, so user configuration (includes, conditional config,
// credential helpers) is honored exactly as git itself would.

use anyhow::{Context as AnyhowContext, Result, bail};
use std::path::PathBuf;
use std::process::Command;

use lab_core::compose::DEFAULT_COMMENT_CHAR;

/// Thin wrapper around the `git` binary
pub struct GitService;

impl GitService {
    /// Absolute path of the repository's git directory, if inside one
    pub fn git_dir() -> Option<PathBuf> {
        Self::output(&["rev-parse", "--absolute-git-dir"])
            .ok()
            .map(PathBuf::from)
    }

    /// A single git config value; unset keys are `None`
    pub fn config_value(key: &str) -> Option<String> {
        Self::output(&["config", "--get", key])
            .ok()
            .filter(|value| !value.is_empty())
    }

    /// Character that starts a comment line in edit buffers (core.commentChar)
    pub fn comment_char() -> char {
        comment_char_from(Self::config_value("core.commentChar").as_deref())
    }

    /// Fetch URL of a named remote
    pub fn remote_url(remote: &str) -> Result<String> {
        Self::output(&["remote", "get-url", remote])
            .with_context(|| format!("no git remote named '{remote}'"))
    }

    /// All local remotes as (name, fetch URL) pairs
    pub fn remotes() -> Result<Vec<(String, String)>> {
        let listing = Self::output(&["remote", "-v"])?;
        Ok(parse_remote_listing(&listing))
    }

    /// `git fetch <remote> <refspec>`
    pub fn fetch(remote: &str, refspec: &str) -> Result<()> {
        Self::passthrough(&["fetch", remote, refspec])
    }

    /// Print every commit in `range` with its patch, newest first unless
    /// `reverse` is set
    pub fn log_patches(range: &str, reverse: bool) -> Result<()> {
        let mut args = vec!["log", "-p"];
        if reverse {
            args.push("--reverse");
        }
        args.push(range);
        Self::passthrough(&args)
    }

    /// Run git and capture trimmed stdout; a non-zero exit is an error
    fn output(args: &[&str]) -> Result<String> {
        tracing::debug!(?args, "running git");
        let output = Command::new("git")
            .args(args)
            .output()
            .context("failed to run git; is it installed and in PATH?")?;

        if !output.status.success() {
            bail!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Run git with inherited stdio so its output goes straight to the user
    fn passthrough(args: &[&str]) -> Result<()> {
        tracing::debug!(?args, "running git");
        let status = Command::new("git")
            .args(args)
            .status()
            .context("failed to run git; is it installed and in PATH?")?;

        if !status.success() {
            bail!("git {} exited with {}", args.join(" "), status);
        }
        Ok(())
    }
}

/// Interpret a core.commentChar value
///
/// Unset, empty and `auto` all mean the default `#`.
fn comment_char_from(value: Option<&str>) -> char {
    match value.map(str::trim) {
        None | Some("") | Some("auto") => DEFAULT_COMMENT_CHAR,
        Some(value) => value.chars().next().unwrap_or(DEFAULT_COMMENT_CHAR),
    }
}

/// Parse `git remote -v` output, keeping only fetch entries
///
/// Push and fetch URLs can differ; only the fetch URL says where commits
/// come from.
fn parse_remote_listing(listing: &str) -> Vec<(String, String)> {
    listing
        .lines()
        .filter_map(|line| {
            let (name, rest) = line.split_once('\t')?;
            let url = rest.strip_suffix(" (fetch)")?;
            Some((name.to_string(), url.to_string()))
        })
        .collect()
}
