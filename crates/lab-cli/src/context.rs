use anyhow::{Context as AnyhowContext, Result};
use std::path::{Path, PathBuf};

use lab_core::{ConfigManager, LabConfig};

use crate::services::{EditorService, GitLabClient, GitService};

/// Application context that gets passed to command handlers
///
/// Holds the resolved configuration and the repository location, and builds
/// the forge client and editor the handlers work against.
pub struct Context {
    config: LabConfig,
    git_dir: Option<PathBuf>,
}

impl Context {
    /// Locate the repository (if any) and load the layered configuration
    pub fn new(config_path: Option<PathBuf>) -> Result<Self> {
        let git_dir = GitService::git_dir();
        tracing::debug!(git_dir = ?git_dir, "resolved repository");

        let config = ConfigManager::load_config(git_dir.as_deref(), config_path.as_deref())
            .context("failed to load configuration")?;

        Ok(Self { config, git_dir })
    }

    pub fn git_dir(&self) -> Option<&Path> {
        self.git_dir.as_deref()
    }

    /// Remote used when a command names only an id
    pub fn default_remote(&self) -> &str {
        &self.config.core.default_remote
    }

    pub fn forge(&self) -> Result<GitLabClient> {
        Ok(GitLabClient::new(&self.config.core)?)
    }

    pub fn editor(&self) -> EditorService {
        EditorService::new(self.config.editor.command.clone(), self.git_dir())
    }
}
