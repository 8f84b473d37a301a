// crates/lab-core/src/config.rs - Configuration System
//
// CONFIGURATION HIERARCHY (highest to lowest priority):
// 1. Environment variables (LAB_CORE_HOST, LAB_CORE_TOKEN, ...)
// 2. Repository config file (<git-dir>/lab/lab.toml)
// 3. Global config file (<config-dir>/lab/lab.toml)
// 4. Built-in defaults
//
// An explicit `--config <file>` replaces both file layers.
//
// EXAMPLE FILE:
// ```toml
// [core]
// host = "https://gitlab.example.org"
// token = "glpat-..."
// default_remote = "upstream"
//
// [editor]
// command = "helix"
// ```

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the config file in every file layer
pub const CONFIG_FILE_NAME: &str = "lab.toml";

/// Errors that can occur during configuration loading and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid TOML syntax in {file}: {error}")]
    ParseError { file: String, error: String },

    #[error("Invalid configuration value: {0}")]
    ValidationError(String),

    #[error("I/O error reading config: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Fully resolved configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LabConfig {
    pub core: CoreConfig,
    pub editor: EditorConfig,
}

/// Forge connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Base URL of the GitLab instance
    pub host: String,

    /// Personal access token sent as PRIVATE-TOKEN
    pub token: Option<String>,

    /// Remote used when a command is given only an id
    pub default_remote: String,
}

/// Editor integration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EditorConfig {
    /// Editor command (overrides GIT_EDITOR, VISUAL and EDITOR)
    pub command: Option<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            token: None,
            default_remote: default_remote(),
        }
    }
}

/// One config file as written on disk; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigLayer {
    #[serde(default)]
    core: CoreLayer,
    #[serde(default)]
    editor: EditorLayer,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CoreLayer {
    host: Option<String>,
    token: Option<String>,
    default_remote: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct EditorLayer {
    command: Option<String>,
}

/// Loads, merges and validates configuration
pub struct ConfigManager;

impl ConfigManager {
    /// Load complete configuration from all sources
    ///
    /// - Missing config files are not errors (defaults apply)
    /// - A missing `explicit` file is an error, since the user asked for it
    /// - Invalid TOML is an error naming the offending file
    pub fn load_config(git_dir: Option<&Path>, explicit: Option<&Path>) -> ConfigResult<LabConfig> {
        let mut config = LabConfig::default();

        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::FileNotFound(path.display().to_string()));
                }
                Self::apply_file(&mut config, path)?;
            }
            None => {
                if let Some(path) = Self::global_config_path() {
                    Self::apply_file(&mut config, &path)?;
                }
                if let Some(git_dir) = git_dir {
                    Self::apply_file(&mut config, &Self::repo_config_path(git_dir))?;
                }
            }
        }

        Self::apply_env_overrides(&mut config, |key| env::var(key).ok());
        Self::validate_config(&config)?;

        tracing::debug!(host = %config.core.host, remote = %config.core.default_remote, "configuration loaded");
        Ok(config)
    }

    /// `<config-dir>/lab/lab.toml`, e.g. `~/.config/lab/lab.toml` on Linux
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("lab").join(CONFIG_FILE_NAME))
    }

    /// `<git-dir>/lab/lab.toml`
    pub fn repo_config_path(git_dir: &Path) -> PathBuf {
        git_dir.join("lab").join(CONFIG_FILE_NAME)
    }

    /// Merge one file layer into `config` if the file exists
    fn apply_file(config: &mut LabConfig, path: &Path) -> ConfigResult<()> {
        if !path.exists() {
            return Ok(());
        }

        let content = std::fs::read_to_string(path)?;
        let layer = Self::parse_layer(&content, path)?;
        tracing::debug!(file = %path.display(), "applying config file");
        Self::merge_layer(config, layer);
        Ok(())
    }

    fn parse_layer(content: &str, path: &Path) -> ConfigResult<ConfigLayer> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError {
            file: path.display().to_string(),
            error: e.to_string(),
        })
    }

    /// Keys present in `layer` replace the current values
    fn merge_layer(config: &mut LabConfig, layer: ConfigLayer) {
        if let Some(host) = layer.core.host {
            config.core.host = host;
        }
        if let Some(token) = layer.core.token {
            config.core.token = Some(token);
        }
        if let Some(remote) = layer.core.default_remote {
            config.core.default_remote = remote;
        }
        if let Some(command) = layer.editor.command {
            config.editor.command = Some(command);
        }
    }

    /// Apply environment variable overrides
    ///
    /// - LAB_CORE_HOST -> core.host
    /// - LAB_CORE_TOKEN -> core.token
    /// - LAB_CORE_REMOTE -> core.default_remote
    /// - LAB_EDITOR -> editor.command
    fn apply_env_overrides<F>(config: &mut LabConfig, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("LAB_CORE_HOST") {
            config.core.host = host;
        }
        if let Some(token) = lookup("LAB_CORE_TOKEN").filter(|t| !t.is_empty()) {
            config.core.token = Some(token);
        }
        if let Some(remote) = lookup("LAB_CORE_REMOTE") {
            config.core.default_remote = remote;
        }
        if let Some(command) = lookup("LAB_EDITOR") {
            config.editor.command = Some(command);
        }
    }

    /// Validate the final configuration
    fn validate_config(config: &LabConfig) -> ConfigResult<()> {
        let host = config.core.host.as_str();
        if !(host.starts_with("https://") || host.starts_with("http://")) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid host '{host}'. Must be an http:// or https:// URL"
            )));
        }

        if config.core.default_remote.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "default_remote cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn default_host() -> String {
    "https://gitlab.com".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}
