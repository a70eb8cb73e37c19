//! Configuration handling for Replan
//!
//! Configuration is stored in `.replan/config.toml` (project) and
//! `~/.config/replan/config.toml` (global).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Output format commands fall back to when `--format` is not given
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DefaultFormat {
    #[default]
    Text,
    Json,
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Goal assumed when a command omits one
    pub default_goal: Option<String>,

    /// Seconds to wait for the store lock when committing a preview
    pub commit_timeout_secs: u64,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            default_goal: None,
            commit_timeout_secs: 5,
        }
    }
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: DefaultFormat,
}

/// Combined configuration (global + project)
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
    pub global: GlobalConfig,
    pub project_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration for a specific project
    pub fn for_project(project_root: &Path) -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project_config(project_root)?;

        Ok(Self {
            project,
            global,
            project_root: Some(project_root.to_path_buf()),
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "replan", "replan-cli").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration, tolerating a missing file
    pub fn load_global() -> Result<GlobalConfig> {
        let Some(config_dir) = Self::global_config_dir() else {
            return Ok(GlobalConfig::default());
        };

        let path = config_dir.join("config.toml");
        if !path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read global config: {}", path.display()))?;

        let config: GlobalConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .with_context(|| format!("Failed to parse global config: {}", path.display()))?;

        Ok(config)
    }

    /// Loads project configuration from `.replan/config.toml`
    fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
        let path = project_root.join(".replan").join("config.toml");
        if !path.exists() {
            return Ok(ProjectConfig::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read project config: {}", path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .with_context(|| format!("Failed to parse project config: {}", path.display()))?;

        Ok(config)
    }

    /// Walks up from the current directory looking for `.replan/`
    pub fn find_project_root() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;

        loop {
            if current.join(".replan").is_dir() {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Duration to wait for the store lock when committing
    pub fn commit_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.project.commit_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_project_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_project_config(dir.path()).unwrap();

        assert!(config.default_goal.is_none());
        assert_eq!(config.commit_timeout_secs, 5);
    }

    #[test]
    fn project_config_parses_toml() {
        let dir = TempDir::new().unwrap();
        let replan_dir = dir.path().join(".replan");
        fs::create_dir_all(&replan_dir).unwrap();
        fs::write(
            replan_dir.join("config.toml"),
            "default_goal = \"g-1234567\"\ncommit_timeout_secs = 10\n",
        )
        .unwrap();

        let config = Config::load_project_config(dir.path()).unwrap();
        assert_eq!(config.default_goal.as_deref(), Some("g-1234567"));
        assert_eq!(config.commit_timeout_secs, 10);
    }

    #[test]
    fn global_config_parses_default_format() {
        let config: GlobalConfig = toml::from_str("default_format = \"json\"").unwrap();
        assert_eq!(config.default_format, DefaultFormat::Json);

        let config: GlobalConfig = toml::from_str("").unwrap();
        assert_eq!(config.default_format, DefaultFormat::Text);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = TempDir::new().unwrap();
        let replan_dir = dir.path().join(".replan");
        fs::create_dir_all(&replan_dir).unwrap();
        fs::write(replan_dir.join("config.toml"), "default_goal = [not toml").unwrap();

        assert!(Config::load_project_config(dir.path()).is_err());
    }
}
