//! Project management
//!
//! Handles project initialization and provides access to stores.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::{Config, GoalStore, TaskStore};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Project already exists at {0}")]
    AlreadyExists(PathBuf),

    #[error("Not in a replan project. Run 'replan init' first.")]
    NotInProject,
}

/// A Replan project
#[derive(Debug)]
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let replan_dir = root.join(".replan");

        if !replan_dir.is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Initializes a new project at the given path
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let replan_dir = root.join(".replan");

        if replan_dir.is_dir() {
            return Err(ProjectError::AlreadyExists(replan_dir).into());
        }

        fs::create_dir_all(&replan_dir).with_context(|| {
            format!("Failed to create .replan directory: {}", replan_dir.display())
        })?;

        let goals_dir = replan_dir.join("goals");
        fs::create_dir_all(&goals_dir).with_context(|| {
            format!("Failed to create goals directory: {}", goals_dir.display())
        })?;

        let tasks_path = replan_dir.join("tasks.jsonl");
        if !tasks_path.exists() {
            fs::write(&tasks_path, "").with_context(|| {
                format!("Failed to create task store: {}", tasks_path.display())
            })?;
        }

        let config_path = replan_dir.join("config.toml");
        if !config_path.exists() {
            let default_config = r#"# Replan configuration

# Goal assumed when a command omits one
# default_goal = "g-1234567"

# Seconds to wait for the store lock when committing a preview
commit_timeout_secs = 5
"#;
            fs::write(&config_path, default_config)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        Self::open(root)
    }

    /// Returns the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the project configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the task store for this project
    pub fn task_store(&self) -> TaskStore {
        TaskStore::for_project(&self.root)
    }

    /// Returns the goal store for this project
    pub fn goal_store(&self) -> GoalStore {
        GoalStore::for_project(&self.root)
    }
}
