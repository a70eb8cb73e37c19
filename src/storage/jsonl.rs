//! JSONL storage for tasks
//!
//! Tasks are stored in `.replan/tasks.jsonl` with one JSON object per
//! line. Uses file locking for concurrent access safety; full rewrites
//! go through a temp file and an atomic rename.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use crate::domain::{GoalId, Task, TaskId};

/// Store for task data in JSONL format
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    /// Creates a new task store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates the default store for a project
    pub fn for_project(project_root: &Path) -> Self {
        Self::new(project_root.join(".replan").join("tasks.jsonl"))
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the sidecar lock file used to serialize commits
    pub(crate) fn lock_path(&self) -> PathBuf {
        self.path.with_extension("jsonl.lock")
    }

    /// Reads all tasks from the store
    pub fn read_all(&self) -> Result<HashMap<TaskId, Task>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open task store: {}", self.path.display()))?;

        // Acquire shared lock for reading
        file.lock_shared()
            .context("Failed to acquire read lock on task store")?;

        let reader = BufReader::new(&file);
        let mut tasks = HashMap::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;

            if line.trim().is_empty() {
                continue;
            }

            let task: Task = serde_json::from_str(&line)
                .with_context(|| format!("Failed to parse task at line {}", line_num + 1))?;

            tasks.insert(task.id.clone(), task);
        }

        // Lock is released when file is dropped
        Ok(tasks)
    }

    /// Reads all tasks belonging to a goal
    pub fn read_for_goal(&self, goal_id: &GoalId) -> Result<HashMap<TaskId, Task>> {
        let all = self.read_all()?;
        Ok(all
            .into_iter()
            .filter(|(_, task)| &task.goal_id == goal_id)
            .collect())
    }

    /// Reads a goal's task snapshot as a vector (calculator input)
    pub fn snapshot_for_goal(&self, goal_id: &GoalId) -> Result<Vec<Task>> {
        let mut tasks: Vec<Task> = self.read_for_goal(goal_id)?.into_values().collect();
        tasks.sort_by_key(|t| t.id.sequence());
        Ok(tasks)
    }

    /// Writes all tasks to the store (full rewrite)
    pub fn write_all(&self, tasks: &HashMap<TaskId, Task>) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        // Write to temp file first
        let temp_path = self.path.with_extension("jsonl.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            // Acquire exclusive lock
            file.lock_exclusive()
                .context("Failed to acquire write lock on task store")?;

            let mut writer = BufWriter::new(&file);

            // Sort by ID for consistent output
            let mut sorted: Vec<_> = tasks.values().collect();
            sorted.sort_by(|a, b| a.id.to_string().cmp(&b.id.to_string()));

            for task in sorted {
                let line = serde_json::to_string(task).context("Failed to serialize task")?;
                writeln!(writer, "{}", line).context("Failed to write task")?;
            }

            writer.flush().context("Failed to flush task store")?;
        }

        // Atomic rename
        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }

    /// Appends a single task (used for quick adds without full rewrite)
    pub fn append(&self, task: &Task) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open task store: {}", self.path.display()))?;

        // Acquire exclusive lock
        file.lock_exclusive()
            .context("Failed to acquire write lock on task store")?;

        let mut writer = BufWriter::new(&file);
        let line = serde_json::to_string(task).context("Failed to serialize task")?;
        writeln!(writer, "{}", line).context("Failed to write task")?;

        writer.flush().context("Failed to flush task store")?;

        Ok(())
    }

    /// Updates a single task (reads all, updates, writes all)
    pub fn update(&self, task: &Task) -> Result<()> {
        let mut tasks = self.read_all()?;
        tasks.insert(task.id.clone(), task.clone());
        self.write_all(&tasks)
    }

    /// Removes a task by ID
    pub fn remove(&self, task_id: &TaskId) -> Result<bool> {
        let mut tasks = self.read_all()?;
        let removed = tasks.remove(task_id).is_some();
        if removed {
            self.write_all(&tasks)?;
        }
        Ok(removed)
    }

    /// Returns the next free sequence number for a goal
    pub fn next_sequence(&self, goal_id: &GoalId) -> Result<u32> {
        let tasks = self.read_for_goal(goal_id)?;
        Ok(tasks
            .keys()
            .map(|id| id.sequence())
            .max()
            .unwrap_or(0)
            + 1)
    }
}
