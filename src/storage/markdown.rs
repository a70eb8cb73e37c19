//! Markdown storage for goals
//!
//! Goals are stored as markdown files in `.replan/goals/`. Each file
//! has YAML frontmatter for metadata and a markdown body (the goal
//! description). An index file (`.replan/goals/index.jsonl`) caches
//! metadata for fast listing and is rebuilt when stale.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::{Goal, GoalFrontmatter, GoalId, GoalStatus};

/// Index entry for quick goal lookups
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct IndexEntry {
    id: GoalId,
    title: String,
    status: GoalStatus,
    updated_at: chrono::DateTime<chrono::Utc>,
    file_name: String,
}

impl From<&Goal> for IndexEntry {
    fn from(goal: &Goal) -> Self {
        Self {
            id: goal.id.clone(),
            title: goal.title.clone(),
            status: goal.status,
            updated_at: goal.updated_at,
            file_name: format!("{}.md", goal.id),
        }
    }
}

/// Store for goal data as markdown files
pub struct GoalStore {
    /// Directory containing goal files
    dir: PathBuf,

    /// Path to the index file
    index_path: PathBuf,
}

impl GoalStore {
    /// Creates a new goal store at the given directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let index_path = dir.join("index.jsonl");
        Self { dir, index_path }
    }

    /// Creates the default store for a project
    pub fn for_project(project_root: &Path) -> Self {
        Self::new(project_root.join(".replan").join("goals"))
    }

    /// Returns the directory containing goal files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the path to a goal file
    fn goal_path(&self, id: &GoalId) -> PathBuf {
        self.dir.join(format!("{}.md", id))
    }

    /// Checks if the index needs rebuilding
    fn index_is_stale(&self) -> bool {
        if !self.index_path.exists() {
            return true;
        }

        let index_mtime = match fs::metadata(&self.index_path).and_then(|m| m.modified()) {
            Ok(t) => t,
            Err(_) => return true,
        };

        let entries = match fs::read_dir(&self.dir) {
            Ok(e) => e,
            Err(_) => return true,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "md") {
                if let Ok(mtime) = fs::metadata(&path).and_then(|m| m.modified()) {
                    if mtime > index_mtime {
                        return true;
                    }
                }
            }
        }

        // A deleted file also invalidates the index
        if let Ok(index) = self.read_index() {
            for entry in index.values() {
                if !self.dir.join(&entry.file_name).exists() {
                    return true;
                }
            }
        }

        false
    }

    /// Reads the index file
    fn read_index(&self) -> Result<HashMap<GoalId, IndexEntry>> {
        if !self.index_path.exists() {
            return Ok(HashMap::new());
        }

        let file = File::open(&self.index_path)
            .with_context(|| format!("Failed to open index: {}", self.index_path.display()))?;

        let reader = BufReader::new(file);
        let mut entries = HashMap::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read index line {}", line_num + 1))?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: IndexEntry = serde_json::from_str(&line)
                .with_context(|| format!("Failed to parse index entry at line {}", line_num + 1))?;

            entries.insert(entry.id.clone(), entry);
        }

        Ok(entries)
    }

    /// Writes the index file
    fn write_index(&self, entries: &HashMap<GoalId, IndexEntry>) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create directory: {}", self.dir.display()))?;

        let file = File::create(&self.index_path)
            .with_context(|| format!("Failed to create index: {}", self.index_path.display()))?;

        let mut writer = BufWriter::new(file);

        let mut sorted: Vec<_> = entries.values().collect();
        sorted.sort_by(|a, b| a.id.to_string().cmp(&b.id.to_string()));

        for entry in sorted {
            let line = serde_json::to_string(entry).context("Failed to serialize index entry")?;
            writeln!(writer, "{}", line).context("Failed to write index entry")?;
        }

        writer.flush().context("Failed to flush index")?;
        Ok(())
    }

    /// Rebuilds the index from files
    fn rebuild_index(&self) -> Result<HashMap<GoalId, IndexEntry>> {
        let mut entries = HashMap::new();

        if !self.dir.exists() {
            return Ok(entries);
        }

        for entry in fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read directory: {}", self.dir.display()))?
        {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.extension().is_some_and(|e| e == "md") {
                if let Ok(goal) = self.read_from_file(&path) {
                    entries.insert(goal.id.clone(), IndexEntry::from(&goal));
                }
            }
        }

        self.write_index(&entries)?;
        Ok(entries)
    }

    /// Ensures the index is up-to-date
    fn ensure_index(&self) -> Result<HashMap<GoalId, IndexEntry>> {
        if self.index_is_stale() {
            self.rebuild_index()
        } else {
            self.read_index()
        }
    }

    /// Reads a goal from a file
    fn read_from_file(&self, path: &Path) -> Result<Goal> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read goal file: {}", path.display()))?;

        parse_markdown(&content)
    }

    /// Writes a goal to its file atomically (temp file + rename)
    fn write_to_file(&self, goal: &Goal) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create directory: {}", self.dir.display()))?;

        let path = self.goal_path(&goal.id);
        let temp_path = path.with_extension("md.tmp");
        let content = render_markdown(goal)?;

        fs::write(&temp_path, &content)
            .with_context(|| format!("Failed to write temp file: {}", temp_path.display()))?;

        fs::rename(&temp_path, &path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }

    /// Saves a goal (create or update) and refreshes the index
    pub fn save(&self, goal: &Goal) -> Result<()> {
        self.write_to_file(goal)?;

        let mut entries = self.read_index().unwrap_or_default();
        entries.insert(goal.id.clone(), IndexEntry::from(goal));
        self.write_index(&entries)
    }

    /// Reads a single goal by ID
    pub fn get(&self, id: &GoalId) -> Result<Option<Goal>> {
        let path = self.goal_path(id);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(self.read_from_file(&path)?))
    }

    /// Reads all goals
    pub fn read_all(&self) -> Result<HashMap<GoalId, Goal>> {
        let _ = self.ensure_index()?;
        let mut goals = HashMap::new();

        if !self.dir.exists() {
            return Ok(goals);
        }

        for entry in fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read directory: {}", self.dir.display()))?
        {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.extension().is_some_and(|e| e == "md") {
                if let Ok(goal) = self.read_from_file(&path) {
                    goals.insert(goal.id.clone(), goal);
                }
            }
        }

        Ok(goals)
    }

    /// Lists goals with basic info (from index, fast)
    pub fn list(&self) -> Result<Vec<(GoalId, String, GoalStatus)>> {
        let index = self.ensure_index()?;
        let mut listed: Vec<_> = index
            .values()
            .map(|e| (e.id.clone(), e.title.clone(), e.status))
            .collect();
        listed.sort_by(|a, b| a.0.to_string().cmp(&b.0.to_string()));
        Ok(listed)
    }

    /// Removes a goal file and its index entry
    pub fn remove(&self, id: &GoalId) -> Result<bool> {
        let path = self.goal_path(id);
        if !path.exists() {
            return Ok(false);
        }

        fs::remove_file(&path)
            .with_context(|| format!("Failed to remove goal file: {}", path.display()))?;

        let mut entries = self.read_index().unwrap_or_default();
        entries.remove(id);
        self.write_index(&entries)?;

        Ok(true)
    }
}

/// Parses a markdown string into a Goal
fn parse_markdown(content: &str) -> Result<Goal> {
    let content = content.trim();

    if !content.starts_with("---") {
        anyhow::bail!("Missing frontmatter (must start with ---)");
    }

    let rest = &content[3..];
    let end_pos = rest
        .find("---")
        .ok_or_else(|| anyhow::anyhow!("Missing frontmatter end delimiter (---)"))?;

    let yaml_content = rest[..end_pos].trim();
    let body = rest[end_pos + 3..].trim();

    let fm: GoalFrontmatter =
        serde_yaml::from_str(yaml_content).context("Failed to parse frontmatter")?;

    Ok(fm.into_goal(body.to_string()))
}

/// Renders a goal to markdown
fn render_markdown(goal: &Goal) -> Result<String> {
    let frontmatter = GoalFrontmatter::from(goal);
    let yaml = serde_yaml::to_string(&frontmatter).context("Failed to serialize frontmatter")?;

    let mut content = String::new();
    content.push_str("---\n");
    content.push_str(&yaml);
    content.push_str("---\n\n");
    content.push_str(&goal.body);

    if !content.ends_with('\n') {
        content.push('\n');
    }

    Ok(content)
}
