//! # Storage Layer
//!
//! Persistence layer for Replan with git-friendly file formats.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Goals | Markdown + YAML frontmatter | `.replan/goals/{id}.md` |
//! | Tasks | JSONL (one JSON per line) | `.replan/tasks.jsonl` |
//! | Config | TOML | `.replan/config.toml` |
//! | Index | JSONL (auto-regenerated) | `.replan/goals/index.jsonl` |
//!
//! ## Concurrency Safety
//!
//! - [`TaskStore`] uses file locking (`fs2`) for concurrent access
//! - [`GoalStore`] uses mtime-based index invalidation
//! - All writes are atomic (temp file + rename)
//! - Impact-report commits hold a sidecar lock for the whole
//!   read-validate-write cycle, so two commits against the same
//!   store are serialized
//!
//! ## Key Types
//!
//! - [`Project`] - Entry point for accessing a Replan project
//! - [`TaskStore`] - Read/write tasks as JSONL, apply commits
//! - [`GoalStore`] - Read/write goals as markdown files
//! - [`Config`] - Project and global configuration

mod jsonl;
mod markdown;
mod commit;
mod config;
mod project;

pub use jsonl::TaskStore;
pub use markdown::GoalStore;
pub use commit::{CommitError, CommitRequest, DEFAULT_COMMIT_TIMEOUT};
pub use config::{Config, ConfigError, DefaultFormat, GlobalConfig};
pub use project::{Project, ProjectError};
