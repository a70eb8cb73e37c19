//! Hierarchical ID system for goals, milestones, and tasks
//!
//! ID Format:
//! - Goal IDs: `g-{7-char-hash}` (e.g., `g-7f2b4c1`)
//! - Milestone IDs: `m-{7-char-hash}` (e.g., `m-9d3e5f2`)
//! - Task IDs: `{goal-id}.{sequence}` (e.g., `g-7f2b4c1.3`)
//!
//! Hash is derived from title + creation timestamp, ensuring uniqueness.
//! Same title at different times produces different IDs (by design).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid goal ID format: expected 'g-{{7-char-hash}}', got '{0}'")]
    InvalidGoalId(String),

    #[error("Invalid milestone ID format: expected 'm-{{7-char-hash}}', got '{0}'")]
    InvalidMilestoneId(String),

    #[error("Invalid task ID format: expected '{{goal-id}}.{{sequence}}', got '{0}'")]
    InvalidTaskId(String),

    #[error("Invalid sequence number: {0}")]
    InvalidSequence(String),
}

/// Generates a 7-character hash from title and timestamp
fn generate_hash(title: &str, timestamp: DateTime<Utc>) -> String {
    let input = format!("{}{}", title, timestamp.timestamp_nanos_opt().unwrap_or(0));
    let hash = blake3::hash(input.as_bytes());
    let hex = hash.to_hex();
    hex[..7].to_string()
}

fn valid_hash(hash: &str) -> bool {
    hash.len() == 7 && hash.chars().all(|c| c.is_ascii_hexdigit())
}

/// Goal ID in the format `g-{7-char-hash}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GoalId {
    hash: String,
}

impl GoalId {
    /// Creates a new goal ID from title and timestamp
    pub fn new(title: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            hash: generate_hash(title, timestamp),
        }
    }

    /// Returns the hash portion of the ID
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Creates a task ID for this goal with the given sequence number
    pub fn task_id(&self, sequence: u32) -> TaskId {
        TaskId {
            goal_hash: self.hash.clone(),
            sequence,
        }
    }
}

impl fmt::Display for GoalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g-{}", self.hash)
    }
}

impl FromStr for GoalId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let hash = s
            .strip_prefix("g-")
            .ok_or_else(|| IdError::InvalidGoalId(s.to_string()))?;

        if !valid_hash(hash) {
            return Err(IdError::InvalidGoalId(s.to_string()));
        }

        Ok(Self {
            hash: hash.to_string(),
        })
    }
}

impl TryFrom<String> for GoalId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GoalId> for String {
    fn from(id: GoalId) -> Self {
        id.to_string()
    }
}

/// Milestone ID in the format `m-{7-char-hash}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MilestoneId {
    hash: String,
}

impl MilestoneId {
    /// Creates a new milestone ID from title and timestamp
    pub fn new(title: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            hash: generate_hash(title, timestamp),
        }
    }

    /// Returns the hash portion of the ID
    pub fn hash(&self) -> &str {
        &self.hash
    }
}

impl fmt::Display for MilestoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m-{}", self.hash)
    }
}

impl FromStr for MilestoneId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let hash = s
            .strip_prefix("m-")
            .ok_or_else(|| IdError::InvalidMilestoneId(s.to_string()))?;

        if !valid_hash(hash) {
            return Err(IdError::InvalidMilestoneId(s.to_string()));
        }

        Ok(Self {
            hash: hash.to_string(),
        })
    }
}

impl TryFrom<String> for MilestoneId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MilestoneId> for String {
    fn from(id: MilestoneId) -> Self {
        id.to_string()
    }
}

/// Task ID in the format `{goal-id}.{sequence}` (e.g., `g-7f2b4c1.3`)
///
/// Tasks always belong to a goal; the sequence is assigned at creation
/// and never reused within a goal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskId {
    /// Hash portion of the owning goal's ID
    goal_hash: String,
    /// Sequence number within the goal
    sequence: u32,
}

impl TaskId {
    /// Creates a task ID under the given goal
    pub fn new(goal: &GoalId, sequence: u32) -> Self {
        Self {
            goal_hash: goal.hash.clone(),
            sequence,
        }
    }

    /// Returns the owning goal's ID
    pub fn goal_id(&self) -> GoalId {
        GoalId {
            hash: self.goal_hash.clone(),
        }
    }

    /// Returns the sequence number within the goal
    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g-{}.{}", self.goal_hash, self.sequence)
    }
}

impl FromStr for TaskId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (goal_part, seq_part) = s
            .rsplit_once('.')
            .ok_or_else(|| IdError::InvalidTaskId(s.to_string()))?;

        let goal: GoalId = goal_part
            .parse()
            .map_err(|_| IdError::InvalidTaskId(s.to_string()))?;

        let sequence: u32 = seq_part
            .parse()
            .map_err(|_| IdError::InvalidSequence(seq_part.to_string()))?;

        Ok(Self {
            goal_hash: goal.hash,
            sequence,
        })
    }
}

impl TryFrom<String> for TaskId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TaskId> for String {
    fn from(id: TaskId) -> Self {
        id.to_string()
    }
}
