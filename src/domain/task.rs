//! Task domain model
//!
//! Tasks are the scheduled units of work within a goal. Each task is
//! either floating (its dates may shift to absorb changes elsewhere in
//! the chain) or anchored (its dates are a fixed commitment that only
//! a direct reschedule of that task may change).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::id::{GoalId, MilestoneId, TaskId};

/// Status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
}

impl TaskStatus {
    /// Returns true if this status represents completion
    pub fn is_complete(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }

    /// Returns true if this task is still part of the active plan
    pub fn is_pending(&self) -> bool {
        matches!(self, TaskStatus::Pending)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Completed => write!(f, "completed"),
        }
    }
}

/// A task within a goal's plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,

    /// Goal this task belongs to
    pub goal_id: GoalId,

    /// Milestone this task belongs to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<MilestoneId>,

    /// Human-readable title
    pub title: String,

    /// Scheduled start date (date-only, no time-of-day)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    /// Scheduled end date (inclusive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,

    /// Estimated effort in hours; derives a day span when explicit
    /// dates are absent (8 hours per day, rounded up)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_hours: Option<u32>,

    /// Anchored tasks are immovable barriers during cascades triggered
    /// by other tasks
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub anchored: bool,

    /// Current status
    pub status: TaskStatus,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,

    /// When the task was completed (if completed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a new floating, pending task with no dates
    pub fn new(id: TaskId, goal_id: GoalId, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            goal_id,
            milestone_id: None,
            title: title.into(),
            start_date: None,
            end_date: None,
            duration_hours: None,
            anchored: false,
            status: TaskStatus::Pending,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Returns true if the task has a defined position in the chain
    pub fn is_scheduled(&self) -> bool {
        self.start_date.is_some()
    }

    /// Sets the start and end dates
    pub fn set_dates(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        self.start_date = start;
        self.end_date = end;
        self.updated_at = Utc::now();
    }

    /// Sets the estimated effort in hours
    pub fn set_duration_hours(&mut self, hours: u32) {
        self.duration_hours = Some(hours);
        self.updated_at = Utc::now();
    }

    /// Sets the title
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.updated_at = Utc::now();
    }

    /// Assigns the task to a milestone
    pub fn set_milestone(&mut self, milestone_id: MilestoneId) {
        self.milestone_id = Some(milestone_id);
        self.updated_at = Utc::now();
    }

    /// Marks the task as an immovable commitment
    pub fn anchor(&mut self) {
        if !self.anchored {
            self.anchored = true;
            self.updated_at = Utc::now();
        }
    }

    /// Makes the task floating again
    pub fn release(&mut self) {
        if self.anchored {
            self.anchored = false;
            self.updated_at = Utc::now();
        }
    }

    /// Transitions to completed status
    pub fn complete(&mut self) {
        if !self.status.is_complete() {
            self.status = TaskStatus::Completed;
            let now = Utc::now();
            self.updated_at = now;
            self.completed_at = Some(now);
        }
    }

    /// Transitions back to pending status
    pub fn reopen(&mut self) {
        if self.status.is_complete() {
            self.status = TaskStatus::Pending;
            self.updated_at = Utc::now();
            self.completed_at = None;
        }
    }
}
