//! Goal domain model
//!
//! Goals are the top-level planning documents that own a chain of
//! tasks. They are stored as markdown files with YAML frontmatter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::GoalId;

/// Status of a goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    /// Actively being worked on
    #[default]
    Active,

    /// Successfully completed
    Achieved,

    /// No longer being pursued
    Abandoned,
}

impl GoalStatus {
    /// Returns true if this status represents a closed goal
    pub fn is_closed(&self) -> bool {
        matches!(self, GoalStatus::Achieved | GoalStatus::Abandoned)
    }
}

impl std::fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GoalStatus::Active => write!(f, "active"),
            GoalStatus::Achieved => write!(f, "achieved"),
            GoalStatus::Abandoned => write!(f, "abandoned"),
        }
    }
}

impl std::str::FromStr for GoalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" | "open" => Ok(GoalStatus::Active),
            "achieved" | "done" | "complete" | "completed" => Ok(GoalStatus::Achieved),
            "abandoned" | "cancelled" | "canceled" => Ok(GoalStatus::Abandoned),
            _ => Err(format!("Unknown goal status: {}", s)),
        }
    }
}

/// A goal document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// Unique identifier
    pub id: GoalId,

    /// Human-readable title
    pub title: String,

    /// Current status
    pub status: GoalStatus,

    /// When the goal was created
    pub created_at: DateTime<Utc>,

    /// When the goal was last updated
    pub updated_at: DateTime<Utc>,

    /// Markdown body content (excluding frontmatter)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub body: String,
}

impl Goal {
    /// Creates a new active goal with the given title
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        let now = Utc::now();
        let id = GoalId::new(&title, now);

        Self {
            id,
            title,
            status: GoalStatus::Active,
            created_at: now,
            updated_at: now,
            body: String::new(),
        }
    }

    /// Transitions to a new status
    pub fn set_status(&mut self, status: GoalStatus) {
        if self.status != status {
            self.status = status;
            self.updated_at = Utc::now();
        }
    }

    /// Sets the body content
    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
        self.updated_at = Utc::now();
    }

    /// Returns true if this goal is closed (achieved or abandoned)
    pub fn is_closed(&self) -> bool {
        self.status.is_closed()
    }
}

/// Represents the frontmatter section of a goal file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalFrontmatter {
    pub id: GoalId,
    pub title: String,
    pub status: GoalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Goal> for GoalFrontmatter {
    fn from(goal: &Goal) -> Self {
        Self {
            id: goal.id.clone(),
            title: goal.title.clone(),
            status: goal.status,
            created_at: goal.created_at,
            updated_at: goal.updated_at,
        }
    }
}

impl GoalFrontmatter {
    /// Converts to a Goal with the given body
    pub fn into_goal(self, body: String) -> Goal {
        Goal {
            id: self.id,
            title: self.title,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_goal_is_active() {
        let goal = Goal::new("Learn Spanish");
        assert_eq!(goal.status, GoalStatus::Active);
        assert!(!goal.is_closed());
    }

    #[test]
    fn goal_id_is_generated_from_title() {
        let goal = Goal::new("Learn Spanish");
        assert!(goal.id.to_string().starts_with("g-"));
    }

    #[test]
    fn status_transitions() {
        let mut goal = Goal::new("Test");

        goal.set_status(GoalStatus::Achieved);
        assert!(goal.is_closed());

        goal.set_status(GoalStatus::Active);
        assert!(!goal.is_closed());
    }

    #[test]
    fn status_parsing_accepts_aliases() {
        assert_eq!("done".parse::<GoalStatus>().unwrap(), GoalStatus::Achieved);
        assert_eq!(
            "cancelled".parse::<GoalStatus>().unwrap(),
            GoalStatus::Abandoned
        );
        assert!("nonsense".parse::<GoalStatus>().is_err());
    }

    #[test]
    fn frontmatter_roundtrip() {
        let mut goal = Goal::new("Test goal");
        goal.set_body("Why this matters.");

        let fm = GoalFrontmatter::from(&goal);
        let back = fm.into_goal(goal.body.clone());

        assert_eq!(goal, back);
    }
}
