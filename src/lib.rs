//! Replan CLI - A local-first goal planner with a living-plan engine
//!
//! Replan organizes work into goals, each holding a date-ordered chain
//! of tasks. Deleting or moving a task previews a cascade of date
//! changes across the rest of the chain; anchored tasks act as
//! immovable barriers. Previews are pure, commits are atomic.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{Goal, GoalId, GoalStatus, Task, TaskId, TaskStatus};
pub use domain::{ImpactReport, ImpactStatus};
