//! Domain models and the living-plan engine
//!
//! Contains the core business logic without any I/O concerns. The
//! impact calculators in [`impact`] are pure functions over an
//! in-memory snapshot of a goal's tasks plus an explicit clock.

mod id;
mod task;
mod goal;
mod span;
mod chain;
mod impact;

pub use id::{GoalId, MilestoneId, TaskId, IdError};
pub use task::{Task, TaskStatus};
pub use goal::{Goal, GoalStatus, GoalFrontmatter};
pub use span::{effective_end, effective_start_end, overlap_days, span_days, is_past};
pub use chain::GoalChain;
pub use impact::{
    delete_impact, reschedule_impact, ConflictInfo, DateUpdate, ImpactError, ImpactReport,
    ImpactStatus,
};
