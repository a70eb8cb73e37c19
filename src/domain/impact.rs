//! Delete and reschedule impact calculators
//!
//! Both calculators are pure functions over a snapshot of a goal's
//! tasks plus an explicit `today`. They never mutate anything: they
//! return an [`ImpactReport`] describing the date changes a delete or
//! move would cause, and the caller decides whether to commit it.
//!
//! Conflicts are first-class outcomes, not errors. A report with
//! status [`ImpactStatus::RescheduleConflict`] still carries the fully
//! computed updates so the caller can apply it anyway; only
//! structurally invalid input (unknown task, a requested date before
//! the earliest valid one) is rejected with [`ImpactError`].

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use thiserror::Error;

use super::chain::GoalChain;
use super::id::{GoalId, TaskId};
use super::span::{effective_end, effective_start_end, is_past, overlap_days, span_days};
use super::task::Task;

#[derive(Debug, Error, PartialEq)]
pub enum ImpactError {
    #[error("Task {task} not found in goal {goal}")]
    TaskNotFound { goal: GoalId, task: TaskId },

    #[error("Requested start {requested} is before the earliest valid date {min_valid}")]
    DateBeforeMinimum {
        requested: NaiveDate,
        min_valid: NaiveDate,
    },
}

/// Outcome of an impact calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactStatus {
    /// Every computed date change is applicable
    Success,

    /// Deleting would pull at least one task before today
    DependencyConflict,

    /// Moving would land the chain on an anchored task's window, or
    /// carry tasks past one; the updates are still fully computed for
    /// a forced commit
    RescheduleConflict,
}

/// A single task's computed date change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateUpdate {
    pub task_id: TaskId,
    pub new_start: NaiveDate,
    pub new_end: NaiveDate,
}

/// Details of the anchored task blocking a reschedule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConflictInfo {
    /// Title of the anchored task the move collides with
    pub anchored_task_title: String,

    /// Days the worst-placed task would have to move to clear the
    /// anchored window again
    pub compression_needed_days: i64,
}

/// Non-mutating preview of what a delete or reschedule would change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactReport {
    pub status: ImpactStatus,

    /// Date changes in chain order; only tasks whose dates actually
    /// change appear here
    pub updates: Vec<DateUpdate>,

    /// Days freed by the deletion (delete previews only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_saved_days: Option<i64>,

    /// Anchored tasks that blocked or bounded the cascade
    pub anchored_barriers: Vec<TaskId>,

    /// Conflict details (reschedule previews only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict: Option<ConflictInfo>,

    /// Human-readable summary of the computed facts
    pub message: String,
}

impl ImpactReport {
    /// Returns true if the report can be committed without forcing
    pub fn is_success(&self) -> bool {
        self.status == ImpactStatus::Success
    }
}

/// Shifts a task's window by moving its start, preserving its span
fn shifted_update(task: &Task, new_start: NaiveDate) -> DateUpdate {
    // Scheduled tasks always resolve an effective end
    let end = effective_end(task).unwrap_or(new_start);
    let shift = new_start - task.start_date.unwrap_or(new_start);

    DateUpdate {
        task_id: task.id.clone(),
        new_start,
        new_end: end + shift,
    }
}

/// Computes the date changes caused by deleting a task
///
/// Floating tasks downstream of the deletion are pulled earlier by up
/// to the deleted task's span. An anchored task in the downstream set
/// is a hard wall: tasks behind it are pulled at most to the day after
/// the wall ends, and a task already flush against its wall stays put.
pub fn delete_impact(
    tasks: &[Task],
    goal_id: &GoalId,
    task_id: &TaskId,
    today: NaiveDate,
) -> Result<ImpactReport, ImpactError> {
    let chain = GoalChain::from_tasks(goal_id.clone(), tasks);
    let deleted = chain.get(task_id).ok_or_else(|| ImpactError::TaskNotFound {
        goal: goal_id.clone(),
        task: task_id.clone(),
    })?;

    let time_saved = span_days(deleted);
    let downstream = chain.downstream_of(deleted);

    let anchored_barriers: Vec<TaskId> = downstream
        .iter()
        .filter(|t| t.anchored)
        .map(|t| t.id.clone())
        .collect();

    let mut updates = Vec::new();

    for task in downstream.iter().filter(|t| !t.anchored) {
        // downstream_of only yields scheduled tasks
        let Some(start) = task.start_date else {
            continue;
        };

        let new_start = match chain.nearest_preceding_anchor(start, &downstream) {
            Some(barrier) => {
                let barrier_end = match effective_end(barrier) {
                    Some(end) => end,
                    None => continue,
                };

                // Free days strictly between the wall and this task
                let available = (start - barrier_end).num_days() - 1;
                if available <= 0 {
                    // Already flush against the wall
                    continue;
                }

                // Pull to just past the wall, but never further than
                // the deletion actually freed
                (barrier_end + Duration::days(1)).max(start - Duration::days(time_saved))
            }
            None => start - Duration::days(time_saved),
        };

        if new_start < start {
            updates.push(shifted_update(task, new_start));
        }
    }

    let offending: Vec<&DateUpdate> = updates
        .iter()
        .filter(|u| is_past(u.new_start, today))
        .collect();

    let (status, message) = if offending.is_empty() {
        let status = ImpactStatus::Success;
        let message = if updates.is_empty() {
            format!(
                "Deleting \"{}\" frees {} day(s); no downstream tasks move",
                deleted.title, time_saved
            )
        } else {
            format!(
                "Deleting \"{}\" frees {} day(s); {} task(s) pulled earlier",
                deleted.title,
                time_saved,
                updates.len()
            )
        };
        (status, message)
    } else {
        let names: Vec<String> = offending
            .iter()
            .filter_map(|u| chain.get(&u.task_id))
            .map(|t| format!("\"{}\"", t.title))
            .collect();
        (
            ImpactStatus::DependencyConflict,
            format!(
                "Deleting \"{}\" would pull {} task(s) before today: {}",
                deleted.title,
                names.len(),
                names.join(", ")
            ),
        )
    };

    Ok(ImpactReport {
        status,
        updates,
        time_saved_days: Some(time_saved),
        anchored_barriers,
        conflict: None,
        message,
    })
}

/// Computes the date changes caused by moving a task to a new start
///
/// Moving an anchored task changes only that task. Moving a floating
/// task shifts it and every floating task after it by the same signed
/// delta, preserving relative spacing; anchored tasks downstream stay
/// put, and if the shifted tail would land on one or cross it in
/// either direction, the report carries a [`ConflictInfo`] alongside
/// the fully computed updates.
pub fn reschedule_impact(
    tasks: &[Task],
    goal_id: &GoalId,
    task_id: &TaskId,
    new_start: NaiveDate,
    today: NaiveDate,
) -> Result<ImpactReport, ImpactError> {
    let chain = GoalChain::from_tasks(goal_id.clone(), tasks);
    let task = chain.get(task_id).ok_or_else(|| ImpactError::TaskNotFound {
        goal: goal_id.clone(),
        task: task_id.clone(),
    })?;

    // An undated task has no chain position: moving it just assigns
    // dates, bounded only by today
    let Some(current_start) = task.start_date else {
        if new_start < today {
            return Err(ImpactError::DateBeforeMinimum {
                requested: new_start,
                min_valid: today,
            });
        }

        let new_end = new_start + Duration::days(span_days(task) - 1);
        return Ok(ImpactReport {
            status: ImpactStatus::Success,
            updates: vec![DateUpdate {
                task_id: task.id.clone(),
                new_start,
                new_end,
            }],
            time_saved_days: None,
            anchored_barriers: Vec::new(),
            conflict: None,
            message: format!(
                "\"{}\" scheduled for {} (was unscheduled)",
                task.title, new_start
            ),
        });
    };

    let min_valid = if task.anchored {
        today
    } else {
        match chain.predecessor_end(task) {
            Some(end) => today.max(end + Duration::days(1)),
            None => today,
        }
    };

    if new_start < min_valid {
        return Err(ImpactError::DateBeforeMinimum {
            requested: new_start,
            min_valid,
        });
    }

    // Anchored tasks move alone; their dates are only ever changed by
    // a direct reschedule like this one
    if task.anchored {
        let update = shifted_update(task, new_start);
        let message = format!("Anchored \"{}\" moves to {}; no cascade", task.title, new_start);
        return Ok(ImpactReport {
            status: ImpactStatus::Success,
            updates: vec![update],
            time_saved_days: None,
            anchored_barriers: Vec::new(),
            conflict: None,
            message,
        });
    }

    let delta = (new_start - current_start).num_days();
    let downstream = chain.downstream_of(task);

    let anchored_barriers: Vec<TaskId> = downstream
        .iter()
        .filter(|t| t.anchored)
        .map(|t| t.id.clone())
        .collect();

    if delta == 0 {
        return Ok(ImpactReport {
            status: ImpactStatus::Success,
            updates: Vec::new(),
            time_saved_days: None,
            anchored_barriers,
            conflict: None,
            message: format!("\"{}\" already starts on {}", task.title, new_start),
        });
    }

    // The whole floating tail moves together, preserving spacing
    let mut updates = vec![shifted_update(task, new_start)];
    for t in downstream.iter().filter(|t| !t.anchored) {
        if let Some(start) = t.start_date {
            updates.push(shifted_update(t, start + Duration::days(delta)));
        }
    }

    // Chain order against every downstream anchor must survive the
    // shift: a task scheduled before an anchor must stay clear of it,
    // and one scheduled after must not be pulled back onto or past it.
    // The earliest violated anchor is reported, with the largest day
    // count needed to restore the order.
    let mut conflict = None;
    for anchor in downstream.iter().filter(|t| t.anchored) {
        let Some((a_start, a_end)) = effective_start_end(anchor) else {
            continue;
        };

        let mut violation: i64 = 0;
        for update in &updates {
            let Some(original) = chain.get(&update.task_id) else {
                continue;
            };

            let days = if update.task_id == *task_id {
                // The directly moved task only conflicts by occupying
                // the anchored window; its position is the user's call
                overlap_days(update.new_start, update.new_end, a_start, a_end)
            } else if original.start_date.is_some_and(|s| s > a_end) {
                // Was after the anchor: must not land on or before it
                (a_end - update.new_start).num_days() + 1
            } else {
                // Was before the anchor: must stay entirely before it
                (update.new_end - a_start).num_days() + 1
            };
            violation = violation.max(days);
        }

        if violation > 0 {
            conflict = Some(ConflictInfo {
                anchored_task_title: anchor.title.clone(),
                compression_needed_days: violation,
            });
            break;
        }
    }

    let moved_count = updates.len() - 1;
    let (status, message) = match &conflict {
        Some(info) => (
            ImpactStatus::RescheduleConflict,
            format!(
                "Moving \"{}\" to {} conflicts with anchored \"{}\" by {} day(s)",
                task.title, new_start, info.anchored_task_title, info.compression_needed_days
            ),
        ),
        None => (
            ImpactStatus::Success,
            if moved_count == 0 {
                format!("\"{}\" moves to {}", task.title, new_start)
            } else {
                format!(
                    "\"{}\" moves to {}; {} downstream task(s) shift by {} day(s)",
                    task.title,
                    new_start,
                    moved_count,
                    delta.abs()
                )
            },
        ),
    };

    Ok(ImpactReport {
        status,
        updates,
        time_saved_days: None,
        anchored_barriers,
        conflict,
        message,
    })
}
