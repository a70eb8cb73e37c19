//! Atomic application of impact reports
//!
//! A commit takes the date updates from a previewed [`ImpactReport`]
//! (plus, for deletions, the task being removed) and applies them as
//! one all-or-nothing batch. The whole read-validate-write cycle runs
//! under an exclusive sidecar lock so commits against the same store
//! are serialized; the write itself is the store's temp-file + rename,
//! so a failure at any point leaves the store untouched.
//!
//! Because previews are computed against a snapshot, every target is
//! re-validated here: a task that vanished, changed goals, or was
//! completed between preview and commit fails the whole batch with
//! [`CommitError::StalePreview`].
//!
//! [`ImpactReport`]: crate::domain::ImpactReport

use std::fs::OpenOptions;
use std::time::{Duration, Instant};

use anyhow::Context;
use fs2::FileExt;
use thiserror::Error;

use crate::domain::{DateUpdate, GoalId, TaskId};

use super::jsonl::TaskStore;

/// Default time to wait for the store lock before giving up
pub const DEFAULT_COMMIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Interval between lock acquisition attempts
const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Error)]
pub enum CommitError {
    #[error("Preview is stale ({0}); recompute the impact and try again")]
    StalePreview(String),

    #[error("Timed out waiting for the task store lock")]
    Timeout,

    #[error("Commit failed: {0}")]
    Persistence(#[from] anyhow::Error),
}

/// An approved set of changes to apply atomically
#[derive(Debug, Clone)]
pub struct CommitRequest<'a> {
    /// Goal the preview was computed for
    pub goal_id: &'a GoalId,

    /// Per-task date changes from the impact report
    pub updates: &'a [DateUpdate],

    /// Task to delete, for delete-impact commits
    pub delete: Option<&'a TaskId>,
}

impl TaskStore {
    /// Applies a commit request as a single atomic batch
    ///
    /// Either every update (and the optional deletion) is applied, or
    /// the store is left exactly as it was. Returns
    /// [`CommitError::Timeout`] if the store lock cannot be acquired
    /// before the timeout expires; nothing has been written in that
    /// case either.
    pub fn commit(&self, request: &CommitRequest, timeout: Duration) -> Result<(), CommitError> {
        if let Some(parent) = self.path().parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let lock_path = self.lock_path();
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file: {}", lock_path.display()))?;

        // Bounded acquisition: a timed-out commit writes nothing
        let deadline = Instant::now() + timeout;
        loop {
            match lock_file.try_lock_exclusive() {
                Ok(()) => break,
                Err(_) if Instant::now() < deadline => {
                    std::thread::sleep(LOCK_RETRY_INTERVAL);
                }
                Err(_) => return Err(CommitError::Timeout),
            }
        }

        // Lock is released when lock_file drops, even on early return
        let result = self.commit_locked(request);
        let _ = fs2::FileExt::unlock(&lock_file);
        result
    }

    /// Validates and applies the batch; caller holds the store lock
    fn commit_locked(&self, request: &CommitRequest) -> Result<(), CommitError> {
        let mut tasks = self.read_all()?;

        // Re-validate every target before touching anything
        if let Some(delete_id) = request.delete {
            let target = tasks
                .get(delete_id)
                .ok_or_else(|| CommitError::StalePreview(format!("task {} no longer exists", delete_id)))?;

            if &target.goal_id != request.goal_id {
                return Err(CommitError::StalePreview(format!(
                    "task {} moved to another goal",
                    delete_id
                )));
            }
            if target.status.is_complete() {
                return Err(CommitError::StalePreview(format!(
                    "task {} was completed",
                    delete_id
                )));
            }
        }

        for update in request.updates {
            let target = tasks.get(&update.task_id).ok_or_else(|| {
                CommitError::StalePreview(format!("task {} no longer exists", update.task_id))
            })?;

            if &target.goal_id != request.goal_id {
                return Err(CommitError::StalePreview(format!(
                    "task {} moved to another goal",
                    update.task_id
                )));
            }
            if target.status.is_complete() {
                return Err(CommitError::StalePreview(format!(
                    "task {} was completed",
                    update.task_id
                )));
            }
        }

        // Apply in memory, then write once
        if let Some(delete_id) = request.delete {
            tasks.remove(delete_id);
        }

        for update in request.updates {
            if let Some(task) = tasks.get_mut(&update.task_id) {
                task.set_dates(Some(update.new_start), Some(update.new_end));
            }
        }

        self.write_all(&tasks)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Task;
    use chrono::{NaiveDate, Utc};
    use tempfile::TempDir;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, d).unwrap()
    }

    fn setup() -> (TempDir, TaskStore, GoalId, Vec<Task>) {
        let dir = TempDir::new().unwrap();
        let store = TaskStore::new(dir.path().join("tasks.jsonl"));
        let goal = GoalId::new("Test goal", Utc::now());

        let mut tasks = Vec::new();
        for seq in 1..=3u32 {
            let mut t = Task::new(goal.task_id(seq), goal.clone(), format!("Task {}", seq));
            let start = seq * 3;
            t.set_dates(Some(day(start)), Some(day(start + 1)));
            store.append(&t).unwrap();
            tasks.push(t);
        }

        (dir, store, goal, tasks)
    }

    #[test]
    fn commit_applies_all_updates() {
        let (_dir, store, goal, tasks) = setup();

        let updates = vec![
            DateUpdate {
                task_id: tasks[1].id.clone(),
                new_start: day(1),
                new_end: day(2),
            },
            DateUpdate {
                task_id: tasks[2].id.clone(),
                new_start: day(4),
                new_end: day(5),
            },
        ];

        let request = CommitRequest {
            goal_id: &goal,
            updates: &updates,
            delete: Some(&tasks[0].id),
        };

        store.commit(&request, DEFAULT_COMMIT_TIMEOUT).unwrap();

        let loaded = store.read_all().unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(!loaded.contains_key(&tasks[0].id));
        assert_eq!(loaded.get(&tasks[1].id).unwrap().start_date, Some(day(1)));
        assert_eq!(loaded.get(&tasks[2].id).unwrap().end_date, Some(day(5)));
    }

    #[test]
    fn stale_preview_when_target_missing_changes_nothing() {
        let (_dir, store, goal, tasks) = setup();

        let updates = vec![
            DateUpdate {
                task_id: tasks[1].id.clone(),
                new_start: day(1),
                new_end: day(2),
            },
            DateUpdate {
                task_id: goal.task_id(99), // never existed
                new_start: day(4),
                new_end: day(5),
            },
        ];

        let request = CommitRequest {
            goal_id: &goal,
            updates: &updates,
            delete: None,
        };

        let err = store.commit(&request, DEFAULT_COMMIT_TIMEOUT).unwrap_err();
        assert!(matches!(err, CommitError::StalePreview(_)));

        // First update must not have been applied either
        let loaded = store.read_all().unwrap();
        assert_eq!(
            loaded.get(&tasks[1].id).unwrap().start_date,
            tasks[1].start_date
        );
    }

    #[test]
    fn stale_preview_when_target_completed() {
        let (_dir, store, goal, mut tasks) = setup();

        tasks[1].complete();
        store.update(&tasks[1]).unwrap();

        let updates = vec![DateUpdate {
            task_id: tasks[1].id.clone(),
            new_start: day(1),
            new_end: day(2),
        }];

        let request = CommitRequest {
            goal_id: &goal,
            updates: &updates,
            delete: None,
        };

        let err = store.commit(&request, DEFAULT_COMMIT_TIMEOUT).unwrap_err();
        assert!(matches!(err, CommitError::StalePreview(_)));
    }

    #[test]
    fn stale_preview_when_delete_target_vanished() {
        let (_dir, store, goal, tasks) = setup();

        store.remove(&tasks[0].id).unwrap();

        let request = CommitRequest {
            goal_id: &goal,
            updates: &[],
            delete: Some(&tasks[0].id),
        };

        let err = store.commit(&request, DEFAULT_COMMIT_TIMEOUT).unwrap_err();
        assert!(matches!(err, CommitError::StalePreview(_)));
    }

    #[test]
    fn commit_times_out_when_lock_is_held() {
        let (_dir, store, goal, tasks) = setup();

        // Hold the commit lock from "another process"
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(store.lock_path())
            .unwrap();
        lock_file.lock_exclusive().unwrap();

        let updates = vec![DateUpdate {
            task_id: tasks[1].id.clone(),
            new_start: day(1),
            new_end: day(2),
        }];

        let request = CommitRequest {
            goal_id: &goal,
            updates: &updates,
            delete: None,
        };

        let err = store
            .commit(&request, Duration::from_millis(50))
            .unwrap_err();
        assert!(matches!(err, CommitError::Timeout));

        // Nothing was written
        let loaded = store.read_all().unwrap();
        assert_eq!(
            loaded.get(&tasks[1].id).unwrap().start_date,
            tasks[1].start_date
        );
    }

    #[test]
    fn empty_commit_is_a_noop() {
        let (_dir, store, goal, _tasks) = setup();

        let request = CommitRequest {
            goal_id: &goal,
            updates: &[],
            delete: None,
        };

        store.commit(&request, DEFAULT_COMMIT_TIMEOUT).unwrap();
        assert_eq!(store.read_all().unwrap().len(), 3);
    }
}
