//! End-to-end scenarios for the living-plan engine
//!
//! Each scenario builds a goal chain in memory, previews a delete or
//! move, and checks the computed report; the commit scenarios then
//! apply reports against a real temp store and verify atomicity.

use chrono::{Duration, NaiveDate, Utc};
use tempfile::TempDir;

use replan_cli::domain::{
    delete_impact, reschedule_impact, GoalId, ImpactError, ImpactStatus, Task,
};
use replan_cli::storage::{CommitError, CommitRequest, TaskStore, DEFAULT_COMMIT_TIMEOUT};

/// Day 0 of every scenario
fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 7, 1).unwrap()
}

fn day(offset: i64) -> NaiveDate {
    base() + Duration::days(offset)
}

fn goal() -> GoalId {
    GoalId::new("Scenario goal", Utc::now())
}

fn floating(goal: &GoalId, seq: u32, start: i64, end: i64) -> Task {
    let mut t = Task::new(goal.task_id(seq), goal.clone(), format!("T{}", seq));
    t.set_dates(Some(day(start)), Some(day(end)));
    t
}

fn anchored(goal: &GoalId, seq: u32, start: i64, end: i64) -> Task {
    let mut t = floating(goal, seq, start, end);
    t.set_title(format!("A{}", seq));
    t.anchor();
    t
}

#[test]
fn scenario_a_delete_shifts_whole_floating_chain() {
    // T1[0-2], T2[3-5], T3[6-8], all floating; delete T1
    let g = goal();
    let tasks = vec![
        floating(&g, 1, 0, 2),
        floating(&g, 2, 3, 5),
        floating(&g, 3, 6, 8),
    ];

    let report = delete_impact(&tasks, &g, &tasks[0].id, day(0)).unwrap();

    assert_eq!(report.status, ImpactStatus::Success);
    assert_eq!(report.time_saved_days, Some(3));
    assert_eq!(report.updates.len(), 2);

    assert_eq!(report.updates[0].task_id, tasks[1].id);
    assert_eq!(report.updates[0].new_start, day(0));
    assert_eq!(report.updates[0].new_end, day(2));

    assert_eq!(report.updates[1].task_id, tasks[2].id);
    assert_eq!(report.updates[1].new_start, day(3));
    assert_eq!(report.updates[1].new_end, day(5));
}

#[test]
fn scenario_b_anchored_wall_holds_the_chain() {
    // T1[0-2] floating, A[3-5] anchored, T2[6-8] floating; delete T1
    let g = goal();
    let tasks = vec![
        floating(&g, 1, 0, 2),
        anchored(&g, 2, 3, 5),
        floating(&g, 3, 6, 8),
    ];

    let report = delete_impact(&tasks, &g, &tasks[0].id, day(0)).unwrap();

    assert_eq!(report.status, ImpactStatus::Success);
    assert_eq!(report.time_saved_days, Some(3));

    // The anchor never moves and T2 is flush against it (zero free
    // days between day 5 and day 6), so nothing changes at all
    assert!(report.updates.is_empty());
    assert_eq!(report.anchored_barriers, vec![tasks[1].id.clone()]);
}

#[test]
fn scenario_c_reschedule_before_min_valid_is_rejected() {
    // T2's predecessor ends day 2, so day 1 is invalid for T2
    let g = goal();
    let tasks = vec![floating(&g, 1, 0, 2), floating(&g, 2, 5, 7)];

    let err = reschedule_impact(&tasks, &g, &tasks[1].id, day(1), day(0)).unwrap_err();

    assert_eq!(
        err,
        ImpactError::DateBeforeMinimum {
            requested: day(1),
            min_valid: day(3),
        }
    );
}

#[test]
fn scenario_d_tail_overlapping_anchor_by_two_days() {
    // T1[0-1], T2[2-3] floating, A[6-9] anchored. Moving T1 to day 4
    // shifts T2 to [6-7], overlapping A's window by 2 days.
    let g = goal();
    let tasks = vec![
        floating(&g, 1, 0, 1),
        floating(&g, 2, 2, 3),
        anchored(&g, 3, 6, 9),
    ];

    let report = reschedule_impact(&tasks, &g, &tasks[0].id, day(4), day(0)).unwrap();

    assert_eq!(report.status, ImpactStatus::RescheduleConflict);

    let info = report.conflict.as_ref().expect("conflict info");
    assert_eq!(info.anchored_task_title, "A3");
    assert_eq!(info.compression_needed_days, 2);

    // Updates fully populated so the caller can reschedule anyway
    assert_eq!(report.updates.len(), 2);
    assert_eq!(report.updates[0].new_start, day(4));
    assert_eq!(report.updates[0].new_end, day(5));
    assert_eq!(report.updates[1].new_start, day(6));
    assert_eq!(report.updates[1].new_end, day(7));

    // The anchor itself is never part of the update set
    assert!(report.updates.iter().all(|u| u.task_id != tasks[2].id));
}

#[test]
fn pulling_a_task_earlier_cannot_silently_cross_an_anchor() {
    // T1[20-21] floating, A[30-31] anchored, T2[40-41] floating.
    // Moving T1 to day 0 would drag T2 to [20-21], in front of the
    // anchor it used to follow; that must surface as a conflict, not
    // a committable success.
    let g = goal();
    let tasks = vec![
        floating(&g, 1, 20, 21),
        anchored(&g, 2, 30, 31),
        floating(&g, 3, 40, 41),
    ];

    let report = reschedule_impact(&tasks, &g, &tasks[0].id, day(0), day(0)).unwrap();

    assert_eq!(report.status, ImpactStatus::RescheduleConflict);
    let info = report.conflict.as_ref().expect("conflict info");
    assert_eq!(info.anchored_task_title, "A2");
    // T2 lands at day 20 and needs 12 days to get past day 31 again
    assert_eq!(info.compression_needed_days, 12);

    // Still fully computed for a forced commit; the anchor stays out
    assert_eq!(report.updates.len(), 2);
    assert_eq!(report.updates[1].new_start, day(20));
    assert!(report.updates.iter().all(|u| u.task_id != tasks[1].id));
}

#[test]
fn delete_preview_commit_roundtrip() {
    let dir = TempDir::new().unwrap();
    let store = TaskStore::new(dir.path().join("tasks.jsonl"));

    let g = goal();
    let tasks = vec![
        floating(&g, 1, 0, 2),
        floating(&g, 2, 3, 5),
        floating(&g, 3, 6, 8),
    ];
    for t in &tasks {
        store.append(t).unwrap();
    }

    let snapshot = store.snapshot_for_goal(&g).unwrap();
    let report = delete_impact(&snapshot, &g, &tasks[0].id, day(0)).unwrap();
    assert!(report.is_success());

    let request = CommitRequest {
        goal_id: &g,
        updates: &report.updates,
        delete: Some(&tasks[0].id),
    };
    store.commit(&request, DEFAULT_COMMIT_TIMEOUT).unwrap();

    let after = store.read_all().unwrap();
    assert_eq!(after.len(), 2);
    assert!(!after.contains_key(&tasks[0].id));
    assert_eq!(after.get(&tasks[1].id).unwrap().start_date, Some(day(0)));
    assert_eq!(after.get(&tasks[2].id).unwrap().start_date, Some(day(3)));
}

#[test]
fn forced_reschedule_commit_applies_conflicted_updates_unchanged() {
    let dir = TempDir::new().unwrap();
    let store = TaskStore::new(dir.path().join("tasks.jsonl"));

    let g = goal();
    let tasks = vec![
        floating(&g, 1, 0, 1),
        floating(&g, 2, 2, 3),
        anchored(&g, 3, 6, 9),
    ];
    for t in &tasks {
        store.append(t).unwrap();
    }

    let snapshot = store.snapshot_for_goal(&g).unwrap();
    let report = reschedule_impact(&snapshot, &g, &tasks[0].id, day(4), day(0)).unwrap();
    assert_eq!(report.status, ImpactStatus::RescheduleConflict);

    // "Reschedule anyway": the conflicted report commits as computed
    let request = CommitRequest {
        goal_id: &g,
        updates: &report.updates,
        delete: None,
    };
    store.commit(&request, DEFAULT_COMMIT_TIMEOUT).unwrap();

    let after = store.read_all().unwrap();
    assert_eq!(after.get(&tasks[0].id).unwrap().start_date, Some(day(4)));
    assert_eq!(after.get(&tasks[1].id).unwrap().start_date, Some(day(6)));
    // The anchor kept its dates
    assert_eq!(after.get(&tasks[2].id).unwrap().start_date, Some(day(6)));
    assert_eq!(after.get(&tasks[2].id).unwrap().end_date, Some(day(9)));
}

#[test]
fn stale_preview_leaves_every_task_untouched() {
    let dir = TempDir::new().unwrap();
    let store = TaskStore::new(dir.path().join("tasks.jsonl"));

    let g = goal();
    let tasks = vec![
        floating(&g, 1, 0, 2),
        floating(&g, 2, 3, 5),
        floating(&g, 3, 6, 8),
    ];
    for t in &tasks {
        store.append(t).unwrap();
    }

    let snapshot = store.snapshot_for_goal(&g).unwrap();
    let report = delete_impact(&snapshot, &g, &tasks[0].id, day(0)).unwrap();

    // Concurrent edit between preview and commit: T3 gets completed
    let mut t3 = tasks[2].clone();
    t3.complete();
    store.update(&t3).unwrap();

    let request = CommitRequest {
        goal_id: &g,
        updates: &report.updates,
        delete: Some(&tasks[0].id),
    };
    let err = store.commit(&request, DEFAULT_COMMIT_TIMEOUT).unwrap_err();
    assert!(matches!(err, CommitError::StalePreview(_)));

    // All-or-nothing: nothing moved, nothing was deleted
    let after = store.read_all().unwrap();
    assert_eq!(after.len(), 3);
    assert_eq!(after.get(&tasks[0].id).unwrap().start_date, Some(day(0)));
    assert_eq!(after.get(&tasks[1].id).unwrap().start_date, Some(day(3)));
}

#[test]
fn previews_are_idempotent() {
    let g = goal();
    let tasks = vec![
        floating(&g, 1, 0, 2),
        floating(&g, 2, 3, 5),
    ];

    let first = delete_impact(&tasks, &g, &tasks[0].id, day(0)).unwrap();
    let second = delete_impact(&tasks, &g, &tasks[0].id, day(0)).unwrap();

    assert_eq!(first, second);
}
