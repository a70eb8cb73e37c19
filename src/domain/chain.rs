//! Goal chain model
//!
//! The chain is the date-ordered view of one goal's pending tasks that
//! both impact calculators work over. It is always rebuilt from the
//! current task set at the start of a calculation and never persisted;
//! staleness between a preview and its commit is caught by the commit
//! applier instead.
//!
//! Tasks without a start date have no position in the chain: they are
//! kept in the view (sorted last) but are neither barriers nor
//! shiftable during a cascade.

use chrono::NaiveDate;

use super::id::{GoalId, TaskId};
use super::span::effective_end;
use super::task::Task;

/// Date-ordered view of a goal's pending tasks
#[derive(Debug, Clone)]
pub struct GoalChain {
    goal_id: GoalId,
    tasks: Vec<Task>,
}

impl GoalChain {
    /// Builds the chain for a goal from a snapshot of tasks
    ///
    /// Filters to the goal's pending tasks and sorts by start date,
    /// with undated tasks last and creation sequence as a tiebreak.
    pub fn from_tasks<'a>(goal_id: GoalId, tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut tasks: Vec<Task> = tasks
            .into_iter()
            .filter(|t| t.goal_id == goal_id && t.status.is_pending())
            .cloned()
            .collect();

        tasks.sort_by(|a, b| match (a.start_date, b.start_date) {
            (Some(x), Some(y)) => x.cmp(&y).then(a.id.sequence().cmp(&b.id.sequence())),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.id.sequence().cmp(&b.id.sequence()),
        });

        Self { goal_id, tasks }
    }

    /// Returns the goal this chain belongs to
    pub fn goal_id(&self) -> &GoalId {
        &self.goal_id
    }

    /// Returns all tasks in chain order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Looks up a task by ID
    pub fn get(&self, task_id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == task_id)
    }

    /// Returns true if the chain contains the task
    pub fn contains(&self, task_id: &TaskId) -> bool {
        self.get(task_id).is_some()
    }

    /// Returns the number of tasks in the chain
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true if the chain is empty
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Returns the tasks downstream of `task` in chain order
    ///
    /// Downstream means: scheduled, and starting strictly later than
    /// `task` (same-day ties broken by creation sequence). Undated
    /// tasks are never part of the downstream set, and a task with no
    /// start date has no downstream.
    pub fn downstream_of(&self, task: &Task) -> Vec<&Task> {
        let Some(start) = task.start_date else {
            return Vec::new();
        };

        self.tasks
            .iter()
            .filter(|t| t.id != task.id)
            .filter(|t| match t.start_date {
                Some(other) => {
                    other > start || (other == start && t.id.sequence() > task.id.sequence())
                }
                None => false,
            })
            .collect()
    }

    /// Finds the anchored task in `within` with the latest start date
    /// that is still strictly earlier than `before`
    pub fn nearest_preceding_anchor<'a>(
        &self,
        before: NaiveDate,
        within: &[&'a Task],
    ) -> Option<&'a Task> {
        within
            .iter()
            .filter(|t| t.anchored)
            .filter(|t| t.start_date.is_some_and(|s| s < before))
            .max_by_key(|t| t.start_date)
            .copied()
    }

    /// Returns the latest effective end date among tasks that start
    /// strictly earlier than `task` (its immediate predecessor bound)
    pub fn predecessor_end(&self, task: &Task) -> Option<NaiveDate> {
        let start = task.start_date?;

        self.tasks
            .iter()
            .filter(|t| t.id != task.id)
            .filter(|t| t.start_date.is_some_and(|s| s < start))
            .filter_map(effective_end)
            .max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn goal() -> GoalId {
        GoalId::new("Test goal", Utc::now())
    }

    fn task(goal: &GoalId, seq: u32, start: Option<u32>, end: Option<u32>) -> Task {
        let mut t = Task::new(goal.task_id(seq), goal.clone(), format!("Task {}", seq));
        t.set_dates(start.map(day), end.map(day));
        t
    }

    #[test]
    fn chain_orders_by_start_date() {
        let g = goal();
        let tasks = vec![
            task(&g, 1, Some(10), Some(12)),
            task(&g, 2, Some(1), Some(2)),
            task(&g, 3, Some(5), Some(6)),
        ];

        let chain = GoalChain::from_tasks(g, &tasks);
        let seqs: Vec<u32> = chain.tasks().iter().map(|t| t.id.sequence()).collect();
        assert_eq!(seqs, vec![2, 3, 1]);
    }

    #[test]
    fn undated_tasks_sort_last() {
        let g = goal();
        let tasks = vec![
            task(&g, 1, None, None),
            task(&g, 2, Some(3), Some(4)),
        ];

        let chain = GoalChain::from_tasks(g, &tasks);
        assert_eq!(chain.tasks()[0].id.sequence(), 2);
        assert_eq!(chain.tasks()[1].id.sequence(), 1);
    }

    #[test]
    fn completed_and_foreign_tasks_excluded() {
        let g = goal();
        let other = GoalId::new("Other goal", Utc::now());

        let mut done = task(&g, 1, Some(1), Some(2));
        done.complete();
        let foreign = task(&other, 1, Some(1), Some(2));
        let live = task(&g, 2, Some(3), Some(4));

        let chain = GoalChain::from_tasks(g, [&done, &foreign, &live]);
        assert_eq!(chain.len(), 1);
        assert!(chain.contains(&live.id));
    }

    #[test]
    fn downstream_is_strictly_later() {
        let g = goal();
        let tasks = vec![
            task(&g, 1, Some(1), Some(2)),
            task(&g, 2, Some(3), Some(4)),
            task(&g, 3, Some(5), Some(6)),
            task(&g, 4, None, None),
        ];

        let chain = GoalChain::from_tasks(g, &tasks);
        let first = chain.get(&tasks[0].id).unwrap();

        let downstream = chain.downstream_of(first);
        let seqs: Vec<u32> = downstream.iter().map(|t| t.id.sequence()).collect();
        assert_eq!(seqs, vec![2, 3]); // undated task 4 excluded

        let last = chain.get(&tasks[2].id).unwrap();
        assert!(chain.downstream_of(last).is_empty());
    }

    #[test]
    fn undated_task_has_no_downstream() {
        let g = goal();
        let tasks = vec![task(&g, 1, None, None), task(&g, 2, Some(3), Some(4))];

        let chain = GoalChain::from_tasks(g, &tasks);
        let undated = chain.get(&tasks[0].id).unwrap();
        assert!(chain.downstream_of(undated).is_empty());
    }

    #[test]
    fn nearest_preceding_anchor_picks_latest() {
        let g = goal();
        let mut a1 = task(&g, 1, Some(2), Some(3));
        a1.anchor();
        let mut a2 = task(&g, 2, Some(5), Some(6));
        a2.anchor();
        let floating = task(&g, 3, Some(4), Some(4));

        let tasks = vec![a1.clone(), a2.clone(), floating];
        let chain = GoalChain::from_tasks(g, &tasks);
        let within: Vec<&Task> = chain.tasks().iter().collect();

        // Before day 8: both anchors precede, a2 is nearest
        let found = chain.nearest_preceding_anchor(day(8), &within).unwrap();
        assert_eq!(found.id, a2.id);

        // Before day 4: only a1 precedes
        let found = chain.nearest_preceding_anchor(day(4), &within).unwrap();
        assert_eq!(found.id, a1.id);

        // Before day 2: nothing precedes
        assert!(chain.nearest_preceding_anchor(day(2), &within).is_none());
    }

    #[test]
    fn predecessor_end_uses_latest_effective_end() {
        let g = goal();
        let tasks = vec![
            task(&g, 1, Some(1), Some(9)), // long task ending latest
            task(&g, 2, Some(2), Some(3)),
            task(&g, 3, Some(5), Some(6)),
        ];

        let chain = GoalChain::from_tasks(g, &tasks);
        let last = chain.get(&tasks[2].id).unwrap();

        assert_eq!(chain.predecessor_end(last), Some(day(9)));

        let first = chain.get(&tasks[0].id).unwrap();
        assert_eq!(chain.predecessor_end(first), None);
    }
}
