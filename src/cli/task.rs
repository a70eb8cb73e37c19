//! Task CLI commands
//!
//! `delete` and `move` are preview-first: they print the impact report
//! computed by the living-plan engine and only touch the store when
//! `--commit` is given. A reschedule conflict can be applied anyway
//! with `--force`; a delete conflict cannot be committed at all.

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::Subcommand;

use super::output::Output;
use crate::domain::{
    delete_impact, reschedule_impact, GoalId, ImpactReport, ImpactStatus, MilestoneId, Task,
    TaskId,
};
use crate::storage::{CommitRequest, Project};

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add a task to a goal
    Add {
        /// Goal ID
        goal: String,

        /// Task title
        title: String,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// End date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Estimated effort in hours (8 hours per day)
        #[arg(long)]
        hours: Option<u32>,

        /// Mark the task as an immovable commitment
        #[arg(long)]
        anchored: bool,

        /// Milestone ID to attach the task to
        #[arg(long)]
        milestone: Option<String>,
    },

    /// List tasks (all, or for a goal)
    List {
        /// Goal ID (omit for all tasks)
        goal: Option<String>,
    },

    /// Show task details
    Show {
        /// Task ID
        id: String,
    },

    /// Mark task as completed
    Done {
        /// Task ID
        id: String,
    },

    /// Reopen a completed task
    Reopen {
        /// Task ID
        id: String,
    },

    /// Anchor a task (its dates become an immovable barrier)
    Anchor {
        /// Task ID
        id: String,
    },

    /// Release an anchored task back to floating
    Release {
        /// Task ID
        id: String,
    },

    /// Preview (and optionally commit) deleting a task
    Delete {
        /// Task ID
        id: String,

        /// Apply the previewed changes atomically
        #[arg(long)]
        commit: bool,

        /// Override the current date (YYYY-MM-DD) for the preview
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Preview (and optionally commit) moving a task to a new start date
    Move {
        /// Task ID
        id: String,

        /// New start date (YYYY-MM-DD)
        date: NaiveDate,

        /// Apply the previewed changes atomically
        #[arg(long)]
        commit: bool,

        /// Commit even if the move overlaps an anchored task
        #[arg(long)]
        force: bool,

        /// Override the current date (YYYY-MM-DD) for the preview
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

pub fn run(cmd: TaskCommands, output: &Output) -> Result<()> {
    match cmd {
        TaskCommands::Add {
            goal,
            title,
            start,
            end,
            hours,
            anchored,
            milestone,
        } => add_task(output, &goal, &title, start, end, hours, anchored, milestone.as_deref()),
        TaskCommands::List { goal } => list_tasks(output, goal.as_deref()),
        TaskCommands::Show { id } => show_task(output, &id),
        TaskCommands::Done { id } => complete_task(output, &id),
        TaskCommands::Reopen { id } => reopen_task(output, &id),
        TaskCommands::Anchor { id } => set_anchored(output, &id, true),
        TaskCommands::Release { id } => set_anchored(output, &id, false),
        TaskCommands::Delete { id, commit, today } => {
            delete_task(output, &id, commit, resolve_today(today))
        }
        TaskCommands::Move {
            id,
            date,
            commit,
            force,
            today,
        } => move_task(output, &id, date, commit, force, resolve_today(today)),
    }
}

/// The explicit clock: system time is read only here, at the CLI edge
fn resolve_today(explicit: Option<NaiveDate>) -> NaiveDate {
    explicit.unwrap_or_else(|| chrono::Local::now().date_naive())
}

#[allow(clippy::too_many_arguments)]
fn add_task(
    output: &Output,
    goal_str: &str,
    title: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    hours: Option<u32>,
    anchored: bool,
    milestone: Option<&str>,
) -> Result<()> {
    if let (Some(s), Some(e)) = (start, end) {
        if e < s {
            bail!("End date {} is before start date {}", e, s);
        }
    }
    if end.is_some() && start.is_none() {
        bail!("An end date requires a start date");
    }
    if let Some(h) = hours {
        if h == 0 {
            bail!("Hours must be positive");
        }
    }

    let project = Project::open_current()?;
    let goal_id: GoalId = goal_str.parse()?;

    if project.goal_store().get(&goal_id)?.is_none() {
        bail!("Goal not found: {}", goal_id);
    }

    let store = project.task_store();
    let sequence = store.next_sequence(&goal_id)?;

    let mut task = Task::new(goal_id.task_id(sequence), goal_id, title);
    task.set_dates(start, end);
    if let Some(h) = hours {
        task.set_duration_hours(h);
    }
    if anchored {
        task.anchor();
    }
    if let Some(m) = milestone {
        let milestone_id: MilestoneId = m.parse()?;
        task.set_milestone(milestone_id);
    }

    store.append(&task)?;

    if output.is_json() {
        output.data(&task);
    } else {
        output.success(&format!("Added task {} \"{}\"", task.id, task.title));
    }
    Ok(())
}

fn list_tasks(output: &Output, goal_str: Option<&str>) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.task_store();

    let mut tasks: Vec<Task> = match goal_str {
        Some(g) => {
            let goal_id: GoalId = g.parse()?;
            store.snapshot_for_goal(&goal_id)?
        }
        None => store.read_all()?.into_values().collect(),
    };

    tasks.sort_by_key(|t| (t.start_date.is_none(), t.start_date, t.id.sequence()));

    if output.is_json() {
        output.data(&tasks);
        return Ok(());
    }

    for task in &tasks {
        let dates = match (task.start_date, task.end_date) {
            (Some(s), Some(e)) => format!("{} .. {}", s, e),
            (Some(s), None) => format!("{} ..", s),
            _ => "unscheduled".to_string(),
        };
        let marker = if task.anchored { "[anchored]" } else { "" };
        output.row(&[
            &task.id.to_string(),
            &task.status.to_string(),
            &dates,
            &task.title,
            marker,
        ]);
    }
    Ok(())
}

fn show_task(output: &Output, id_str: &str) -> Result<()> {
    let (_, _, task) = load_task(id_str)?;
    output.data(&task);
    Ok(())
}

fn complete_task(output: &Output, id_str: &str) -> Result<()> {
    let (project, _, mut task) = load_task(id_str)?;
    task.complete();
    project.task_store().update(&task)?;
    output.success(&format!("Completed {}", task.id));
    Ok(())
}

fn reopen_task(output: &Output, id_str: &str) -> Result<()> {
    let (project, _, mut task) = load_task(id_str)?;
    task.reopen();
    project.task_store().update(&task)?;
    output.success(&format!("Reopened {}", task.id));
    Ok(())
}

fn set_anchored(output: &Output, id_str: &str, anchored: bool) -> Result<()> {
    let (project, _, mut task) = load_task(id_str)?;
    if anchored {
        task.anchor();
    } else {
        task.release();
    }
    project.task_store().update(&task)?;
    output.success(&format!(
        "{} is now {}",
        task.id,
        if anchored { "anchored" } else { "floating" }
    ));
    Ok(())
}

fn delete_task(output: &Output, id_str: &str, commit: bool, today: NaiveDate) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.task_store();
    let task_id: TaskId = id_str.parse()?;
    let goal_id = task_id.goal_id();

    let snapshot = store.snapshot_for_goal(&goal_id)?;
    output.verbose(&format!(
        "computing delete impact over {} task(s) in {}",
        snapshot.len(),
        goal_id
    ));
    let report = delete_impact(&snapshot, &goal_id, &task_id, today)?;

    print_report(output, &report, &snapshot);

    if !commit {
        if !output.is_json() {
            output.blank();
            output.success("Preview only. Re-run with --commit to apply.");
        }
        return Ok(());
    }

    if !report.is_success() {
        bail!("Refusing to commit a {} preview: {}", status_label(report.status), report.message);
    }

    let request = CommitRequest {
        goal_id: &goal_id,
        updates: &report.updates,
        delete: Some(&task_id),
    };
    store.commit(&request, project.config().commit_timeout())?;

    output.success(&format!(
        "Deleted {}; {} task(s) rescheduled",
        task_id,
        report.updates.len()
    ));
    Ok(())
}

fn move_task(
    output: &Output,
    id_str: &str,
    date: NaiveDate,
    commit: bool,
    force: bool,
    today: NaiveDate,
) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.task_store();
    let task_id: TaskId = id_str.parse()?;
    let goal_id = task_id.goal_id();

    let snapshot = store.snapshot_for_goal(&goal_id)?;
    output.verbose(&format!(
        "computing reschedule impact over {} task(s) in {}",
        snapshot.len(),
        goal_id
    ));
    let report = reschedule_impact(&snapshot, &goal_id, &task_id, date, today)?;

    print_report(output, &report, &snapshot);

    if !commit {
        if !output.is_json() {
            output.blank();
            output.success("Preview only. Re-run with --commit to apply.");
        }
        return Ok(());
    }

    let committable = report.is_success()
        || (report.status == ImpactStatus::RescheduleConflict && force);

    if !committable {
        bail!(
            "Refusing to commit a {} preview: {} (use --force to reschedule anyway)",
            status_label(report.status),
            report.message
        );
    }

    let request = CommitRequest {
        goal_id: &goal_id,
        updates: &report.updates,
        delete: None,
    };
    store.commit(&request, project.config().commit_timeout())?;

    output.success(&format!(
        "Moved {}; {} task(s) rescheduled",
        task_id,
        report.updates.len()
    ));
    Ok(())
}

fn status_label(status: ImpactStatus) -> &'static str {
    match status {
        ImpactStatus::Success => "success",
        ImpactStatus::DependencyConflict => "dependency-conflict",
        ImpactStatus::RescheduleConflict => "reschedule-conflict",
    }
}

/// Renders an impact report; JSON mode emits it whole
fn print_report(output: &Output, report: &ImpactReport, snapshot: &[Task]) {
    if output.is_json() {
        output.data(report);
        return;
    }

    output.success(&report.message);

    if !report.updates.is_empty() {
        output.blank();
        for update in &report.updates {
            let title = snapshot
                .iter()
                .find(|t| t.id == update.task_id)
                .map(|t| t.title.as_str())
                .unwrap_or("?");
            output.row(&[
                &update.task_id.to_string(),
                title,
                &format!("-> {} .. {}", update.new_start, update.new_end),
            ]);
        }
    }

    if !report.anchored_barriers.is_empty() {
        output.blank();
        for id in &report.anchored_barriers {
            let title = snapshot
                .iter()
                .find(|t| &t.id == id)
                .map(|t| t.title.as_str())
                .unwrap_or("?");
            output.row(&[&id.to_string(), title, "(anchored, unchanged)"]);
        }
    }
}

fn load_task(id_str: &str) -> Result<(Project, GoalId, Task)> {
    let project = Project::open_current()?;
    let task_id: TaskId = id_str.parse()?;
    let goal_id = task_id.goal_id();

    let tasks = project.task_store().read_for_goal(&goal_id)?;
    let task = tasks
        .get(&task_id)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Task not found: {}", task_id))?;

    Ok((project, goal_id, task))
}
