//! Goal CLI commands

use anyhow::{bail, Result};
use clap::Subcommand;

use super::output::Output;
use crate::domain::{Goal, GoalId, GoalStatus};
use crate::storage::Project;

#[derive(Subcommand)]
pub enum GoalCommands {
    /// Add a goal
    Add {
        /// Goal title
        title: String,

        /// Markdown description of the goal
        #[arg(long)]
        body: Option<String>,
    },

    /// List goals
    List,

    /// Show goal details and its task chain
    Show {
        /// Goal ID
        id: String,
    },

    /// Mark a goal as achieved
    Done {
        /// Goal ID
        id: String,
    },

    /// Mark a goal as abandoned
    Abandon {
        /// Goal ID
        id: String,
    },
}

pub fn run(cmd: GoalCommands, output: &Output) -> Result<()> {
    match cmd {
        GoalCommands::Add { title, body } => add_goal(output, &title, body.as_deref()),
        GoalCommands::List => list_goals(output),
        GoalCommands::Show { id } => show_goal(output, &id),
        GoalCommands::Done { id } => set_status(output, &id, GoalStatus::Achieved),
        GoalCommands::Abandon { id } => set_status(output, &id, GoalStatus::Abandoned),
    }
}

fn add_goal(output: &Output, title: &str, body: Option<&str>) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.goal_store();

    let mut goal = Goal::new(title);
    if let Some(body) = body {
        goal.set_body(body);
    }
    store.save(&goal)?;

    if output.is_json() {
        output.data(&goal);
    } else {
        output.success(&format!("Added goal {} \"{}\"", goal.id, goal.title));
    }
    Ok(())
}

fn list_goals(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let listed = project.goal_store().list()?;

    if output.is_json() {
        let items: Vec<_> = listed
            .iter()
            .map(|(id, title, status)| {
                serde_json::json!({
                    "id": id.to_string(),
                    "title": title,
                    "status": status,
                })
            })
            .collect();
        output.data(&items);
        return Ok(());
    }

    if listed.is_empty() {
        output.success("No goals yet. Add one with 'replan goal add <title>'.");
        return Ok(());
    }

    for (id, title, status) in listed {
        output.row(&[&id.to_string(), &status.to_string(), &title]);
    }
    Ok(())
}

fn show_goal(output: &Output, id_str: &str) -> Result<()> {
    let project = Project::open_current()?;
    let goal_id: GoalId = id_str.parse()?;

    let Some(goal) = project.goal_store().get(&goal_id)? else {
        bail!("Goal not found: {}", goal_id);
    };

    let mut tasks = project.task_store().snapshot_for_goal(&goal_id)?;
    tasks.sort_by_key(|t| (t.start_date.is_none(), t.start_date, t.id.sequence()));

    if output.is_json() {
        output.data(&serde_json::json!({
            "goal": goal,
            "tasks": tasks,
        }));
        return Ok(());
    }

    output.success(&format!("{} \"{}\" ({})", goal.id, goal.title, goal.status));
    if !goal.body.is_empty() {
        output.blank();
        output.success(&goal.body);
    }

    if !tasks.is_empty() {
        output.blank();
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
    }
    Ok(())
}

fn set_status(output: &Output, id_str: &str, status: GoalStatus) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.goal_store();
    let goal_id: GoalId = id_str.parse()?;

    let Some(mut goal) = store.get(&goal_id)? else {
        bail!("Goal not found: {}", goal_id);
    };

    goal.set_status(status);
    store.save(&goal)?;

    output.success(&format!("Goal {} is now {}", goal.id, goal.status));
    Ok(())
}
