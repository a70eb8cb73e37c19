//! Main CLI application structure

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{goal, task};
use crate::storage::{Config, Project};

#[derive(Parser)]
#[command(name = "replan")]
#[command(author, version, about = "Local-first goal planning with cascade-aware rescheduling")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the configured global format)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new replan project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Manage goals
    #[command(subcommand)]
    Goal(goal::GoalCommands),

    /// Manage tasks and preview plan changes
    #[command(subcommand)]
    Task(task::TaskCommands),
}

/// Parses arguments and runs the selected command
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let format = match cli.format {
        Some(format) => format,
        None => Config::load_global()?.default_format.into(),
    };
    let output = Output::new(format, cli.verbose);

    match cli.command {
        Commands::Init { path } => init_project(&output, &path),
        Commands::Goal(cmd) => goal::run(cmd, &output),
        Commands::Task(cmd) => task::run(cmd, &output),
    }
}

fn init_project(output: &Output, path: &str) -> Result<()> {
    let project = Project::init(path)?;
    output.success(&format!(
        "Initialized replan project at {}",
        project.root().display()
    ));
    Ok(())
}
