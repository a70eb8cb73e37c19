//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Project management | `init` |
//! | Goal | Goal lifecycle | `goal add`, `goal list`, `goal show` |
//! | Task | Plan editing | `task add`, `task done`, `task anchor` |
//! | Plan | Cascade previews | `task delete`, `task move` |
//!
//! `task delete` and `task move` print an impact preview by default;
//! `--commit` applies a successful preview atomically, and `task move
//! --force` additionally applies a reschedule-conflict preview
//! unchanged ("reschedule anyway"). `--today` overrides the clock so
//! previews are reproducible.
//!
//! ## Output Formats
//!
//! All commands support `--format`:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON (impact reports serialize whole)
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod goal;
mod task;

pub use app::{Cli, Commands, run};
pub use output::{Output, OutputFormat};
