use clap::{Args, Parser, Subcommand};

use crate::model::task::Priority;
use crate::ops::filter::{SortKey, StatusFilter};

#[derive(Parser)]
#[command(name = "doable", about = concat!("[·] doable v", env!("CARGO_PKG_VERSION"), " - your tasks, tracked locally"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress notification output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use a different data directory
    #[arg(short = 'C', long = "data-dir", global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a task
    Add(AddArgs),
    /// List tasks (filtered and sorted)
    List(ListArgs),
    /// Show task details
    Show(ShowArgs),
    /// Toggle a task's completion
    Done(DoneArgs),
    /// Edit task fields
    Edit(EditArgs),
    /// Delete a task
    Delete(DeleteArgs),
    /// Log time spent on a task
    Time(TimeArgs),
    /// Move a task directly before another task
    Mv(MvArgs),
    /// Apply an operation to several tasks at once
    Bulk(BulkCmd),
    /// List categories in use
    Categories,
    /// Show task counters
    Stats,
    /// Show completion and time analytics
    Analytics,
    /// List templates, or create a task from one
    Templates(TemplatesCmd),
    /// Export tasks to a file
    Export(ExportArgs),
    /// Import tasks from a JSON file
    Import(ImportArgs),
    /// Announce overdue tasks (once each)
    Remind(RemindArgs),
    /// Show or set the display theme
    Theme(ThemeArgs),
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    pub title: String,
    /// Longer description
    #[arg(short, long, default_value = "")]
    pub description: String,
    /// Priority (low, medium, high)
    #[arg(short, long, default_value = "medium")]
    pub priority: Priority,
    /// Category label
    #[arg(short, long, default_value = "")]
    pub category: String,
    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<chrono::NaiveDate>,
    /// Tag (repeatable)
    #[arg(short, long = "tag", action = clap::ArgAction::Append)]
    pub tags: Vec<String>,
    /// Attribution
    #[arg(long, default_value = "You")]
    pub by: String,
}

#[derive(Args)]
pub struct DoneArgs {
    /// Task ID
    pub id: String,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task ID
    pub id: String,
    /// New title
    #[arg(short, long)]
    pub title: Option<String>,
    /// New description
    #[arg(short, long)]
    pub description: Option<String>,
    /// New priority (low, medium, high)
    #[arg(short, long)]
    pub priority: Option<Priority>,
    /// New category
    #[arg(short, long)]
    pub category: Option<String>,
    /// New due date (YYYY-MM-DD); pass "none" to clear
    #[arg(long)]
    pub due: Option<String>,
    /// Replace tags (repeatable)
    #[arg(long = "tag", action = clap::ArgAction::Append)]
    pub tags: Vec<String>,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Task ID
    pub id: String,
}

#[derive(Args)]
pub struct TimeArgs {
    /// Task ID
    pub id: String,
    /// Minutes to add
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    pub minutes: u64,
}

#[derive(Args)]
pub struct MvArgs {
    /// Task to move
    pub id: String,
    /// Task it should land directly before
    pub before: String,
}

#[derive(Args)]
pub struct BulkCmd {
    #[command(subcommand)]
    pub action: BulkAction,
}

#[derive(Subcommand)]
pub enum BulkAction {
    /// Mark the given tasks completed
    Complete(BulkTarget),
    /// Mark the given tasks not completed
    Uncomplete(BulkTarget),
    /// Delete the given tasks
    Delete(BulkTarget),
}

#[derive(Args)]
pub struct BulkTarget {
    /// Task IDs (omit when using --all)
    pub ids: Vec<String>,
    /// Target every task matching the filter flags below
    #[arg(long, conflicts_with = "ids")]
    pub all: bool,
    /// Search term (with --all)
    #[arg(short, long, requires = "all")]
    pub search: Option<String>,
    /// Status filter (with --all; all, completed, pending)
    #[arg(long, default_value = "all", requires = "all")]
    pub status: StatusFilter,
    /// Priority filter (with --all)
    #[arg(long, requires = "all")]
    pub priority: Option<Priority>,
    /// Category filter (with --all; exact match)
    #[arg(long, requires = "all")]
    pub category: Option<String>,
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ListArgs {
    /// Search term (matches title, description, tags)
    #[arg(short, long)]
    pub search: Option<String>,
    /// Status filter (all, completed, pending)
    #[arg(long, default_value = "all")]
    pub status: StatusFilter,
    /// Priority filter (low, medium, high)
    #[arg(long)]
    pub priority: Option<Priority>,
    /// Category filter (exact match)
    #[arg(long)]
    pub category: Option<String>,
    /// Sort key (created, due, priority, time)
    #[arg(long, default_value = "created")]
    pub sort: SortKey,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Task ID
    pub id: String,
}

#[derive(Args)]
pub struct TemplatesCmd {
    /// Template name to instantiate (if omitted, lists templates)
    pub name: Option<String>,
}

// ---------------------------------------------------------------------------
// Data exchange and maintenance
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ExportArgs {
    /// Output format (json, csv)
    #[arg(long, default_value = "json")]
    pub format: String,
    /// Output file (default: tasks-<date>.<ext> in the current directory)
    #[arg(short, long)]
    pub out: Option<String>,
}

#[derive(Args)]
pub struct ImportArgs {
    /// JSON file to import
    pub file: String,
}

#[derive(Args)]
pub struct RemindArgs {
    /// Keep running, re-checking on an interval
    #[arg(long)]
    pub watch: bool,
    /// Minutes between checks in watch mode
    #[arg(long, default_value_t = 60)]
    pub every: u64,
}

#[derive(Args)]
pub struct ThemeArgs {
    /// Mode to set (dark, light); omit to show the current mode
    pub mode: Option<String>,
}
