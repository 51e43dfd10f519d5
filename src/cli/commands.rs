use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tf", about = concat!("taskflow v", env!("CARGO_PKG_VERSION"), " - nested task lists you can drag around"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Operate on the material library instead of the todo list
    #[arg(long, global = true)]
    pub library: bool,

    /// Run against a different directory
    #[arg(short = 'C', long = "data-dir", global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create .taskflow/ in the current directory
    Init,
    /// Show the task tree
    List(ListArgs),
    /// Show one task
    Show(IdArg),
    /// Add a task
    Add(AddArgs),
    /// Edit task fields
    Edit(EditArgs),
    /// Delete a task and its subtasks
    Rm(RmArgs),
    /// Move a task after another task, or under it with --child
    Mv(MvArgs),
    /// Show a task's subtasks
    Expand(IdArg),
    /// Hide a task's subtasks
    Collapse(IdArg),
    /// Mark a task and its subtasks done
    Done(DoneArgs),
    /// Mark a task and its subtasks not done
    Undone(IdArg),
    /// Set the focused task
    Focus(IdArg),
    /// Show or replace the tag catalog
    Tags(TagsArgs),
    /// Show or change preferences
    Prefs(PrefsArgs),
    /// Copy a library task (and subtasks) into the todo list
    Promote(IdArg),
    /// Clear all data
    Reset(ResetArgs),
    /// Validate list integrity
    Check,
    /// View the recovery log
    Recovery(RecoveryArgs),
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ListArgs {
    /// Include collapsed subtasks
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct IdArg {
    /// Task ID
    pub id: u64,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    pub title: String,
    /// Add as a subtask of this task
    #[arg(long)]
    pub parent: Option<u64>,
    /// Insert right after this task instead of at the bottom
    #[arg(long)]
    pub after: Option<u64>,
    /// Priority (high, medium, low)
    #[arg(long)]
    pub priority: Option<String>,
    /// Tag (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task ID
    pub id: u64,
    /// New title
    #[arg(long)]
    pub title: Option<String>,
    /// Priority (high, medium, low)
    #[arg(long)]
    pub priority: Option<String>,
    /// Replace tags (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    /// Remove all tags
    #[arg(long, conflicts_with = "tags")]
    pub clear_tags: bool,
    /// Remark text
    #[arg(long)]
    pub remark: Option<String>,
    /// Remove the remark
    #[arg(long, conflicts_with = "remark")]
    pub clear_remark: bool,
    /// Repeat type (recurring, one-shot)
    #[arg(long)]
    pub repeat: Option<String>,
}

#[derive(Args)]
pub struct RmArgs {
    /// Task ID
    pub id: u64,
    /// Skip the confirmation check
    #[arg(long, short)]
    pub yes: bool,
}

#[derive(Args)]
pub struct MvArgs {
    /// Task to move
    pub source: u64,
    /// Task to drop onto
    pub target: u64,
    /// Make SOURCE the first child of TARGET instead of its next sibling
    #[arg(long)]
    pub child: bool,
}

#[derive(Args)]
pub struct DoneArgs {
    /// Task ID
    pub id: u64,
    /// Complete even when subtasks are still open
    #[arg(long, short)]
    pub yes: bool,
}

#[derive(Args)]
pub struct TagsArgs {
    /// New catalog (omit to show the current one)
    pub tags: Vec<String>,
}

#[derive(Args)]
pub struct PrefsArgs {
    /// Ask before deleting
    #[arg(long, value_name = "BOOL")]
    pub confirm_delete: Option<bool>,
    /// Ask before completing a task with open subtasks
    #[arg(long, value_name = "BOOL")]
    pub confirm_subtasks: Option<bool>,
    /// Priority for new tasks
    #[arg(long)]
    pub default_priority: Option<String>,
    /// Tag for new tasks
    #[arg(long)]
    pub default_tag: Option<String>,
    /// Remove the default tag
    #[arg(long, conflicts_with = "default_tag")]
    pub clear_default_tag: bool,
}

#[derive(Args)]
pub struct ResetArgs {
    /// Confirm clearing both lists
    #[arg(long, short)]
    pub yes: bool,
}

// ---------------------------------------------------------------------------
// Recovery log
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct RecoveryArgs {
    /// Maximum number of entries to show (default: 10)
    #[arg(long)]
    pub limit: Option<usize>,
    /// Print the absolute path to the recovery log
    #[arg(long)]
    pub path: bool,
}
