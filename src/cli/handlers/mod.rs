mod init;
pub use init::cmd_init;

use std::path::PathBuf;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io::{self, ConfigError, Workspace};
use crate::io::document_io::{self, Document};
use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry};
use crate::model::list::{ListKind, PreferencesPatch, TaskList};
use crate::model::task::{Priority, RepeatType, Task, TaskId, TaskPatch, dedup_tags};
use crate::ops::task_ops::{self, InsertPosition, MoveEdge, TaskError};
use crate::ops::{check, nav};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Everything a command needs: the located workspace, the loaded document,
/// and which list the command targets.
struct Context {
    workspace: Workspace,
    doc: Document,
    kind: ListKind,
    json: bool,
}

impl Context {
    fn load(
        data_dir: Option<&str>,
        library: bool,
        json: bool,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let start = resolve_start(data_dir)?;
        let workspace = config_io::open_workspace(&start)?;
        let doc = document_io::read_document(&workspace.data_dir, &workspace.document_path())?;
        let kind = if library {
            ListKind::Library
        } else {
            ListKind::Todo
        };
        Ok(Context {
            workspace,
            doc,
            kind,
            json,
        })
    }

    fn list(&self) -> &TaskList {
        self.doc.list(self.kind)
    }

    fn list_mut(&mut self) -> &mut TaskList {
        self.doc.list_mut(self.kind)
    }

    fn save(&self) -> Result<(), document_io::DocumentError> {
        document_io::write_document(&self.workspace.document_path(), &self.doc)
    }

    /// Look up a task in either collection of the active list
    fn task(&self, id: TaskId) -> Result<&Task, TaskError> {
        self.list().task(id).ok_or(TaskError::NotFound(id))
    }
}

/// Resolve the -C flag, or the current directory
pub fn resolve_start(data_dir: Option<&str>) -> Result<PathBuf, ConfigError> {
    match data_dir {
        Some(dir) => std::fs::canonicalize(dir).map_err(|e| ConfigError::ReadError {
            path: PathBuf::from(dir),
            source: e,
        }),
        None => Ok(std::env::current_dir()?),
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let Some(command) = cli.command else {
        return Err("no command given (try `tf --help`)".into());
    };
    if let Commands::Init = command {
        return cmd_init(cli.data_dir.as_deref());
    }

    let mut ctx = Context::load(cli.data_dir.as_deref(), cli.library, cli.json)?;

    match command {
        // Handled above
        Commands::Init => Ok(()),

        // Read commands
        Commands::List(args) => cmd_list(&ctx, args),
        Commands::Show(args) => cmd_show(&ctx, args),
        Commands::Check => cmd_check(&ctx),
        Commands::Recovery(args) => cmd_recovery(&ctx, args),

        // Write commands
        Commands::Add(args) => cmd_add(&mut ctx, args),
        Commands::Edit(args) => cmd_edit(&mut ctx, args),
        Commands::Rm(args) => cmd_rm(&mut ctx, args),
        Commands::Mv(args) => cmd_mv(&mut ctx, args),
        Commands::Expand(args) => cmd_expand(&mut ctx, args.id, true),
        Commands::Collapse(args) => cmd_expand(&mut ctx, args.id, false),
        Commands::Done(args) => cmd_done(&mut ctx, args),
        Commands::Undone(args) => cmd_undone(&mut ctx, args),
        Commands::Focus(args) => cmd_focus(&mut ctx, args),
        Commands::Tags(args) => cmd_tags(&mut ctx, args),
        Commands::Prefs(args) => cmd_prefs(&mut ctx, args),
        Commands::Promote(args) => cmd_promote(&mut ctx, args),
        Commands::Reset(args) => cmd_reset(&mut ctx, args),
    }
}

fn parse_priority(s: &str) -> Result<Priority, String> {
    Priority::parse(s)
        .ok_or_else(|| format!("unknown priority '{}' (expected: high, medium, low)", s))
}

fn parse_repeat(s: &str) -> Result<RepeatType, String> {
    RepeatType::parse(s)
        .ok_or_else(|| format!("unknown repeat type '{}' (expected: recurring, one-shot)", s))
}

fn print_ids(json: bool, ids: &[TaskId]) -> CmdResult {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&IdsJson { ids: ids.to_vec() })?
        );
    } else {
        for id in ids {
            println!("{}", id);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read command handlers
// ---------------------------------------------------------------------------

fn cmd_list(ctx: &Context, args: ListArgs) -> CmdResult {
    if ctx.json {
        let out = list_to_json(ctx.kind, ctx.list(), args.all);
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for line in format_list(ctx.kind, ctx.list(), args.all) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_show(ctx: &Context, args: IdArg) -> CmdResult {
    let task = ctx.task(args.id)?;
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&task_to_json(task))?);
    } else {
        for line in format_task_detail(ctx.list(), task) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_tags_show(ctx: &Context) -> CmdResult {
    let tags = &ctx.list().tag_catalog;
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(tags)?);
    } else {
        for tag in tags {
            println!("{}", tag);
        }
    }
    Ok(())
}

fn cmd_prefs_show(ctx: &Context) -> CmdResult {
    let list = ctx.list();
    if ctx.json {
        let out = PrefsJson {
            preferences: &list.preferences,
            tags: &list.tag_catalog,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for line in format_prefs(list) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_check(ctx: &Context) -> CmdResult {
    let result = check::check_list(ctx.list());

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        if !result.errors.is_empty() {
            println!("Errors:");
            for err in &result.errors {
                match err {
                    check::CheckError::DuplicateId { task_id } => {
                        println!("  {} appears more than once", task_id);
                    }
                    check::CheckError::DanglingParent { task_id, parent } => {
                        println!("  {} has missing parent {}", task_id, parent);
                    }
                    check::CheckError::ParentCycle { task_id } => {
                        println!("  {} is its own ancestor", task_id);
                    }
                    check::CheckError::HiddenWithoutCollapsedAncestor { task_id } => {
                        println!("  {} is hidden but no ancestor is collapsed", task_id);
                    }
                    check::CheckError::VisibleUnderCollapsed { task_id } => {
                        println!("  {} is shown under a collapsed task", task_id);
                    }
                }
            }
        }
        if !result.warnings.is_empty() {
            if !result.errors.is_empty() {
                println!();
            }
            println!("Warnings:");
            for warn in &result.warnings {
                match warn {
                    check::CheckWarning::StaleFocus { task_id } => {
                        println!("  focus points at {}, which is not shown", task_id);
                    }
                    check::CheckWarning::HiddenFlagMismatch { task_id } => {
                        println!("  {} has a stale hidden flag", task_id);
                    }
                }
            }
        }
        if result.valid {
            println!("ok: {} list is valid", ctx.kind);
        }
    }

    if result.valid {
        Ok(())
    } else {
        Err(format!("{} list has errors", ctx.kind).into())
    }
}

fn cmd_recovery(ctx: &Context, args: RecoveryArgs) -> CmdResult {
    let data_dir = &ctx.workspace.data_dir;
    if args.path {
        println!("{}", recovery::recovery_log_path(data_dir).display());
        return Ok(());
    }

    let entries = recovery::read_recovery_entries(data_dir, Some(args.limit.unwrap_or(10)));
    if ctx.json {
        let values: Vec<serde_json::Value> = entries.iter().map(|e| e.to_json()).collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
    } else if entries.is_empty() {
        println!("recovery log is empty");
    } else {
        for entry in &entries {
            print!("{}", entry.to_display_markdown());
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write command handlers
// ---------------------------------------------------------------------------

fn cmd_add(ctx: &mut Context, args: AddArgs) -> CmdResult {
    let mut patch = TaskPatch::default();
    if let Some(p) = &args.priority {
        patch.priority = Some(parse_priority(p)?);
    }
    if !args.tags.is_empty() {
        patch.tags = Some(args.tags.clone());
    }

    let position = match args.after {
        Some(after) => InsertPosition::After(after),
        None => InsertPosition::Bottom,
    };
    let list = ctx.list_mut();
    let id = task_ops::add_task(list, args.title, args.parent, position, false)?;

    // Applied in place so tasks created under a collapsed parent get it too
    if !patch.is_empty()
        && let Some(task) = list
            .visible
            .iter_mut()
            .chain(list.hidden.iter_mut())
            .find(|t| t.id == id)
    {
        patch.apply(task);
    }

    ctx.save()?;
    if ctx.json {
        println!("{}", serde_json::json!({ "id": id }));
    } else {
        println!("{}", id);
    }
    Ok(())
}

fn cmd_edit(ctx: &mut Context, args: EditArgs) -> CmdResult {
    let mut patch = TaskPatch {
        title: args.title,
        ..Default::default()
    };
    if let Some(p) = &args.priority {
        patch.priority = Some(parse_priority(p)?);
    }
    if args.clear_tags {
        patch.tags = Some(Vec::new());
    } else if !args.tags.is_empty() {
        patch.tags = Some(args.tags);
    }
    if args.clear_remark {
        patch.remark = Some(None);
    } else if let Some(remark) = args.remark {
        patch.remark = Some(Some(remark));
    }
    if let Some(r) = &args.repeat {
        patch.repeat_type = Some(parse_repeat(r)?);
    }
    if patch.is_empty() {
        return Err("nothing to change (see `tf edit --help`)".into());
    }

    task_ops::update_task(ctx.list_mut(), args.id, &patch)?;
    ctx.save()?;
    Ok(())
}

fn cmd_rm(ctx: &mut Context, args: RmArgs) -> CmdResult {
    let list = ctx.list();
    if !list.contains(args.id) {
        return Err(TaskError::NotFound(args.id).into());
    }
    if nav::needs_delete_confirm(list) && !args.yes {
        return Err(format!("deleting {} needs confirmation (pass --yes)", args.id).into());
    }

    let snapshot: Vec<Task> = {
        let ids = crate::ops::hierarchy::descendant_closure(args.id, list.all_tasks())?;
        ids.iter().filter_map(|id| list.task(*id).cloned()).collect()
    };
    let removed = task_ops::remove_task(ctx.list_mut(), args.id)?;
    ctx.save()?;

    recovery::log_recovery(
        &ctx.workspace.data_dir,
        RecoveryEntry::new(RecoveryCategory::Delete, format!("task {} deleted", args.id))
            .field("List", ctx.kind)
            .field("Removed", removed.len())
            .body(serde_json::to_string_pretty(&snapshot)?),
    );
    print_ids(ctx.json, &removed)
}

fn cmd_mv(ctx: &mut Context, args: MvArgs) -> CmdResult {
    let edge = if args.child {
        MoveEdge::Child
    } else {
        MoveEdge::Sibling
    };
    task_ops::move_task(ctx.list_mut(), args.source, args.target, edge)?;
    ctx.save()?;
    Ok(())
}

fn cmd_expand(ctx: &mut Context, id: TaskId, expand: bool) -> CmdResult {
    task_ops::toggle_expand(ctx.list_mut(), id, expand)?;
    ctx.save()?;
    Ok(())
}

fn cmd_done(ctx: &mut Context, args: DoneArgs) -> CmdResult {
    if nav::needs_completion_confirm(ctx.list(), args.id) && !args.yes {
        return Err(format!(
            "task {} has unfinished subtasks; pass --yes to complete them too",
            args.id
        )
        .into());
    }
    let ids = task_ops::toggle_completed(ctx.list_mut(), args.id, true)?;
    ctx.save()?;
    if ctx.json {
        print_ids(true, &ids)?;
    }
    Ok(())
}

fn cmd_undone(ctx: &mut Context, args: IdArg) -> CmdResult {
    let ids = task_ops::toggle_completed(ctx.list_mut(), args.id, false)?;
    ctx.save()?;
    if ctx.json {
        print_ids(true, &ids)?;
    }
    Ok(())
}

fn cmd_focus(ctx: &mut Context, args: IdArg) -> CmdResult {
    if !ctx.list().is_visible(args.id) {
        return Err(TaskError::NotFound(args.id).into());
    }
    task_ops::set_focus(ctx.list_mut(), Some(args.id));
    ctx.save()?;
    Ok(())
}

fn cmd_tags(ctx: &mut Context, args: TagsArgs) -> CmdResult {
    if args.tags.is_empty() {
        return cmd_tags_show(ctx);
    }
    task_ops::update_tag_catalog(ctx.list_mut(), dedup_tags(&args.tags));
    ctx.save()?;
    cmd_tags_show(ctx)
}

fn prefs_patch(args: &PrefsArgs) -> Result<PreferencesPatch, String> {
    let default_priority = match &args.default_priority {
        Some(p) => Some(parse_priority(p)?),
        None => None,
    };
    let default_tag = if args.clear_default_tag {
        Some(None)
    } else {
        args.default_tag.clone().map(Some)
    };
    Ok(PreferencesPatch {
        confirm_before_delete: args.confirm_delete,
        confirm_incomplete_subtasks: args.confirm_subtasks,
        default_priority,
        default_tag,
    })
}

fn cmd_prefs(ctx: &mut Context, args: PrefsArgs) -> CmdResult {
    let patch = prefs_patch(&args)?;
    if patch.is_empty() {
        return cmd_prefs_show(ctx);
    }
    task_ops::update_preferences(ctx.list_mut(), &patch);
    ctx.save()?;
    cmd_prefs_show(ctx)
}

fn cmd_promote(ctx: &mut Context, args: IdArg) -> CmdResult {
    let (library, todo) = ctx.doc.pair_mut(ListKind::Library);
    let ids = task_ops::batch_copy_subtree(library, todo, args.id)?;
    ctx.save()?;
    print_ids(ctx.json, &ids)
}

fn cmd_reset(ctx: &mut Context, args: ResetArgs) -> CmdResult {
    if !args.yes {
        return Err("reset clears both lists; pass --yes to confirm".into());
    }
    let data_dir = ctx.workspace.data_dir.clone();
    let path = ctx.workspace.document_path();
    document_io::reset_document(&data_dir, &path, &mut ctx.doc)?;
    Ok(())
}
