use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use crate::cli::commands::*;
use crate::cli::output::{self, CategoriesJson, ListJson, TemplatesJson, ThemeJson};
use crate::io::clock::{Clock, SystemClock};
use crate::io::export;
use crate::io::kv::{FileKvStore, KvStore};
use crate::model::prefs::DarkMode;
use crate::model::task::TaskDraft;
use crate::model::template::{builtin_templates, find_template};
use crate::ops::filter::{self, SortKey, TaskFilter};
use crate::ops::notify::{self, ConsoleNotifier, Notifier, OverdueWatcher, SilentNotifier};
use crate::ops::stats::{TaskAnalytics, TaskStats};
use crate::ops::store::TaskStore;

/// Storage key for the display-mode preference
pub const DARK_MODE_KEY: &str = "darkMode";

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let ctx = Context::open(&cli)?;

    match cli.command {
        // Write commands
        Commands::Add(args) => cmd_add(ctx, args),
        Commands::Done(args) => cmd_done(ctx, args),
        Commands::Edit(args) => cmd_edit(ctx, args),
        Commands::Delete(args) => cmd_delete(ctx, args),
        Commands::Time(args) => cmd_time(ctx, args),
        Commands::Mv(args) => cmd_mv(ctx, args),
        Commands::Bulk(args) => cmd_bulk(ctx, args),
        Commands::Templates(args) => cmd_templates(ctx, args, cli.json),

        // Read commands
        Commands::List(args) => cmd_list(ctx, args, cli.json),
        Commands::Show(args) => cmd_show(ctx, args, cli.json),
        Commands::Categories => cmd_categories(ctx, cli.json),
        Commands::Stats => cmd_stats(ctx, cli.json),
        Commands::Analytics => cmd_analytics(ctx, cli.json),

        // Data exchange and maintenance
        Commands::Export(args) => cmd_export(ctx, args),
        Commands::Import(args) => cmd_import(ctx, args),
        Commands::Remind(args) => cmd_remind(ctx, args),
        Commands::Theme(args) => cmd_theme(ctx, args, cli.json),
    }
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Everything a command needs: hydrated store, the raw port for the
/// preference key, and the notification sink.
struct Context {
    store: TaskStore,
    port: FileKvStore,
    notifier: Box<dyn Notifier>,
    clock: SystemClock,
}

impl Context {
    fn open(cli: &Cli) -> Result<Self, Box<dyn std::error::Error>> {
        let data_dir = match &cli.data_dir {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .ok_or("cannot determine a data directory; pass --data-dir")?
                .join("doable"),
        };
        let port = FileKvStore::open(&data_dir)
            .map_err(|e| format!("cannot open data directory '{}': {}", data_dir.display(), e))?;
        let store = TaskStore::open(Box::new(port.clone()), Box::new(SystemClock));
        let notifier: Box<dyn Notifier> = if cli.quiet {
            Box::new(SilentNotifier)
        } else {
            Box::new(ConsoleNotifier)
        };
        Ok(Context {
            store,
            port,
            notifier,
            clock: SystemClock,
        })
    }
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(mut ctx: Context, args: AddArgs) -> CmdResult {
    // Title validation happens here at the boundary; the store trusts it
    let title = args.title.trim().to_string();
    if title.is_empty() {
        return Err("task title cannot be empty".into());
    }

    let id = ctx.store.add(TaskDraft {
        title: title.clone(),
        description: args.description,
        priority: args.priority,
        category: args.category,
        due_date: args.due,
        created_by: args.by,
        photos: Vec::new(),
        time_spent: 0,
        tags: args.tags,
    });
    ctx.notifier.notify(&notify::task_added(&title));
    println!("added {}", id);
    Ok(())
}

fn cmd_done(mut ctx: Context, args: DoneArgs) -> CmdResult {
    let before = ctx.store.find(&args.id).map(|t| (t.title.clone(), t.completed));
    ctx.store.toggle_completion(&args.id);
    // Announce only the false→true transition; unknown ids are silent no-ops
    if let Some((title, was_completed)) = before {
        if !was_completed {
            ctx.notifier.notify(&notify::task_completed(&title));
            println!("completed {}", args.id);
        } else {
            println!("reopened {}", args.id);
        }
    }
    Ok(())
}

fn cmd_edit(mut ctx: Context, args: EditArgs) -> CmdResult {
    // Full replacement: carry id and created_at over from the original
    let Some(mut task) = ctx.store.find(&args.id).cloned() else {
        return Ok(());
    };
    if let Some(title) = args.title {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err("task title cannot be empty".into());
        }
        task.title = title;
    }
    if let Some(description) = args.description {
        task.description = description;
    }
    if let Some(priority) = args.priority {
        task.priority = priority;
    }
    if let Some(category) = args.category {
        task.category = category;
    }
    match args.due.as_deref() {
        Some("none") => task.due_date = None,
        Some(date) => task.due_date = Some(date.parse()?),
        None => {}
    }
    if !args.tags.is_empty() {
        task.tags = Vec::new();
        for tag in args.tags {
            if !task.tags.contains(&tag) {
                task.tags.push(tag);
            }
        }
    }

    let title = task.title.clone();
    ctx.store.update(task);
    ctx.notifier.notify(&notify::task_updated(&title));
    println!("updated {}", args.id);
    Ok(())
}

fn cmd_delete(mut ctx: Context, args: DeleteArgs) -> CmdResult {
    let title = ctx.store.find(&args.id).map(|t| t.title.clone());
    ctx.store.delete(&args.id);
    if let Some(title) = title {
        ctx.notifier.notify(&notify::task_deleted(&title));
        println!("deleted {}", args.id);
    }
    Ok(())
}

fn cmd_time(mut ctx: Context, args: TimeArgs) -> CmdResult {
    ctx.store.update_time(&args.id, args.minutes);
    if let Some(task) = ctx.store.find(&args.id) {
        println!("logged {}m on {} (total {}m)", args.minutes, args.id, task.time_spent);
    }
    Ok(())
}

fn cmd_mv(mut ctx: Context, args: MvArgs) -> CmdResult {
    let valid = args.id != args.before
        && ctx.store.find(&args.id).is_some()
        && ctx.store.find(&args.before).is_some();
    ctx.store.drag_start(&args.id);
    ctx.store.drop_on(&args.before);
    if valid {
        println!("moved {} before {}", args.id, args.before);
    }
    Ok(())
}

fn cmd_bulk(ctx: Context, args: BulkCmd) -> CmdResult {
    match args.action {
        BulkAction::Complete(target) => bulk_apply(ctx, target, "completed", TaskStore::bulk_complete),
        BulkAction::Uncomplete(target) => {
            bulk_apply(ctx, target, "reopened", TaskStore::bulk_uncomplete)
        }
        BulkAction::Delete(target) => bulk_apply(ctx, target, "deleted", TaskStore::bulk_delete),
    }
}

fn bulk_apply(mut ctx: Context, target: BulkTarget, label: &str, op: fn(&mut TaskStore)) -> CmdResult {
    if target.all {
        // Select the filtered view, the same toggle the select-all checkbox
        // performs; with a fresh per-process selection this always selects
        let filter = TaskFilter {
            search: target.search.unwrap_or_default(),
            status: target.status,
            priority: target.priority,
            category: target.category,
            sort: SortKey::default(),
        };
        let visible: Vec<String> = filter
            .apply(ctx.store.tasks())
            .iter()
            .map(|t| t.id.clone())
            .collect();
        ctx.store.select_all(&visible);
    } else {
        for id in &target.ids {
            ctx.store.select(id, true);
        }
    }
    let count = ctx.store.selected().len();
    op(&mut ctx.store);
    println!("{} {} tasks", label, count);
    Ok(())
}

fn cmd_templates(mut ctx: Context, args: TemplatesCmd, json: bool) -> CmdResult {
    let templates = builtin_templates();
    match args.name {
        None => {
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&TemplatesJson {
                        templates: &templates
                    })?
                );
            } else {
                for template in &templates {
                    println!("{}", output::template_line(template));
                }
            }
        }
        Some(name) => {
            let template = find_template(&templates, &name)
                .ok_or_else(|| format!("no template named '{}'", name))?;
            let id = ctx.store.add(template.to_draft());
            ctx.notifier.notify(&notify::template_used(&template.name));
            println!("added {} from template '{}'", id, template.name);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(ctx: Context, args: ListArgs, json: bool) -> CmdResult {
    let filter = TaskFilter {
        search: args.search.unwrap_or_default(),
        status: args.status,
        priority: args.priority,
        category: args.category,
        sort: args.sort,
    };
    let view = filter.apply(ctx.store.tasks());

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&ListJson {
                total: ctx.store.tasks().len(),
                shown: view.len(),
                tasks: view,
            })?
        );
    } else {
        let now = ctx.clock.now();
        for task in &view {
            println!("{}", output::task_line(task, now));
        }
        println!("{} of {} tasks", view.len(), ctx.store.tasks().len());
    }
    Ok(())
}

fn cmd_show(ctx: Context, args: ShowArgs, json: bool) -> CmdResult {
    let task = ctx
        .store
        .find(&args.id)
        .ok_or_else(|| format!("task not found: {}", args.id))?;
    if json {
        println!("{}", serde_json::to_string_pretty(task)?);
    } else {
        print!("{}", output::task_detail(task, ctx.clock.now()));
    }
    Ok(())
}

fn cmd_categories(ctx: Context, json: bool) -> CmdResult {
    let categories = filter::categories(ctx.store.tasks());
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&CategoriesJson { categories })?
        );
    } else {
        for category in categories {
            println!("{}", category);
        }
    }
    Ok(())
}

/// Minutes as whole hours, rounded half-up
fn hours(minutes: u64) -> u64 {
    (minutes + 30) / 60
}

fn cmd_stats(ctx: Context, json: bool) -> CmdResult {
    let stats = TaskStats::of(ctx.store.tasks());
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("total:      {}", stats.total);
        println!("completed:  {}", stats.completed);
        println!("pending:    {}", stats.pending);
        println!("time spent: {}h", hours(stats.total_time_spent));
    }
    Ok(())
}

fn cmd_analytics(ctx: Context, json: bool) -> CmdResult {
    let analytics = TaskAnalytics::of(ctx.store.tasks());
    if json {
        println!("{}", serde_json::to_string_pretty(&analytics)?);
    } else {
        println!("completion rate: {:.1}%", analytics.completion_rate);
        println!("total time:      {}h", hours(analytics.total_time_spent));
        println!("avg time/task:   {:.0}m", analytics.avg_time_per_task);
        println!("by category:");
        for (category, count) in &analytics.by_category {
            println!("  {:<16} {}", category, count);
        }
        println!("by priority:");
        for (priority, count) in &analytics.by_priority {
            println!("  {:<16} {}", priority, count);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Data exchange and maintenance
// ---------------------------------------------------------------------------

fn cmd_export(ctx: Context, args: ExportArgs) -> CmdResult {
    let today = ctx.clock.now().date_naive();
    let (content, ext) = match args.format.as_str() {
        "json" => (export::to_json(ctx.store.tasks()), "json"),
        "csv" => (export::to_csv(ctx.store.tasks()), "csv"),
        other => return Err(format!("unknown export format '{}' (json, csv)", other).into()),
    };
    let path = args
        .out
        .unwrap_or_else(|| export::default_filename(today, ext));
    fs::write(&path, content)?;
    println!("exported {} tasks to {}", ctx.store.tasks().len(), path);
    Ok(())
}

fn cmd_import(mut ctx: Context, args: ImportArgs) -> CmdResult {
    let content = fs::read_to_string(&args.file)
        .map_err(|e| format!("cannot read '{}': {}", args.file, e))?;
    // Parse failure is the one user-visible error path; the list stays
    // unchanged
    let tasks = export::parse_json(&content)
        .map_err(|e| format!("{} (expected a tasks JSON export)", e))?;
    let count = tasks.len();
    ctx.store.import_tasks(tasks);
    println!("imported {} tasks", count);
    Ok(())
}

fn cmd_remind(ctx: Context, args: RemindArgs) -> CmdResult {
    let mut watcher = OverdueWatcher::new();

    // Eager first check, then (in watch mode) periodic re-checks against a
    // freshly hydrated snapshot
    let fresh = watcher.check(ctx.store.tasks(), ctx.clock.now());
    for notification in &fresh {
        ctx.notifier.notify(notification);
    }
    if !args.watch {
        println!("{} overdue reminders", fresh.len());
        return Ok(());
    }

    loop {
        thread::sleep(Duration::from_secs(args.every * 60));
        let store = TaskStore::open(Box::new(ctx.port.clone()), Box::new(SystemClock));
        for notification in watcher.check(store.tasks(), ctx.clock.now()) {
            ctx.notifier.notify(&notification);
        }
    }
}

fn cmd_theme(ctx: Context, args: ThemeArgs, json: bool) -> CmdResult {
    let current: DarkMode = ctx
        .port
        .get(DARK_MODE_KEY)
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default();

    let mode = match args.mode.as_deref() {
        None => current,
        Some("dark") => DarkMode(true),
        Some("light") => DarkMode(false),
        Some(other) => return Err(format!("unknown theme '{}' (dark, light)", other).into()),
    };
    if mode != current {
        ctx.port.set(DARK_MODE_KEY, &serde_json::to_string(&mode)?)?;
    }
    if json {
        println!("{}", serde_json::to_string(&ThemeJson { mode: mode.label() })?);
    } else {
        println!("{}", mode.label());
    }
    Ok(())
}
