//! Command implementations for the CLI interface.
//!
//! Read commands build a [`Snapshot`] from the store and print one of the views, as
//! tables or as JSON. Write commands turn the request into a [`MutationIntent`] and
//! hand it to the store, or only print it under `--dry-run`.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use chrono::{Datelike, NaiveDate, Utc};
use clap::Subcommand;
use clap_complete::{generate, Shell};
use serde::Serialize;
use tracing::info;

use taskpulse::config::PulseConfig;
use taskpulse::dates::{format_day_relative, parse_day, parse_day_input, weekday_name};
use taskpulse::db::Database;
use taskpulse::fields::{Category, Priority, Status};
use taskpulse::heatmap::{HeatmapCell, Tier};
use taskpulse::mutation::{self, MutationIntent, TaskChanges, TaskDraft};
use taskpulse::snapshot::Snapshot;
use taskpulse::stats::TrendPoint;
use taskpulse::task::Task;
use taskpulse::views::{self, DashboardView, DayPlan};

#[derive(Subcommand)]
pub enum Commands {
    /// Today's tasks, completion rate, streak and weekly trend.
    Dashboard,

    /// Tasks scheduled for tomorrow.
    Tomorrow,

    /// Unfinished tasks that are overdue or have no date.
    Backlog,

    /// Completed tasks grouped by day, newest first.
    History {
        /// Maximum number of days to print. Defaults to `history.limit`.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Unfinished tasks after tomorrow, grouped by horizon.
    Upcoming {
        /// Group by calendar day instead of horizon.
        #[arg(long)]
        by_day: bool,
    },

    /// Completion statistics across all tasks.
    Analytics {
        /// Also draw the trailing-year consistency heatmap.
        #[arg(long)]
        heatmap: bool,
    },

    /// Add a new task.
    Add {
        /// Short title for the task.
        title: String,
        #[arg(long, value_enum, default_value_t = Category::Learning)]
        category: Category,
        #[arg(long, value_enum, default_value_t = Priority::Medium)]
        priority: Priority,
        /// Day: YYYY-MM-DD, "today", "tomorrow", "next week", "fri", or "in 3d". Defaults to today.
        #[arg(long, conflicts_with = "no_date")]
        date: Option<String>,
        /// Leave the task undated.
        #[arg(long)]
        no_date: bool,
        /// Estimated effort in minutes.
        #[arg(long)]
        estimate: Option<u32>,
        /// Checklist item. May be repeated.
        #[arg(long = "subtask")]
        subtasks: Vec<String>,
    },

    /// Flip a task between completed and pending, syncing its subtasks.
    Toggle {
        /// Task ID, ID prefix or title.
        id: String,
    },

    /// Check or uncheck one subtask.
    Subtask {
        /// Task ID, ID prefix or title.
        id: String,
        /// Subtask ID, title or 1-based position.
        subtask: String,
    },

    /// Move a task to another day.
    Reschedule {
        /// Task ID, ID prefix or title.
        id: String,
        /// "today", "tomorrow", "next week", or any other accepted day.
        when: String,
    },

    /// Update fields on a task.
    Update {
        /// Task ID, ID prefix or title.
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, value_enum)]
        category: Option<Category>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        #[arg(long, value_enum)]
        status: Option<Status>,
        #[arg(long, conflicts_with = "clear_date")]
        date: Option<String>,
        #[arg(long)]
        clear_date: bool,
        #[arg(long)]
        estimate: Option<u32>,
    },

    /// Delete a task.
    Delete {
        /// Task ID, ID prefix or title.
        id: String,
    },

    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Settings shared by every command after flags and configuration are merged.
pub struct Context {
    pub db_path: PathBuf,
    pub today: NaiveDate,
    pub json: bool,
    pub dry_run: bool,
    pub config: PulseConfig,
}

/// Route a parsed command to its handler.
pub fn dispatch(command: Commands, ctx: &Context) -> Result<()> {
    match command {
        Commands::Dashboard => cmd_dashboard(ctx),
        Commands::Tomorrow => cmd_tomorrow(ctx),
        Commands::Backlog => cmd_backlog(ctx),
        Commands::History { limit } => cmd_history(ctx, limit),
        Commands::Upcoming { by_day } => cmd_upcoming(ctx, by_day),
        Commands::Analytics { heatmap } => cmd_analytics(ctx, heatmap),
        Commands::Add {
            title, category, priority, date, no_date, estimate, subtasks,
        } => cmd_add(ctx, title, category, priority, date, no_date, estimate, subtasks),
        Commands::Toggle { id } => cmd_toggle(ctx, id),
        Commands::Subtask { id, subtask } => cmd_subtask(ctx, id, subtask),
        Commands::Reschedule { id, when } => cmd_reschedule(ctx, id, when),
        Commands::Update {
            id, title, category, priority, status, date, clear_date, estimate,
        } => cmd_update(ctx, id, title, category, priority, status, date, clear_date, estimate),
        Commands::Delete { id } => cmd_delete(ctx, id),
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn long_date(day: NaiveDate) -> String {
    format!("{}, {}", weekday_name(day.weekday()), day.format("%B %-d, %Y"))
}

fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

/// Truncate to `width` characters, ending with an ellipsis when shortened.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

/// Print tasks as a fixed-width table with relative dates and subtask progress.
pub fn print_table(tasks: &[&Task], today: NaiveDate) {
    if tasks.is_empty() {
        println!("  (no tasks)");
        return;
    }
    println!(
        "{:<8} {:<11} {:<6} {:<9} {:<10} {:>5} {}",
        "ID", "Status", "Pri", "Category", "Date", "Est", "Title [subtasks]"
    );
    for t in tasks {
        let day = t.raw_date().and_then(parse_day);
        let estimate = t
            .time_estimate
            .map(|m| format!("{m}m"))
            .unwrap_or_else(|| "-".into());
        let (done, total) = t.subtask_progress();
        let progress = if total == 0 {
            String::new()
        } else {
            format!(" [{done}/{total}]")
        };
        println!(
            "{:<8} {:<11} {:<6} {:<9} {:<10} {:>5} {}{}",
            short_id(&t.id),
            t.status.label(),
            t.priority.label(),
            t.category.label(),
            format_day_relative(day, today),
            estimate,
            truncate(&t.title, 48),
            progress
        );
    }
}

fn print_trend(points: &[TrendPoint]) {
    let days: Vec<String> = points
        .iter()
        .map(|p| format!("{} {}", p.label, p.count))
        .collect();
    println!("Last 7 days: {}", days.join(" | "));
}

/// Seven weekday rows, one column per week, oldest week on the left.
fn print_heatmap(cells: &[HeatmapCell]) {
    let Some(first) = cells.first() else {
        return;
    };
    let offset = first.day.weekday().num_days_from_monday() as usize;
    let weeks = (cells.len() + offset).div_ceil(7);
    let mut rows = vec![vec![' '; weeks]; 7];
    for (i, cell) in cells.iter().enumerate() {
        let slot = i + offset;
        rows[slot % 7][slot / 7] = cell.tier.glyph();
    }
    let labels = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
    for (label, row) in labels.iter().zip(rows) {
        println!("{label} {}", row.into_iter().collect::<String>());
    }
    let legend: String = [0, 1, 3, 5, 7, 9]
        .map(|n| Tier::for_count(n).glyph().to_string())
        .join(" ");
    println!("    less {legend} more");
}

#[derive(Serialize)]
struct DashboardOutput<'a> {
    #[serde(flatten)]
    view: &'a DashboardView<'a>,
    daily_target: u32,
    on_target: bool,
}

/// Show today's tasks and compare the completion rate with the daily target.
pub fn cmd_dashboard(ctx: &Context) -> Result<()> {
    let db = Database::load(&ctx.db_path)?;
    let snapshot = Snapshot::new(&db.tasks);
    let view = views::dashboard(&snapshot, ctx.today);
    let target = ctx.config.dashboard.daily_target;
    let on_target = view.total > 0 && view.completion_rate >= target;

    if ctx.json {
        return print_json(&DashboardOutput {
            view: &view,
            daily_target: target,
            on_target,
        });
    }

    println!("{}", long_date(ctx.today));
    let verdict = if view.total == 0 {
        "nothing scheduled"
    } else if on_target {
        "on target"
    } else {
        "below target"
    };
    println!(
        "Progress: {}/{} done ({}%), target {}% ({})",
        view.completed, view.total, view.completion_rate, target, verdict
    );
    println!(
        "Planned: {} min left   Streak: {} day(s)",
        view.planned_minutes, view.streak
    );
    println!();
    print_table(&view.tasks, ctx.today);
    println!();
    print_trend(&view.weekly_trend);
    Ok(())
}

fn print_day_plan(plan: &DayPlan<'_>, today: NaiveDate) {
    println!("{} ({})", long_date(plan.day), plan.tasks.len());
    print_table(&plan.tasks, today);
}

/// Show the tasks scheduled for tomorrow.
pub fn cmd_tomorrow(ctx: &Context) -> Result<()> {
    let db = Database::load(&ctx.db_path)?;
    let snapshot = Snapshot::new(&db.tasks);
    let plan = views::tomorrow(&snapshot, ctx.today);
    if ctx.json {
        return print_json(&plan);
    }
    print_day_plan(&plan, ctx.today);
    Ok(())
}

/// Show overdue and undated unfinished tasks.
pub fn cmd_backlog(ctx: &Context) -> Result<()> {
    let db = Database::load(&ctx.db_path)?;
    let snapshot = Snapshot::new(&db.tasks);
    let view = views::backlog(&snapshot, ctx.today);
    if ctx.json {
        return print_json(&view);
    }
    println!("Backlog ({})", view.items.len());
    let tasks: Vec<&Task> = view.items.iter().map(|item| item.task).collect();
    print_table(&tasks, ctx.today);
    Ok(())
}

/// Show completed tasks grouped by day, newest first.
pub fn cmd_history(ctx: &Context, limit: Option<usize>) -> Result<()> {
    let db = Database::load(&ctx.db_path)?;
    let snapshot = Snapshot::new(&db.tasks);
    let mut view = views::history(&snapshot, ctx.today);
    view.groups
        .truncate(limit.unwrap_or(ctx.config.history.limit));
    if ctx.json {
        return print_json(&view);
    }

    println!("{} completed task(s)", view.total);
    for group in &view.groups {
        println!();
        println!("{} ({})", group.label, group.tasks.len());
        for t in &group.tasks {
            println!(
                "  ✓ {:<8} {:<9} {:<6} {}",
                short_id(&t.id),
                t.category.label(),
                t.priority.label(),
                truncate(&t.title, 60)
            );
        }
    }
    Ok(())
}

/// Show unfinished tasks after tomorrow, by horizon or by day.
pub fn cmd_upcoming(ctx: &Context, by_day: bool) -> Result<()> {
    let db = Database::load(&ctx.db_path)?;
    let snapshot = Snapshot::new(&db.tasks);

    if by_day {
        let plans = views::upcoming_by_day(&snapshot, ctx.today);
        if ctx.json {
            return print_json(&plans);
        }
        if plans.is_empty() {
            println!("Nothing scheduled after tomorrow.");
        }
        for plan in &plans {
            print_day_plan(plan, ctx.today);
            println!();
        }
        return Ok(());
    }

    let view = views::upcoming(&snapshot, ctx.today);
    if ctx.json {
        return print_json(&view);
    }
    println!("Upcoming ({})", view.total);
    for group in &view.groups {
        println!();
        println!("{} ({})", group.horizon.label(), group.tasks.len());
        print_table(&group.tasks, ctx.today);
    }
    Ok(())
}

/// Show completion statistics, optionally with the heatmap.
pub fn cmd_analytics(ctx: &Context, heatmap: bool) -> Result<()> {
    let db = Database::load(&ctx.db_path)?;
    let snapshot = Snapshot::new(&db.tasks);
    let view = views::analytics(&snapshot, ctx.today);
    if ctx.json {
        return print_json(&view);
    }

    println!(
        "Tasks: {} total, {} completed ({}%)",
        view.total_tasks, view.completed_tasks, view.completion_rate
    );
    println!(
        "Streak: {} day(s)   Days tracked: {}   Completions: {}",
        view.streak, view.days_tracked, view.total_completions
    );
    println!("Most productive day: {}", view.most_productive_day);

    let categories: Vec<String> = view
        .category_distribution
        .iter()
        .map(|(category, n)| format!("{} {n}", category.label()))
        .collect();
    if !categories.is_empty() {
        println!("Categories: {}", categories.join(", "));
    }

    println!();
    println!("{:<8} {:>5} {:>5}", "Priority", "Done", "Open");
    for (priority, split) in &view.priority_breakdown {
        println!(
            "{:<8} {:>5} {:>5}",
            priority.label(),
            split.completed,
            split.pending
        );
    }
    println!();
    print_trend(&view.weekly_trend);

    if heatmap {
        println!();
        print_heatmap(&view.heatmap);
    }
    Ok(())
}

fn parse_when(raw: &str, today: NaiveDate) -> Result<NaiveDate> {
    parse_day_input(raw, today).ok_or_else(|| {
        anyhow!(
            "unrecognised date '{raw}': use YYYY-MM-DD, today, tomorrow, next week, a weekday, or 'in Nd'"
        )
    })
}

fn find_task(db: &Database, identifier: &str) -> Result<Task> {
    db.resolve(identifier).cloned().map_err(|msg| anyhow!(msg))
}

/// Print the intent under `--dry-run`, otherwise apply and save it.
fn commit(ctx: &Context, db: &mut Database, intent: MutationIntent, verb: &str) -> Result<()> {
    if ctx.dry_run {
        return print_json(&intent);
    }
    if let MutationIntent::Update { changes, .. } = &intent {
        if changes.is_empty() {
            println!("Nothing to change.");
            return Ok(());
        }
    }
    let id = db.apply(intent, Utc::now())?;
    db.save(&ctx.db_path)?;
    info!(%id, path = %ctx.db_path.display(), "saved task store");

    let status = db
        .get(&id)
        .map(|t| format!(" ({})", t.status.label()))
        .unwrap_or_default();
    println!("{verb} {id}{status}");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_add(
    ctx: &Context,
    title: String,
    category: Category,
    priority: Priority,
    date: Option<String>,
    no_date: bool,
    estimate: Option<u32>,
    subtasks: Vec<String>,
) -> Result<()> {
    let mut db = Database::load(&ctx.db_path)?;
    let mut draft = TaskDraft::new(title, ctx.today);
    draft.category = category;
    draft.priority = priority;
    draft.date = match (no_date, date) {
        (true, _) => None,
        (false, Some(raw)) => Some(parse_when(&raw, ctx.today)?),
        (false, None) => Some(ctx.today),
    };
    draft.time_estimate = estimate;
    draft.subtasks = subtasks;

    let intent = mutation::create(draft)?;
    commit(ctx, &mut db, intent, "Added task")
}

/// Complete or reopen a task.
pub fn cmd_toggle(ctx: &Context, id: String) -> Result<()> {
    let mut db = Database::load(&ctx.db_path)?;
    let task = find_task(&db, &id)?;
    commit(ctx, &mut db, mutation::toggle_status(&task), "Toggled task")
}

/// Match a subtask by id, 1-based position, unique id prefix or title.
fn resolve_subtask(task: &Task, key: &str) -> Result<String> {
    if let Some(subtask) = task.subtask(key) {
        return Ok(subtask.id.clone());
    }
    if let Some(subtask) = key
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| task.subtasks.get(i))
    {
        return Ok(subtask.id.clone());
    }
    let wanted = key.to_lowercase();
    let matches: Vec<_> = task
        .subtasks
        .iter()
        .filter(|s| s.id.starts_with(key) || s.title.to_lowercase() == wanted)
        .collect();
    match matches.as_slice() {
        [one] => Ok(one.id.clone()),
        [] => Ok(key.to_string()),
        _ => bail!("several subtasks of '{}' match '{key}'", task.title),
    }
}

/// Check or uncheck a single subtask.
pub fn cmd_subtask(ctx: &Context, id: String, subtask: String) -> Result<()> {
    let mut db = Database::load(&ctx.db_path)?;
    let task = find_task(&db, &id)?;
    let subtask_id = resolve_subtask(&task, &subtask)?;
    let intent = mutation::toggle_subtask(&task, &subtask_id)?;
    commit(ctx, &mut db, intent, "Updated task")
}

/// Move a task to another day.
pub fn cmd_reschedule(ctx: &Context, id: String, when: String) -> Result<()> {
    let mut db = Database::load(&ctx.db_path)?;
    let task = find_task(&db, &id)?;
    let day = parse_when(&when, ctx.today)?;
    commit(ctx, &mut db, mutation::reschedule(&task, day), "Rescheduled task")
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_update(
    ctx: &Context,
    id: String,
    title: Option<String>,
    category: Option<Category>,
    priority: Option<Priority>,
    status: Option<Status>,
    date: Option<String>,
    clear_date: bool,
    estimate: Option<u32>,
) -> Result<()> {
    let mut db = Database::load(&ctx.db_path)?;
    let task = find_task(&db, &id)?;

    let date = if clear_date {
        Some(None)
    } else {
        date.map(|raw| parse_when(&raw, ctx.today).map(|d| Some(d.format("%Y-%m-%d").to_string())))
            .transpose()?
    };
    let changes = TaskChanges {
        title,
        category,
        priority,
        status,
        date,
        time_estimate: estimate,
        subtasks: None,
    };
    if changes.is_empty() {
        bail!("nothing to update: pass at least one field flag");
    }

    let intent = mutation::edit(&task, &changes)?;
    commit(ctx, &mut db, intent, "Updated task")
}

/// Delete a task.
pub fn cmd_delete(ctx: &Context, id: String) -> Result<()> {
    let mut db = Database::load(&ctx.db_path)?;
    let task = find_task(&db, &id)?;
    commit(ctx, &mut db, mutation::delete(&task), "Deleted task")
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}
