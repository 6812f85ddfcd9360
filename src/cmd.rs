//! Command implementations for the CLI interface.
//!
//! Each handler resolves the user's task references, runs the engine over the
//! current task list, and commits the renumbered result as one undoable step.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::Subcommand;
use clap_complete::{generate, Shell};
use tracing::info;

use crate::config::Settings;
use crate::db::*;
use crate::dates::parse_date_input;
use crate::dependents::find_dependents;
use crate::error::{Result, ScheduleError};
use crate::fields::{DependentsPolicy, OutputFormat};
use crate::outline::{demote, insert_after, promote};
use crate::propagate::{on_duration_change, on_predecessors_change, on_start_date_change};
use crate::serial::{format_serials, resolve_serials};
use crate::task::{find, Task};
use crate::wbs::{renumber, validate_outline};

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new task.
    Add {
        /// Task name.
        name: String,
        /// Insert after this task (id, WBS code or name) at its outline level.
        #[arg(long)]
        after: Option<String>,
        /// Indent the new task under the row above it.
        #[arg(long)]
        child: bool,
        /// Duration in days.
        #[arg(long, default_value_t = 1)]
        duration: u32,
        /// Start date: YYYY-MM-DD, "today", "tomorrow", or "in Nd". Defaults to today.
        #[arg(long)]
        start: Option<String>,
        /// Make the task a zero-length milestone.
        #[arg(long)]
        milestone: bool,
        /// Predecessors as row numbers or ids, e.g. "1,3".
        #[arg(long)]
        pred: Option<String>,
    },

    /// List the schedule in outline order.
    List {
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Show one task with its predecessors and successors.
    View {
        /// Task id, WBS code or name.
        task: String,
    },

    /// Indent a task under the row above it.
    Indent { task: String },

    /// Outdent a task one level.
    Outdent { task: String },

    /// Change a task's duration in days.
    Duration { task: String, days: u32 },

    /// Move a task's start date. Predecessors may push it later.
    Start { task: String, date: String },

    /// Add predecessors to a task. Links that would form a cycle are rejected.
    Link {
        task: String,
        /// Row numbers or ids, comma-separated.
        preds: String,
    },

    /// Remove predecessors from a task.
    Unlink {
        task: String,
        /// Row numbers or ids, comma-separated.
        preds: String,
    },

    /// Mark a task as a milestone, or clear the flag with --off.
    Milestone {
        task: String,
        #[arg(long)]
        off: bool,
    },

    /// Set percent complete (0-100).
    Progress { task: String, percent: u8 },

    /// Rename a task.
    Rename { task: String, name: String },

    /// Delete tasks.
    Delete {
        /// Task ids, WBS codes or names.
        #[arg(required = true)]
        tasks: Vec<String>,
        /// Also delete outline children.
        #[arg(long)]
        cascade: bool,
        /// What to do with surviving tasks that reference a deleted task.
        #[arg(long, value_enum, default_value_t = DependentsPolicy::Refuse)]
        dependents: DependentsPolicy,
    },

    /// Show which tasks list the given tasks as predecessors.
    Dependents {
        #[arg(required = true)]
        tasks: Vec<String>,
    },

    /// Recompute WBS codes and push every task past its predecessors.
    Reschedule,

    /// Undo the last change.
    Undo,

    /// Redo the last undone change.
    Redo,

    /// Replace the schedule with a JSON task list.
    Import {
        input: PathBuf,
        /// Reject outline level jumps instead of clamping them.
        #[arg(long)]
        strict: bool,
    },

    /// Write the task list as JSON.
    Export {
        /// Output file path (default: stdout).
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Dispatch a parsed command against the schedule at `settings.db_path`.
pub fn run(command: Commands, settings: &Settings) -> Result<()> {
    let load = || Database::load(&settings.db_path);
    match command {
        Commands::Add { name, after, child, duration, start, milestone, pred } =>
            cmd_add(&mut load()?, settings, name, after, child, duration, start, milestone, pred),
        Commands::List { format } => cmd_list(&load()?, format),
        Commands::View { task } => cmd_view(&load()?, &task),
        Commands::Indent { task } => cmd_indent(&mut load()?, settings, &task, true),
        Commands::Outdent { task } => cmd_indent(&mut load()?, settings, &task, false),
        Commands::Duration { task, days } => cmd_duration(&mut load()?, settings, &task, days),
        Commands::Start { task, date } => cmd_start(&mut load()?, settings, &task, &date),
        Commands::Link { task, preds } => cmd_link(&mut load()?, settings, &task, &preds),
        Commands::Unlink { task, preds } => cmd_unlink(&mut load()?, settings, &task, &preds),
        Commands::Milestone { task, off } => cmd_milestone(&mut load()?, settings, &task, !off),
        Commands::Progress { task, percent } => cmd_progress(&mut load()?, settings, &task, percent),
        Commands::Rename { task, name } => cmd_rename(&mut load()?, settings, &task, name),
        Commands::Delete { tasks, cascade, dependents } =>
            cmd_delete(&mut load()?, settings, &tasks, cascade, dependents),
        Commands::Dependents { tasks } => cmd_dependents(&load()?, &tasks),
        Commands::Reschedule => cmd_reschedule(&mut load()?, settings),
        Commands::Undo => cmd_history(&mut load()?, settings, true),
        Commands::Redo => cmd_history(&mut load()?, settings, false),
        Commands::Import { input, strict } => cmd_import(&mut load()?, settings, input, strict),
        Commands::Export { output } => cmd_export(&load()?, output),
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
    }
}

/// Renumber, commit as one undo step, and write to disk.
fn save(db: &mut Database, settings: &Settings, tasks: Vec<Task>) -> Result<()> {
    db.commit(renumber(&tasks), settings.history_depth);
    db.save(&settings.db_path)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn lookup<'a>(tasks: &'a [Task], id: &str) -> Result<&'a Task> {
    find(tasks, id).ok_or_else(|| ScheduleError::TaskNotFound(id.to_string()))
}

/// Add a new task to the schedule.
pub fn cmd_add(
    db: &mut Database,
    settings: &Settings,
    name: String,
    after: Option<String>,
    child: bool,
    duration: u32,
    start: Option<String>,
    milestone: bool,
    pred: Option<String>,
) -> Result<()> {
    let start = match start {
        Some(s) => parse_date_input(&s, today())?,
        None => today(),
    };
    let after_id = after.map(|a| db.resolve_task(&a)).transpose()?;
    // Rows are typed against the list as the user sees it now.
    let preds = match pred {
        Some(p) => resolve_serials(&p, &db.tasks)?,
        None => Vec::new(),
    };

    let id = db.next_id()?;
    let mut task = Task::new(&id, name, start).with_duration(duration);
    if milestone {
        task = task.set_milestone(true);
    }
    validate_task(&task)?;

    let mut list = insert_after(task, after_id.as_deref(), &db.tasks);
    if child {
        list = promote(&id, &list);
    }
    if !preds.is_empty() {
        let (accepted, _) = accept_predecessors(&id, preds, &list);
        let edited = on_predecessors_change(lookup(&list, &id)?, accepted, &list);
        list = apply_edit(&list, edited);
    }

    save(db, settings, list)?;
    let added = db.require(&id)?;
    info!(task = %added.id, "task added");
    println!(
        "Added {} '{}' at WBS {} ({} to {}).",
        added.id, added.name, added.wbs, added.start_date, added.end_date
    );
    Ok(())
}

/// Print the schedule as a table or as JSON.
pub fn cmd_list(db: &Database, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            if db.tasks.is_empty() {
                println!("No tasks.");
            } else {
                print_table(&db.tasks);
            }
        }
        OutputFormat::Json => println!("{}", to_json(&db.tasks)?),
    }
    Ok(())
}

/// Show the details of one task.
pub fn cmd_view(db: &Database, identifier: &str) -> Result<()> {
    let id = db.resolve_task(identifier)?;
    let task = db.require(&id)?;

    println!("ID:           {}", task.id);
    println!("Name:         {}", task.name);
    println!("WBS:          {}", task.wbs);
    println!("Level:        {}", task.outline_level);
    println!("Start:        {}", task.start_date);
    println!("End:          {}", task.end_date);
    println!("Duration:     {}d{}", task.duration, if task.milestone { " (milestone)" } else { "" });
    println!("Progress:     {}%", task.progress);

    println!("Predecessors:");
    if task.predecessors.is_empty() {
        println!("  -");
    }
    for p in &task.predecessors {
        match db.get(&p.task_id) {
            Some(t) => println!("  {} {} {} (ends {})", p.kind.code(), t.wbs, t.name, t.end_date),
            None => println!("  {} {} (missing)", p.kind.code(), p.task_id),
        }
    }

    println!("Successors:");
    let successors = find_dependents(&[id.as_str()], &db.tasks);
    if successors.is_empty() {
        println!("  -");
    }
    for d in successors {
        println!("  {} {} (starts {})", d.task.wbs, d.task.name, d.task.start_date);
    }
    Ok(())
}

/// Indent (promote) or outdent (demote) a task.
pub fn cmd_indent(db: &mut Database, settings: &Settings, identifier: &str, indent: bool) -> Result<()> {
    let id = db.resolve_task(identifier)?;
    let list = if indent { promote(&id, &db.tasks) } else { demote(&id, &db.tasks) };
    save(db, settings, list)?;
    let task = db.require(&id)?;
    println!("{} is now WBS {} (level {}).", task.id, task.wbs, task.outline_level);
    Ok(())
}

pub fn cmd_duration(db: &mut Database, settings: &Settings, identifier: &str, days: u32) -> Result<()> {
    let id = db.resolve_task(identifier)?;
    let edited = on_duration_change(db.require(&id)?, days, &db.tasks);
    validate_task(&edited)?;
    let list = apply_edit(&db.tasks, edited);
    save(db, settings, list)?;
    print_dates(db, &id)
}

pub fn cmd_start(db: &mut Database, settings: &Settings, identifier: &str, date: &str) -> Result<()> {
    let id = db.resolve_task(identifier)?;
    let requested = parse_date_input(date, today())?;
    let edited = on_start_date_change(db.require(&id)?, requested, &db.tasks);
    if edited.start_date != requested {
        println!("Predecessors hold {} until {}.", id, edited.start_date);
    }
    let list = apply_edit(&db.tasks, edited);
    save(db, settings, list)?;
    print_dates(db, &id)
}

/// Add predecessor links. If any of them would close a cycle nothing is changed.
pub fn cmd_link(db: &mut Database, settings: &Settings, identifier: &str, input: &str) -> Result<()> {
    let id = db.resolve_task(identifier)?;
    let task = db.require(&id)?.clone();
    let candidates: Vec<_> = resolve_serials(input, &db.tasks)?
        .into_iter()
        .filter(|p| !task.depends_on(&p.task_id))
        .collect();
    let (accepted, rejected) = accept_predecessors(&id, candidates, &db.tasks);

    if let Some(p) = rejected.first() {
        return Err(ScheduleError::CyclicDependency {
            successor: id,
            predecessor: p.task_id.clone(),
        });
    }
    if accepted.is_empty() {
        println!("{} already has those predecessors.", id);
        return Ok(());
    }

    let mut preds = task.predecessors.clone();
    preds.extend(accepted);
    let edited = on_predecessors_change(&task, preds, &db.tasks);
    let list = apply_edit(&db.tasks, edited);
    save(db, settings, list)?;
    print_dates(db, &id)
}

pub fn cmd_unlink(db: &mut Database, settings: &Settings, identifier: &str, input: &str) -> Result<()> {
    let id = db.resolve_task(identifier)?;
    let removed: HashSet<String> = resolve_serials(input, &db.tasks)?
        .into_iter()
        .map(|p| p.task_id)
        .collect();
    let task = db.require(&id)?;
    let preds = task
        .predecessors
        .iter()
        .filter(|p| !removed.contains(&p.task_id))
        .cloned()
        .collect();
    let edited = on_predecessors_change(task, preds, &db.tasks);
    let list = apply_edit(&db.tasks, edited);
    save(db, settings, list)?;
    print_dates(db, &id)
}

pub fn cmd_milestone(db: &mut Database, settings: &Settings, identifier: &str, on: bool) -> Result<()> {
    let id = db.resolve_task(identifier)?;
    let edited = db.require(&id)?.clone().set_milestone(on);
    let list = apply_edit(&db.tasks, edited);
    save(db, settings, list)?;
    print_dates(db, &id)
}

pub fn cmd_progress(db: &mut Database, settings: &Settings, identifier: &str, percent: u8) -> Result<()> {
    let id = db.resolve_task(identifier)?;
    let mut edited = db.require(&id)?.clone();
    edited.progress = percent;
    validate_task(&edited)?;
    let list = replace_task(&db.tasks, edited);
    save(db, settings, list)?;
    println!("{} is {}% complete.", id, percent);
    Ok(())
}

pub fn cmd_rename(db: &mut Database, settings: &Settings, identifier: &str, name: String) -> Result<()> {
    let id = db.resolve_task(identifier)?;
    let mut edited = db.require(&id)?.clone();
    edited.name = name;
    validate_task(&edited)?;
    let list = replace_task(&db.tasks, edited);
    save(db, settings, list)?;
    println!("Renamed {}.", id);
    Ok(())
}

/// Delete tasks after checking outline children and surviving dependents.
pub fn cmd_delete(
    db: &mut Database,
    settings: &Settings,
    identifiers: &[String],
    cascade: bool,
    policy: DependentsPolicy,
) -> Result<()> {
    let mut ids: Vec<String> = Vec::new();
    for identifier in identifiers {
        let id = db.resolve_task(identifier)?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    let mut children: Vec<String> = Vec::new();
    for id in &ids {
        let below: Vec<String> = collect_descendants(&db.tasks, id)
            .into_iter()
            .filter(|c| !ids.contains(c) && !children.contains(c))
            .collect();
        if !below.is_empty() && !cascade {
            return Err(ScheduleError::HasChildren {
                task_id: id.clone(),
                count: below.len(),
            });
        }
        children.extend(below);
    }
    ids.extend(children);

    let targets: Vec<&str> = ids.iter().map(String::as_str).collect();
    let at_risk: Vec<_> = find_dependents(&targets, &db.tasks)
        .into_iter()
        .filter(|d| !ids.contains(&d.task.id))
        .collect();
    for d in &at_risk {
        println!(
            "{} {} depends on {}",
            d.task.wbs,
            d.task.name,
            d.matched_predecessor_ids.join(",")
        );
    }

    let list = delete_tasks(&db.tasks, &ids, policy)?;
    save(db, settings, list)?;
    println!("Deleted {} task(s).", ids.len());
    Ok(())
}

pub fn cmd_dependents(db: &Database, identifiers: &[String]) -> Result<()> {
    let ids = identifiers
        .iter()
        .map(|i| db.resolve_task(i))
        .collect::<Result<Vec<_>>>()?;
    let targets: Vec<&str> = ids.iter().map(String::as_str).collect();
    let found = find_dependents(&targets, &db.tasks);
    if found.is_empty() {
        println!("No dependents.");
    }
    for d in found {
        println!(
            "{:<8} {:<5} {} <- {}",
            d.task.wbs,
            d.task.id,
            d.task.name,
            d.matched_predecessor_ids.join(",")
        );
    }
    Ok(())
}

pub fn cmd_reschedule(db: &mut Database, settings: &Settings) -> Result<()> {
    let list = reschedule(&db.tasks);
    let moved = list.iter().zip(&db.tasks).filter(|(a, b)| a != b).count();
    save(db, settings, list)?;
    println!("Rescheduled {} task(s); {} changed.", db.tasks.len(), moved);
    Ok(())
}

pub fn cmd_history(db: &mut Database, settings: &Settings, undo: bool) -> Result<()> {
    if undo {
        db.undo()?;
    } else {
        db.redo()?;
    }
    db.save(&settings.db_path)?;
    println!("{} ({} task(s)).", if undo { "Undone" } else { "Redone" }, db.tasks.len());
    Ok(())
}

/// Replace the schedule with tasks read from a JSON file.
pub fn cmd_import(db: &mut Database, settings: &Settings, input: PathBuf, strict: bool) -> Result<()> {
    let data = fs::read_to_string(&input).map_err(|e| ScheduleError::Io { path: input.clone(), source: e })?;
    let tasks: Vec<Task> = serde_json::from_str(&data).map_err(|source| ScheduleError::Parse {
        path: input.clone(),
        source,
    })?;
    if strict {
        validate_outline(&tasks)?;
    }
    validate_schedule(&tasks)?;

    let list = reschedule(&tasks);
    for task in &list {
        validate_task(task)?;
    }
    let count = list.len();
    save(db, settings, list)?;
    println!("Imported {} task(s) from {}.", count, input.display());
    Ok(())
}

pub fn cmd_export(db: &Database, output: Option<PathBuf>) -> Result<()> {
    let json = to_json(&db.tasks)?;
    match output {
        Some(path) => {
            fs::write(&path, json).map_err(|e| ScheduleError::Io { path: path.clone(), source: e })?;
            println!("Exported {} task(s) to {}.", db.tasks.len(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

fn to_json(tasks: &[Task]) -> Result<String> {
    serde_json::to_string_pretty(tasks).map_err(|source| ScheduleError::Parse {
        path: PathBuf::from("<stdout>"),
        source,
    })
}

fn print_dates(db: &Database, id: &str) -> Result<()> {
    let task = db.require(id)?;
    println!(
        "{} {}: {} to {} ({}d).",
        task.id, task.name, task.start_date, task.end_date, task.duration
    );
    Ok(())
}

/// Print tasks as an outline-indented table.
pub fn print_table(tasks: &[Task]) {
    println!(
        "{:<4} {:<10} {:<6} {:<32} {:<10} {:<10} {:>4} {:<10} {:>4}",
        "#", "WBS", "ID", "Name", "Start", "End", "Days", "Pred", "%"
    );
    for (row, t) in tasks.iter().enumerate() {
        let marker = if t.milestone { " ◆" } else { "" };
        let name = format!("{}{}{}", "  ".repeat(t.outline_level), t.name, marker);
        println!(
            "{:<4} {:<10} {:<6} {:<32} {:<10} {:<10} {:>4} {:<10} {:>4}",
            row + 1,
            t.wbs,
            t.id,
            truncate(&name, 32),
            t.start_date,
            t.end_date,
            t.duration,
            truncate(&format_serials(t), 10),
            t.progress
        );
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
        assert_eq!(truncate("", 3), "");
    }
}
