//! File-backed schedule store and the caller-side policies around the engine.
//!
//! The engine modules are pure list-in, list-out transformations. This module
//! owns everything they leave to the caller: persistence, undo/redo snapshots,
//! input validation, cycle rejection, walking the successor fan-out after an
//! edit, and deciding what happens to links that point at deleted tasks.

use std::collections::{HashSet, VecDeque};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cycle::has_cycle;
use crate::dates::{compute_end_date, propagate};
use crate::dependents::find_dependents;
use crate::error::{Result, ScheduleError};
use crate::fields::DependentsPolicy;
use crate::outline::remove;
use crate::task::{position, Predecessor, Task};
use crate::wbs::renumber;

/// A schedule as stored on disk: the current task list plus its edit history.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Database {
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub undo: Vec<Vec<Task>>,
    #[serde(default)]
    pub redo: Vec<Vec<Task>>,
    #[serde(default)]
    pub next_seq: u64,
}

impl Database {
    /// Load a schedule from JSON. A missing file is an empty schedule.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no schedule file yet; starting empty");
            return Ok(Database::default());
        }
        let mut buf = String::new();
        File::open(path)
            .and_then(|mut f| f.read_to_string(&mut buf))
            .map_err(|e| ScheduleError::io(path, e))?;
        serde_json::from_str(&buf).map_err(|source| ScheduleError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save the schedule using an atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<()> {
        let tmp = path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(self).map_err(|source| ScheduleError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let mut f = File::create(&tmp).map_err(|e| ScheduleError::io(&tmp, e))?;
        f.write_all(data.as_bytes()).map_err(|e| ScheduleError::io(&tmp, e))?;
        f.flush().map_err(|e| ScheduleError::io(&tmp, e))?;
        fs::rename(&tmp, path).map_err(|e| ScheduleError::io(path, e))?;
        Ok(())
    }

    /// Hand out the next `T<n>` id.
    pub fn next_id(&mut self) -> Result<String> {
        let highest = self
            .tasks
            .iter()
            .filter_map(|t| t.id.strip_prefix('T').and_then(|n| n.parse::<u64>().ok()))
            .max()
            .unwrap_or(0);
        let last = self.next_seq.max(highest);
        self.next_seq = last
            .checked_add(1)
            .ok_or_else(|| ScheduleError::IdSpaceExhausted(format!("T{last}")))?;
        Ok(format!("T{}", self.next_seq))
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn require(&self, id: &str) -> Result<&Task> {
        self.get(id).ok_or_else(|| ScheduleError::TaskNotFound(id.to_string()))
    }

    /// Replace the task list, keeping the previous one as an undo snapshot.
    pub fn commit(&mut self, tasks: Vec<Task>, history_depth: usize) {
        let previous = std::mem::replace(&mut self.tasks, tasks);
        self.undo.push(previous);
        if self.undo.len() > history_depth {
            let excess = self.undo.len() - history_depth;
            self.undo.drain(..excess);
        }
        self.redo.clear();
    }

    pub fn undo(&mut self) -> Result<()> {
        let snapshot = self.undo.pop().ok_or(ScheduleError::EmptyHistory("undo"))?;
        let current = std::mem::replace(&mut self.tasks, snapshot);
        self.redo.push(current);
        Ok(())
    }

    pub fn redo(&mut self) -> Result<()> {
        let snapshot = self.redo.pop().ok_or(ScheduleError::EmptyHistory("redo"))?;
        let current = std::mem::replace(&mut self.tasks, snapshot);
        self.undo.push(current);
        Ok(())
    }

    /// Resolve a task reference typed by a person: id, WBS code or name.
    pub fn resolve_task(&self, identifier: &str) -> Result<String> {
        let identifier = identifier.trim();
        if let Some(task) = self.get(identifier) {
            return Ok(task.id.clone());
        }
        if let Some(task) = self.tasks.iter().find(|t| t.wbs == identifier) {
            return Ok(task.id.clone());
        }

        let wanted = identifier.to_lowercase();
        let matches: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|t| t.name.to_lowercase() == wanted)
            .collect();
        match matches.as_slice() {
            [] => Err(ScheduleError::TaskNotFound(identifier.to_string())),
            [task] => Ok(task.id.clone()),
            many => Err(ScheduleError::AmbiguousName {
                name: identifier.to_string(),
                count: many.len(),
            }),
        }
    }
}

/// Check the fields the engine takes on trust.
pub fn validate_task(task: &Task) -> Result<()> {
    if task.name.trim().is_empty() {
        return Err(ScheduleError::validation(&task.id, "name cannot be empty"));
    }
    if task.progress > 100 {
        return Err(ScheduleError::validation(&task.id, "progress must be between 0 and 100"));
    }
    if task.milestone && task.duration != 0 {
        return Err(ScheduleError::validation(&task.id, "a milestone has no duration"));
    }
    if task.end_date < task.start_date {
        return Err(ScheduleError::validation(&task.id, "end date is before start date"));
    }
    Ok(())
}

/// Check a whole task list before it replaces the schedule.
///
/// Ids must be unique and no predecessor link may lead back to its own
/// successor. The search in [`has_cycle`] stops as soon as it reaches the
/// successor, so the link under test is never walked and can stay in the list.
pub fn validate_schedule(tasks: &[Task]) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::new();
    for task in tasks {
        if !seen.insert(task.id.as_str()) {
            return Err(ScheduleError::DuplicateId(task.id.clone()));
        }
    }
    for task in tasks {
        for pred in &task.predecessors {
            if has_cycle(&task.id, &pred.task_id, tasks) {
                return Err(ScheduleError::CyclicDependency {
                    successor: task.id.clone(),
                    predecessor: pred.task_id.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Split candidate links into those that can be added and those that would close a cycle.
pub fn accept_predecessors(
    successor_id: &str,
    candidates: Vec<Predecessor>,
    tasks: &[Task],
) -> (Vec<Predecessor>, Vec<Predecessor>) {
    candidates
        .into_iter()
        .partition(|p| !has_cycle(successor_id, &p.task_id, tasks))
}

/// Swap an edited task into the list, matching by id.
pub fn replace_task(tasks: &[Task], edited: Task) -> Vec<Task> {
    let mut out = tasks.to_vec();
    match position(&out, &edited.id) {
        Some(i) => out[i] = edited,
        None => warn!(task = %edited.id, "replace: task not in list"),
    }
    out
}

/// Push every successor of the changed tasks forward as far as needed.
///
/// Breadth-first over the successor fan-out. A task is queued again whenever
/// its dates move. On an already-cyclic list the walk gives up after a bounded
/// number of steps.
pub fn cascade(tasks: Vec<Task>, changed: &[String]) -> Vec<Task> {
    let mut list = tasks;
    let mut queue: VecDeque<String> = changed.iter().cloned().collect();
    let limit = list.len().saturating_mul(list.len()).max(1);
    let mut steps = 0usize;

    while let Some(id) = queue.pop_front() {
        steps += 1;
        if steps > limit {
            warn!(steps, "date cascade did not settle; the schedule may contain a cycle");
            break;
        }
        for dependent in find_dependents(&[id.as_str()], &list) {
            let moved = propagate(&dependent.task, &list);
            if moved != dependent.task {
                debug!(task = %moved.id, start = %moved.start_date, via = %id, "cascaded");
                let moved_id = moved.id.clone();
                list = replace_task(&list, moved);
                queue.push_back(moved_id);
            }
        }
    }
    list
}

/// Replace one task with its edited version and carry the change to its successors.
pub fn apply_edit(tasks: &[Task], edited: Task) -> Vec<Task> {
    let id = edited.id.clone();
    cascade(replace_task(tasks, edited), &[id])
}

/// Recompute every derived field: WBS codes, serials, end dates and predecessor pushes.
pub fn reschedule(tasks: &[Task]) -> Vec<Task> {
    let mut list: Vec<Task> = renumber(tasks)
        .into_iter()
        .map(|mut t| {
            if t.milestone {
                t.duration = 0;
            }
            t.end_date = compute_end_date(t.start_date, t.duration);
            t
        })
        .collect();

    for pass in 0..=list.len() {
        let mut moved = false;
        for i in 0..list.len() {
            let next = propagate(&list[i], &list);
            if next != list[i] {
                list[i] = next;
                moved = true;
            }
        }
        if !moved {
            debug!(passes = pass + 1, "schedule settled");
            return list;
        }
    }
    warn!("schedule did not settle; it may contain a cycle");
    list
}

/// Outline descendants of a task: the rows after it that sit deeper in the tree.
pub fn collect_descendants(tasks: &[Task], id: &str) -> Vec<String> {
    let Some(i) = position(tasks, id) else {
        return Vec::new();
    };
    let level = tasks[i].outline_level;
    tasks[i + 1..]
        .iter()
        .take_while(|t| t.outline_level > level)
        .map(|t| t.id.clone())
        .collect()
}

/// Remove links to `removed` ids from every task.
pub fn detach_predecessors(tasks: &[Task], removed: &HashSet<&str>) -> Vec<Task> {
    tasks
        .iter()
        .map(|t| {
            let mut t = t.clone();
            t.predecessors.retain(|p| !removed.contains(p.task_id.as_str()));
            t
        })
        .collect()
}

/// Delete tasks, applying `policy` to survivors that still reference them.
pub fn delete_tasks(tasks: &[Task], ids: &[String], policy: DependentsPolicy) -> Result<Vec<Task>> {
    let doomed: HashSet<&str> = ids.iter().map(String::as_str).collect();
    let targets: Vec<&str> = doomed.iter().copied().collect();
    let survivors_at_risk: Vec<_> = find_dependents(&targets, tasks)
        .into_iter()
        .filter(|d| !doomed.contains(d.task.id.as_str()))
        .collect();

    let list = match policy {
        DependentsPolicy::Refuse if !survivors_at_risk.is_empty() => {
            return Err(ScheduleError::DanglingReferences {
                count: survivors_at_risk.len(),
            });
        }
        DependentsPolicy::Detach => detach_predecessors(tasks, &doomed),
        _ => {
            for d in &survivors_at_risk {
                warn!(
                    task = %d.task.id,
                    missing = ?d.matched_predecessor_ids,
                    "keeping link to deleted task"
                );
            }
            tasks.to_vec()
        }
    };

    info!(count = doomed.len(), "deleting tasks");
    Ok(remove(&targets, &list))
}
