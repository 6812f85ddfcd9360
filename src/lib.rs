//! # project_schedule
//!
//! Outline-based task scheduling: the engine behind a project table and its
//! timeline.
//!
//! A schedule is a plain `Vec<Task>` kept in depth-first outline order. The
//! engine is a set of pure functions over that list: every call takes the
//! current list and hands back a fresh one, so callers can keep the old one as
//! an undo snapshot.
//!
//! - [`wbs::renumber`] derives dotted WBS codes ("2.3.1") from outline levels.
//! - [`dates::propagate`] pushes a task past the end of its finish-to-start
//!   predecessors; [`propagate`] wraps it for duration, start and link edits.
//! - [`cycle::has_cycle`] answers whether a proposed link would close a loop.
//! - [`outline`] indents, outdents, inserts and removes rows.
//! - [`dependents::find_dependents`] lists tasks that reference a set of tasks,
//!   so a delete can be blocked or repaired first.
//!
//! ```
//! use chrono::NaiveDate;
//! use project_schedule::dates::propagate;
//! use project_schedule::task::Task;
//!
//! let jan = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
//! let a = Task::new("A", "Foundations", jan(1)).with_duration(5);
//! let b = Task::new("B", "Walls", jan(1)).with_duration(3).with_predecessor("A");
//!
//! let b = propagate(&b, &[a, b.clone()]);
//! assert_eq!((b.start_date, b.end_date), (jan(6), jan(8)));
//! ```
//!
//! Everything else in the crate (`db`, `cmd`, `cli`, `config`, `logging`) is the
//! `pms` command-line caller: a JSON file store with undo/redo that walks the
//! successor fan-out after each edit.

pub mod cli;
pub mod cmd;
pub mod config;
pub mod cycle;
pub mod dates;
pub mod db;
pub mod dependents;
pub mod error;
pub mod fields;
pub mod logging;
pub mod outline;
pub mod propagate;
pub mod serial;
pub mod task;
pub mod wbs;

pub use error::{Result, ScheduleError};
pub use task::{Predecessor, Task};
