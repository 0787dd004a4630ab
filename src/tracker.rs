//! Task log and timer state machine.
//!
//! `Tracker` is the single application-state object: the activity registry,
//! the ordered log of completed records, and the timer. The timer is a tagged
//! state, `Idle` or `Running`, so at most one in-progress task can exist and
//! the log never contains an unfinished record.

use chrono::{DateTime, Duration, Local};

use crate::activity::ActivityRegistry;
use crate::error::{Error, Result};

/// Stable identity for a completed record. Assigned once when the record is
/// appended; deletion is keyed by id, never by list position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(u64);

impl RecordId {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// One timed interval of an activity. Immutable once in the log, except for
/// deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub id: RecordId,
    pub activity: String,
    pub started_at: DateTime<Local>,
    pub ended_at: DateTime<Local>,
    pub comment: String,
}

/// The in-progress task carried by `TimerState::Running`. Only the comment
/// is mutable while running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInProgress {
    pub activity: String,
    pub started_at: DateTime<Local>,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TimerState {
    #[default]
    Idle,
    Running(TaskInProgress),
}

/// Application state: registry + log + timer.
#[derive(Debug, Clone, Default)]
pub struct Tracker {
    registry: ActivityRegistry,
    records: Vec<TaskRecord>,
    timer: TimerState,
    next_record_id: u64,
}

impl Tracker {
    /// Tracker seeded with the default activity list.
    pub fn new() -> Self {
        Self {
            registry: ActivityRegistry::with_defaults(),
            records: Vec::new(),
            timer: TimerState::Idle,
            next_record_id: 0,
        }
    }

    pub fn registry(&self) -> &ActivityRegistry {
        &self.registry
    }

    pub fn records(&self) -> &[TaskRecord] {
        &self.records
    }

    pub fn timer(&self) -> &TimerState {
        &self.timer
    }

    pub fn running(&self) -> Option<&TaskInProgress> {
        match &self.timer {
            TimerState::Running(task) => Some(task),
            TimerState::Idle => None,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.timer, TimerState::Running(_))
    }

    /// Elapsed time of the running task at `now`. Derived for display only.
    pub fn elapsed_at(&self, now: DateTime<Local>) -> Option<Duration> {
        self.running().map(|task| now - task.started_at)
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed_at(Local::now())
    }

    /// Start tracking `activity` at `now` with an empty comment.
    pub fn start_at(&mut self, activity: &str, now: DateTime<Local>) -> Result<()> {
        if let Some(task) = self.running() {
            return Err(Error::TaskAlreadyRunning(task.activity.clone()));
        }
        self.timer = TimerState::Running(TaskInProgress {
            activity: activity.to_string(),
            started_at: now,
            comment: String::new(),
        });
        Ok(())
    }

    pub fn start(&mut self, activity: &str) -> Result<()> {
        self.start_at(activity, Local::now())
    }

    /// Replace the running task's comment.
    pub fn set_comment(&mut self, text: &str) -> Result<()> {
        match &mut self.timer {
            TimerState::Running(task) => {
                task.comment = text.to_string();
                Ok(())
            }
            TimerState::Idle => Err(Error::NoActiveTask),
        }
    }

    /// End the running task at `now`, append the snapshot to the log and
    /// return it.
    pub fn end_at(&mut self, now: DateTime<Local>) -> Result<TaskRecord> {
        let task = match std::mem::take(&mut self.timer) {
            TimerState::Running(task) => task,
            TimerState::Idle => return Err(Error::NoActiveTask),
        };
        let record = TaskRecord {
            id: self.allocate_record_id(),
            activity: task.activity,
            started_at: task.started_at,
            ended_at: now,
            comment: task.comment,
        };
        self.records.push(record.clone());
        Ok(record)
    }

    pub fn end(&mut self) -> Result<TaskRecord> {
        self.end_at(Local::now())
    }

    /// Delete records by id. Unknown ids are ignored. Returns the number
    /// removed. The running task is untouched.
    pub fn delete_records(&mut self, ids: &[RecordId]) -> usize {
        let before = self.records.len();
        self.records.retain(|record| !ids.contains(&record.id));
        before - self.records.len()
    }

    /// Empty the log unconditionally. The running task is untouched.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Add an activity to the registry.
    pub fn add_activity(&mut self, name: &str) -> Result<()> {
        self.registry.add(name)
    }

    /// Remove an activity and every historical record referencing it.
    /// Returns the number of records removed. Fails while the running task
    /// references the activity.
    pub fn remove_activity(&mut self, name: &str) -> Result<usize> {
        if let Some(task) = self.running() {
            if task.activity == name {
                return Err(Error::ActivityInUse(name.to_string()));
            }
        }
        if !self.registry.remove(name) {
            return Ok(0);
        }
        let before = self.records.len();
        self.records.retain(|record| record.activity != name);
        Ok(before - self.records.len())
    }

    pub fn set_activity_color(&mut self, name: &str, color: &str) {
        self.registry.set_color(name, color);
    }

    fn allocate_record_id(&mut self) -> RecordId {
        let id = RecordId(self.next_record_id);
        self.next_record_id += 1;
        id
    }
}
