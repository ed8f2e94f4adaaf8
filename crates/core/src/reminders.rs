use chrono::Local;
use serde::{Deserialize, Serialize};

/// A single logged task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub task: String,
    pub timestamp: String,
}

/// In-memory task log.
///
/// Records have no identity beyond list position and do not survive a
/// process restart.
#[derive(Debug, Default)]
pub struct ReminderStore {
    entries: Vec<Reminder>,
}

impl ReminderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a task, stamping it with the local wall-clock time.
    pub fn add(&mut self, task: &str) -> Reminder {
        let reminder = Reminder {
            task: task.to_string(),
            timestamp: Local::now().format("%Y-%m-%d %H:%M").to_string(),
        };
        self.entries.push(reminder.clone());
        reminder
    }

    /// All records, in insertion order.
    pub fn list(&self) -> &[Reminder] {
        &self.entries
    }

    /// Removes every record, returning how many were purged.
    pub fn clear(&mut self) -> usize {
        let purged = self.entries.len();
        self.entries.clear();
        purged
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
