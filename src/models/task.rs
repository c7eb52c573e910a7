use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Task status (lifecycle state)
///
/// Stored and displayed upper case; parsed case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskStatus {
    Pending,
    Complete,
    Overdue,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Pending, TaskStatus::Complete, TaskStatus::Overdue];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Complete => "COMPLETE",
            TaskStatus::Overdue => "OVERDUE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(TaskStatus::Pending),
            "COMPLETE" => Some(TaskStatus::Complete),
            "OVERDUE" => Some(TaskStatus::Overdue),
            _ => None,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub status: TaskStatus,
}

impl Task {
    /// Create a new pending task with a fresh id
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            status: TaskStatus::Pending,
        }
    }

    /// Rebuild a task read back from storage
    pub fn with_id(id: Uuid, title: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            id,
            title: title.into(),
            status,
        }
    }

    pub fn mark_complete(&mut self) {
        self.status = TaskStatus::Complete;
    }

    pub fn is_complete(&self) -> bool {
        self.status == TaskStatus::Complete
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Task(id={}, title='{}', status={})", self.id, self.title, self.status)
    }
}
