use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::utils::parse_date;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Completed];

    /// Text stored in the `status` column and shown in the table
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            TaskStatus::Pending => TaskStatus::InProgress,
            TaskStatus::InProgress => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::Pending,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            TaskStatus::Pending => TaskStatus::Completed,
            TaskStatus::InProgress => TaskStatus::Pending,
            TaskStatus::Completed => TaskStatus::InProgress,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown task status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for TaskStatus {
    type Err = UnknownStatus;

    /// Accepts the stored text as well as the lowercase CLI spellings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "in progress" | "in-progress" | "inprogress" => Ok(TaskStatus::InProgress),
            "completed" | "done" => Ok(TaskStatus::Completed),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title cannot be empty")]
    EmptyTitle,
    #[error("Invalid deadline '{0}', expected YYYY-MM-DD")]
    InvalidDeadline(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub deadline: String, // ISO 8601: YYYY-MM-DD, or empty
    pub status: TaskStatus,
    pub reminder: bool,
}

/// Every task field except the store-assigned id
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub deadline: String,
    pub status: TaskStatus,
    pub reminder: bool,
}

/// A task matched by a due-today query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DueTask {
    pub id: i64,
    pub title: String,
}

/// How a task row is colored in the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Completed,
    InProgress,
    Pending,
    DueToday,
    Overdue,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn deadline(mut self, deadline: impl Into<String>) -> Self {
        self.deadline = deadline.into();
        self
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn reminder(mut self, reminder: bool) -> Self {
        self.reminder = reminder;
        self
    }

    /// Trim the free-text fields and check them before they reach the store.
    ///
    /// The deadline must be empty or a zero-padded ISO date, otherwise the
    /// lexicographic comparison against today's date would be meaningless.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        self.title = self.title.trim().to_string();
        self.description = self.description.trim().to_string();
        self.deadline = self.deadline.trim().to_string();

        if self.title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if !self.deadline.is_empty() {
            let parsed = parse_date(&self.deadline)
                .map_err(|_| ValidationError::InvalidDeadline(self.deadline.clone()))?;
            // chrono accepts "2024-1-5"; the stored form must be canonical
            if parsed.format("%Y-%m-%d").to_string() != self.deadline {
                return Err(ValidationError::InvalidDeadline(self.deadline));
            }
        }
        Ok(self)
    }
}

impl From<&Task> for TaskDraft {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            deadline: task.deadline.clone(),
            status: task.status,
            reminder: task.reminder,
        }
    }
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Classify the task against `today` (YYYY-MM-DD)
    pub fn urgency(&self, today: &str) -> Urgency {
        if self.is_completed() {
            return Urgency::Completed;
        }
        if self.deadline == today {
            Urgency::DueToday
        } else if !self.deadline.is_empty() && self.deadline.as_str() < today {
            Urgency::Overdue
        } else if self.status == TaskStatus::InProgress {
            Urgency::InProgress
        } else {
            Urgency::Pending
        }
    }
}
