use clap::{Parser, Subcommand, ValueEnum};
use thiserror::Error;
use tracing::info;

use crate::database::{Database, StorageError};
use crate::models::{TaskDraft, TaskStatus, ValidationError};
use crate::utils::{format_date, today};

#[derive(Parser)]
#[command(name = "todo")]
#[command(about = "To-do manager with deadlines and due-today reminders")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use development mode (separate config and database)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive TUI (default if no subcommand)
    Tui,
    /// Add a task
    Add {
        /// Task title
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Deadline (YYYY-MM-DD)
        #[arg(long)]
        deadline: Option<String>,
        /// Pending, "In Progress" or Completed
        #[arg(long, default_value = "Pending")]
        status: TaskStatus,
        /// Enable the due-today reminder
        #[arg(long)]
        remind: bool,
    },
    /// List all tasks
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Change a task's status
    Status { id: i64, status: TaskStatus },
    /// Turn a task's reminder on or off
    Remind { id: i64, setting: ReminderSetting },
    /// Delete a task
    Delete { id: i64 },
    /// Show tasks due today
    Due {
        /// Only tasks with a reminder set
        #[arg(long)]
        reminders: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReminderSetting {
    On,
    Off,
    Toggle,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Database error: {0}")]
    Storage(#[from] StorageError),
    #[error("Input error: {0}")]
    Validation(#[from] ValidationError),
    #[error("No task with ID {0}")]
    NotFound(i64),
    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn handle_add(
    title: String,
    description: String,
    deadline: Option<String>,
    status: TaskStatus,
    remind: bool,
    db: &Database,
) -> Result<i64, CliError> {
    let draft = TaskDraft::new(title)
        .description(description)
        .deadline(deadline.unwrap_or_default())
        .status(status)
        .reminder(remind)
        .validate()?;

    let id = db.create_task(&draft)?;
    info!(id, "task created from cli");
    println!("Task created successfully (ID: {})", id);
    Ok(id)
}

pub fn handle_list(json: bool, db: &Database) -> Result<(), CliError> {
    let tasks = db.list_tasks()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
        return Ok(());
    }

    println!("{:>4}  {:<24} {:<10} {:<11} {:<8}", "ID", "Title", "Deadline", "Status", "Reminder");
    for task in &tasks {
        println!(
            "{:>4}  {:<24} {:<10} {:<11} {:<8}",
            task.id,
            truncate(&task.title, 24),
            task.deadline,
            task.status,
            if task.reminder { "Yes" } else { "No" }
        );
    }
    println!("{} tasks", tasks.len());
    Ok(())
}

pub fn handle_status(id: i64, status: TaskStatus, db: &Database) -> Result<(), CliError> {
    if db.set_status(id, status)? == 0 {
        return Err(CliError::NotFound(id));
    }
    println!("Task {} marked as {}", id, status);
    Ok(())
}

pub fn handle_remind(id: i64, setting: ReminderSetting, db: &Database) -> Result<(), CliError> {
    let enabled = match setting {
        ReminderSetting::On | ReminderSetting::Off => {
            let enabled = setting == ReminderSetting::On;
            if db.set_reminder(id, enabled)? == 0 {
                return Err(CliError::NotFound(id));
            }
            enabled
        }
        ReminderSetting::Toggle => db.toggle_reminder(id)?.ok_or(CliError::NotFound(id))?,
    };
    println!("Reminder {}", if enabled { "enabled" } else { "disabled" });
    Ok(())
}

pub fn handle_delete(id: i64, db: &Database) -> Result<(), CliError> {
    if db.delete_task(id)? == 0 {
        return Err(CliError::NotFound(id));
    }
    println!("Task deleted successfully");
    Ok(())
}

pub fn handle_due(reminders_only: bool, db: &Database) -> Result<(), CliError> {
    let date = today();
    let due = db.tasks_due_on(date, reminders_only)?;
    if due.is_empty() {
        println!("Nothing due today ({})", format_date(date));
        return Ok(());
    }
    println!("You have {} tasks due today:", due.len());
    for task in due {
        println!("  • {} (ID: {})", task.title, task.id);
    }
    Ok(())
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        text.chars().take(max.saturating_sub(3)).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_rejects_blank_title_before_storage() {
        let db = Database::open_in_memory().unwrap();
        let result = handle_add("  ".to_string(), String::new(), None, TaskStatus::Pending, false, &db);
        assert!(matches!(result, Err(CliError::Validation(ValidationError::EmptyTitle))));
        assert!(db.list_tasks().unwrap().is_empty());
    }

    #[test]
    fn status_on_missing_task_reports_not_found() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(
            handle_status(7, TaskStatus::Completed, &db),
            Err(CliError::NotFound(7))
        ));
    }

    #[test]
    fn remind_toggle_flips_stored_flag() {
        let db = Database::open_in_memory().unwrap();
        let id = handle_add("Call bank".to_string(), String::new(), None, TaskStatus::Pending, false, &db).unwrap();
        handle_remind(id, ReminderSetting::Toggle, &db).unwrap();
        assert!(db.get_task(id).unwrap().unwrap().reminder);
        handle_remind(id, ReminderSetting::Off, &db).unwrap();
        assert!(!db.get_task(id).unwrap().unwrap().reminder);
    }

    #[test]
    fn cli_parses_status_values() {
        let cli = Cli::try_parse_from(["todo", "status", "3", "In Progress"]).unwrap();
        match cli.command {
            Some(Commands::Status { id, status }) => {
                assert_eq!(id, 3);
                assert_eq!(status, TaskStatus::InProgress);
            }
            _ => panic!("expected status command"),
        }
    }

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long title", 10), "a very ...");
    }
}
