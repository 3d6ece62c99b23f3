use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::models::{DueTask, Task, TaskDraft, TaskStatus};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Failed to create database directory: {0}")]
    Directory(String),
    #[error("Database unavailable: {0}")]
    Unavailable(String),
}

impl ToSql for TaskStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TaskStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

const TASK_COLUMNS: &str = "id, title, description, deadline, status, reminder";

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database file and initialize the schema
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db_path = path.as_ref();

        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StorageError::Directory(e.to_string()))?;
            }
        }

        let conn = Connection::open(db_path)?;
        let db = Database { conn };
        db.initialize()?;

        debug!(path = %db_path.display(), "opened task database");
        Ok(db)
    }

    /// In-memory database, mainly for tests
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let db = Database {
            conn: Connection::open_in_memory()?,
        };
        db.initialize()?;
        Ok(db)
    }

    /// Create the tasks table and its index. Safe to call repeatedly.
    pub fn initialize(&self) -> Result<(), StorageError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS tasks (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                title           TEXT NOT NULL,
                description     TEXT,
                deadline        TEXT,
                status          TEXT DEFAULT 'Pending',
                reminder        INTEGER DEFAULT 0
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_tasks_deadline ON tasks(deadline)",
            [],
        )?;

        Ok(())
    }

    /// Insert a task and return its ID.
    ///
    /// The draft is expected to have passed [`TaskDraft::validate`]; the store
    /// does not check the title again.
    pub fn create_task(&self, draft: &TaskDraft) -> Result<i64, StorageError> {
        self.conn.execute(
            "INSERT INTO tasks (title, description, deadline, status, reminder)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                draft.title,
                draft.description,
                draft.deadline,
                draft.status,
                draft.reminder
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn row_to_task(row: &rusqlite::Row) -> Result<Task, rusqlite::Error> {
        Ok(Task {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            deadline: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
            status: row.get::<_, Option<TaskStatus>>(4)?.unwrap_or_default(),
            reminder: row.get::<_, Option<bool>>(5)?.unwrap_or(false),
        })
    }

    /// Every task in insertion order
    pub fn list_tasks(&self) -> Result<Vec<Task>, StorageError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY id ASC"))?;
        let tasks = stmt
            .query_map([], Self::row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    pub fn get_task(&self, id: i64) -> Result<Option<Task>, StorageError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"))?;
        let mut rows = stmt.query_map(rusqlite::params![id], Self::row_to_task)?;
        Ok(rows.next().transpose()?)
    }

    /// Replace every field of a task. Returns the number of rows affected,
    /// which is 0 when `id` does not exist.
    pub fn update_task(&self, id: i64, draft: &TaskDraft) -> Result<usize, StorageError> {
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE tasks SET title = ?1, description = ?2, deadline = ?3,
             status = ?4, reminder = ?5 WHERE id = ?6",
            rusqlite::params![
                draft.title,
                draft.description,
                draft.deadline,
                draft.status,
                draft.reminder,
                id
            ],
        )?;
        tx.commit()?;
        Ok(changed)
    }

    pub fn delete_task(&self, id: i64) -> Result<usize, StorageError> {
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute("DELETE FROM tasks WHERE id = ?1", rusqlite::params![id])?;
        tx.commit()?;
        Ok(changed)
    }

    pub fn set_status(&self, id: i64, status: TaskStatus) -> Result<usize, StorageError> {
        let changed = self.conn.execute(
            "UPDATE tasks SET status = ?1 WHERE id = ?2",
            rusqlite::params![status, id],
        )?;
        Ok(changed)
    }

    pub fn set_reminder(&self, id: i64, enabled: bool) -> Result<usize, StorageError> {
        let changed = self.conn.execute(
            "UPDATE tasks SET reminder = ?1 WHERE id = ?2",
            rusqlite::params![enabled, id],
        )?;
        Ok(changed)
    }

    /// Flip the reminder flag and return its new value, or `None` if the
    /// task does not exist
    pub fn toggle_reminder(&self, id: i64) -> Result<Option<bool>, StorageError> {
        let changed = self.conn.execute(
            "UPDATE tasks SET reminder = CASE WHEN reminder = 1 THEN 0 ELSE 1 END WHERE id = ?1",
            rusqlite::params![id],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        let enabled: bool = self.conn.query_row(
            "SELECT reminder FROM tasks WHERE id = ?1",
            rusqlite::params![id],
            |row| row.get(0),
        )?;
        Ok(Some(enabled))
    }

    /// Non-completed tasks whose deadline is `date`, optionally only those
    /// with a reminder set
    pub fn tasks_due_on(
        &self,
        date: NaiveDate,
        require_reminder: bool,
    ) -> Result<Vec<DueTask>, StorageError> {
        let mut sql = String::from(
            "SELECT id, title FROM tasks WHERE deadline = ?1 AND status != 'Completed'",
        );
        if require_reminder {
            sql.push_str(" AND reminder = 1");
        }
        sql.push_str(" ORDER BY id ASC");

        let today = date.format("%Y-%m-%d").to_string();
        let mut stmt = self.conn.prepare(&sql)?;
        let due = stmt
            .query_map(rusqlite::params![today], |row| {
                Ok(DueTask {
                    id: row.get(0)?,
                    title: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn draft(title: &str, deadline: &str, reminder: bool) -> TaskDraft {
        TaskDraft::new(title).deadline(deadline).reminder(reminder)
    }

    #[test]
    fn initialize_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        db.create_task(&draft("a", "", false)).unwrap();
        db.initialize().unwrap();
        db.initialize().unwrap();
        assert_eq!(db.list_tasks().unwrap().len(), 1);
    }

    #[test]
    fn create_round_trips_every_field() {
        let db = Database::open_in_memory().unwrap();
        let submitted = TaskDraft::new("Write report")
            .description("Quarterly numbers")
            .deadline("2024-03-15")
            .status(TaskStatus::InProgress)
            .reminder(true);
        let id = db.create_task(&submitted).unwrap();

        let tasks = db.list_tasks().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, id);
        assert_eq!(TaskDraft::from(&tasks[0]), submitted);
    }

    #[test]
    fn list_keeps_insertion_order() {
        let db = Database::open_in_memory().unwrap();
        let ids: Vec<i64> = ["c", "a", "b"]
            .iter()
            .map(|t| db.create_task(&draft(t, "", false)).unwrap())
            .collect();
        let listed: Vec<i64> = db.list_tasks().unwrap().iter().map(|t| t.id).collect();
        assert_eq!(listed, ids);
    }

    #[test]
    fn missing_id_operations_are_no_ops() {
        let db = Database::open_in_memory().unwrap();
        let id = db.create_task(&draft("keep", "2024-01-01", true)).unwrap();
        let before = db.list_tasks().unwrap();

        let missing = id + 100;
        assert_eq!(db.update_task(missing, &draft("other", "", false)).unwrap(), 0);
        assert_eq!(db.delete_task(missing).unwrap(), 0);
        assert_eq!(db.set_status(missing, TaskStatus::Completed).unwrap(), 0);
        assert_eq!(db.set_reminder(missing, false).unwrap(), 0);
        assert_eq!(db.toggle_reminder(missing).unwrap(), None);
        assert!(db.get_task(missing).unwrap().is_none());

        assert_eq!(db.list_tasks().unwrap(), before);
    }

    #[test]
    fn toggle_reminder_flips_flag() {
        let db = Database::open_in_memory().unwrap();
        let id = db.create_task(&draft("t", "", false)).unwrap();
        assert_eq!(db.toggle_reminder(id).unwrap(), Some(true));
        assert_eq!(db.toggle_reminder(id).unwrap(), Some(false));
        assert!(!db.get_task(id).unwrap().unwrap().reminder);
    }

    #[test]
    fn due_queries_filter_on_deadline_status_and_reminder() {
        let db = Database::open_in_memory().unwrap();
        let today = date("2024-01-01");
        let remind = db.create_task(&draft("remind", "2024-01-01", true)).unwrap();
        let quiet = db.create_task(&draft("quiet", "2024-01-01", false)).unwrap();
        let done = db
            .create_task(&draft("done", "2024-01-01", true).status(TaskStatus::Completed))
            .unwrap();
        db.create_task(&draft("tomorrow", "2024-01-02", true)).unwrap();

        let with_reminder: Vec<i64> = db.tasks_due_on(today, true).unwrap().iter().map(|d| d.id).collect();
        assert_eq!(with_reminder, vec![remind]);

        let all_due: Vec<i64> = db.tasks_due_on(today, false).unwrap().iter().map(|d| d.id).collect();
        assert_eq!(all_due, vec![remind, quiet]);

        db.set_status(done, TaskStatus::Pending).unwrap();
        db.set_reminder(remind, false).unwrap();
        let with_reminder: Vec<i64> = db.tasks_due_on(today, true).unwrap().iter().map(|d| d.id).collect();
        assert_eq!(with_reminder, vec![done]);
    }

    #[test]
    fn legacy_null_columns_read_as_defaults() {
        let db = Database::open_in_memory().unwrap();
        db.conn
            .execute("INSERT INTO tasks (title, description, deadline) VALUES ('old', NULL, NULL)", [])
            .unwrap();
        let task = &db.list_tasks().unwrap()[0];
        assert_eq!(task.description, "");
        assert_eq!(task.deadline, "");
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(!task.reminder);
    }
}
