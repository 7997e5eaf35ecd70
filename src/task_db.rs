use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;
use thiserror::Error;

use crate::models::{CreateTaskRequest, Task, UpdateTaskRequest};

const SCHEMA_TASKS: &str = "CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT,
    completed BOOLEAN NOT NULL DEFAULT 0,
    due_date TIMESTAMP,
    reminder_date TIMESTAMP,
    created_at TIMESTAMP NOT NULL,
    updated_at TIMESTAMP NOT NULL
);";

const TASK_COLUMNS: &str =
    "id, title, description, completed, due_date, reminder_date, created_at, updated_at";

#[derive(Debug, Error)]
pub enum DbError {
    #[error("task {0} not found")]
    NotFound(i64),
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

/// The task store: one relational `tasks` table behind a SQLite connection.
///
/// Every public method is a single statement against the connection, held
/// under the mutex for the duration of that statement only. Mutations return
/// the canonical row via RETURNING so callers never re-read after writing.
pub struct TaskDb {
    conn: Mutex<Connection>,
}

impl TaskDb {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA_TASKS)?;
        Ok(TaskDb { conn: Mutex::new(conn) })
    }

    /// Inserts a new task with completed=false and created_at == updated_at.
    pub fn insert(&self, input: &CreateTaskRequest) -> Result<Task, DbError> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO tasks (title, description, completed, due_date, reminder_date, created_at, updated_at) \
             VALUES (?1, ?2, 0, ?3, ?4, ?5, ?5) RETURNING {}",
            TASK_COLUMNS
        );
        let conn = self.conn.lock();
        let task = conn.query_row(
            &sql,
            params![
                input.title,
                input.description,
                opt_ts(&input.due_date),
                opt_ts(&input.reminder_date),
                ts(&now)
            ],
            map_task,
        )?;
        Ok(task)
    }

    /// Every row, newest first. id breaks created_at ties deterministically.
    pub fn fetch_all(&self) -> Result<Vec<Task>, DbError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM tasks ORDER BY created_at DESC, id DESC",
            TASK_COLUMNS
        ))?;
        let rows = stmt.query_map([], map_task)?;
        let mut tasks = Vec::new();
        for task in rows {
            tasks.push(task?);
        }
        Ok(tasks)
    }

    /// A missing id is `Ok(None)`, not an error.
    pub fn get_by_id(&self, id: i64) -> Result<Option<Task>, DbError> {
        let conn = self.conn.lock();
        let task = conn
            .query_row(
                &format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS),
                params![id],
                map_task,
            )
            .optional()?;
        Ok(task)
    }

    /// Applies the present fields of `changes` and refreshes updated_at, as
    /// one UPDATE statement. updated_at is bumped even when `changes` carries
    /// no fields at all.
    pub fn update(&self, id: i64, changes: &UpdateTaskRequest) -> Result<Task, DbError> {
        let now = Utc::now();
        let mut sets: Vec<&str> = vec!["updated_at = ?"];
        let mut values: Vec<Value> = vec![ts(&now)];
        if let Some(Some(title)) = &changes.title {
            sets.push("title = ?");
            values.push(Value::from(title.clone()));
        }
        if let Some(description) = &changes.description {
            sets.push("description = ?");
            values.push(description.clone().map_or(Value::Null, Value::from));
        }
        if let Some(completed) = changes.completed {
            sets.push("completed = ?");
            values.push(Value::from(completed));
        }
        if let Some(due_date) = &changes.due_date {
            sets.push("due_date = ?");
            values.push(opt_ts(due_date));
        }
        if let Some(reminder_date) = &changes.reminder_date {
            sets.push("reminder_date = ?");
            values.push(opt_ts(reminder_date));
        }
        values.push(Value::from(id));

        let sql = format!(
            "UPDATE tasks SET {} WHERE id = ? RETURNING {}",
            sets.join(", "),
            TASK_COLUMNS
        );
        let conn = self.conn.lock();
        conn.query_row(&sql, params_from_iter(values), map_task)
            .map_err(|e| not_found_on_empty(e, id))
    }

    /// Flips `completed` in place. The negation happens inside the statement
    /// so two concurrent toggles cannot both read the old value.
    pub fn toggle(&self, id: i64) -> Result<Task, DbError> {
        let now = Utc::now();
        let sql = format!(
            "UPDATE tasks SET completed = NOT completed, updated_at = ?2 WHERE id = ?1 RETURNING {}",
            TASK_COLUMNS
        );
        let conn = self.conn.lock();
        conn.query_row(&sql, params![id, ts(&now)], map_task)
            .map_err(|e| not_found_on_empty(e, id))
    }

    /// Permanent removal. Deleting an id that does not exist is an error, so
    /// a repeated delete of the same id fails.
    pub fn delete(&self, id: i64) -> Result<(), DbError> {
        let conn = self.conn.lock();
        let affected = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(DbError::NotFound(id));
        }
        Ok(())
    }
}

// Timestamps are stored as fixed-width RFC 3339 UTC text so that the string
// order of created_at matches chronological order.
fn ts(dt: &DateTime<Utc>) -> Value {
    Value::from(dt.to_rfc3339_opts(SecondsFormat::Micros, false))
}

fn opt_ts(dt: &Option<DateTime<Utc>>) -> Value {
    dt.as_ref().map_or(Value::Null, ts)
}

fn map_task(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        completed: row.get(3)?,
        due_date: row.get(4)?,
        reminder_date: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn not_found_on_empty(e: rusqlite::Error, id: i64) -> DbError {
    match e {
        rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(id),
        e => DbError::Sqlite(e),
    }
}
