//! Task storage manager contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the CRUD and search APIs over the `tasks` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Every mutating call commits through [`TaskRepository::save`] before it
//!   returns; a failed call leaves the store unchanged.
//! - Write paths call `Task::validate()` before SQL mutations.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - `fetch_all` order is insertion order (`seq ASC`).

use crate::db::DbError;
use crate::model::task::{Task, TaskId, TaskValidationError};
use log::{debug, error, info, warn};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT uuid, title FROM tasks";

pub type StoreResult<T> = Result<T, StoreError>;

/// Error for task persistence and query operations.
#[derive(Debug)]
pub enum StoreError {
    Validation(TaskValidationError),
    Db(DbError),
    NotFound(TaskId),
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<TaskValidationError> for StoreError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage manager interface for the task list.
pub trait TaskRepository {
    /// Returns every task in insertion order.
    fn fetch_all(&self) -> StoreResult<Vec<Task>>;
    /// Returns tasks whose title contains `term` (case-insensitive), sorted
    /// ascending by title with insertion order breaking ties.
    fn fetch_filtered(&self, term: &str) -> StoreResult<Vec<Task>>;
    /// Looks up one task by id; `None` when it does not exist.
    fn get(&self, id: TaskId) -> StoreResult<Option<Task>>;
    /// Returns the number of stored tasks.
    fn count(&self) -> StoreResult<u64>;
    /// Persists a new task with a fresh id and returns it.
    fn create(&self, title: &str) -> StoreResult<Task>;
    /// Replaces the title of the task identified by `task.id`.
    fn update(&self, task: &Task, new_title: &str) -> StoreResult<()>;
    /// Removes the task identified by `task.id`; `NotFound` when absent.
    fn delete(&self, task: &Task) -> StoreResult<()>;
    /// Removes every task in one statement. Succeeds on an empty store.
    fn delete_all(&self) -> StoreResult<()>;
    /// Flushes pending writes. No-op when nothing is pending.
    fn save(&self) -> StoreResult<()>;
}

impl<R: TaskRepository + ?Sized> TaskRepository for &R {
    fn fetch_all(&self) -> StoreResult<Vec<Task>> {
        (**self).fetch_all()
    }

    fn fetch_filtered(&self, term: &str) -> StoreResult<Vec<Task>> {
        (**self).fetch_filtered(term)
    }

    fn get(&self, id: TaskId) -> StoreResult<Option<Task>> {
        (**self).get(id)
    }

    fn count(&self) -> StoreResult<u64> {
        (**self).count()
    }

    fn create(&self, title: &str) -> StoreResult<Task> {
        (**self).create(title)
    }

    fn update(&self, task: &Task, new_title: &str) -> StoreResult<()> {
        (**self).update(task, new_title)
    }

    fn delete(&self, task: &Task) -> StoreResult<()> {
        (**self).delete(task)
    }

    fn delete_all(&self) -> StoreResult<()> {
        (**self).delete_all()
    }

    fn save(&self) -> StoreResult<()> {
        (**self).save()
    }
}

/// SQLite-backed task repository.
///
/// Borrows a connection opened by [`crate::db::open_db`]; one instance is
/// built at startup and handed to whoever owns the list state.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Runs `op` inside an immediate write transaction and commits it with
    /// `save`. Rolls back on any error after the transaction was opened.
    ///
    /// A failed `BEGIN` (for example a transaction already open on the shared
    /// connection) is returned as-is; the caller's transaction is left alone.
    fn write<T>(
        &self,
        event: &'static str,
        op: impl FnOnce(&Connection) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let started_at = Instant::now();
        if let Err(err) = self.conn.execute_batch("BEGIN IMMEDIATE;") {
            error!(
                "event={event} module=repo status=error duration_ms={} error_code=begin_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }

        let outcome = op(self.conn).and_then(|value| self.save().map(|()| value));

        match outcome {
            Ok(value) => {
                info!(
                    "event={event} module=repo status=ok duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(value)
            }
            Err(err) => {
                self.rollback();
                error!(
                    "event={event} module=repo status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    fn rollback(&self) {
        if self.conn.is_autocommit() {
            return;
        }
        if let Err(err) = self.conn.execute_batch("ROLLBACK;") {
            warn!("event=task_rollback module=repo status=error error={err}");
        }
    }

    fn query_tasks(&self, sql: &str) -> StoreResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();

        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn fetch_all(&self) -> StoreResult<Vec<Task>> {
        let tasks = self.query_tasks(&format!("{TASK_SELECT_SQL} ORDER BY seq ASC;"))?;
        debug!(
            "event=task_fetch_all module=repo status=ok count={}",
            tasks.len()
        );
        Ok(tasks)
    }

    fn fetch_filtered(&self, term: &str) -> StoreResult<Vec<Task>> {
        // SQLite lower()/LIKE only fold ASCII, so matching happens in Rust.
        let mut tasks = self.query_tasks(&format!("{TASK_SELECT_SQL} ORDER BY seq ASC;"))?;
        tasks.retain(|task| task.matches_search(term));
        tasks.sort_by(|left, right| left.title.cmp(&right.title));
        debug!(
            "event=task_fetch_filtered module=repo status=ok term_chars={} count={}",
            term.chars().count(),
            tasks.len()
        );
        Ok(tasks)
    }

    fn get(&self, id: TaskId) -> StoreResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }

        Ok(None)
    }

    fn count(&self) -> StoreResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tasks;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| StoreError::InvalidData(format!("negative task count `{count}`")))
    }

    fn create(&self, title: &str) -> StoreResult<Task> {
        let task = Task::new(title);
        task.validate()?;

        self.write("task_create", |conn| {
            conn.execute(
                "INSERT INTO tasks (uuid, title) VALUES (?1, ?2);",
                params![task.id.to_string(), task.title.as_str()],
            )?;
            Ok(())
        })?;

        Ok(task)
    }

    fn update(&self, task: &Task, new_title: &str) -> StoreResult<()> {
        Task::with_id(task.id, new_title).validate()?;

        self.write("task_update", |conn| {
            let changed = conn.execute(
                "UPDATE tasks
                 SET
                    title = ?1,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = ?2;",
                params![new_title, task.id.to_string()],
            )?;

            if changed == 0 {
                return Err(StoreError::NotFound(task.id));
            }
            Ok(())
        })
    }

    fn delete(&self, task: &Task) -> StoreResult<()> {
        self.write("task_delete", |conn| {
            let changed = conn.execute("DELETE FROM tasks WHERE uuid = ?1;", [task.id.to_string()])?;

            if changed == 0 {
                return Err(StoreError::NotFound(task.id));
            }
            Ok(())
        })
    }

    fn delete_all(&self) -> StoreResult<()> {
        let removed = self.write("task_delete_all", |conn| {
            Ok(conn.execute("DELETE FROM tasks;", [])?)
        })?;
        debug!("event=task_delete_all module=repo status=ok removed={removed}");
        Ok(())
    }

    fn save(&self) -> StoreResult<()> {
        if self.conn.is_autocommit() {
            return Ok(());
        }
        self.conn.execute_batch("COMMIT;")?;
        Ok(())
    }
}

fn parse_task_row(row: &Row<'_>) -> StoreResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        StoreError::InvalidData(format!("invalid uuid value `{uuid_text}` in tasks.uuid"))
    })?;

    let task = Task::with_id(id, row.get::<_, String>("title")?);
    task.validate()?;
    Ok(task)
}
