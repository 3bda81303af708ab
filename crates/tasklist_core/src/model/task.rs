//! Task domain model.
//!
//! # Responsibility
//! - Define the single persisted record of the task list.
//! - Provide the case-insensitive search predicate shared by store and view.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - A persisted task always has a non-empty `title`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a task, assigned once at creation.
pub type TaskId = Uuid;

/// Validation failures for task invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Title is empty or whitespace-only.
    EmptyTitle,
    /// Nil UUID cannot identify a task.
    NilId,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title cannot be empty"),
            Self::NilId => write!(f, "task id cannot be the nil uuid"),
        }
    }
}

impl Error for TaskValidationError {}

/// One entry of the task list.
///
/// Equality covers both `id` and `title`; use [`Task::same_task`] to compare
/// identity only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
}

impl Task {
    /// Creates a task with a freshly generated id.
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), title)
    }

    /// Creates a task with a caller-provided id.
    ///
    /// Does not validate; call [`Task::validate`] before persisting.
    pub fn with_id(id: TaskId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }

    /// Checks the persistence invariants of this task.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.is_nil() {
            return Err(TaskValidationError::NilId);
        }
        if is_blank_title(&self.title) {
            return Err(TaskValidationError::EmptyTitle);
        }
        Ok(())
    }

    /// Returns whether both values refer to the same stored task.
    pub fn same_task(&self, other: &Task) -> bool {
        self.id == other.id
    }

    /// Case-insensitive substring match of `term` against the title.
    ///
    /// An empty term matches every task.
    pub fn matches_search(&self, term: &str) -> bool {
        if term.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&term.to_lowercase())
    }
}

/// Returns `true` for titles that must never reach the store.
pub fn is_blank_title(title: &str) -> bool {
    title.trim().is_empty()
}
