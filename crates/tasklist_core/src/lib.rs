//! Core logic for TaskList: the task store and the list/filter state it feeds.
//! Presentation code talks to this crate through `TaskListViewModel`.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::task::{is_blank_title, Task, TaskId, TaskValidationError};
pub use repo::task_repo::{SqliteTaskRepository, StoreError, StoreResult, TaskRepository};
pub use service::task_list::{FilterState, ListChange, TaskListViewModel};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
