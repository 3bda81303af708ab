//! Repository layer: the task storage manager.
//!
//! # Responsibility
//! - Define the data access contract consumed by the list view model.
//! - Isolate SQLite query details from list/filter orchestration.
//!
//! # Invariants
//! - Repository writes enforce `Task::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod task_repo;
