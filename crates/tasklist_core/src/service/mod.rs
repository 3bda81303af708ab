//! List/filter state fed by the task storage manager.
//!
//! # Responsibility
//! - Keep the presentation layer decoupled from storage details.

pub mod task_list;
