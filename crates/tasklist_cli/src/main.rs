//! CLI smoke probe for `tasklist_core`.
//!
//! Resolves `TASKLIST_*` configuration, starts logging, reads the configured
//! store, then runs one create/search/delete cycle through the view model
//! against an in-memory store so the configured file is only read.

use std::process::ExitCode;
use tasklist_core::db::migrations::latest_version;
use tasklist_core::db::open_db_in_memory;
use tasklist_core::{
    init_logging_from_config, CoreConfig, SqliteTaskRepository, TaskListViewModel,
};

fn main() -> ExitCode {
    println!("tasklist_core version={}", tasklist_core::core_version());
    println!("tasklist_core schema_version={}", latest_version());

    let config = match CoreConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("tasklist_core config error: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("tasklist_core logging disabled: {err}");
    }

    match configured_store_summary(&config) {
        Ok(summary) => println!("tasklist_core store={summary}"),
        Err(err) => {
            eprintln!(
                "tasklist_core store `{}` unreadable: {err}",
                config.db_path.display()
            );
            return ExitCode::FAILURE;
        }
    }

    match in_memory_cycle() {
        Ok(summary) => {
            println!("tasklist_core cycle={summary}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("tasklist_core cycle failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn configured_store_summary(config: &CoreConfig) -> Result<String, Box<dyn std::error::Error>> {
    let conn = config.open_store()?;
    let repo = SqliteTaskRepository::new(&conn);
    let mut list = TaskListViewModel::new(&repo);
    list.load_all()?;

    Ok(format!(
        "{} tasks={}",
        config.db_path.display(),
        list.all_tasks().len()
    ))
}

fn in_memory_cycle() -> Result<String, Box<dyn std::error::Error>> {
    let conn = open_db_in_memory()?;
    let repo = SqliteTaskRepository::new(&conn);
    let mut list = TaskListViewModel::new(&repo);

    list.load_all()?;
    list.add_task("smoke task")?;
    list.search("SMOKE")?;
    let matched = list.visible_tasks().len();
    list.delete_all_tasks()?;
    list.shutdown()?;

    Ok(format!("ok matched={matched}"))
}
