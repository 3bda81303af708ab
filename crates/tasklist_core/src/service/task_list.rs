//! Task list view model.
//!
//! # Responsibility
//! - Own the in-memory task list and the active filtered subset.
//! - Route every list mutation through the storage manager.
//! - Report what the presentation layer must redraw.
//!
//! # Invariants
//! - In-memory state changes only after the store confirms the write, so
//!   memory and store never diverge on failure.
//! - `all_tasks` keeps insertion order; new tasks are appended at the end.
//! - While filtering, `filtered_tasks` is re-derived from the store after
//!   every mutation.

use crate::model::task::{is_blank_title, Task};
use crate::repo::task_repo::{StoreResult, TaskRepository};
use log::{debug, warn};

/// Search state of the list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FilterState {
    #[default]
    Unfiltered,
    /// Active search with a non-empty term.
    Filtered(String),
}

/// Redraw instruction returned to the presentation layer.
///
/// Row indices refer to [`TaskListViewModel::visible_tasks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListChange {
    /// Whole visible list changed.
    Reloaded,
    Inserted(usize),
    Updated(usize),
    Removed(usize),
}

/// Single source of truth for what the task list screen renders.
pub struct TaskListViewModel<R: TaskRepository> {
    repo: R,
    all_tasks: Vec<Task>,
    filtered_tasks: Vec<Task>,
    filter: FilterState,
}

impl<R: TaskRepository> TaskListViewModel<R> {
    /// Creates an empty, unfiltered view model. Call [`Self::load_all`] to
    /// populate it.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            all_tasks: Vec::new(),
            filtered_tasks: Vec::new(),
            filter: FilterState::Unfiltered,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn all_tasks(&self) -> &[Task] {
        &self.all_tasks
    }

    pub fn filtered_tasks(&self) -> &[Task] {
        &self.filtered_tasks
    }

    pub fn filter_state(&self) -> &FilterState {
        &self.filter
    }

    pub fn is_filtering(&self) -> bool {
        matches!(self.filter, FilterState::Filtered(_))
    }

    /// Collection the presentation layer should render right now.
    pub fn visible_tasks(&self) -> &[Task] {
        if self.is_filtering() {
            &self.filtered_tasks
        } else {
            &self.all_tasks
        }
    }

    pub fn task_at(&self, index: usize) -> Option<&Task> {
        self.visible_tasks().get(index)
    }

    /// Replaces the full list with the store contents.
    ///
    /// On failure the previously loaded list stays in place.
    pub fn load_all(&mut self) -> StoreResult<ListChange> {
        let tasks = self.repo.fetch_all().map_err(|err| {
            warn!("event=task_list_load module=service status=error error={err}");
            err
        })?;
        self.all_tasks = tasks;
        self.refresh_filtered();
        debug!(
            "event=task_list_load module=service status=ok count={}",
            self.all_tasks.len()
        );
        Ok(ListChange::Reloaded)
    }

    /// Applies raw search-box text.
    ///
    /// An empty term ends filtering and shows the full list again.
    pub fn search(&mut self, term: &str) -> StoreResult<ListChange> {
        if term.is_empty() {
            return Ok(self.end_search());
        }

        let tasks = self.repo.fetch_filtered(term).map_err(|err| {
            warn!("event=task_list_search module=service status=error error={err}");
            err
        })?;
        self.filtered_tasks = tasks;
        self.filter = FilterState::Filtered(term.to_string());
        debug!(
            "event=task_list_search module=service status=ok count={}",
            self.filtered_tasks.len()
        );
        Ok(ListChange::Reloaded)
    }

    /// Leaves the search session.
    pub fn end_search(&mut self) -> ListChange {
        self.filter = FilterState::Unfiltered;
        self.filtered_tasks.clear();
        ListChange::Reloaded
    }

    /// Creates a task and appends it to the full list.
    ///
    /// Returns `Ok(None)` without touching the store for blank titles. The
    /// returned signal refers to [`Self::visible_tasks`]: `Inserted(i)` when
    /// unfiltered, `Reloaded` while filtering because the filtered view is
    /// re-queried and the new row's sorted position is not tracked.
    pub fn add_task(&mut self, title: &str) -> StoreResult<Option<ListChange>> {
        if is_blank_title(title) {
            return Ok(None);
        }

        let task = self.repo.create(title)?;
        self.all_tasks.push(task);

        if self.is_filtering() {
            self.refresh_filtered();
            return Ok(Some(ListChange::Reloaded));
        }
        Ok(Some(ListChange::Inserted(self.all_tasks.len() - 1)))
    }

    /// Renames `existing`, keeping its position in the full list.
    ///
    /// Returns `Ok(None)` without touching the store for blank titles.
    pub fn update_task(
        &mut self,
        existing: &Task,
        new_title: &str,
    ) -> StoreResult<Option<ListChange>> {
        if is_blank_title(new_title) {
            return Ok(None);
        }

        self.repo.update(existing, new_title)?;

        for task in self
            .all_tasks
            .iter_mut()
            .chain(self.filtered_tasks.iter_mut())
            .filter(|task| task.same_task(existing))
        {
            task.title = new_title.to_string();
        }

        if self.is_filtering() {
            self.refresh_filtered();
            return Ok(Some(ListChange::Reloaded));
        }
        Ok(Some(
            position_of(&self.all_tasks, existing).map_or(ListChange::Reloaded, ListChange::Updated),
        ))
    }

    /// Deletes `existing` from the store, then from every in-memory list.
    pub fn delete_task(&mut self, existing: &Task) -> StoreResult<ListChange> {
        let visible_index = position_of(self.visible_tasks(), existing);

        self.repo.delete(existing)?;

        self.all_tasks.retain(|task| !task.same_task(existing));
        self.filtered_tasks.retain(|task| !task.same_task(existing));

        Ok(visible_index.map_or(ListChange::Reloaded, ListChange::Removed))
    }

    /// Deletes every task from the store, then clears the in-memory lists.
    pub fn delete_all_tasks(&mut self) -> StoreResult<ListChange> {
        self.repo.delete_all()?;
        self.all_tasks.clear();
        self.filtered_tasks.clear();
        Ok(ListChange::Reloaded)
    }

    /// Flushes the store before the process exits.
    pub fn shutdown(&self) -> StoreResult<()> {
        self.repo.save()
    }

    fn refresh_filtered(&mut self) {
        let FilterState::Filtered(term) = &self.filter else {
            return;
        };

        match self.repo.fetch_filtered(term) {
            Ok(tasks) => self.filtered_tasks = tasks,
            // Write already committed; keep the in-place edits until the next search.
            Err(err) => {
                warn!("event=task_list_refilter module=service status=error error={err}");
            }
        }
    }
}

fn position_of(tasks: &[Task], target: &Task) -> Option<usize> {
    tasks.iter().position(|task| task.same_task(target))
}
