//! Keeping a rendered task list in step with the store.
//!
//! Rebuilding the whole menu closes it and drops focus, so after the initial
//! build every mutation is described as the smallest patch that brings the
//! view back in line with [`TaskStore::list_sorted`]. The view applies the
//! patch; it never reads the store directly.

use tracing::debug;

use crate::io::storage::TaskStorage;
use crate::model::{Task, TaskSummary};
use crate::ops::sort;
use crate::ops::store::TaskStore;

/// One instruction for the view. Exactly one is produced per mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewUpdate {
    /// Replace everything with these tasks (already in menu order).
    FullRebuild(Vec<Task>),
    /// Insert a single new row at `index` within the task list. With
    /// `open_section` the list divider does not exist yet and must be
    /// created first.
    InsertOne {
        task: Task,
        index: usize,
        open_section: bool,
    },
    /// Remove the row bound to `id`. With `close_section` the list is now
    /// empty and its divider goes too.
    RemoveOne { id: u64, close_section: bool },
    /// Move existing rows into this order, reusing each row for its task.
    ReorderAll(Vec<Task>),
    /// Redraw one row in place; its position is unchanged.
    AppearanceChanged(Task),
}

/// What the host receives after a mutation: the view patch plus the new
/// pending/total counts for the panel icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub update: ViewUpdate,
    pub summary: TaskSummary,
}

/// A store together with what the view is known to look like.
pub struct Session<S> {
    store: TaskStore<S>,
    /// The view currently has a task divider
    section_open: bool,
    /// The view's layout can no longer be trusted; next change rebuilds
    stale: bool,
}

impl<S: TaskStorage> Session<S> {
    pub fn new(store: TaskStore<S>) -> Self {
        Session {
            store,
            section_open: false,
            stale: true,
        }
    }

    pub fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    /// Initial build of the view.
    pub fn start(&mut self) -> Dispatch {
        self.rebuild()
    }

    /// Forget the view's layout; the next mutation answers with a rebuild.
    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    pub fn rebuild(&mut self) -> Dispatch {
        self.stale = false;
        self.section_open = !self.store.is_empty();
        self.dispatch(ViewUpdate::FullRebuild(self.sorted_tasks()))
    }

    /// Add a task. `None` when the text is blank.
    pub fn add(&mut self, text: &str) -> Option<Dispatch> {
        let task = self.store.add_task(text).ok()?;
        if self.stale {
            return Some(self.rebuild());
        }
        let index = sort::position(self.store.tasks(), task.id).unwrap_or(0);
        let open_section = !self.section_open;
        self.section_open = true;
        Some(self.dispatch(ViewUpdate::InsertOne {
            task,
            index,
            open_section,
        }))
    }

    /// Flip a task's completed flag. `None` for an unknown id.
    pub fn toggle(&mut self, id: u64) -> Option<Dispatch> {
        let before = self.sorted_ids();
        let task = match self.store.toggle_task(id) {
            Ok(task) => task,
            Err(e) => {
                debug!("toggle ignored: {}", e);
                return None;
            }
        };
        if self.stale {
            return Some(self.rebuild());
        }
        let update = if self.sorted_ids() == before {
            ViewUpdate::AppearanceChanged(task)
        } else {
            ViewUpdate::ReorderAll(self.sorted_tasks())
        };
        Some(self.dispatch(update))
    }

    /// Delete a task. `None` for an unknown id.
    pub fn delete(&mut self, id: u64) -> Option<Dispatch> {
        let removed = match self.store.delete_task(id) {
            Ok(task) => task,
            Err(e) => {
                debug!("delete ignored: {}", e);
                return None;
            }
        };
        if self.stale {
            return Some(self.rebuild());
        }
        let close_section = self.store.is_empty();
        if close_section {
            self.section_open = false;
        }
        Some(self.dispatch(ViewUpdate::RemoveOne {
            id: removed.id,
            close_section,
        }))
    }

    /// Final save before the host goes away.
    pub fn shutdown(&self) {
        if let Err(e) = self.store.save() {
            tracing::warn!("{}; final save skipped", e);
        }
    }

    fn dispatch(&self, update: ViewUpdate) -> Dispatch {
        Dispatch {
            update,
            summary: self.store.summary(),
        }
    }

    fn sorted_tasks(&self) -> Vec<Task> {
        self.store.list_sorted().into_iter().cloned().collect()
    }

    fn sorted_ids(&self) -> Vec<u64> {
        self.store.list_sorted().iter().map(|t| t.id).collect()
    }
}
