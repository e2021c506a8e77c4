use std::collections::HashMap;

use crate::model::{Task, TaskSummary};
use crate::ops::sync::{Dispatch, ViewUpdate};

/// Identity of a row. Survives reorders so per-row state (selection,
/// highlight) follows the task instead of the position.
pub type WidgetId = u64;

/// Ticks a newly inserted row stays highlighted
pub const FLASH_TICKS: u8 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItem {
    Header,
    Separator,
    /// The "add a new task" input
    Entry,
    /// Divider between the input and the task rows, only while tasks exist
    TaskDivider,
    Task(TaskRow),
    FooterDivider,
    /// `x/y completed`
    Footer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub widget: WidgetId,
    pub task: Task,
    /// Remaining highlight ticks after insertion
    pub flash: u8,
}

/// The panel menu as a flat list of items, patched by [`ViewUpdate`]s.
#[derive(Debug, Clone)]
pub struct Menu {
    items: Vec<MenuItem>,
    next_widget: WidgetId,
    summary: TaskSummary,
}

impl Default for Menu {
    fn default() -> Self {
        Menu::new()
    }
}

impl Menu {
    pub fn new() -> Self {
        Menu {
            items: vec![MenuItem::Header, MenuItem::Separator, MenuItem::Entry],
            next_widget: 1,
            summary: TaskSummary::default(),
        }
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn summary(&self) -> TaskSummary {
        self.summary
    }

    pub fn task_rows(&self) -> impl Iterator<Item = &TaskRow> {
        self.items.iter().filter_map(|item| match item {
            MenuItem::Task(row) => Some(row),
            _ => None,
        })
    }

    pub fn task_ids(&self) -> Vec<u64> {
        self.task_rows().map(|r| r.task.id).collect()
    }

    pub fn task_count(&self) -> usize {
        self.task_rows().count()
    }

    /// Position of `id` among the task rows
    pub fn row_index(&self, id: u64) -> Option<usize> {
        self.task_rows().position(|r| r.task.id == id)
    }

    pub fn widget_index(&self, widget: WidgetId) -> Option<usize> {
        self.task_rows().position(|r| r.widget == widget)
    }

    pub fn row(&self, index: usize) -> Option<&TaskRow> {
        self.task_rows().nth(index)
    }

    pub fn has_section(&self) -> bool {
        self.items.contains(&MenuItem::TaskDivider)
    }

    pub fn footer_text(&self) -> String {
        self.summary.footer()
    }

    pub fn apply(&mut self, dispatch: Dispatch) {
        self.summary = dispatch.summary;
        match dispatch.update {
            ViewUpdate::FullRebuild(tasks) => self.rebuild(tasks),
            ViewUpdate::InsertOne {
                task,
                index,
                open_section,
            } => self.insert(task, index, open_section),
            ViewUpdate::RemoveOne { id, close_section } => self.remove(id, close_section),
            ViewUpdate::ReorderAll(tasks) => self.reorder(tasks),
            ViewUpdate::AppearanceChanged(task) => self.refresh(task),
        }
    }

    /// Age the insertion highlight by one tick.
    pub fn tick(&mut self) {
        for item in &mut self.items {
            if let MenuItem::Task(row) = item {
                row.flash = row.flash.saturating_sub(1);
            }
        }
    }

    fn rebuild(&mut self, tasks: Vec<Task>) {
        self.items.truncate(3);
        if tasks.is_empty() {
            return;
        }
        self.items.push(MenuItem::TaskDivider);
        for task in tasks {
            let row = self.new_row(task, 0);
            self.items.push(MenuItem::Task(row));
        }
        self.items.push(MenuItem::FooterDivider);
        self.items.push(MenuItem::Footer);
    }

    fn insert(&mut self, task: Task, index: usize, open_section: bool) {
        if open_section || !self.has_section() {
            self.open_section();
        }
        let start = self.task_start();
        let at = (start + index).min(self.task_end());
        let row = self.new_row(task, FLASH_TICKS);
        self.items.insert(at, MenuItem::Task(row));
    }

    fn remove(&mut self, id: u64, close_section: bool) {
        self.items
            .retain(|item| !matches!(item, MenuItem::Task(row) if row.task.id == id));
        if close_section {
            self.close_section();
        }
    }

    /// Re-place existing rows in the given order, keeping their identity.
    fn reorder(&mut self, tasks: Vec<Task>) {
        let start = self.task_start();
        let end = self.task_end();
        let mut rows: HashMap<u64, TaskRow> = self
            .items
            .drain(start..end)
            .filter_map(|item| match item {
                MenuItem::Task(row) => Some((row.task.id, row)),
                _ => None,
            })
            .collect();

        let mut placed = Vec::with_capacity(tasks.len());
        for task in tasks {
            let row = match rows.remove(&task.id) {
                Some(mut row) => {
                    row.task = task;
                    row
                }
                None => self.new_row(task, FLASH_TICKS),
            };
            placed.push(MenuItem::Task(row));
        }

        if placed.is_empty() {
            self.close_section();
        } else {
            if !self.has_section() {
                self.open_section();
            }
            let at = self.task_start();
            self.items.splice(at..at, placed);
        }
    }

    fn refresh(&mut self, task: Task) {
        for item in &mut self.items {
            if let MenuItem::Task(row) = item
                && row.task.id == task.id
            {
                row.task = task;
                return;
            }
        }
    }

    fn open_section(&mut self) {
        if self.has_section() {
            return;
        }
        let entry = self.entry_index();
        self.items.insert(entry + 1, MenuItem::TaskDivider);
        let end = self.task_end();
        self.items.insert(end, MenuItem::FooterDivider);
        self.items.insert(end + 1, MenuItem::Footer);
    }

    fn close_section(&mut self) {
        self.items.retain(|item| {
            !matches!(
                item,
                MenuItem::TaskDivider | MenuItem::FooterDivider | MenuItem::Footer
            )
        });
    }

    fn entry_index(&self) -> usize {
        self.items
            .iter()
            .position(|item| *item == MenuItem::Entry)
            .unwrap_or(self.items.len().saturating_sub(1))
    }

    /// First item index of the task rows
    fn task_start(&self) -> usize {
        self.items
            .iter()
            .position(|item| *item == MenuItem::TaskDivider)
            .unwrap_or_else(|| self.entry_index())
            + 1
    }

    /// One past the last task row
    fn task_end(&self) -> usize {
        let start = self.task_start();
        self.items[start..]
            .iter()
            .position(|item| !matches!(item, MenuItem::Task(_)))
            .map_or(self.items.len(), |offset| start + offset)
    }

    fn new_row(&mut self, task: Task, flash: u8) -> TaskRow {
        let widget = self.next_widget;
        self.next_widget += 1;
        TaskRow {
            widget,
            task,
            flash,
        }
    }
}
