use std::cmp::Ordering;

use crate::model::Task;

/// Menu order: incomplete before completed, newest (highest id) first
/// within each group.
pub fn compare(a: &Task, b: &Task) -> Ordering {
    a.completed
        .cmp(&b.completed)
        .then_with(|| b.id.cmp(&a.id))
}

/// A freshly ordered view of `tasks`; the slice itself is not touched.
pub fn sorted(tasks: &[Task]) -> Vec<&Task> {
    let mut out: Vec<&Task> = tasks.iter().collect();
    out.sort_by(|a, b| compare(a, b));
    out
}

/// Index of task `id` in sorted order
pub fn position(tasks: &[Task], id: u64) -> Option<usize> {
    sorted(tasks).iter().position(|t| t.id == id)
}
