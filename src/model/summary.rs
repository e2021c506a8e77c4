use crate::model::task::Task;

/// Pending/total counts reported to the shell after every mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskSummary {
    pub pending: usize,
    pub total: usize,
}

impl TaskSummary {
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut summary = TaskSummary::default();
        for task in tasks {
            summary.total += 1;
            if !task.completed {
                summary.pending += 1;
            }
        }
        summary
    }

    pub fn completed(&self) -> usize {
        self.total - self.pending
    }

    /// Footer line under the task list, e.g. `2/5 completed`
    pub fn footer(&self) -> String {
        format!("{}/{} completed", self.completed(), self.total)
    }

    /// Short status line for the panel tooltip / title bar
    pub fn tooltip(&self) -> String {
        match self.pending {
            0 => "Task Tab - All tasks completed!".to_string(),
            1 => "Task Tab - 1 pending task".to_string(),
            n => format!("Task Tab - {} pending tasks", n),
        }
    }
}
