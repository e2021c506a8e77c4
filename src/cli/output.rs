use serde::Serialize;

use crate::io::recovery::RecoveryEntry;
use crate::model::{Task, TaskSummary, format_timestamp};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskJson {
    pub id: u64,
    pub text: String,
    pub completed: bool,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct StatusJson {
    pub pending: usize,
    pub completed: usize,
    pub total: usize,
}

#[derive(Serialize)]
pub struct AddedJson {
    pub id: u64,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(task: &Task) -> TaskJson {
    TaskJson {
        id: task.id,
        text: task.text.clone(),
        completed: task.completed,
        created_at: format_timestamp(&task.created_at),
    }
}

pub fn summary_to_json(summary: TaskSummary) -> StatusJson {
    StatusJson {
        pending: summary.pending,
        completed: summary.completed(),
        total: summary.total,
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// `[x] 3 Buy milk`
pub fn format_task_line(task: &Task) -> String {
    let mark = if task.completed { 'x' } else { ' ' };
    format!("[{}] {} {}", mark, task.id, task.text)
}

pub fn format_status(summary: TaskSummary) -> Vec<String> {
    vec![summary.tooltip(), summary.footer()]
}

/// One recovery entry as shown by `tt recovery`: the header line, fields
/// indented, then the preserved content.
pub fn format_recovery_entry(entry: &RecoveryEntry) -> Vec<String> {
    let mut lines = vec![format!(
        "{} [{}] {}",
        entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
        entry.category,
        entry.description
    )];
    for (key, value) in &entry.fields {
        lines.push(format!("  {}: {}", key, value));
    }
    if !entry.body.is_empty() {
        lines.extend(entry.body.lines().map(|l| format!("    {}", l)));
    }
    lines
}
