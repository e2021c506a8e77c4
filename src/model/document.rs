use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::task::{Task, format_timestamp};

/// The on-disk shape of the task file (`tasks.json`).
///
/// Fields are kept close to the raw JSON: anything the reader can repair
/// (missing flags, missing or unparseable timestamps, a stale id counter) is
/// optional here and normalized by the store on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDocument {
    #[serde(default)]
    pub tasks: Vec<StoredTask>,
    #[serde(default)]
    pub next_task_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_saved: Option<String>,
}

/// One task as stored on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTask {
    pub id: u64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl From<&Task> for StoredTask {
    fn from(task: &Task) -> Self {
        StoredTask {
            id: task.id,
            text: task.text.clone(),
            completed: Some(task.completed),
            created_at: Some(format_timestamp(&task.created_at)),
        }
    }
}

impl TaskDocument {
    /// Snapshot a collection for writing
    pub fn snapshot(tasks: &[Task], next_task_id: u64, saved_at: DateTime<Utc>) -> Self {
        TaskDocument {
            tasks: tasks.iter().map(StoredTask::from).collect(),
            next_task_id: Some(next_task_id),
            last_saved: Some(format_timestamp(&saved_at)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn serializes_in_file_format() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let saved = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 1).unwrap();
        let task = Task {
            id: 1,
            text: "Buy milk".into(),
            completed: false,
            created_at: created,
        };
        let doc = TaskDocument::snapshot(&[task], 2, saved);
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "tasks": [
                    {"id": 1, "text": "Buy milk", "completed": false, "createdAt": "2024-01-01T00:00:00.000Z"}
                ],
                "nextTaskId": 2,
                "lastSaved": "2024-01-01T00:00:01.000Z"
            })
        );
    }

    #[test]
    fn missing_fields_default() {
        let doc: TaskDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.tasks.is_empty());
        assert_eq!(doc.next_task_id, None);
        assert_eq!(doc.last_saved, None);

        let doc: TaskDocument =
            serde_json::from_str(r#"{"tasks":[{"id":3,"text":"old"}],"nextTaskId":null}"#).unwrap();
        assert_eq!(doc.tasks[0].completed, None);
        assert_eq!(doc.tasks[0].created_at, None);
        assert_eq!(doc.next_task_id, None);
    }

    #[test]
    fn wrong_shape_is_rejected() {
        assert!(serde_json::from_str::<TaskDocument>("42").is_err());
        assert!(serde_json::from_str::<TaskDocument>(r#"{"tasks":"nope"}"#).is_err());
        assert!(serde_json::from_str::<TaskDocument>(r#"{"tasks":[{"text":"no id"}]}"#).is_err());
    }
}
