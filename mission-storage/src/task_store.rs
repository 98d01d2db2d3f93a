//! Suggested-task store backed by `state/suggested-tasks.json`.
//!
//! The document is rewritten whole on every review. Reviews go through
//! the workspace writer lock so concurrent approvals cannot lose each
//! other's updates. The rewrite works on the raw JSON document, so fields
//! this crate does not model survive a round trip.

use crate::error::{StorageError, StorageResult};
use crate::workspace::Workspace;
use chrono::Utc;
use mission_core::fallback::{self, iso};
use mission_core::ops::decode_records;
use mission_core::{SuggestedTask, TaskAction};
use serde_json::{json, Map, Value};
use std::path::PathBuf;

/// Tasks as served by the list endpoint.
#[derive(Debug, Clone)]
pub struct TaskList {
    pub tasks: Vec<SuggestedTask>,
    /// True when nothing usable was on disk.
    pub from_fallback: bool,
}

#[derive(Debug, Clone)]
pub struct TaskStore {
    workspace: Workspace,
}

impl TaskStore {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    pub fn path(&self) -> PathBuf {
        self.workspace.path(["state", "suggested-tasks.json"])
    }

    fn fallback_tasks() -> Vec<Value> {
        fallback::tasks(Utc::now())
            .iter()
            .filter_map(|task| serde_json::to_value(task).ok())
            .collect()
    }

    /// Raw document, or `None` when missing or not a JSON object with a
    /// `tasks` array.
    async fn read_document(&self) -> Option<Map<String, Value>> {
        let doc: Value = self.workspace.read_json(self.path(), Value::Null).await;
        match doc {
            Value::Object(map) if map.get("tasks").is_some_and(Value::is_array) => Some(map),
            _ => None,
        }
    }

    pub async fn load(&self) -> TaskList {
        match self.read_document().await {
            Some(doc) => {
                let raw = doc
                    .get("tasks")
                    .and_then(Value::as_array)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                TaskList {
                    tasks: decode_records(raw),
                    from_fallback: false,
                }
            }
            None => TaskList {
                tasks: fallback::tasks(Utc::now()),
                from_fallback: true,
            },
        }
    }

    /// Apply a review decision and persist the whole document.
    ///
    /// Returns the updated task as stored. An unknown id leaves the file
    /// untouched.
    pub async fn review(&self, task_id: &str, action: TaskAction) -> StorageResult<Value> {
        let path = self.path();
        let _guard = self.workspace.lock(&path).await;

        let mut doc = self.read_document().await.unwrap_or_else(|| {
            let mut map = Map::new();
            map.insert("tasks".to_string(), Value::Array(Self::fallback_tasks()));
            map
        });

        let now = iso(Utc::now());
        let updated = {
            let tasks = doc
                .get_mut("tasks")
                .and_then(Value::as_array_mut)
                .ok_or_else(|| StorageError::TaskNotFound(task_id.to_string()))?;
            let task = tasks
                .iter_mut()
                .find(|task| task_id_matches(task, task_id))
                .ok_or_else(|| StorageError::TaskNotFound(task_id.to_string()))?;
            let fields = task
                .as_object_mut()
                .ok_or_else(|| StorageError::TaskNotFound(task_id.to_string()))?;
            fields.insert("status".to_string(), json!(action.resulting_status().as_str()));
            fields.insert("reviewedAt".to_string(), json!(now));
            task.clone()
        };

        let version = doc.get("version").and_then(Value::as_u64).unwrap_or(0) + 1;
        doc.insert("lastUpdated".to_string(), json!(now));
        doc.insert("version".to_string(), json!(version));

        self.workspace.write_json(&path, &Value::Object(doc)).await?;
        tracing::info!(task_id, action = %action, version, "Suggested task reviewed");
        Ok(updated)
    }
}

fn task_id_matches(task: &Value, task_id: &str) -> bool {
    match task.get("id") {
        Some(Value::String(id)) => id == task_id,
        Some(Value::Number(id)) => id.to_string() == task_id,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mission_core::TaskStatus;

    fn store() -> (tempfile::TempDir, TaskStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = TaskStore::new(Workspace::new(dir.path()));
        (dir, store)
    }

    #[tokio::test]
    async fn test_missing_file_serves_fallback() {
        let (_dir, store) = store();
        let list = store.load().await;
        assert!(list.from_fallback);
        assert_eq!(list.tasks.len(), 4);
    }

    #[tokio::test]
    async fn test_review_persists_fallback_document() {
        let (_dir, store) = store();
        let task = store.review("task-2", TaskAction::Reject).await.unwrap();
        assert_eq!(task["status"], "rejected");
        assert!(task["reviewedAt"].is_string());

        let list = store.load().await;
        assert!(!list.from_fallback);
        let reviewed = list.tasks.iter().find(|t| t.id == "task-2").unwrap();
        assert_eq!(reviewed.status, TaskStatus::Rejected);
        assert!(reviewed.reviewed_at.is_some());
    }

    #[tokio::test]
    async fn test_unknown_fields_survive_and_version_bumps() {
        let (_dir, store) = store();
        let doc = json!({
            "tasks": [{"id": "t1", "title": "A", "owner": "nebula", "status": "pending"}],
            "source": "planner",
            "version": 3
        });
        store.workspace.write_json(store.path(), &doc).await.unwrap();

        store.review("t1", TaskAction::Approve).await.unwrap();

        let saved: Value = store.workspace.read_json(store.path(), Value::Null).await;
        assert_eq!(saved["version"], 4);
        assert_eq!(saved["source"], "planner");
        assert_eq!(saved["tasks"][0]["owner"], "nebula");
        assert_eq!(saved["tasks"][0]["status"], "approved");
        assert!(saved["lastUpdated"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_id_leaves_file_untouched() {
        let (_dir, store) = store();
        let doc = json!({"tasks": [{"id": "t1", "title": "A"}]});
        store.workspace.write_json(store.path(), &doc).await.unwrap();
        let before = store.workspace.read_text(store.path()).await;

        let err = store.review("nope", TaskAction::Approve).await.unwrap_err();
        assert!(matches!(err, StorageError::TaskNotFound(id) if id == "nope"));
        assert_eq!(store.workspace.read_text(store.path()).await, before);
    }

    #[tokio::test]
    async fn test_missing_file_unknown_id_writes_nothing() {
        let (_dir, store) = store();
        assert!(store.review("nope", TaskAction::Reject).await.is_err());
        assert!(!store.workspace.file_exists(store.path()).await);
    }

    #[tokio::test]
    async fn test_corrupt_records_are_dropped_on_load() {
        let (_dir, store) = store();
        let doc = json!({"tasks": [{"id": "ok", "title": "Fine"}, {"title": "no id"}, 7]});
        store.workspace.write_json(store.path(), &doc).await.unwrap();
        let list = store.load().await;
        assert_eq!(list.tasks.len(), 1);
        assert_eq!(list.tasks[0].id, "ok");
    }

    #[tokio::test]
    async fn test_concurrent_reviews_do_not_lose_updates() {
        let (_dir, store) = store();
        let tasks: Vec<Value> = (0..16)
            .map(|i| json!({"id": format!("t{i}"), "title": "x", "status": "pending"}))
            .collect();
        store
            .workspace
            .write_json(store.path(), &json!({"tasks": tasks}))
            .await
            .unwrap();

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.review(&format!("t{i}"), TaskAction::Approve).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let list = store.load().await;
        assert!(list.tasks.iter().all(|t| t.status == TaskStatus::Approved));
        let saved: Value = store.workspace.read_json(store.path(), Value::Null).await;
        assert_eq!(saved["version"], 16);
    }
}
