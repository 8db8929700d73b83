//! Local fallback task store.
//!
//! One JSON array per user at `<dir>/tasks_<key>.json`, where the key is the
//! form-urlencoded username, so distinct usernames never share a file and no
//! key contains a path separator. Every operation
//! reads the whole file and every mutation rewrites it atomically. A missing
//! file is an empty collection.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use chrono::Utc;
use tempfile::NamedTempFile;

use super::{NewTask, Task, TaskError, TaskPatch};
use crate::config::paths;

/// Per-user JSON task files in one directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at `${TASKER_HOME}/tasks`.
    pub fn open_default() -> Self {
        Self::new(paths::tasks_dir())
    }

    /// File holding `username`'s tasks.
    pub fn path_for(&self, username: &str) -> PathBuf {
        self.dir
            .join(format!("tasks_{}.json", username_key(username)))
    }

    /// # Errors
    /// Returns `Storage` if the file exists but cannot be read or parsed.
    pub fn list(&self, username: &str) -> Result<Vec<Task>, TaskError> {
        let path = self.path_for(username);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(TaskError::Storage(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )));
            }
        };
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&contents)
            .map_err(|e| TaskError::Storage(format!("Failed to parse {}: {e}", path.display())))
    }

    /// # Errors
    /// Returns `InvalidInput` for an empty name or an id already in use, and
    /// `Storage` on I/O failure.
    pub fn create(&self, username: &str, input: NewTask) -> Result<Task, TaskError> {
        input.validate()?;

        let mut tasks = self.list(username)?;
        if let Some(id) = &input.id
            && tasks.iter().any(|t| &t.id == id)
        {
            return Err(TaskError::InvalidInput(format!(
                "Task id already exists: {id}"
            )));
        }

        let task = input.into_task(Utc::now());
        tasks.push(task.clone());
        self.save(username, &tasks)?;
        Ok(task)
    }

    /// Merges `patch` into the task. An empty patch returns the task unchanged.
    ///
    /// # Errors
    /// Returns `NotFound` if no task has `id`, `InvalidInput` for an invalid
    /// patch, and `Storage` on I/O failure.
    pub fn update(&self, username: &str, id: &str, patch: &TaskPatch) -> Result<Task, TaskError> {
        let mut tasks = self.list(username)?;
        let slot = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| TaskError::not_found(id))?;
        let updated = slot.merged(patch)?;
        if patch.is_empty() {
            return Ok(updated);
        }
        slot.clone_from(&updated);
        self.save(username, &tasks)?;
        Ok(updated)
    }

    /// Removes the task if present. Deleting a missing id succeeds.
    ///
    /// # Errors
    /// Returns `Storage` on I/O failure.
    pub fn delete(&self, username: &str, id: &str) -> Result<(), TaskError> {
        let mut tasks = self.list(username)?;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() != before {
            self.save(username, &tasks)?;
        }
        Ok(())
    }

    /// Writes the collection via temp file + rename so readers never see a
    /// partial file.
    fn save(&self, username: &str, tasks: &[Task]) -> Result<(), TaskError> {
        let path = self.path_for(username);
        fs::create_dir_all(&self.dir).map_err(|e| {
            TaskError::Storage(format!(
                "Failed to create directory {}: {e}",
                self.dir.display()
            ))
        })?;

        let contents = serde_json::to_vec_pretty(tasks)
            .map_err(|e| TaskError::Storage(format!("Failed to serialize tasks: {e}")))?;

        let mut tmp = NamedTempFile::new_in(&self.dir)
            .map_err(|e| TaskError::Storage(format!("Failed to create temp file: {e}")))?;
        tmp.write_all(&contents)
            .map_err(|e| TaskError::Storage(format!("Failed to write temp file: {e}")))?;
        tmp.persist(&path).map_err(|e| {
            TaskError::Storage(format!("Failed to write {}: {}", path.display(), e.error))
        })?;

        tracing::debug!(path = %path.display(), count = tasks.len(), "Saved local tasks");
        Ok(())
    }
}

/// Maps a username to a file-name-safe key. The encoding is injective:
/// only `[A-Za-z0-9*._-]` pass through and everything else is escaped.
fn username_key(username: &str) -> String {
    url::form_urlencoded::byte_serialize(username.trim().as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::tasks::{Priority, TaskStatus};

    const USER: &str = "ada@example.com";

    #[test]
    fn test_missing_file_lists_empty() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        assert!(store.list(USER).unwrap().is_empty());
    }

    #[test]
    fn test_file_name_is_keyed_by_username() {
        let store = LocalStore::new("/data");
        assert_eq!(
            store.path_for("ada@example.com"),
            PathBuf::from("/data/tasks_ada%40example.com.json")
        );
        assert_eq!(
            store.path_for("../evil/name"),
            PathBuf::from("/data/tasks_..%2Fevil%2Fname.json")
        );
    }

    #[test]
    fn test_similar_usernames_get_separate_collections() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        store
            .create("ada+work@example.com", NewTask::new("secret"))
            .unwrap();

        assert!(store.list("ada_work@example.com").unwrap().is_empty());
        assert!(store.list("ada work@example.com").unwrap().is_empty());
        assert_eq!(store.list("ada+work@example.com").unwrap().len(), 1);
        assert_ne!(
            store.path_for("ada+work@example.com"),
            store.path_for("ada_work@example.com")
        );
    }

    #[test]
    fn test_create_then_list_contains_task() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        let created = store
            .create(USER, NewTask::new("Buy milk").with_priority(Priority::High))
            .unwrap();

        let tasks = store.list(USER).unwrap();
        assert_eq!(tasks, vec![created.clone()]);
        assert_eq!(created.status, TaskStatus::Pending);
    }

    #[test]
    fn test_users_are_isolated() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        store.create(USER, NewTask::new("mine")).unwrap();
        assert!(store.list("bob@example.com").unwrap().is_empty());
    }

    #[test]
    fn test_create_with_empty_name_leaves_store_unchanged() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        store.create(USER, NewTask::new("keep")).unwrap();
        let before = fs::read(store.path_for(USER)).unwrap();

        let err = store.create(USER, NewTask::new("   ")).unwrap_err();

        assert!(matches!(err, TaskError::InvalidInput(_)));
        assert_eq!(fs::read(store.path_for(USER)).unwrap(), before);
    }

    #[test]
    fn test_create_rejects_duplicate_id() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        let first = NewTask {
            id: Some("dup".to_string()),
            ..NewTask::new("first")
        };
        store.create(USER, first.clone()).unwrap();

        let err = store.create(USER, first).unwrap_err();
        assert!(matches!(err, TaskError::InvalidInput(_)));
        assert_eq!(store.list(USER).unwrap().len(), 1);
    }

    #[test]
    fn test_update_changes_only_patched_fields() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        let created = store
            .create(USER, NewTask::new("Write report").with_description("Q3"))
            .unwrap();

        let updated = store
            .update(USER, &created.id, &TaskPatch::complete())
            .unwrap();

        assert_eq!(updated.status, TaskStatus::Completed);
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.description, created.description);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(store.list(USER).unwrap(), vec![updated]);
    }

    #[test]
    fn test_update_missing_task_is_not_found() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        let err = store
            .update(USER, "nope", &TaskPatch::complete())
            .unwrap_err();
        assert_eq!(err, TaskError::not_found("nope"));
    }

    #[test]
    fn test_empty_patch_checks_id_then_returns_task_unchanged() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        let err = store
            .update(USER, "missing", &TaskPatch::default())
            .unwrap_err();
        assert_eq!(err, TaskError::not_found("missing"));

        let created = store.create(USER, NewTask::new("as is")).unwrap();
        let same = store
            .update(USER, &created.id, &TaskPatch::default())
            .unwrap();
        assert_eq!(same, created);
        assert_eq!(store.list(USER).unwrap(), vec![created]);
    }

    #[test]
    fn test_invalid_patch_on_missing_task_is_not_found() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        let reopen = TaskPatch {
            status: Some(TaskStatus::Pending),
            ..Default::default()
        };
        assert_eq!(
            store.update(USER, "missing", &reopen).unwrap_err(),
            TaskError::not_found("missing")
        );
    }

    #[test]
    fn test_delete_twice_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        let created = store.create(USER, NewTask::new("temp")).unwrap();

        store.delete(USER, &created.id).unwrap();
        store.delete(USER, &created.id).unwrap();

        assert!(store.list(USER).unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_storage_error() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        fs::write(store.path_for(USER), "{not json").unwrap();
        assert!(matches!(store.list(USER), Err(TaskError::Storage(_))));
    }

    #[test]
    fn test_reads_records_written_by_older_clients() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        fs::write(
            store.path_for(USER),
            r#"[{"task_id":"task_1","task_name":"Old","description":"","deadline":"",
                "priority":"low","status":"completed","created_at":"2024-05-01T08:00:00.000Z"}]"#,
        )
        .unwrap();

        let tasks = store.list(USER).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].deadline, None);
        assert!(tasks[0].is_completed());
    }
}
