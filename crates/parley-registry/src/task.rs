// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Task registry for asynchronous speech synthesis.
//!
//! Tasks start in [`TaskStatus::Processing`] and are moved exactly once to a
//! terminal state by the synthesis worker. Polling callers read them; nothing
//! deletes them before shutdown.

use chrono::{DateTime, Utc};
use parley_core::TaskStatus;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::id::RecordId;
use crate::keyed::KeyedRegistry;

/// State of one synthesis job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskRecord {
    pub status: TaskStatus,
    /// Public URL of the produced audio. Set only when `status` is `Done`.
    pub result_reference: Option<String>,
    /// Failure reason. Set only when `status` is `Failed`.
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskRecord {
    fn processing() -> Self {
        let now = Utc::now();
        Self {
            status: TaskStatus::Processing,
            result_reference: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Registry of synthesis tasks.
#[derive(Default)]
pub struct TaskRegistry {
    records: KeyedRegistry<TaskRecord>,
}

impl TaskRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a task in the `processing` state and returns its id.
    pub fn create_task(&self) -> RecordId {
        let id = self.records.create(TaskRecord::processing());
        debug!(task_id = %id, "task created");
        id
    }

    /// Records the outcome of a task.
    ///
    /// Unknown ids are a logged no-op: the worker may race the shutdown
    /// clear. Moving a task back to `processing` is refused. A second
    /// terminal update overwrites the first. `result_reference` is kept only
    /// for `Done` and `error_message` only for `Failed`.
    ///
    /// Returns true if the record was changed.
    pub fn update_status(
        &self,
        id: &str,
        status: TaskStatus,
        result_reference: Option<String>,
        error_message: Option<String>,
    ) -> bool {
        if !status.is_terminal() {
            warn!(task_id = id, "refusing to move task back to processing");
            return false;
        }

        let updated = self.records.update(id, |record| {
            if record.status.is_terminal() {
                warn!(
                    task_id = id,
                    previous = %record.status,
                    next = %status,
                    "task already terminal, overwriting"
                );
            }
            record.status = status;
            record.result_reference = match status {
                TaskStatus::Done => result_reference,
                _ => None,
            };
            record.error_message = match status {
                TaskStatus::Failed => error_message,
                _ => None,
            };
            record.updated_at = Utc::now();
        });

        if updated {
            info!(task_id = id, status = %status, "task status updated");
        } else {
            warn!(task_id = id, status = %status, "attempted to update non-existent task");
        }
        updated
    }

    /// Marks the task done with the URL of its audio.
    pub fn complete(&self, id: &str, audio_url: impl Into<String>) -> bool {
        self.update_status(id, TaskStatus::Done, Some(audio_url.into()), None)
    }

    /// Marks the task failed with a reason.
    pub fn fail(&self, id: &str, message: impl Into<String>) -> bool {
        self.update_status(id, TaskStatus::Failed, None, Some(message.into()))
    }

    /// Returns a copy of the task, if it exists.
    pub fn get_task(&self, id: &str) -> Option<TaskRecord> {
        self.records.get(id)
    }

    /// Removes every task. Produced audio files are left on disk.
    pub fn clear_all(&self) -> usize {
        let cleared = self.records.drain().len();
        info!(count = cleared, "cleared all tasks");
        cleared
    }

    /// Number of tasks.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if there are no tasks.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn new_task_is_processing() {
        let registry = TaskRegistry::new();
        let id = registry.create_task();
        let task = registry.get_task(id.as_str()).unwrap();
        assert_eq!(task.status, TaskStatus::Processing);
        assert!(task.result_reference.is_none());
        assert!(task.error_message.is_none());
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn complete_sets_result_only() {
        let registry = TaskRegistry::new();
        let id = registry.create_task();
        assert!(registry.complete(id.as_str(), "http://h/static/audio/a.wav"));

        let task = registry.get_task(id.as_str()).unwrap();
        assert_eq!(task.status, TaskStatus::Done);
        assert_eq!(
            task.result_reference.as_deref(),
            Some("http://h/static/audio/a.wav")
        );
        assert!(task.error_message.is_none());
        assert!(task.updated_at >= task.created_at);
    }

    #[test]
    fn fail_sets_error_only() {
        let registry = TaskRegistry::new();
        let id = registry.create_task();
        assert!(registry.fail(id.as_str(), "engine crashed"));

        let task = registry.get_task(id.as_str()).unwrap();
        assert_eq!(task.status, TaskStatus::Failed);
        assert_eq!(task.error_message.as_deref(), Some("engine crashed"));
        assert!(task.result_reference.is_none());
    }

    #[test]
    fn mismatched_fields_are_dropped() {
        let registry = TaskRegistry::new();
        let id = registry.create_task();
        registry.update_status(
            id.as_str(),
            TaskStatus::Done,
            Some("url".into()),
            Some("stray error".into()),
        );
        let task = registry.get_task(id.as_str()).unwrap();
        assert_eq!(task.result_reference.as_deref(), Some("url"));
        assert!(task.error_message.is_none());
    }

    #[test]
    #[traced_test]
    fn unknown_id_update_is_a_noop() {
        let registry = TaskRegistry::new();
        assert!(!registry.complete("0123456789abcdef0123456789abcdef", "url"));
        assert!(!registry.fail("missing", "err"));
        assert!(registry.is_empty());
        assert!(registry.get_task("missing").is_none());
        assert!(logs_contain("attempted to update non-existent task"));
    }

    #[test]
    #[traced_test]
    fn terminal_task_never_returns_to_processing() {
        let registry = TaskRegistry::new();
        let id = registry.create_task();
        registry.complete(id.as_str(), "url");

        assert!(!registry.update_status(id.as_str(), TaskStatus::Processing, None, None));
        assert_eq!(
            registry.get_task(id.as_str()).unwrap().status,
            TaskStatus::Done
        );
        assert!(logs_contain("refusing to move task back to processing"));
    }

    #[test]
    #[traced_test]
    fn second_terminal_update_wins() {
        let registry = TaskRegistry::new();
        let id = registry.create_task();
        registry.complete(id.as_str(), "url");
        assert!(registry.fail(id.as_str(), "late failure"));

        let task = registry.get_task(id.as_str()).unwrap();
        assert_eq!(task.status, TaskStatus::Failed);
        assert!(task.result_reference.is_none());
        assert_eq!(task.error_message.as_deref(), Some("late failure"));
        assert!(logs_contain("task already terminal"));
    }

    #[test]
    fn clear_all_removes_every_task() {
        let registry = TaskRegistry::new();
        let ids: Vec<_> = (0..3).map(|_| registry.create_task()).collect();
        registry.complete(ids[0].as_str(), "url");

        assert_eq!(registry.clear_all(), 3);
        assert!(registry.is_empty());
        assert!(!registry.complete(ids[1].as_str(), "after shutdown"));
        assert!(registry.is_empty());
    }
}
