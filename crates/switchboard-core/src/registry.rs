//! Task Registry — in-memory store of task records owned by the orchestrator

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{OrchestratorError, Result};
use crate::task::Task;

#[derive(Default)]
struct Inner {
    tasks: HashMap<String, Task>,
    /// Insertion order, for stable listings
    order: Vec<String>,
}

/// Concurrent-safe map from task id to task record.
///
/// All mutation goes through [`TaskRegistry::update`]. The mutator works on a
/// copy that is committed under the write lock only if it succeeds, so readers
/// see either the old record or the fully-applied new one.
#[derive(Default)]
pub struct TaskRegistry {
    inner: RwLock<Inner>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new task. Ids are never reused.
    pub async fn create(&self, task: Task) -> Result<Task> {
        let mut inner = self.inner.write().await;
        if inner.tasks.contains_key(&task.id) {
            return Err(OrchestratorError::DuplicateTaskId(task.id));
        }
        debug!("Registry: created task {}", task.id);
        inner.order.push(task.id.clone());
        inner.tasks.insert(task.id.clone(), task.clone());
        Ok(task)
    }

    /// Apply `mutator` atomically and return the committed snapshot
    pub async fn update<F>(&self, id: &str, mutator: F) -> Result<Task>
    where
        F: FnOnce(&mut Task) -> Result<()>,
    {
        let mut inner = self.inner.write().await;
        let current = inner
            .tasks
            .get_mut(id)
            .ok_or_else(|| OrchestratorError::TaskNotFound(id.to_string()))?;

        let mut draft = current.clone();
        mutator(&mut draft)?;
        *current = draft.clone();
        debug!("Registry: task {} is now {}", id, draft.status);
        Ok(draft)
    }

    /// Snapshot of a task
    pub async fn get(&self, id: &str) -> Result<Task> {
        self.inner
            .read()
            .await
            .tasks
            .get(id)
            .cloned()
            .ok_or_else(|| OrchestratorError::TaskNotFound(id.to_string()))
    }

    /// All tasks, oldest first
    pub async fn list(&self) -> Vec<Task> {
        let inner = self.inner.read().await;
        inner
            .order
            .iter()
            .filter_map(|id| inner.tasks.get(id).cloned())
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.tasks.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.tasks.is_empty()
    }
}
