//! In-memory task store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::{
    ChannelId, Completion, Task, TaskId, TaskRef, TaskbellError, validate_title,
};
use crate::ports::{Clock, TaskStore};

/// Task + store-private bookkeeping.
///
/// `claimed` is set while a reminder for the task is being sent, so two
/// overlapping sweeps never both pick it up.
#[derive(Debug, Clone)]
struct TaskRecord {
    task: Task,
    claimed: bool,
}

/// In-memory store state.
struct InMemoryStoreState {
    /// All task records, in creation order (ids ascending).
    records: Vec<TaskRecord>,

    /// Next task ID to assign.
    next_task_id: u64,
}

impl InMemoryStoreState {
    fn new() -> Self {
        Self {
            records: Vec::new(),
            next_task_id: 1,
        }
    }

    /// Allocate a new TaskId.
    fn allocate_task_id(&mut self) -> TaskId {
        let id = TaskId::new(self.next_task_id);
        self.next_task_id += 1;
        id
    }

    fn record_mut(&mut self, id: TaskId) -> Option<&mut TaskRecord> {
        // records は id 昇順なので二分探索できる
        let index = self
            .records
            .binary_search_by_key(&id, |record| record.task.id())
            .ok()?;
        self.records.get_mut(index)
    }

    /// First record in creation order matching `target`.
    fn position(&self, target: &TaskRef) -> Option<usize> {
        self.records
            .iter()
            .position(|record| record.task.matches(target))
    }

    fn snapshot<'a>(records: impl Iterator<Item = &'a TaskRecord>) -> Vec<Task> {
        records.map(|record| record.task.clone()).collect()
    }
}

/// In-memory `TaskStore`.
///
/// One `tokio::sync::Mutex` covers every operation; each operation takes it
/// exactly once and never awaits anything else while holding it.
pub struct InMemoryTaskStore {
    state: Mutex<InMemoryStoreState>,
    clock: Arc<dyn Clock>,
}

impl InMemoryTaskStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(InMemoryStoreState::new()),
            clock,
        }
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn create(
        &self,
        title: &str,
        due: DateTime<Utc>,
        channel: ChannelId,
    ) -> Result<Task, TaskbellError> {
        let title = validate_title(title)?;
        let created_at = self.clock.now();

        let mut state = self.state.lock().await;
        let id = state.allocate_task_id();
        let task = Task::new(id, title, due, channel, created_at);
        state.records.push(TaskRecord {
            task: task.clone(),
            claimed: false,
        });
        Ok(task)
    }

    async fn list(&self) -> Vec<Task> {
        let state = self.state.lock().await;
        InMemoryStoreState::snapshot(state.records.iter())
    }

    async fn get(&self, id: TaskId) -> Option<Task> {
        let mut state = self.state.lock().await;
        state.record_mut(id).map(|record| record.task.clone())
    }

    async fn complete(&self, target: &TaskRef) -> Result<Completion, TaskbellError> {
        let mut state = self.state.lock().await;
        let index = state
            .position(target)
            .or_else(|| target.title_fallback().and_then(|title| state.position(&title)))
            .ok_or_else(|| TaskbellError::NotFound(target.to_string()))?;
        let record = &mut state.records[index];

        let changed = record.task.mark_completed();
        Ok(Completion {
            task: record.task.clone(),
            already_completed: !changed,
        })
    }

    async fn due_before(&self, threshold: DateTime<Utc>) -> Vec<Task> {
        let state = self.state.lock().await;
        InMemoryStoreState::snapshot(
            state
                .records
                .iter()
                .filter(|record| record.task.is_reminder_due(threshold)),
        )
    }

    async fn claim_due(&self, threshold: DateTime<Utc>) -> Vec<Task> {
        let mut state = self.state.lock().await;
        let mut claimed = Vec::new();
        for record in state.records.iter_mut() {
            if record.claimed || !record.task.is_reminder_due(threshold) {
                continue;
            }
            record.claimed = true;
            claimed.push(record.task.clone());
        }
        if !claimed.is_empty() {
            debug!(count = claimed.len(), %threshold, "claimed due reminders");
        }
        claimed
    }

    async fn mark_notified(&self, id: TaskId) -> Result<Task, TaskbellError> {
        let mut state = self.state.lock().await;
        let record = state
            .record_mut(id)
            .ok_or_else(|| TaskbellError::NotFound(id.to_string()))?;
        record.task.mark_notified();
        record.claimed = false;
        Ok(record.task.clone())
    }

    async fn release_claim(&self, id: TaskId) -> Result<(), TaskbellError> {
        let mut state = self.state.lock().await;
        let record = state
            .record_mut(id)
            .ok_or_else(|| TaskbellError::NotFound(id.to_string()))?;
        record.claimed = false;
        Ok(())
    }
}
