//! TaskService - タスク追加・一覧・完了の共通入口
//!
//! スラッシュコマンドもフォーム入力も、ここの `create_task` を直接呼ぶ。
//! 外部サービスの呼び出しはすべてストアのロック外で、ストアから
//! コピーしたデータだけを使って行う。

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use tracing::{debug, info, warn};

use super::status::TaskCounts;
use crate::domain::{
    ChannelId, Completion, EventId, Task, TaskRef, TaskbellError, parse_due, validate_title,
};
use crate::planner::{CalendarWindow, parse_duration, plan_window};
use crate::ports::{CalendarService, TaskStore, TextGenerator};

/// "Add task" request as received from any front end.
#[derive(Debug, Clone)]
pub struct AddTaskRequest {
    /// The user's text as typed; empty means "title + due".
    pub raw_input: String,
    pub title: String,
    pub due_text: String,
    pub channel: ChannelId,
}

/// Outcome of the calendar step. Creation and calendar sync are not
/// transactional: a failure here leaves the task in place.
#[derive(Debug)]
pub enum CalendarSync {
    Created {
        event_id: EventId,
        window: CalendarWindow,
    },
    Failed {
        error: TaskbellError,
    },
}

#[derive(Debug)]
pub struct AddTaskOutcome {
    pub task: Task,
    pub summary: String,
    /// Friendly reply for the requester (falls back to `summary`).
    pub reply: String,
    pub calendar: CalendarSync,
}

#[derive(Debug)]
pub struct CompleteOutcome {
    pub task: Task,
    pub already_completed: bool,
    /// `None` when the task had already been completed before this call.
    pub celebration: Option<Result<String, TaskbellError>>,
}

pub struct TaskService {
    store: Arc<dyn TaskStore>,
    text: Arc<dyn TextGenerator>,
    calendar: Arc<dyn CalendarService>,
    offset: FixedOffset,
}

impl TaskService {
    pub fn new(
        store: Arc<dyn TaskStore>,
        text: Arc<dyn TextGenerator>,
        calendar: Arc<dyn CalendarService>,
        offset: FixedOffset,
    ) -> Self {
        Self {
            store,
            text,
            calendar,
            offset,
        }
    }

    /// Offset used to read and display local due times.
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Validate → summarize → store → calendar → reply.
    ///
    /// Validation and summary failures abort before anything is stored.
    /// Later failures are reported in the outcome.
    pub async fn create_task(
        &self,
        request: AddTaskRequest,
    ) -> Result<AddTaskOutcome, TaskbellError> {
        let title = validate_title(&request.title)?;
        let due = parse_due(&request.due_text, self.offset)?;
        let local_due = due.with_timezone(&self.offset);

        let raw_input = if request.raw_input.trim().is_empty() {
            format!("{title} {}", request.due_text.trim())
        } else {
            request.raw_input
        };
        let summary = self
            .text
            .summarize_task(&raw_input, &title, local_due)
            .await?;

        let task = self.store.create(&title, due, request.channel).await?;
        info!(task_id = %task.id(), title = task.title(), due = %task.due(), "task created");

        let calendar = match self.sync_calendar(&task, local_due).await {
            Ok((event_id, window)) => CalendarSync::Created { event_id, window },
            Err(error) => {
                warn!(task_id = %task.id(), %error, "calendar sync failed");
                CalendarSync::Failed { error }
            }
        };

        let reply = match self.text.acknowledge(&summary).await {
            Ok(reply) => reply,
            Err(error) => {
                warn!(task_id = %task.id(), %error, "acknowledgement failed, replying with summary");
                summary.clone()
            }
        };

        Ok(AddTaskOutcome {
            task,
            summary,
            reply,
            calendar,
        })
    }

    async fn sync_calendar(
        &self,
        task: &Task,
        local_due: DateTime<FixedOffset>,
    ) -> Result<(EventId, CalendarWindow), TaskbellError> {
        let estimate = self.text.estimate_duration(task.title(), local_due).await?;
        let duration = parse_duration(&estimate);
        if duration.is_zero() {
            debug!(task_id = %task.id(), %estimate, "estimate has no duration, booking an empty window");
        }
        let window = plan_window(task.due(), duration)?;
        let event_id = self
            .calendar
            .create_event(task.title(), window.start, window.end)
            .await?;
        Ok((event_id, window))
    }

    pub async fn list_tasks(&self) -> Vec<Task> {
        self.store.list().await
    }

    pub async fn status(&self) -> TaskCounts {
        TaskCounts::from_tasks(&self.store.list().await)
    }

    /// Complete by id (`3`, `#3`) or exact title.
    ///
    /// Celebration runs only on the call that actually completed the task;
    /// its failure never undoes the completion.
    pub async fn complete_task(&self, identifier: &str) -> Result<CompleteOutcome, TaskbellError> {
        let target = TaskRef::parse(identifier)?;
        let Completion {
            task,
            already_completed,
        } = self.store.complete(&target).await?;

        let celebration = if already_completed {
            None
        } else {
            info!(task_id = %task.id(), title = task.title(), "task completed");
            let result = self.text.celebrate(task.title()).await;
            if let Err(error) = &result {
                warn!(task_id = %task.id(), %error, "celebration failed");
            }
            Some(result)
        };

        Ok(CompleteOutcome {
            task,
            already_completed,
            celebration,
        })
    }
}
