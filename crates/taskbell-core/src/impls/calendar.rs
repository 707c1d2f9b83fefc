//! InMemoryCalendar - 登録したイベントを保持するだけのカレンダー
//!
//! 実際のカレンダー API と同じ port の裏に置ける開発用実装。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;

use crate::domain::{EventId, TaskbellError};
use crate::ports::{CalendarService, IdGenerator};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEvent {
    pub id: EventId,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

pub struct InMemoryCalendar {
    events: Mutex<Vec<CalendarEvent>>,
    ids: Box<dyn IdGenerator>,
}

impl InMemoryCalendar {
    pub fn new(ids: Box<dyn IdGenerator>) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            ids,
        }
    }

    /// Snapshot of the events created so far.
    pub async fn events(&self) -> Vec<CalendarEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl CalendarService for InMemoryCalendar {
    async fn create_event(
        &self,
        title: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<EventId, TaskbellError> {
        let id = self.ids.generate_event_id();
        self.events.lock().await.push(CalendarEvent {
            id,
            title: title.to_string(),
            start,
            end,
        });
        info!(event_id = %id, title, %start, %end, "calendar event created");
        Ok(id)
    }
}
