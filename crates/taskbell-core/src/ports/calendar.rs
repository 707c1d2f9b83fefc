//! CalendarService port - 締め切り前の作業枠をカレンダーに登録

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{EventId, TaskbellError};

/// Best effort: a failure here never removes the task that was already
/// created.
#[async_trait]
pub trait CalendarService: Send + Sync {
    async fn create_event(
        &self,
        title: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<EventId, TaskbellError>;
}
