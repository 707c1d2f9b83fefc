//! Notifier port - リマインドの送信先（Slack、コンソールなど）

use async_trait::async_trait;

use crate::domain::{ChannelId, TaskbellError};

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, channel: &ChannelId, text: &str) -> Result<(), TaskbellError>;
}
