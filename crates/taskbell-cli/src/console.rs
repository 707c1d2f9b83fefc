//! Console notifier: reminders are printed like chat messages.

use async_trait::async_trait;
use taskbell_core::domain::{ChannelId, TaskbellError};
use taskbell_core::ports::Notifier;

pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, channel: &ChannelId, text: &str) -> Result<(), TaskbellError> {
        println!("[{channel}] {text}");
        Ok(())
    }
}
