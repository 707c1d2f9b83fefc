//! TemplateTextGenerator - API キーなしで動く固定テンプレート

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};

use crate::domain::TaskbellError;
use crate::ports::TextGenerator;

/// Deterministic replies, used when no generative API is configured.
pub struct TemplateTextGenerator {
    default_estimate: String,
}

impl TemplateTextGenerator {
    pub fn new(default_estimate: impl Into<String>) -> Self {
        Self {
            default_estimate: default_estimate.into(),
        }
    }
}

impl Default for TemplateTextGenerator {
    fn default() -> Self {
        Self::new("1時間")
    }
}

#[async_trait]
impl TextGenerator for TemplateTextGenerator {
    async fn summarize_task(
        &self,
        _raw_input: &str,
        title: &str,
        due: DateTime<FixedOffset>,
    ) -> Result<String, TaskbellError> {
        Ok(format!(
            "- タイトル: {title}\n- 締め切り: {}",
            due.format("%Y-%m-%d %H:%M")
        ))
    }

    async fn acknowledge(&self, summary: &str) -> Result<String, TaskbellError> {
        Ok(format!("タスクを追加したよ🌸\n{summary}"))
    }

    async fn estimate_duration(
        &self,
        _title: &str,
        _due: DateTime<FixedOffset>,
    ) -> Result<String, TaskbellError> {
        Ok(self.default_estimate.clone())
    }

    async fn celebrate(&self, title: &str) -> Result<String, TaskbellError> {
        Ok(format!("「{title}」完了おめでとう🎉 おつかれさま！"))
    }
}
