//! TextGenerator port - 生成 AI による文章整形
//!
//! # 実装
//! - `impls::OpenAiTextGenerator`: OpenAI 互換 API
//! - `impls::TemplateTextGenerator`: API キーなしで動く固定テンプレート

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};

use crate::domain::TaskbellError;

/// Failures are reported as `TaskbellError::Collaborator`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Format the raw request into a task description.
    async fn summarize_task(
        &self,
        raw_input: &str,
        title: &str,
        due: DateTime<FixedOffset>,
    ) -> Result<String, TaskbellError>;

    /// Friendly reply to the user who added the task.
    async fn acknowledge(&self, summary: &str) -> Result<String, TaskbellError>;

    /// Free-text estimate of the work needed (e.g. "1時間30分").
    async fn estimate_duration(
        &self,
        title: &str,
        due: DateTime<FixedOffset>,
    ) -> Result<String, TaskbellError>;

    /// Congratulation for a completed task.
    async fn celebrate(&self, title: &str) -> Result<String, TaskbellError>;
}
