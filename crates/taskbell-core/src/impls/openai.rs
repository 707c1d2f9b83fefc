//! OpenAI-compatible text generator.
//!
//! Talks to any server exposing `/chat/completions` (OpenAI, OpenRouter,
//! a local gateway, ...). Prompts are Japanese to match the bot's replies.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Collaborator, TaskbellError};
use crate::ports::TextGenerator;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TEMPERATURE: f32 = 0.8;

/// Connection details for the chat completions API.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiSettings {
    /// Base URL including `/v1`.
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub request_timeout: Duration,
}

impl OpenAiSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

pub struct OpenAiTextGenerator {
    client: reqwest::Client,
    settings: OpenAiSettings,
}

impl OpenAiTextGenerator {
    pub fn new(settings: OpenAiSettings) -> Result<Self, TaskbellError> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| TaskbellError::Config(format!("http client: {e}")))?;
        Ok(Self { client, settings })
    }

    /// Send one user message, return the first choice's text.
    async fn complete(&self, prompt: &str) -> Result<String, TaskbellError> {
        let failed = |e: reqwest::Error| TaskbellError::collaborator(Collaborator::TextGeneration, e);

        let url = format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        );
        let body = ChatCompletionRequest {
            model: &self.settings.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.settings.temperature,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.settings.api_key)
            .json(&body)
            .send()
            .await
            .map_err(failed)?;

        let status = response.status();
        debug!(status = status.as_u16(), "received chat completion response");
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(match status.as_u16() {
                401 | 403 => TaskbellError::Config(format!(
                    "text generation rejected the API key ({status})"
                )),
                _ => TaskbellError::collaborator(
                    Collaborator::TextGeneration,
                    format!("HTTP {status}: {}", message.trim()),
                ),
            });
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(failed)?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| {
                TaskbellError::collaborator(Collaborator::TextGeneration, "empty completion")
            })?;
        debug!(model = %self.settings.model, chars = text.chars().count(), "completion received");
        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for OpenAiTextGenerator {
    async fn summarize_task(
        &self,
        raw_input: &str,
        title: &str,
        due: DateTime<FixedOffset>,
    ) -> Result<String, TaskbellError> {
        let prompt = format!(
            "次の形式でタスクを整理してください：\n\
             - タイトル: {title}\n\
             - 締め切り: {due}\n\
             ユーザーからの入力: 「{raw_input}」",
            due = due.format("%Y-%m-%d %H:%M"),
        );
        self.complete(&prompt).await
    }

    async fn acknowledge(&self, summary: &str) -> Result<String, TaskbellError> {
        let prompt = format!(
            "ユーザーがタスクを追加しました。かわいらしく、フレンドリーにチャットで返信してください。\n\n\
             タスク情報:\n{summary}\n\n---\n\n【返信する文章】"
        );
        self.complete(&prompt).await
    }

    async fn estimate_duration(
        &self,
        title: &str,
        due: DateTime<FixedOffset>,
    ) -> Result<String, TaskbellError> {
        let prompt = format!(
            "次のタスクにかかる作業時間を見積もり、「○時間○分」の形式だけで答えてください。\n\
             タスク: {title}\n締め切り: {due}",
            due = due.format("%Y-%m-%d %H:%M"),
        );
        self.complete(&prompt).await
    }

    async fn celebrate(&self, title: &str) -> Result<String, TaskbellError> {
        let prompt = format!(
            "ユーザーがタスク「{title}」を完了しました。かわいらしく、フレンドリーに短いお祝いの言葉を返してください。"
        );
        self.complete(&prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn generator(server: &MockServer) -> OpenAiTextGenerator {
        let mut settings = OpenAiSettings::new("test-key");
        settings.base_url = server.uri();
        OpenAiTextGenerator::new(settings).unwrap()
    }

    fn reply(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        }))
    }

    #[tokio::test]
    async fn returns_trimmed_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(reply("  1時間30分\n"))
            .expect(1)
            .mount(&server)
            .await;

        let jst = FixedOffset::east_opt(9 * 3600).unwrap();
        let due = jst.with_ymd_and_hms(2025, 1, 10, 15, 0, 0).unwrap();
        let text = generator(&server)
            .estimate_duration("資料作成", due)
            .await
            .unwrap();
        assert_eq!(text, "1時間30分");
    }

    #[tokio::test]
    async fn sends_model_and_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(wiremock::matchers::body_partial_json(serde_json::json!({
                "model": DEFAULT_MODEL,
                "messages": [{ "role": "user" }]
            })))
            .respond_with(reply("おめでとう！"))
            .expect(1)
            .mount(&server)
            .await;

        let text = generator(&server).celebrate("資料作成").await.unwrap();
        assert_eq!(text, "おめでとう！");
    }

    #[tokio::test]
    async fn http_error_is_a_collaborator_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let err = generator(&server).celebrate("資料作成").await.unwrap_err();
        assert!(matches!(
            &err,
            TaskbellError::Collaborator {
                service: Collaborator::TextGeneration,
                message,
            } if message.contains("500") && message.contains("upstream down")
        ));
    }

    #[tokio::test]
    async fn rejected_key_is_a_config_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = generator(&server).celebrate("資料作成").await.unwrap_err();
        assert!(matches!(err, TaskbellError::Config(_)));
    }

    #[tokio::test]
    async fn empty_choices_are_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&server)
            .await;

        let err = generator(&server).acknowledge("- タイトル: x").await.unwrap_err();
        assert!(err.to_string().contains("empty completion"));
    }
}
