//! Config - 環境変数からの設定読み込み
//!
//! `.env` の読み込み（dotenvy）はバイナリ側で行い、ここでは環境変数だけを見る。
//! 値が空の変数は未設定として扱う。

use std::str::FromStr;
use std::time::Duration;

use chrono::{FixedOffset, TimeDelta};

use super::reminder_loop::{DEFAULT_LOOKAHEAD_MINUTES, ReminderConfig};
use crate::domain::{ChannelId, TaskbellError, default_utc_offset};
use crate::impls::OpenAiSettings;

pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENAI_MODEL: &str = "TASKBELL_OPENAI_MODEL";
pub const ENV_OPENAI_BASE_URL: &str = "TASKBELL_OPENAI_BASE_URL";
pub const ENV_TEMPERATURE: &str = "TASKBELL_TEMPERATURE";
pub const ENV_REMINDER_TICK_SECS: &str = "TASKBELL_REMINDER_TICK_SECS";
pub const ENV_REMINDER_LOOKAHEAD_MINUTES: &str = "TASKBELL_REMINDER_LOOKAHEAD_MINUTES";
pub const ENV_UTC_OFFSET: &str = "TASKBELL_UTC_OFFSET";
pub const ENV_CHANNEL: &str = "TASKBELL_CHANNEL";

const DEFAULT_CHANNEL: &str = "console";

#[derive(Debug, Clone)]
pub struct Config {
    /// `None` → offline template replies.
    pub openai: Option<OpenAiSettings>,
    pub reminder: ReminderConfig,
    /// Offset used for due times typed without one.
    pub utc_offset: FixedOffset,
    /// Channel that tasks created from this process report to.
    pub channel: ChannelId,
}

impl Config {
    pub fn from_env() -> Result<Self, TaskbellError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, TaskbellError> {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let openai = match var(ENV_OPENAI_API_KEY) {
            Some(api_key) => {
                let mut settings = OpenAiSettings::new(api_key);
                if let Some(model) = var(ENV_OPENAI_MODEL) {
                    settings.model = model;
                }
                if let Some(base_url) = var(ENV_OPENAI_BASE_URL) {
                    settings.base_url = base_url;
                }
                if let Some(temperature) = parse_var::<f32>(ENV_TEMPERATURE, var(ENV_TEMPERATURE))? {
                    settings.temperature = temperature;
                }
                Some(settings)
            }
            None => None,
        };

        let mut reminder = ReminderConfig::default();
        if let Some(secs) = parse_var::<u64>(ENV_REMINDER_TICK_SECS, var(ENV_REMINDER_TICK_SECS))? {
            if secs == 0 {
                return Err(TaskbellError::Config(format!(
                    "{ENV_REMINDER_TICK_SECS} must be at least 1"
                )));
            }
            reminder.tick = Duration::from_secs(secs);
        }
        let lookahead = parse_var::<u32>(
            ENV_REMINDER_LOOKAHEAD_MINUTES,
            var(ENV_REMINDER_LOOKAHEAD_MINUTES),
        )?
        .map_or(DEFAULT_LOOKAHEAD_MINUTES, i64::from);
        reminder.lookahead = TimeDelta::minutes(lookahead);

        let utc_offset = match parse_var::<FixedOffset>(ENV_UTC_OFFSET, var(ENV_UTC_OFFSET))? {
            Some(offset) => offset,
            None => default_utc_offset(),
        };

        let channel = ChannelId::new(var(ENV_CHANNEL).unwrap_or_else(|| DEFAULT_CHANNEL.to_string()));

        Ok(Self {
            openai,
            reminder,
            utc_offset,
            channel,
        })
    }
}

fn parse_var<T>(key: &str, raw: Option<String>) -> Result<Option<T>, TaskbellError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.map(|raw| {
        raw.parse::<T>()
            .map_err(|e| TaskbellError::Config(format!("{key}={raw}: {e}")))
    })
    .transpose()
}
