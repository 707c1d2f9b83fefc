//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! - 必須の port（TextGenerator, Notifier）が揃っているかを build() で検証（Fail-fast）
//! - それ以外は開発用のデフォルト実装で埋める

use std::sync::Arc;

use chrono::FixedOffset;

use super::config::Config;
use super::reminder_loop::{ReminderConfig, ReminderHandle, ReminderScheduler};
use super::service::TaskService;
use crate::domain::{TaskbellError, default_utc_offset};
use crate::impls::{InMemoryCalendar, InMemoryTaskStore, OpenAiTextGenerator, TemplateTextGenerator};
use crate::ports::{
    CalendarService, Clock, Notifier, SystemClock, TaskStore, TextGenerator, UlidGenerator,
};

/// AppBuilder はアプリケーションを構築
///
/// # 使用例
/// ```ignore
/// let app = AppBuilder::new()
///     .with_config(&config)?
///     .notifier(Arc::new(MyNotifier))
///     .build()?;
/// let reminders = app.start_reminders();
/// ```
///
/// # デフォルト
/// - clock: SystemClock
/// - store: InMemoryTaskStore（clock を共有）
/// - calendar: InMemoryCalendar（ULID のイベント ID）
/// - offset: Config と同じ +09:00
pub struct AppBuilder {
    clock: Option<Arc<dyn Clock>>,
    store: Option<Arc<dyn TaskStore>>,
    text: Option<Arc<dyn TextGenerator>>,
    calendar: Option<Arc<dyn CalendarService>>,
    notifier: Option<Arc<dyn Notifier>>,
    reminder: ReminderConfig,
    offset: Option<FixedOffset>,
}

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing components: {0:?}. These must be provided before build().")]
    MissingComponents(Vec<&'static str>),
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            clock: None,
            store: None,
            text: None,
            calendar: None,
            notifier: None,
            reminder: ReminderConfig::default(),
            offset: None,
        }
    }

    /// Apply reminder timing, offset and the text generator from `config`.
    ///
    /// Without an API key the offline templates are used.
    pub fn with_config(self, config: &Config) -> Result<Self, TaskbellError> {
        let text: Arc<dyn TextGenerator> = match &config.openai {
            Some(settings) => Arc::new(OpenAiTextGenerator::new(settings.clone())?),
            None => Arc::new(TemplateTextGenerator::default()),
        };
        Ok(self
            .text_generator(text)
            .reminder(config.reminder.clone())
            .utc_offset(config.utc_offset))
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn store(mut self, store: Arc<dyn TaskStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn text_generator(mut self, text: Arc<dyn TextGenerator>) -> Self {
        self.text = Some(text);
        self
    }

    pub fn calendar(mut self, calendar: Arc<dyn CalendarService>) -> Self {
        self.calendar = Some(calendar);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn reminder(mut self, reminder: ReminderConfig) -> Self {
        self.reminder = reminder;
        self
    }

    pub fn utc_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = Some(offset);
        self
    }

    /// # 検証
    /// - text generator と notifier が設定されているかチェック
    /// - 不足があれば BuildError::MissingComponents を返す
    pub fn build(self) -> Result<App, BuildError> {
        let mut missing = Vec::new();
        if self.text.is_none() {
            missing.push("text_generator");
        }
        if self.notifier.is_none() {
            missing.push("notifier");
        }
        let (Some(text), Some(notifier)) = (self.text, self.notifier) else {
            return Err(BuildError::MissingComponents(missing));
        };

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryTaskStore::new(Arc::clone(&clock))));
        let calendar = self.calendar.unwrap_or_else(|| {
            Arc::new(InMemoryCalendar::new(Box::new(UlidGenerator::new(
                Arc::clone(&clock),
            ))))
        });
        let offset = self.offset.unwrap_or_else(default_utc_offset);

        let service = TaskService::new(Arc::clone(&store), text, calendar, offset);
        let scheduler = ReminderScheduler::new(store, notifier, clock, self.reminder);

        Ok(App {
            service: Arc::new(service),
            scheduler: Arc::new(scheduler),
        })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// App はワイヤリング済みのサービスとリマインドループ
pub struct App {
    pub service: Arc<TaskService>,
    pub scheduler: Arc<ReminderScheduler>,
}

impl App {
    /// Spawn the periodic reminder sweep. Stop it with the returned handle.
    pub fn start_reminders(&self) -> ReminderHandle {
        Arc::clone(&self.scheduler).spawn()
    }
}
