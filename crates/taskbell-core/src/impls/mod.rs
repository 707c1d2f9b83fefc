//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **InMemoryTaskStore**: プロセス内の正本（永続化なし）
//! - **InMemoryCalendar**: 登録イベントを保持するだけのカレンダー
//! - **OpenAiTextGenerator**: OpenAI 互換 API による文章生成
//! - **TemplateTextGenerator**: オフライン用の固定テンプレート

pub mod calendar;
pub mod inmem_store;
pub mod openai;
pub mod template_text;

pub use self::calendar::{CalendarEvent, InMemoryCalendar};
pub use self::inmem_store::InMemoryTaskStore;
pub use self::openai::{OpenAiSettings, OpenAiTextGenerator};
pub use self::template_text::TemplateTextGenerator;
