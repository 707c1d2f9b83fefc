//! Ports - 抽象化レイヤー
//!
//! Hexagonal Architecture の「ポート」を定義します。
//! 外部サービス（生成 AI、カレンダー、チャット通知）と時刻・ID 生成を
//! trait の裏に隠し、コアのロジックをテスト可能にします。

pub mod calendar;
pub mod clock;
pub mod id_generator;
pub mod notifier;
pub mod task_store;
pub mod text_generator;

// 主要な trait を再エクスポート
pub use self::calendar::CalendarService;
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::notifier::Notifier;
pub use self::task_store::TaskStore;
pub use self::text_generator::TextGenerator;
