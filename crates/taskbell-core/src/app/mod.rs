//! App - アプリケーション層
//!
//! ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **AppBuilder**: アプリケーションの構築とワイヤリング
//! - **Config**: 環境変数からの設定
//! - **TaskService**: 追加・一覧・完了の共通入口
//! - **ReminderScheduler**: 締め切り前リマインドの定期スイープ
//! - **TaskCounts**: 集計

pub mod builder;
pub mod config;
pub mod reminder_loop;
pub mod service;
pub mod status;

// 主要な型を再エクスポート
pub use self::builder::{App, AppBuilder, BuildError};
pub use self::config::Config;
pub use self::reminder_loop::{
    ReminderConfig, ReminderHandle, ReminderScheduler, SweepReport, reminder_message,
};
pub use self::service::{AddTaskOutcome, AddTaskRequest, CalendarSync, CompleteOutcome, TaskService};
pub use self::status::TaskCounts;
