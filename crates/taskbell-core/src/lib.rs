//! taskbell-core
//!
//! Core building blocks for the taskbell task tracker.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, task, due, errors）
//! - **planner**: 見積もり文の解析とカレンダー枠の計算
//! - **ports**: 抽象化レイヤー（TaskStore, TextGenerator, CalendarService, Notifier, Clock）
//! - **impls**: 実装（InMemoryTaskStore, OpenAiTextGenerator など）
//! - **app**: アプリケーションロジック（builder, config, service, reminder_loop）

pub mod app;
pub mod domain;
pub mod impls;
pub mod planner;
pub mod ports;
