//! Errors - エラー型と分類
//!
//! - Validation: 入力不正（締め切りの形式、空タイトル、完了対象の指定ミス）
//! - NotFound: 完了対象のタスクが存在しない
//! - Collaborator: 外部サービス（文章生成・カレンダー・通知）の失敗
//! - Config: 環境変数などの設定不正
//!
//! ID の重複や更新の消失は実行時エラーとしては扱わない。
//! ストアの単一ロックによって構造的に起こらない。

use std::fmt;

use thiserror::Error;

/// 失敗した外部サービスの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collaborator {
    TextGeneration,
    Calendar,
    Notification,
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Collaborator::TextGeneration => "text generation",
            Collaborator::Calendar => "calendar",
            Collaborator::Notification => "notification",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum TaskbellError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("task not found: {0}")]
    NotFound(String),

    #[error("{service} failed: {message}")]
    Collaborator {
        service: Collaborator,
        message: String,
    },

    #[error("config error: {0}")]
    Config(String),
}

impl TaskbellError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn collaborator(service: Collaborator, message: impl fmt::Display) -> Self {
        Self::Collaborator {
            service,
            message: message.to_string(),
        }
    }

    /// Errors caused by the requester's input (no state was touched).
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotFound(_))
    }
}
