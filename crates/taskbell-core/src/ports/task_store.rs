//! TaskStore port - タスク集合の正本（source of truth）
//!
//! 呼び出し側は共有状態に直接触れず、ここに並ぶ操作だけを使う。
//! 排他制御は実装の内部詳細。
//!
//! # 実装
//! - `impls::InMemoryTaskStore`（プロセス内メモリ、再起動で消える）

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{ChannelId, Completion, Task, TaskId, TaskRef, TaskbellError};

/// TaskStore はタスクの作成・一覧・完了・リマインド状態を管理
///
/// # 設計原則
/// - 変更操作は互いに排他（ID の採番と追加は不可分）
/// - 読み出しはスナップショットを返す（ライブビューではない）
/// - 外部サービス呼び出しはロックの外で行う（この trait は I/O を持たない）
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Allocate the next id and append an open, not-yet-notified task.
    async fn create(
        &self,
        title: &str,
        due: DateTime<Utc>,
        channel: ChannelId,
    ) -> Result<Task, TaskbellError>;

    /// Snapshot of every task in creation order.
    async fn list(&self) -> Vec<Task>;

    async fn get(&self, id: TaskId) -> Option<Task>;

    /// Complete the first task (creation order) matching `target`.
    ///
    /// Completing an already completed task is not an error.
    async fn complete(&self, target: &TaskRef) -> Result<Completion, TaskbellError>;

    /// Open, not-yet-notified tasks with `due <= threshold`, in creation order.
    async fn due_before(&self, threshold: DateTime<Utc>) -> Vec<Task>;

    /// Like [`TaskStore::due_before`], but also claims the returned tasks so a
    /// concurrent sweep will not pick them up until they are marked or
    /// released.
    async fn claim_due(&self, threshold: DateTime<Utc>) -> Vec<Task>;

    /// Record that the reminder went out. Idempotent.
    async fn mark_notified(&self, id: TaskId) -> Result<Task, TaskbellError>;

    /// Drop a claim after a failed send so the next sweep retries.
    async fn release_claim(&self, id: TaskId) -> Result<(), TaskbellError>;
}
