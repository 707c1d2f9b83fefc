//! ReminderLoop - 締め切りが近いタスクへの定期リマインド
//!
//! # フロー（1 tick）
//! 1. Clock から now を取り、`threshold = now + lookahead` を計算
//! 2. TaskStore::claim_due() で対象を取得（作成順、同時に claim 済みにする）
//! 3. ロック外で Notifier::notify()
//! 4. 成功 → mark_notified / 失敗 → release_claim（次の tick で再送）
//!
//! 通知は at-least-once。締め切りを過ぎたタスクもプロセス再開後に一度だけ送る。

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::domain::TaskId;
use crate::ports::{Clock, Notifier, TaskStore};

pub const DEFAULT_TICK: Duration = Duration::from_secs(60);
pub const DEFAULT_LOOKAHEAD_MINUTES: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderConfig {
    /// Interval between sweeps.
    pub tick: Duration,
    /// A task is due for a reminder once `now >= due - lookahead`.
    pub lookahead: TimeDelta,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            tick: DEFAULT_TICK,
            lookahead: TimeDelta::minutes(DEFAULT_LOOKAHEAD_MINUTES),
        }
    }
}

pub fn reminder_message(title: &str) -> String {
    format!("⏰ リマインド: 「{title}」の締め切りが近づいてるよ！がんばってね💪")
}

/// What a single sweep did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub notified: Vec<TaskId>,
    /// Sends that failed; these stay eligible for the next sweep.
    pub failed: Vec<TaskId>,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.notified.is_empty() && self.failed.is_empty()
    }
}

pub struct ReminderScheduler {
    store: Arc<dyn TaskStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    config: ReminderConfig,
}

impl ReminderScheduler {
    pub fn new(
        store: Arc<dyn TaskStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        config: ReminderConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &ReminderConfig {
        &self.config
    }

    fn threshold(&self) -> DateTime<Utc> {
        self.clock
            .now()
            .checked_add_signed(self.config.lookahead)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Run one sweep. A failed send never stops the rest of the sweep.
    pub async fn sweep_once(&self) -> SweepReport {
        let threshold = self.threshold();
        let due = self.store.claim_due(threshold).await;
        let mut report = SweepReport::default();

        for task in due {
            let text = reminder_message(task.title());
            match self.notifier.notify(task.channel(), &text).await {
                Ok(()) => {
                    if let Err(error) = self.store.mark_notified(task.id()).await {
                        warn!(task_id = %task.id(), %error, "mark_notified failed");
                        continue;
                    }
                    info!(task_id = %task.id(), channel = %task.channel(), "reminder sent");
                    report.notified.push(task.id());
                }
                Err(error) => {
                    warn!(task_id = %task.id(), channel = %task.channel(), %error, "reminder failed, retrying next tick");
                    if let Err(error) = self.store.release_claim(task.id()).await {
                        warn!(task_id = %task.id(), %error, "release_claim failed");
                    }
                    report.failed.push(task.id());
                }
            }
        }

        report
    }

    /// Start the periodic sweep on the tokio runtime.
    pub fn spawn(self: Arc<Self>) -> ReminderHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(reminder_loop(self, shutdown_rx));
        ReminderHandle { shutdown_tx, join }
    }
}

/// Handle of a running reminder loop.
/// - `shutdown_tx` を drop するとループが止まる
/// - `shutdown_and_join()` で終了を待てる
pub struct ReminderHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl ReminderHandle {
    /// Stop after the current sweep (an in-flight send is not cancelled).
    pub fn request_shutdown(&self) {
        // ignore send error: the loop may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        if let Err(error) = self.join.await {
            warn!(%error, "reminder loop ended abnormally");
        }
    }
}

async fn reminder_loop(scheduler: Arc<ReminderScheduler>, mut shutdown_rx: watch::Receiver<bool>) {
    let period = scheduler.config.tick.max(Duration::from_millis(1));
    let mut ticker = tokio::time::interval(period);
    // 1 本のループ内では sweep が重ならない（遅れた tick は捨てる）
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    info!(tick_secs = period.as_secs_f64(), lookahead_min = scheduler.config.lookahead.num_minutes(), "reminder loop started");

    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                continue;
            }
            _ = ticker.tick() => {}
        }

        let report = scheduler.sweep_once().await;
        if !report.is_empty() {
            debug!(notified = report.notified.len(), failed = report.failed.len(), "sweep finished");
        }
    }

    info!("reminder loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChannelId, Collaborator, TaskRef, TaskbellError};
    use crate::impls::InMemoryTaskStore;
    use crate::ports::FixedClock;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    /// Records every send; can fail for a channel or for the first N calls.
    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(ChannelId, String)>>,
        fail_channel: Option<String>,
        fail_first: AtomicUsize,
        delay: Option<Duration>,
    }

    impl RecordingNotifier {
        async fn sent(&self) -> Vec<(ChannelId, String)> {
            self.sent.lock().await.clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, channel: &ChannelId, text: &str) -> Result<(), TaskbellError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let failing_channel = self.fail_channel.as_deref() == Some(channel.as_str());
            let failing_call = self
                .fail_first
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failing_channel || failing_call {
                return Err(TaskbellError::collaborator(Collaborator::Notification, "send failed"));
            }
            self.sent.lock().await.push((channel.clone(), text.to_string()));
            Ok(())
        }
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 10, hour, minute, 0).unwrap()
    }

    struct Fixture {
        clock: FixedClock,
        store: Arc<InMemoryTaskStore>,
        notifier: Arc<RecordingNotifier>,
        scheduler: Arc<ReminderScheduler>,
    }

    fn fixture(now: DateTime<Utc>, notifier: RecordingNotifier) -> Fixture {
        let clock = FixedClock::new(now);
        let store = Arc::new(InMemoryTaskStore::new(Arc::new(clock.clone())));
        let notifier = Arc::new(notifier);
        let scheduler = Arc::new(ReminderScheduler::new(
            store.clone(),
            notifier.clone(),
            Arc::new(clock.clone()),
            ReminderConfig::default(),
        ));
        Fixture {
            clock,
            store,
            notifier,
            scheduler,
        }
    }

    #[tokio::test]
    async fn fires_once_inside_the_window() {
        let f = fixture(at(14, 35), RecordingNotifier::default());
        let task = f
            .store
            .create("資料作成", at(15, 0), ChannelId::new("C-team"))
            .await
            .unwrap();

        f.clock.set(at(14, 36));
        let report = f.scheduler.sweep_once().await;
        assert_eq!(report.notified, vec![task.id()]);
        assert!(f.store.get(task.id()).await.unwrap().is_notified());

        let sent = f.notifier.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, ChannelId::new("C-team"));
        assert_eq!(sent[0].1, reminder_message("資料作成"));

        f.clock.set(at(14, 37));
        assert!(f.scheduler.sweep_once().await.is_empty());
        assert_eq!(f.notifier.sent().await.len(), 1);
    }

    #[tokio::test]
    async fn waits_until_the_window_opens() {
        let f = fixture(at(14, 0), RecordingNotifier::default());
        f.store
            .create("資料作成", at(15, 0), ChannelId::new("C"))
            .await
            .unwrap();

        f.clock.set(at(14, 29));
        assert!(f.scheduler.sweep_once().await.is_empty());

        f.clock.set(at(14, 30));
        assert_eq!(f.scheduler.sweep_once().await.notified.len(), 1);
    }

    #[tokio::test]
    async fn overdue_task_still_fires_once() {
        let f = fixture(at(9, 0), RecordingNotifier::default());
        f.store
            .create("資料作成", at(15, 0), ChannelId::new("C"))
            .await
            .unwrap();

        // プロセスが止まっていて窓を丸ごと逃した
        f.clock.set(at(18, 0));
        assert_eq!(f.scheduler.sweep_once().await.notified.len(), 1);
        assert!(f.scheduler.sweep_once().await.is_empty());
    }

    #[tokio::test]
    async fn completed_tasks_are_never_reminded() {
        let f = fixture(at(14, 35), RecordingNotifier::default());
        f.store
            .create("資料作成", at(15, 0), ChannelId::new("C"))
            .await
            .unwrap();
        f.store
            .complete(&TaskRef::Title("資料作成".into()))
            .await
            .unwrap();

        f.clock.set(at(16, 0));
        assert!(f.scheduler.sweep_once().await.is_empty());
        assert!(f.notifier.sent().await.is_empty());
    }

    #[tokio::test]
    async fn failed_send_is_retried_next_tick() {
        let notifier = RecordingNotifier {
            fail_first: AtomicUsize::new(1),
            ..Default::default()
        };
        let f = fixture(at(14, 35), notifier);
        let task = f
            .store
            .create("資料作成", at(15, 0), ChannelId::new("C"))
            .await
            .unwrap();

        let report = f.scheduler.sweep_once().await;
        assert_eq!(report.failed, vec![task.id()]);
        assert!(!f.store.get(task.id()).await.unwrap().is_notified());

        let report = f.scheduler.sweep_once().await;
        assert_eq!(report.notified, vec![task.id()]);
        assert_eq!(f.notifier.sent().await.len(), 1);
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_the_sweep() {
        let notifier = RecordingNotifier {
            fail_channel: Some("C-broken".into()),
            ..Default::default()
        };
        let f = fixture(at(14, 35), notifier);
        let broken = f
            .store
            .create("壊れた", at(14, 50), ChannelId::new("C-broken"))
            .await
            .unwrap();
        let ok = f
            .store
            .create("資料作成", at(15, 0), ChannelId::new("C-ok"))
            .await
            .unwrap();

        let report = f.scheduler.sweep_once().await;
        assert_eq!(report.failed, vec![broken.id()]);
        assert_eq!(report.notified, vec![ok.id()]);
    }

    #[tokio::test]
    async fn overlapping_sweeps_notify_once() {
        let notifier = RecordingNotifier {
            delay: Some(Duration::from_millis(50)),
            ..Default::default()
        };
        let f = fixture(at(14, 35), notifier);
        f.store
            .create("資料作成", at(15, 0), ChannelId::new("C"))
            .await
            .unwrap();

        let (a, b) = tokio::join!(f.scheduler.sweep_once(), f.scheduler.sweep_once());
        assert_eq!(a.notified.len() + b.notified.len(), 1);
        assert_eq!(f.notifier.sent().await.len(), 1);
    }

    #[tokio::test]
    async fn spawned_loop_sweeps_until_shutdown() {
        let f = fixture(at(14, 35), RecordingNotifier::default());
        let scheduler = Arc::new(ReminderScheduler::new(
            f.store.clone(),
            f.notifier.clone(),
            Arc::new(f.clock.clone()),
            ReminderConfig {
                tick: Duration::from_millis(10),
                ..ReminderConfig::default()
            },
        ));
        f.store
            .create("資料作成", at(15, 0), ChannelId::new("C"))
            .await
            .unwrap();

        let handle = scheduler.spawn();
        tokio::time::timeout(Duration::from_secs(2), async {
            while f.notifier.sent().await.is_empty() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        // 何 tick 回っても 1 回だけ
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.shutdown_and_join().await;
        assert_eq!(f.notifier.sent().await.len(), 1);
    }
}
