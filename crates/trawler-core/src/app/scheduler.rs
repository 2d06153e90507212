//! CycleScheduler - 一定間隔で検索サイクルを回すバックグラウンドループ
//!
//! # フロー
//! 1. `start()` でループを 1 本だけ spawn（二重起動は no-op）
//! 2. 毎 quantum ごとに「前回から interval を超えたか」を判定
//! 3. 超えていれば last_run を先に更新してからサイクルを実行
//! 4. サイクル後に abort フラグを見て、立っていれば抜ける
//!
//! # 実装詳細
//! - サイクルは子タスクで実行し、Err も panic もここで握りつぶしてログに出す
//! - 実行中のサイクルは中断しない。`stop()` はループの次の判定で効く
//! - 時間は `tokio::time::Instant` で測るので、テストでは時計を止めて進められる

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::app::status::{CycleReport, SchedulerStatus};
use crate::config::SchedulerConfig;
use crate::domain::TrawlerError;

/// One unit of scheduled work.
#[async_trait]
pub trait CycleRunner: Send + Sync {
    async fn run_cycle(&self) -> Result<CycleReport, TrawlerError>;
}

#[derive(Default)]
struct Shared {
    running: AtomicBool,
    abort: AtomicBool,
    status: tokio::sync::Mutex<SchedulerStatus>,
}

/// Scheduler handle.
/// - drop するとループに停止を要求する（実行中のサイクルは最後まで走る）
pub struct CycleScheduler {
    runner: Arc<dyn CycleRunner>,
    config: SchedulerConfig,
    shared: Arc<Shared>,
    /// `start` と `stop` はこのロックの中で abort を触る
    join: Mutex<Option<JoinHandle<()>>>,
}

impl CycleScheduler {
    /// # Errors
    ///
    /// Returns `TrawlerError::Config` if `config` does not validate.
    pub fn new(
        runner: Arc<dyn CycleRunner>,
        config: SchedulerConfig,
    ) -> Result<Self, TrawlerError> {
        config.validate()?;
        Ok(Self {
            runner,
            config,
            shared: Arc::new(Shared::default()),
            join: Mutex::new(None),
        })
    }

    /// Spawn the loop. Returns `false` if it was already running.
    ///
    /// With `run_immediately` the first check fires a cycle; otherwise the
    /// first cycle comes one full interval after start.
    ///
    /// # Panics
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, run_immediately: bool) -> bool {
        let mut slot = self.join_slot();
        if self
            .shared
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("scheduler already running");
            return false;
        }
        self.shared.abort.store(false, Ordering::Release);

        let last_run = if run_immediately {
            None
        } else {
            Some(Instant::now())
        };
        info!(
            run_immediately,
            interval = ?self.config.cycle_interval,
            "scheduler started"
        );

        let handle = tokio::spawn(run_loop(
            Arc::clone(&self.runner),
            self.config.clone(),
            Arc::clone(&self.shared),
            last_run,
        ));
        *slot = Some(handle);
        true
    }

    /// Ask the loop to exit after its current check. No-op when idle.
    pub fn stop(&self) {
        let _slot = self.join_slot();
        if self.shared.running.load(Ordering::Acquire) {
            debug!("scheduler stop requested");
            self.shared.abort.store(true, Ordering::Release);
        }
    }

    /// Stop and wait for the loop (and any in-flight cycle) to finish.
    pub async fn stop_and_join(&self) {
        self.stop();
        let handle = self.join_slot().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!(error = %e, "scheduler loop ended abnormally");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    pub async fn status(&self) -> SchedulerStatus {
        let mut status = self.shared.status.lock().await.clone();
        status.running = self.is_running();
        status
    }

    fn join_slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.join.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for CycleScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_loop(
    runner: Arc<dyn CycleRunner>,
    config: SchedulerConfig,
    shared: Arc<Shared>,
    mut last_run: Option<Instant>,
) {
    loop {
        let now = Instant::now();
        let due = match last_run {
            None => true,
            Some(prev) => now.duration_since(prev) > config.cycle_interval,
        };
        if due {
            // 先に記録する: 失敗しても次の interval までは再実行しない
            last_run = Some(now);
            run_guarded(&runner, &shared).await;
        }

        if shared.abort.swap(false, Ordering::AcqRel) {
            break;
        }
        tokio::time::sleep(config.poll_quantum).await;
    }

    shared.running.store(false, Ordering::Release);
    info!("scheduler stopped");
}

async fn run_guarded(runner: &Arc<dyn CycleRunner>, shared: &Shared) {
    {
        let mut status = shared.status.lock().await;
        status.cycles_started += 1;
        status.last_run_at = Some(Utc::now());
    }

    let runner = Arc::clone(runner);
    let outcome = tokio::spawn(async move { runner.run_cycle().await }).await;

    let mut status = shared.status.lock().await;
    match outcome {
        Ok(Ok(report)) => status.last_report = Some(report),
        Ok(Err(e)) => {
            status.cycles_failed += 1;
            error!("search cycle failed: {e}");
            debug!(error = ?e, "search cycle error detail");
        }
        Err(e) => {
            status.cycles_failed += 1;
            error!("search cycle panicked: {e}");
            debug!(error = ?e, "search cycle join error detail");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CycleId, StoreError};
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use ulid::Ulid;

    #[derive(Clone, Copy)]
    enum Behaviour {
        Succeed,
        Fail,
        Panic,
    }

    struct CountingRunner {
        runs: AtomicUsize,
        behaviour: Behaviour,
    }

    impl CountingRunner {
        fn new(behaviour: Behaviour) -> Arc<Self> {
            Arc::new(Self {
                runs: AtomicUsize::new(0),
                behaviour,
            })
        }

        fn runs(&self) -> usize {
            self.runs.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CycleRunner for CountingRunner {
        async fn run_cycle(&self) -> Result<CycleReport, TrawlerError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            match self.behaviour {
                Behaviour::Succeed => Ok(CycleReport::new(CycleId::from_ulid(Ulid::new()))),
                Behaviour::Fail => Err(StoreError::Query("no such table: tv_episodes".into()).into()),
                Behaviour::Panic => panic!("provider blew up"),
            }
        }
    }

    struct SlowRunner {
        duration: Duration,
        finished: AtomicBool,
    }

    impl SlowRunner {
        fn new(duration: Duration) -> Arc<Self> {
            Arc::new(Self {
                duration,
                finished: AtomicBool::new(false),
            })
        }

        fn finished(&self) -> bool {
            self.finished.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CycleRunner for SlowRunner {
        async fn run_cycle(&self) -> Result<CycleReport, TrawlerError> {
            tokio::time::sleep(self.duration).await;
            self.finished.store(true, Ordering::SeqCst);
            Ok(CycleReport::new(CycleId::from_ulid(Ulid::new())))
        }
    }

    fn short_config() -> SchedulerConfig {
        SchedulerConfig {
            cycle_interval: Duration::from_secs(2),
            poll_quantum: Duration::from_secs(1),
            run_at_start: true,
        }
    }

    async fn advance(secs: u64) {
        tokio::time::sleep(Duration::from_secs(secs)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn run_immediately_fires_within_one_quantum() {
        let runner = CountingRunner::new(Behaviour::Succeed);
        let scheduler = CycleScheduler::new(runner.clone(), SchedulerConfig::default()).unwrap();

        assert!(scheduler.start(true));
        advance(1).await;

        assert_eq!(runner.runs(), 1);
        let status = scheduler.status().await;
        assert!(status.running);
        assert!(status.last_run_at.is_some());
        assert!(status.last_report.is_some());
        scheduler.stop_and_join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn deferred_start_waits_one_full_interval() {
        let runner = CountingRunner::new(Behaviour::Succeed);
        let scheduler = CycleScheduler::new(runner.clone(), SchedulerConfig::default()).unwrap();

        scheduler.start(false);
        advance(599).await;
        assert_eq!(runner.runs(), 0);

        advance(3).await;
        assert_eq!(runner.runs(), 1);
        scheduler.stop_and_join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn cycles_repeat_once_the_interval_has_elapsed() {
        let runner = CountingRunner::new(Behaviour::Succeed);
        let scheduler = CycleScheduler::new(runner.clone(), short_config()).unwrap();

        scheduler.start(true);
        // fires at 0, 3, 6 and 9
        tokio::time::sleep(Duration::from_millis(9_500)).await;

        assert_eq!(runner.runs(), 4);
        scheduler.stop_and_join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_takes_effect_within_one_quantum() {
        let runner = CountingRunner::new(Behaviour::Succeed);
        let scheduler = CycleScheduler::new(runner.clone(), SchedulerConfig::default()).unwrap();

        scheduler.start(true);
        advance(5).await;
        scheduler.stop();
        assert!(scheduler.is_running());

        tokio::time::sleep(Duration::from_millis(1_001)).await;
        assert!(!scheduler.is_running());
        assert_eq!(runner.runs(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn start_while_running_is_a_no_op() {
        let runner = CountingRunner::new(Behaviour::Succeed);
        let scheduler = CycleScheduler::new(runner.clone(), SchedulerConfig::default()).unwrap();

        assert!(scheduler.start(true));
        assert!(!scheduler.start(true));
        advance(1).await;

        assert_eq!(runner.runs(), 1);
        scheduler.stop_and_join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_when_idle_leaves_no_stale_abort() {
        let runner = CountingRunner::new(Behaviour::Succeed);
        let scheduler = CycleScheduler::new(runner.clone(), short_config()).unwrap();

        scheduler.stop();
        assert!(!scheduler.is_running());

        scheduler.start(true);
        advance(4).await;
        assert!(scheduler.is_running());
        assert_eq!(runner.runs(), 2);
        scheduler.stop_and_join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn restart_after_stop_runs_again() {
        let runner = CountingRunner::new(Behaviour::Succeed);
        let scheduler = CycleScheduler::new(runner.clone(), SchedulerConfig::default()).unwrap();

        scheduler.start(true);
        scheduler.stop_and_join().await;
        assert!(!scheduler.is_running());

        assert!(scheduler.start(true));
        advance(1).await;
        assert_eq!(runner.runs(), 2);
        scheduler.stop_and_join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn failing_cycle_keeps_the_loop_alive() {
        let runner = CountingRunner::new(Behaviour::Fail);
        let scheduler = CycleScheduler::new(runner.clone(), short_config()).unwrap();

        scheduler.start(true);
        tokio::time::sleep(Duration::from_millis(6_500)).await;

        assert!(scheduler.is_running());
        assert_eq!(runner.runs(), 3);
        let status = scheduler.status().await;
        assert_eq!(status.cycles_started, 3);
        assert_eq!(status.cycles_failed, 3);
        assert!(status.last_report.is_none());
        scheduler.stop_and_join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_cycle_keeps_the_loop_alive() {
        let runner = CountingRunner::new(Behaviour::Panic);
        let scheduler = CycleScheduler::new(runner.clone(), short_config()).unwrap();

        scheduler.start(true);
        tokio::time::sleep(Duration::from_millis(6_500)).await;

        assert!(scheduler.is_running());
        assert_eq!(runner.runs(), 3);
        assert_eq!(scheduler.status().await.cycles_failed, 3);
        scheduler.stop_and_join().await;
    }

    #[test]
    fn invalid_config_is_rejected() {
        let runner = CountingRunner::new(Behaviour::Succeed);
        let config = SchedulerConfig {
            poll_quantum: Duration::ZERO,
            ..SchedulerConfig::default()
        };

        let err = CycleScheduler::new(runner, config).err().unwrap();

        assert!(matches!(err, TrawlerError::Config(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_lets_the_running_cycle_finish() {
        let runner = SlowRunner::new(Duration::from_secs(5));
        let scheduler = CycleScheduler::new(runner.clone(), SchedulerConfig::default()).unwrap();

        scheduler.start(true);
        advance(1).await;
        scheduler.stop();

        tokio::time::sleep(Duration::from_millis(3_500)).await;
        assert!(!runner.finished());
        assert!(scheduler.is_running());

        advance(1).await;
        assert!(runner.finished());
        assert!(!scheduler.is_running());
        assert!(scheduler.status().await.last_report.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_scheduler_lets_the_running_cycle_finish() {
        let runner = SlowRunner::new(Duration::from_secs(5));
        let scheduler = CycleScheduler::new(runner.clone(), SchedulerConfig::default()).unwrap();

        scheduler.start(true);
        advance(1).await;
        drop(scheduler);

        tokio::time::sleep(Duration::from_millis(4_500)).await;
        assert!(runner.finished());
        // loop and cycle task have both released the runner
        assert_eq!(Arc::strong_count(&runner), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn abort_from_a_finished_loop_does_not_stop_the_next_one() {
        let runner = CountingRunner::new(Behaviour::Succeed);
        let scheduler = CycleScheduler::new(runner.clone(), short_config()).unwrap();

        scheduler.start(true);
        advance(1).await;
        scheduler.stop();
        advance(2).await;
        assert!(!scheduler.is_running());
        scheduler.stop();

        assert!(scheduler.start(true));
        // fires on restart and again three seconds later
        advance(4).await;
        assert!(scheduler.is_running());
        assert_eq!(runner.runs(), 3);
        scheduler.stop_and_join().await;
    }
}
