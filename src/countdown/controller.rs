//! Countdown instance with owned tick scheduling
//!
//! Wraps the state machine in the scheduling side effects: a single
//! cancellable tick source, a scoped lifecycle subscription and a watch
//! channel feeding renderers.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::{
    sync::{broadcast::error::RecvError, watch},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, error, info, warn};

use crate::lifecycle::{AppPhase, LifecycleSignal};
use crate::state::CountdownSnapshot;

use super::core::{CountdownCore, PhaseOutcome, TickOutcome};
use super::hooks::CountdownHooks;
use super::reconcile::{self, CountdownConfig, ReconcileAction};

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// The scheduling resource behind a running countdown.
///
/// Presence in the controller's slot means "a tick source is active";
/// cancellation both flags the task (checked under the state lock, so no
/// tick can slip in after `stop` returns) and aborts it.
#[derive(Debug)]
struct TickHandle {
    task: JoinHandle<()>,
    cancelled: Arc<AtomicBool>,
}

impl TickHandle {
    fn cancel(self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.task.abort();
    }
}

/// One countdown instance.
///
/// Cheap to clone; all clones share the same state machine, tick handle
/// slot and snapshot channel.
#[derive(Debug, Clone)]
pub struct Countdown {
    core: Arc<Mutex<CountdownCore>>,
    ticker: Arc<Mutex<Option<TickHandle>>>,
    lifecycle_task: Arc<Mutex<Option<JoinHandle<()>>>>,
    update_tx: watch::Sender<CountdownSnapshot>,
}

impl Countdown {
    /// Create a countdown and, unless configured paused, start ticking.
    ///
    /// The lifecycle subscription is acquired here and held by a
    /// forwarder task until `shutdown` releases it.
    pub fn new(config: CountdownConfig, hooks: CountdownHooks, lifecycle: &LifecycleSignal) -> Self {
        let running = config.running;
        let core = CountdownCore::new(config, hooks);
        let (update_tx, _) = watch::channel(CountdownSnapshot::initial(core.remaining()));

        let countdown = Self {
            core: Arc::new(Mutex::new(core)),
            ticker: Arc::new(Mutex::new(None)),
            lifecycle_task: Arc::new(Mutex::new(None)),
            update_tx,
        };

        let forwarder = countdown.clone();
        let mut phases = lifecycle.subscribe();
        let task = tokio::spawn(async move {
            loop {
                match phases.recv().await {
                    Ok(phase) => forwarder.apply_phase(phase, Utc::now()),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Lifecycle subscription lagged, {} events dropped", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
        if let Ok(mut slot) = countdown.lifecycle_task.lock() {
            *slot = Some(task);
        }

        if running {
            if let Err(e) = countdown.start() {
                error!("Failed to start countdown at construction: {}", e);
            }
        }
        countdown.publish();

        countdown
    }

    /// Schedule the once-per-second tick source.
    ///
    /// No-op when one is already scheduled or the instance is disposed;
    /// a second concurrent tick source can never exist.
    pub fn start(&self) -> Result<(), String> {
        let disposed = self
            .core
            .lock()
            .map_err(|e| format!("Failed to lock countdown state: {}", e))?
            .disposed();
        if disposed {
            return Ok(());
        }

        let mut slot = self
            .ticker
            .lock()
            .map_err(|e| format!("Failed to lock tick handle: {}", e))?;
        if slot.is_some() {
            return Ok(());
        }

        let cancelled = Arc::new(AtomicBool::new(false));
        let task = tokio::spawn(run_ticker(self.clone(), Arc::clone(&cancelled)));
        *slot = Some(TickHandle { task, cancelled });
        debug!("Tick source scheduled");
        Ok(())
    }

    /// Cancel the tick source, if one is scheduled.
    pub fn stop(&self) -> Result<(), String> {
        let handle = self
            .ticker
            .lock()
            .map_err(|e| format!("Failed to lock tick handle: {}", e))?
            .take();
        if let Some(handle) = handle {
            handle.cancel();
            debug!("Tick source cancelled");
        }
        Ok(())
    }

    /// Apply an externally supplied configuration.
    ///
    /// Diffs against the previously applied snapshot and performs only
    /// the required actions; replaying the same configuration changes
    /// nothing.
    pub fn reconcile(&self, new_config: CountdownConfig) -> Result<(), String> {
        let actions = {
            let mut core = self
                .core
                .lock()
                .map_err(|e| format!("Failed to lock countdown state: {}", e))?;
            if core.disposed() {
                return Ok(());
            }

            let actions = reconcile::diff(&core.config(), &new_config);
            core.set_config(new_config);
            // duration resets happen under the lock, before any
            // scheduling changes
            for action in &actions {
                if let ReconcileAction::ResetRemaining(target) = action {
                    core.reset_remaining(*target);
                }
            }
            actions
        };

        if actions.is_empty() {
            return Ok(());
        }

        info!("Reconfiguration requires {:?}", actions);
        for action in &actions {
            match action {
                ReconcileAction::Start => self.start()?,
                ReconcileAction::Stop => self.stop()?,
                ReconcileAction::ResetRemaining(_) => {}
            }
        }
        self.publish();
        Ok(())
    }

    /// Tear the instance down: cancel ticking, release the lifecycle
    /// subscription and refuse all further events.
    pub fn shutdown(&self) -> Result<(), String> {
        {
            let mut core = self
                .core
                .lock()
                .map_err(|e| format!("Failed to lock countdown state: {}", e))?;
            if core.disposed() {
                return Ok(());
            }
            core.dispose();
        }

        self.stop()?;

        if let Some(task) = self
            .lifecycle_task
            .lock()
            .map_err(|e| format!("Failed to lock lifecycle task: {}", e))?
            .take()
        {
            task.abort();
        }

        info!("Countdown disposed");
        Ok(())
    }

    /// Whether a tick source is currently scheduled.
    pub fn is_running(&self) -> Result<bool, String> {
        Ok(self
            .ticker
            .lock()
            .map_err(|e| format!("Failed to lock tick handle: {}", e))?
            .is_some())
    }

    /// The configuration most recently applied.
    pub fn config(&self) -> Result<CountdownConfig, String> {
        Ok(self
            .core
            .lock()
            .map_err(|e| format!("Failed to lock countdown state: {}", e))?
            .config())
    }

    pub fn snapshot(&self) -> Result<CountdownSnapshot, String> {
        let (remaining_seconds, finished) = {
            let core = self
                .core
                .lock()
                .map_err(|e| format!("Failed to lock countdown state: {}", e))?;
            (core.remaining(), core.finished())
        };

        Ok(CountdownSnapshot {
            running: self.is_running()?,
            finished,
            remaining_seconds,
        })
    }

    /// Subscribe to snapshot updates for rendering.
    pub fn updates(&self) -> watch::Receiver<CountdownSnapshot> {
        self.update_tx.subscribe()
    }

    /// Forward an interaction to the `on_press` hook. Returns false when
    /// no hook is configured, i.e. the surface is not interactive.
    pub fn press(&self) -> Result<bool, String> {
        let core = self
            .core
            .lock()
            .map_err(|e| format!("Failed to lock countdown state: {}", e))?;
        Ok(core.press())
    }

    /// Feed one lifecycle phase event into the state machine.
    pub(crate) fn apply_phase(&self, phase: AppPhase, now: DateTime<Utc>) {
        let outcome = match self.core.lock() {
            Ok(mut core) => core.handle_phase(phase, now),
            Err(e) => {
                error!("Failed to lock countdown state for lifecycle event: {}", e);
                return;
            }
        };

        match outcome {
            PhaseOutcome::Completed => {
                if let Err(e) = self.stop() {
                    error!("Failed to cancel tick source after compensation: {}", e);
                }
                self.publish();
            }
            PhaseOutcome::Adjusted => self.publish(),
            PhaseOutcome::Unchanged => {}
        }
    }

    fn publish(&self) {
        match self.snapshot() {
            Ok(snapshot) => {
                self.update_tx.send_replace(snapshot);
            }
            Err(e) => warn!("Failed to publish countdown snapshot: {}", e),
        }
    }
}

/// Drive the state machine once per second until completion or
/// cancellation.
async fn run_ticker(countdown: Countdown, cancelled: Arc<AtomicBool>) {
    // First fire lands one full period after scheduling. A host that was
    // suspended replays at most one overdue tick; the suspension gap
    // itself is covered by lifecycle compensation.
    let mut interval = time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;

        let outcome = {
            let Ok(mut core) = countdown.core.lock() else {
                error!("Countdown state lock poisoned, tick source exiting");
                break;
            };
            if cancelled.load(Ordering::SeqCst) {
                break;
            }
            core.tick()
        };

        match outcome {
            TickOutcome::Ticked => countdown.publish(),
            TickOutcome::Completed => {
                // clear the handle slot before announcing, so observers
                // never see a finished countdown still marked running
                if let Ok(mut slot) = countdown.ticker.lock() {
                    slot.take();
                }
                countdown.publish();
                break;
            }
            TickOutcome::Ignored => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use chrono::TimeDelta;
    use tokio::time::sleep;

    use super::*;

    struct Observed {
        ticks: Arc<AtomicUsize>,
        finishes: Arc<AtomicUsize>,
    }

    fn observed_hooks() -> (CountdownHooks, Observed) {
        let ticks = Arc::new(AtomicUsize::new(0));
        let finishes = Arc::new(AtomicUsize::new(0));

        let tick_counter = Arc::clone(&ticks);
        let finish_counter = Arc::clone(&finishes);
        let hooks = CountdownHooks::new()
            .on_tick(move || {
                tick_counter.fetch_add(1, Ordering::SeqCst);
            })
            .on_finish(move || {
                finish_counter.fetch_add(1, Ordering::SeqCst);
            });

        (hooks, Observed { ticks, finishes })
    }

    async fn drain_events() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn runs_target_down_and_finishes_once() {
        let lifecycle = LifecycleSignal::new();
        let (hooks, observed) = observed_hooks();
        let countdown = Countdown::new(CountdownConfig::new(3, true), hooks, &lifecycle);

        sleep(Duration::from_millis(4_500)).await;

        assert_eq!(observed.ticks.load(Ordering::SeqCst), 2);
        assert_eq!(observed.finishes.load(Ordering::SeqCst), 1);

        let snapshot = countdown.snapshot().unwrap();
        assert!(!snapshot.running);
        assert!(snapshot.finished);
        assert_eq!(snapshot.remaining_seconds.get(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn double_start_schedules_a_single_tick_source() {
        let lifecycle = LifecycleSignal::new();
        let (hooks, observed) = observed_hooks();
        let countdown = Countdown::new(CountdownConfig::new(100, true), hooks, &lifecycle);

        countdown.start().unwrap();
        countdown.start().unwrap();

        sleep(Duration::from_millis(1_200)).await;

        // one tick per simulated second, not two
        assert_eq!(observed.ticks.load(Ordering::SeqCst), 1);
        assert_eq!(countdown.snapshot().unwrap().remaining_seconds.get(), 99);
    }

    #[tokio::test(start_paused = true)]
    async fn paused_construction_does_not_tick() {
        let lifecycle = LifecycleSignal::new();
        let (hooks, observed) = observed_hooks();
        let countdown = Countdown::new(CountdownConfig::new(30, false), hooks, &lifecycle);

        sleep(Duration::from_secs(10)).await;

        assert!(!countdown.is_running().unwrap());
        assert_eq!(observed.ticks.load(Ordering::SeqCst), 0);
        assert_eq!(countdown.snapshot().unwrap().remaining_seconds.get(), 30);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_target_completes_on_first_tick() {
        let lifecycle = LifecycleSignal::new();
        let (hooks, observed) = observed_hooks();
        let countdown = Countdown::new(CountdownConfig::new(0, true), hooks, &lifecycle);

        sleep(Duration::from_millis(1_500)).await;

        assert_eq!(observed.ticks.load(Ordering::SeqCst), 0);
        assert_eq!(observed.finishes.load(Ordering::SeqCst), 1);
        assert!(!countdown.is_running().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn retarget_mid_run_keeps_ticking_uninterrupted() {
        let lifecycle = LifecycleSignal::new();
        let (hooks, observed) = observed_hooks();
        let countdown = Countdown::new(CountdownConfig::new(10, true), hooks, &lifecycle);

        sleep(Duration::from_millis(1_200)).await;
        assert_eq!(countdown.snapshot().unwrap().remaining_seconds.get(), 9);

        countdown.reconcile(CountdownConfig::new(5, true)).unwrap();
        assert_eq!(countdown.snapshot().unwrap().remaining_seconds.get(), 5);
        assert!(countdown.is_running().unwrap());

        sleep(Duration::from_secs(1)).await;
        // still exactly one tick source: one more tick, no burst
        assert_eq!(observed.ticks.load(Ordering::SeqCst), 2);
        assert_eq!(countdown.snapshot().unwrap().remaining_seconds.get(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn replaying_the_same_config_changes_nothing() {
        let lifecycle = LifecycleSignal::new();
        let (hooks, observed) = observed_hooks();
        let countdown = Countdown::new(CountdownConfig::new(60, true), hooks, &lifecycle);

        let config = countdown.config().unwrap();
        countdown.reconcile(config).unwrap();
        countdown.reconcile(config).unwrap();

        sleep(Duration::from_millis(1_200)).await;
        assert_eq!(observed.ticks.load(Ordering::SeqCst), 1);
        assert_eq!(countdown.snapshot().unwrap().remaining_seconds.get(), 59);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_stops_and_resume_restarts() {
        let lifecycle = LifecycleSignal::new();
        let (hooks, observed) = observed_hooks();
        let countdown = Countdown::new(CountdownConfig::new(60, true), hooks, &lifecycle);

        sleep(Duration::from_millis(1_200)).await;
        assert_eq!(countdown.snapshot().unwrap().remaining_seconds.get(), 59);

        countdown.reconcile(CountdownConfig::new(60, false)).unwrap();
        assert!(!countdown.is_running().unwrap());

        sleep(Duration::from_secs(600)).await;
        assert_eq!(observed.ticks.load(Ordering::SeqCst), 1);
        assert_eq!(countdown.snapshot().unwrap().remaining_seconds.get(), 59);

        countdown.reconcile(CountdownConfig::new(60, true)).unwrap();
        sleep(Duration::from_millis(1_200)).await;
        assert_eq!(countdown.snapshot().unwrap().remaining_seconds.get(), 58);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_pending_ticks_for_good() {
        let lifecycle = LifecycleSignal::new();
        let (hooks, observed) = observed_hooks();
        let countdown = Countdown::new(CountdownConfig::new(60, true), hooks, &lifecycle);

        sleep(Duration::from_millis(2_500)).await;
        assert_eq!(observed.ticks.load(Ordering::SeqCst), 2);

        countdown.shutdown().unwrap();
        assert!(!countdown.is_running().unwrap());

        sleep(Duration::from_secs(3_600)).await;
        assert_eq!(observed.ticks.load(Ordering::SeqCst), 2);
        assert_eq!(observed.finishes.load(Ordering::SeqCst), 0);

        // reconfigurations after disposal are refused
        countdown.reconcile(CountdownConfig::new(5, true)).unwrap();
        assert!(!countdown.is_running().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn compensation_to_zero_cancels_the_tick_source() {
        let lifecycle = LifecycleSignal::new();
        let (hooks, observed) = observed_hooks();
        let countdown = Countdown::new(CountdownConfig::new(5, true), hooks, &lifecycle);

        let went: DateTime<Utc> = "2024-06-01T12:00:00Z".parse().unwrap();
        countdown.apply_phase(AppPhase::Background, went);
        countdown.apply_phase(AppPhase::Active, went + TimeDelta::seconds(120));

        let snapshot = countdown.snapshot().unwrap();
        assert!(snapshot.finished);
        assert!(!snapshot.running);
        assert_eq!(snapshot.remaining_seconds.get(), 0);
        assert_eq!(observed.finishes.load(Ordering::SeqCst), 1);

        // no ticks are attributed for the gap, and none fire afterwards
        sleep(Duration::from_secs(10)).await;
        assert_eq!(observed.ticks.load(Ordering::SeqCst), 0);
        assert_eq!(observed.finishes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn emitted_phase_events_reach_the_countdown() {
        let lifecycle = LifecycleSignal::new();
        let (hooks, observed) = observed_hooks();
        let countdown = Countdown::new(CountdownConfig::new(100, false), hooks, &lifecycle);

        // a spurious active with no recorded background is absorbed
        lifecycle.emit(AppPhase::Active);
        drain_events().await;
        assert_eq!(countdown.snapshot().unwrap().remaining_seconds.get(), 100);

        // a sub-second background/active blip deducts nothing
        lifecycle.emit(AppPhase::Background);
        drain_events().await;
        lifecycle.emit(AppPhase::Active);
        drain_events().await;
        assert_eq!(countdown.snapshot().unwrap().remaining_seconds.get(), 100);
        assert_eq!(observed.ticks.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn snapshot_updates_flow_to_watchers() {
        let lifecycle = LifecycleSignal::new();
        let (hooks, _observed) = observed_hooks();
        let countdown = Countdown::new(CountdownConfig::new(90, true), hooks, &lifecycle);
        let mut updates = countdown.updates();

        sleep(Duration::from_millis(1_200)).await;

        assert!(updates.has_changed().unwrap());
        let snapshot = updates.borrow_and_update().clone();
        assert!(snapshot.running);
        assert_eq!(snapshot.remaining_seconds.get(), 89);
        assert_eq!(snapshot.time_parts().to_string(), "00:00:01:29");
    }
}
