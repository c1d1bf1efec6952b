//! Countdown state machine
//!
//! All mutation of a countdown funnels through this type, one serialized
//! event at a time: ticks, lifecycle phases, reconfigurations, disposal.
//! Scheduling lives in the controller; this type never blocks or awaits.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::lifecycle::AppPhase;
use crate::state::RemainingSeconds;

use super::hooks::CountdownHooks;
use super::reconcile::CountdownConfig;

/// What a single tick did to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TickOutcome {
    /// Notified the tick observer and decremented by one second.
    Ticked,
    /// Reached zero; the tick source must tear itself down.
    Completed,
    /// Instance already disposed; nothing happened.
    Ignored,
}

/// What a lifecycle phase event did to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PhaseOutcome {
    Unchanged,
    /// Remaining duration was compensated but is still above zero.
    Adjusted,
    /// Compensation drove the remaining duration to zero; the tick
    /// source must be cancelled by the caller.
    Completed,
}

#[derive(Debug)]
pub(crate) struct CountdownCore {
    config: CountdownConfig,
    remaining: RemainingSeconds,
    /// Wall-clock instant of the last background transition, consumed
    /// exactly once by the next active transition.
    backgrounded_at: Option<DateTime<Utc>>,
    /// Single source of truth for whether completion has been notified.
    finish_fired: bool,
    disposed: bool,
    hooks: CountdownHooks,
}

impl CountdownCore {
    pub(crate) fn new(config: CountdownConfig, hooks: CountdownHooks) -> Self {
        Self {
            remaining: RemainingSeconds::from(config.target_seconds),
            config,
            backgrounded_at: None,
            finish_fired: false,
            disposed: false,
            hooks,
        }
    }

    pub(crate) fn remaining(&self) -> RemainingSeconds {
        self.remaining
    }

    pub(crate) fn finished(&self) -> bool {
        self.finish_fired
    }

    pub(crate) fn config(&self) -> CountdownConfig {
        self.config
    }

    pub(crate) fn disposed(&self) -> bool {
        self.disposed
    }

    pub(crate) fn set_config(&mut self, config: CountdownConfig) {
        self.config = config;
    }

    pub(crate) fn reset_remaining(&mut self, target_seconds: u64) {
        self.remaining = RemainingSeconds::from(target_seconds);
    }

    /// Advance the countdown by one second.
    ///
    /// A single tick invokes at most one of the finish notifier or the
    /// tick-observer-then-decrement pair, never both.
    pub(crate) fn tick(&mut self) -> TickOutcome {
        if self.disposed {
            return TickOutcome::Ignored;
        }

        if self.remaining.get() <= 1 {
            self.remaining = RemainingSeconds::ZERO;
            self.notify_finish();
            TickOutcome::Completed
        } else {
            if let Some(on_tick) = &self.hooks.on_tick {
                on_tick();
            }
            self.remaining = self.remaining.decrement();
            TickOutcome::Ticked
        }
    }

    /// Absorb a host lifecycle phase event.
    ///
    /// Background records the wall-clock entry time without touching the
    /// tick schedule. Active consumes that timestamp and deducts the gap
    /// in a single catch-up step, substituting for ticks the suspended
    /// host never delivered. A repeated background overwrites the
    /// timestamp; an active with no recorded background is a no-op.
    pub(crate) fn handle_phase(&mut self, phase: AppPhase, now: DateTime<Utc>) -> PhaseOutcome {
        if self.disposed {
            return PhaseOutcome::Unchanged;
        }

        match phase {
            AppPhase::Background => {
                self.backgrounded_at = Some(now);
                PhaseOutcome::Unchanged
            }
            AppPhase::Active => {
                let Some(went_background_at) = self.backgrounded_at.take() else {
                    return PhaseOutcome::Unchanged;
                };

                let elapsed = (now - went_background_at).num_milliseconds() as f64 / 1000.0;
                let before = self.remaining;
                self.remaining = self.remaining.deduct_elapsed(elapsed);
                debug!(
                    "Compensated {:.1}s of background time, {} -> {} remaining",
                    elapsed,
                    before.get(),
                    self.remaining.get()
                );

                if self.remaining.is_zero() && !before.is_zero() {
                    // Completion is not deferred to the next tick; the
                    // countdown may not even have a tick source running.
                    self.notify_finish();
                    PhaseOutcome::Completed
                } else if self.remaining != before {
                    PhaseOutcome::Adjusted
                } else {
                    PhaseOutcome::Unchanged
                }
            }
        }
    }

    /// Invoke the forwarded interaction hook, if one is configured.
    /// Returns whether the surface is interactive at all.
    pub(crate) fn press(&self) -> bool {
        if self.disposed {
            return false;
        }
        match &self.hooks.on_press {
            Some(on_press) => {
                on_press();
                true
            }
            None => false,
        }
    }

    /// Mark the instance dead. No mutation or notification afterwards.
    pub(crate) fn dispose(&mut self) {
        self.disposed = true;
    }

    fn notify_finish(&mut self) {
        if self.finish_fired {
            return;
        }
        self.finish_fired = true;
        if let Some(on_finish) = &self.hooks.on_finish {
            on_finish();
        }
    }
}
