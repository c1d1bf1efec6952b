//! Configuration diffing for externally driven reconfiguration

use crate::state::RemainingSeconds;

/// Externally supplied countdown parameters, diffed on every
/// reconfiguration against the previously applied snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownConfig {
    /// Countdown target in whole seconds.
    pub target_seconds: u64,
    /// Whether the timer should be ticking.
    pub running: bool,
}

impl CountdownConfig {
    /// Build a config from untrusted input, clamping a negative target.
    pub fn new(target_seconds: i64, running: bool) -> Self {
        Self {
            target_seconds: RemainingSeconds::clamped(target_seconds).get(),
            running,
        }
    }
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            target_seconds: 0,
            running: true,
        }
    }
}

/// One scheduling side effect demanded by a reconfiguration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileAction {
    /// Reset the remaining duration to the new target.
    ResetRemaining(u64),
    /// Ensure a tick source is scheduled (no-op if one exists).
    Start,
    /// Cancel the tick source (no-op if none exists).
    Stop,
}

/// Decide which actions a config change requires.
///
/// Pure decision logic: the target rule and the running rule apply
/// independently, so a reconfiguration changing both resets the duration
/// and adjusts the schedule in the same pass. An unchanged config yields
/// no actions, which is what makes replaying a configuration idempotent.
pub fn diff(old: &CountdownConfig, new: &CountdownConfig) -> Vec<ReconcileAction> {
    let mut actions = Vec::new();

    if old.target_seconds != new.target_seconds {
        actions.push(ReconcileAction::ResetRemaining(new.target_seconds));
        if new.running {
            actions.push(ReconcileAction::Start);
        }
    }

    if old.running != new.running {
        actions.push(if new.running {
            ReconcileAction::Start
        } else {
            ReconcileAction::Stop
        });
    }

    actions
}
