//! Host lifecycle phase broadcast

use tokio::sync::broadcast;
use tracing::debug;

/// Host application lifecycle phase, delivered as discrete events.
///
/// The two phases in practice alternate, but consumers must absorb
/// repeats of either as no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppPhase {
    Active,
    Background,
}

/// Injected source of lifecycle phase events.
///
/// Whatever the host uses to detect foreground/background transitions
/// (the bundled binary bridges SIGUSR1/SIGUSR2) funnels into `emit`;
/// countdown instances hold a scoped subscription that is dropped on
/// disposal, so no dangling listener survives a shutdown.
#[derive(Debug, Clone)]
pub struct LifecycleSignal {
    tx: broadcast::Sender<AppPhase>,
}

impl LifecycleSignal {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppPhase> {
        self.tx.subscribe()
    }

    /// Broadcast a phase transition to all subscribers.
    pub fn emit(&self, phase: AppPhase) {
        debug!("Lifecycle phase event: {:?}", phase);
        // A send with no live subscribers is not an error here
        let _ = self.tx.send(phase);
    }
}

impl Default for LifecycleSignal {
    fn default() -> Self {
        Self::new()
    }
}
