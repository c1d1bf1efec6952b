//! Signal handling: graceful shutdown and lifecycle phase delivery

use futures::stream::StreamExt;
use signal_hook::consts::{SIGINT, SIGTERM, SIGUSR1, SIGUSR2};
use signal_hook_tokio::Signals;
use tracing::info;

use crate::lifecycle::{AppPhase, LifecycleSignal};

/// Wait for shutdown signals (SIGTERM, SIGINT)
pub async fn shutdown_signal() {
    let mut signals =
        Signals::new([SIGTERM, SIGINT]).expect("Failed to create shutdown signal handler");

    if let Some(signal) = signals.next().await {
        info!("Received signal: {}", signal);
    }
}

/// Bridge host lifecycle signals onto the lifecycle broadcast.
///
/// SIGUSR1 marks the transition to background, SIGUSR2 the return to
/// active. Runs until the process exits.
pub async fn deliver_lifecycle_signals(lifecycle: LifecycleSignal) {
    let mut signals =
        Signals::new([SIGUSR1, SIGUSR2]).expect("Failed to create lifecycle signal handler");

    info!("Listening for lifecycle signals (SIGUSR1=background, SIGUSR2=active)");

    while let Some(signal) = signals.next().await {
        match signal {
            SIGUSR1 => lifecycle.emit(AppPhase::Background),
            SIGUSR2 => lifecycle.emit(AppPhase::Active),
            _ => {}
        }
    }
}
