//! Countdown display background task

use tokio::sync::watch;
use tracing::info;

use crate::state::CountdownSnapshot;

/// Render each published snapshot as the zero-padded `DD:HH:MM:SS` line.
///
/// This is the whole rendering collaborator: a pure decomposition of the
/// remaining duration, re-read once per state change. Exits when the
/// countdown is disposed and the channel closes.
pub async fn countdown_display_task(mut updates: watch::Receiver<CountdownSnapshot>) {
    info!("Starting countdown display task");

    loop {
        if updates.changed().await.is_err() {
            break;
        }

        let snapshot = updates.borrow_and_update().clone();
        let state = if snapshot.finished {
            "finished"
        } else if snapshot.running {
            "running"
        } else {
            "paused"
        };
        info!("Countdown {} [{}]", snapshot.time_parts(), state);
    }
}
