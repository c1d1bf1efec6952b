//! Point-in-time countdown state published to observers

use serde::{Deserialize, Serialize};

use super::{RemainingSeconds, TimeParts};

/// Snapshot of the countdown as of the last state change.
///
/// Published on the watch channel after every tick, compensation,
/// reconfiguration or stop, and embedded in API responses. Renderers
/// derive everything they show from this record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountdownSnapshot {
    pub running: bool,
    pub finished: bool,
    pub remaining_seconds: RemainingSeconds,
}

impl CountdownSnapshot {
    /// Snapshot of a freshly constructed, not yet started countdown.
    pub fn initial(remaining_seconds: RemainingSeconds) -> Self {
        Self {
            running: false,
            finished: false,
            remaining_seconds,
        }
    }

    pub fn time_parts(&self) -> TimeParts {
        self.remaining_seconds.time_parts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_remaining_as_plain_seconds() {
        let snapshot = CountdownSnapshot {
            running: true,
            finished: false,
            remaining_seconds: RemainingSeconds::from(90),
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(
            json,
            r#"{"running":true,"finished":false,"remaining_seconds":90}"#
        );
    }
}
