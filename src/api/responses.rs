//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{CountdownSnapshot, TimeParts};

/// Response body for the countdown control endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub countdown: CountdownSnapshot,
}

impl ApiResponse {
    /// Build a response around the post-action countdown snapshot.
    pub fn new(message: String, countdown: CountdownSnapshot) -> Self {
        let status = if countdown.finished {
            "finished"
        } else if countdown.running {
            "running"
        } else {
            "paused"
        };

        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            countdown,
        }
    }
}

/// Full status report including the display decomposition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub running: bool,
    pub finished: bool,
    pub remaining_seconds: u64,
    pub time_parts: TimeParts,
    /// Zero-padded `DD:HH:MM:SS` string for direct display.
    pub display: String,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Request body for the retarget endpoint. Negative values clamp to 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetRequest {
    pub seconds: i64,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::RemainingSeconds;

    #[test]
    fn api_status_reflects_the_snapshot() {
        let running = ApiResponse::new(
            "ok".to_string(),
            CountdownSnapshot {
                running: true,
                finished: false,
                remaining_seconds: RemainingSeconds::from(10),
            },
        );
        assert_eq!(running.status, "running");

        let paused = ApiResponse::new(
            "ok".to_string(),
            CountdownSnapshot {
                running: false,
                finished: false,
                remaining_seconds: RemainingSeconds::from(10),
            },
        );
        assert_eq!(paused.status, "paused");

        let finished = ApiResponse::new(
            "ok".to_string(),
            CountdownSnapshot {
                running: false,
                finished: true,
                remaining_seconds: RemainingSeconds::ZERO,
            },
        );
        assert_eq!(finished.status, "finished");
    }
}
