//! Server-wide application state

use std::{sync::Mutex, time::Instant};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::countdown::{Countdown, CountdownConfig};
use crate::lifecycle::LifecycleSignal;
use crate::state::{CountdownSnapshot, TimeParts};

/// Shared state behind the HTTP surface: the countdown instance, the
/// lifecycle signal source and request bookkeeping.
#[derive(Debug)]
pub struct AppState {
    pub countdown: Countdown,
    pub lifecycle: LifecycleSignal,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    last_action: Mutex<Option<String>>,
    last_action_time: Mutex<Option<DateTime<Utc>>>,
}

impl AppState {
    pub fn new(countdown: Countdown, lifecycle: LifecycleSignal, port: u16, host: String) -> Self {
        Self {
            countdown,
            lifecycle,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
        }
    }

    /// Pause the countdown, leaving the target untouched.
    pub fn pause(&self) -> Result<CountdownSnapshot, String> {
        info!("Pausing countdown");
        let config = self.countdown.config()?;
        self.countdown.reconcile(CountdownConfig {
            running: false,
            ..config
        })?;
        self.record_action("pause");
        self.countdown.snapshot()
    }

    /// Resume ticking from the current remaining duration.
    pub fn resume(&self) -> Result<CountdownSnapshot, String> {
        info!("Resuming countdown");
        let config = self.countdown.config()?;
        self.countdown.reconcile(CountdownConfig {
            running: true,
            ..config
        })?;
        self.record_action("resume");
        self.countdown.snapshot()
    }

    /// Reconfigure the countdown target. Negative inputs clamp to zero.
    pub fn set_target(&self, seconds: i64) -> Result<CountdownSnapshot, String> {
        info!("Setting countdown target to {}s", seconds.max(0));
        let config = self.countdown.config()?;
        self.countdown
            .reconcile(CountdownConfig::new(seconds, config.running))?;
        self.record_action("target");
        self.countdown.snapshot()
    }

    /// Forward an interaction to the countdown's press hook.
    pub fn press(&self) -> Result<bool, String> {
        let interactive = self.countdown.press()?;
        if interactive {
            self.record_action("press");
        }
        Ok(interactive)
    }

    /// Server uptime as a compact humanized string.
    pub fn get_uptime(&self) -> String {
        TimeParts::from_seconds(self.start_time.elapsed().as_secs()).humanize()
    }

    /// Last action information for status reporting.
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }
}
