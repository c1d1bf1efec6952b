//! Configuration and CLI argument handling

use clap::Parser;

use crate::countdown::CountdownConfig;

/// CLI argument parsing structure
#[derive(Parser)]
#[command(name = "tickdown")]
#[command(about = "A state-managed countdown timer service")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "8642")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Countdown target in seconds (negative values clamp to zero)
    #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
    pub duration: i64,

    /// Construct the countdown paused instead of ticking immediately
    #[arg(long)]
    pub paused: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    /// The initial countdown configuration described by the CLI flags.
    pub fn countdown_config(&self) -> CountdownConfig {
        CountdownConfig::new(self.duration, !self.paused)
    }
}
