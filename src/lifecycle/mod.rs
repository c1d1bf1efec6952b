//! Host lifecycle signal module
//!
//! This module abstracts the host's foreground/background broadcast as an
//! injectable subscribe/emit source.

pub mod signal;

// Re-export main types
pub use signal::{AppPhase, LifecycleSignal};
