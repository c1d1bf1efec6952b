//! Tickdown - a state-managed countdown timer service
//!
//! This is the main entry point for the tickdown application.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{debug, info};

use tickdown::{
    api::create_router,
    config::Config,
    countdown::{Countdown, CountdownHooks},
    lifecycle::LifecycleSignal,
    state::AppState,
    tasks::countdown_display_task,
    utils::{deliver_lifecycle_signals, shutdown_signal},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("tickdown={},tower_http=info", config.log_level()))
        .init();

    info!("Starting tickdown server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, duration={}s, paused={}",
        config.host, config.port, config.duration.max(0), config.paused
    );

    // The lifecycle signal source the countdown subscribes to
    let lifecycle = LifecycleSignal::new();

    let hooks = CountdownHooks::new()
        .on_tick(|| debug!("Countdown ticked"))
        .on_finish(|| info!("Countdown finished"))
        .on_press(|| info!("Countdown pressed"));

    let countdown = Countdown::new(config.countdown_config(), hooks, &lifecycle);

    // Rendering collaborator: prints the countdown on each state change
    tokio::spawn(countdown_display_task(countdown.updates()));

    // Bridge SIGUSR1/SIGUSR2 into background/active phase events
    tokio::spawn(deliver_lifecycle_signals(lifecycle.clone()));

    // Create application state and HTTP router
    let state = Arc::new(AppState::new(
        countdown.clone(),
        lifecycle,
        config.port,
        config.host.clone(),
    ));
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /pause   - Pause the countdown");
    info!("  POST /resume  - Resume the countdown");
    info!("  POST /target  - Set a new countdown target");
    info!("  POST /press   - Forward an interaction to the press hook");
    info!("  POST /background - Deliver a background lifecycle event");
    info!("  POST /active  - Deliver an active lifecycle event");
    info!("  GET  /status  - Check countdown status and time parts");
    info!("  GET  /health  - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    // Dispose the countdown so no tick or callback outlives the server
    if let Err(e) = countdown.shutdown() {
        tracing::error!("Failed to dispose countdown: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}
