//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};
use tracing::{error, info};

use crate::lifecycle::AppPhase;
use crate::state::AppState;

use super::responses::{ApiResponse, HealthResponse, StatusResponse, TargetRequest};

/// Handle POST /pause - stop ticking, keep the remaining duration
pub async fn pause_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.pause() {
        Ok(snapshot) => {
            info!("Pause endpoint called - countdown paused");
            Ok(Json(ApiResponse::new("Countdown paused".to_string(), snapshot)))
        }
        Err(e) => {
            error!("Failed to pause countdown: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /resume - restart ticking from the remaining duration
pub async fn resume_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.resume() {
        Ok(snapshot) => {
            info!("Resume endpoint called - countdown resumed");
            Ok(Json(ApiResponse::new("Countdown resumed".to_string(), snapshot)))
        }
        Err(e) => {
            error!("Failed to resume countdown: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /target - reconfigure the countdown target duration
pub async fn target_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TargetRequest>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.set_target(request.seconds) {
        Ok(snapshot) => {
            info!("Target endpoint called - target set to {}s", request.seconds.max(0));
            Ok(Json(ApiResponse::new(
                format!("Countdown target set to {}s", request.seconds.max(0)),
                snapshot,
            )))
        }
        Err(e) => {
            error!("Failed to set countdown target: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /press - forward an interaction to the press hook
///
/// Returns 404 when no press hook is configured: the rendered surface is
/// static, so there is nothing to press.
pub async fn press_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.press() {
        Ok(true) => {
            info!("Press endpoint called - interaction forwarded");
            let snapshot = state.countdown.snapshot().map_err(|e| {
                error!("Failed to read countdown state: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            })?;
            Ok(Json(ApiResponse::new("Press forwarded".to_string(), snapshot)))
        }
        Ok(false) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            error!("Failed to forward press: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /background - deliver a background lifecycle event
pub async fn background_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    state.lifecycle.emit(AppPhase::Background);
    info!("Background endpoint called - background phase delivered");
    lifecycle_response(&state, "Background phase delivered")
}

/// Handle POST /active - deliver an active lifecycle event
pub async fn active_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    state.lifecycle.emit(AppPhase::Active);
    info!("Active endpoint called - active phase delivered");
    lifecycle_response(&state, "Active phase delivered")
}

fn lifecycle_response(
    state: &Arc<AppState>,
    message: &str,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.countdown.snapshot() {
        Ok(snapshot) => Ok(Json(ApiResponse::new(message.to_string(), snapshot))),
        Err(e) => {
            error!("Failed to read countdown state: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /status - return the current countdown status
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, StatusCode> {
    let snapshot = match state.countdown.snapshot() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to read countdown state: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let time_parts = snapshot.time_parts();
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        running: snapshot.running,
        finished: snapshot.finished,
        remaining_seconds: snapshot.remaining_seconds.get(),
        time_parts,
        display: time_parts.to_string(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
