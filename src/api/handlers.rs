//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::Json,
};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::{
    client::{is_mobile, path_segments, ClientInfo, ScrollPosition},
    error::TimerError,
    state::{AppState, TimerState},
};
use super::responses::{ApiResponse, ClientResponse, HealthResponse, StatusResponse};

/// Query for POST /countdown/start
#[derive(Debug, Default, Deserialize)]
pub struct StartParams {
    pub seconds: Option<u64>,
}

/// Query for GET /client; every field is optional
#[derive(Debug, Default, Deserialize)]
pub struct ClientQuery {
    pub path: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub screen_width: Option<u32>,
    pub screen_height: Option<u32>,
    pub scroll_y: Option<u32>,
    pub body_height: Option<u32>,
}

/// Host header without its `:port` suffix; bracketed IPv6 literals keep their colons
fn strip_port(host: &str) -> &str {
    match host.rsplit_once(':') {
        Some((name, port))
            if !port.contains(']') && (name.ends_with(']') || !name.contains(':')) =>
        {
            name
        }
        _ => host,
    }
}

fn timer_error_status(e: &TimerError) -> StatusCode {
    match e {
        TimerError::ZeroDuration | TimerError::DurationOverflow(_) => StatusCode::BAD_REQUEST,
        TimerError::NoRuntime | TimerError::StatePoisoned => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Handle POST /countdown/start - Start (or restart) the countdown
pub async fn countdown_start_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StartParams>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.start_countdown(params.seconds) {
        Ok(timer) => {
            info!("Countdown start endpoint called - {}s", timer.remaining_seconds);
            Ok(Json(ApiResponse::active(
                format!("Countdown started for {}s", timer.remaining_seconds),
                timer,
            )))
        }
        Err(e) => {
            let status = timer_error_status(&e);
            if status.is_client_error() {
                warn!("Rejected countdown start: {}", e);
            } else {
                error!("Failed to start countdown: {}", e);
            }
            Err(status)
        }
    }
}

/// Handle POST /countdown/cancel - Stop the countdown
pub async fn countdown_cancel_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.cancel_countdown() {
        Ok(timer) => {
            info!("Countdown cancel endpoint called");
            Ok(Json(ApiResponse::inactive("Countdown cancelled".to_string(), timer)))
        }
        Err(e) => {
            error!("Failed to cancel countdown: {}", e);
            Err(timer_error_status(&e))
        }
    }
}

/// Handle GET /countdown - Current countdown snapshot
pub async fn countdown_handler(State(state): State<Arc<AppState>>) -> Json<TimerState> {
    Json(state.get_timer_state())
}

/// Handle GET /client - Describe the requesting client
pub async fn client_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ClientQuery>,
) -> Json<ClientResponse> {
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };

    let user_agent = header_str(header::USER_AGENT).unwrap_or_default();
    let hostname = header_str(header::HOST).map(|host| strip_port(&host).to_string());
    let language = header_str(header::ACCEPT_LANGUAGE).and_then(|languages| {
        languages
            .split(',')
            .next()
            .map(|tag| tag.split(';').next().unwrap_or_default().trim().to_lowercase())
            .filter(|tag| !tag.is_empty())
    });

    let route = query
        .path
        .as_deref()
        .and_then(|path| state.page_routes.lookup(path))
        .map(|(_, route)| route.label.to_string());
    let path = query
        .path
        .as_deref()
        .map(|path| path_segments(path).into_iter().map(str::to_string).collect())
        .unwrap_or_default();
    let position = match (query.scroll_y, query.height, query.body_height) {
        (Some(scroll_y), Some(height), Some(body_height)) => {
            Some(ScrollPosition::from_metrics(scroll_y, height, body_height))
        }
        _ => None,
    };

    Json(ClientResponse {
        client: ClientInfo::from_user_agent(&user_agent),
        hostname,
        language,
        referrer: header_str(header::REFERER),
        page: query.path.clone(),
        path,
        route,
        viewport: ClientResponse::format_dimensions(query.width, query.height),
        screen: ClientResponse::format_dimensions(query.screen_width, query.screen_height),
        mobile: query.width.map(is_mobile),
        position,
    })
}

/// Handle GET /status - Return current server status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        timer: state.get_timer_state(),
        default_wait_seconds: state.default_wait_seconds,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
