//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    client::{ClientInfo, Dimensions, ScrollPosition},
    state::TimerState,
};

/// API response structure for countdown control endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerState,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, timer: TimerState) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            timer,
        }
    }

    /// Create an active response
    pub fn active(message: String, timer: TimerState) -> Self {
        Self::new("active".to_string(), message, timer)
    }

    /// Create an inactive response
    pub fn inactive(message: String, timer: TimerState) -> Self {
        Self::new("inactive".to_string(), message, timer)
    }
}

/// Server status with countdown information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimerState,
    pub default_wait_seconds: u64,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Client description assembled from request headers and query parameters
#[derive(Debug, Clone, Serialize)]
pub struct ClientResponse {
    #[serde(flatten)]
    pub client: ClientInfo,
    pub hostname: Option<String>,
    pub language: Option<String>,
    pub referrer: Option<String>,
    pub page: Option<String>,
    pub path: Vec<String>,
    pub route: Option<String>,
    /// `WIDTHxHEIGHT` of the viewport, when reported
    pub viewport: Option<String>,
    /// `WIDTHxHEIGHT` of the screen, when reported
    pub screen: Option<String>,
    pub mobile: Option<bool>,
    pub position: Option<ScrollPosition>,
}

impl ClientResponse {
    pub fn format_dimensions(width: Option<u32>, height: Option<u32>) -> Option<String> {
        Some(Dimensions::new(width?, height?).to_string())
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
