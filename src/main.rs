//! Countdown Hooks - countdown timer and client introspection over HTTP
//! 
//! This is the main entry point for the countdown-hooks server.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use countdown_hooks::{
    api::create_router,
    config::Config,
    state::AppState,
    tasks::{countdown_monitor_task, Scheduler},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("countdown_hooks={},tower_http=info", config.log_level()))
        .init();

    info!("Starting countdown-hooks server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, wait={}s",
          config.host, config.port, config.wait);

    let scheduler = Scheduler::current()?;

    // Create application state
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        config.wait,
        scheduler.clone(),
    ));

    // Start the countdown monitor background task
    let monitor_state = Arc::clone(&state);
    tokio::spawn(async move {
        countdown_monitor_task(monitor_state, scheduler).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /countdown/start?seconds=N - Start or restart the countdown");
    info!("  POST /countdown/cancel          - Cancel the countdown");
    info!("  GET  /countdown                 - Current countdown state");
    info!("  GET  /client                    - Describe the requesting client");
    info!("  GET  /status                    - Server status and last action");
    info!("  GET  /health                    - Health check");

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

    info!("Server shutdown complete");
    Ok(())
}
