//! Server entry point: wires the registry, dispatcher and health monitor to
//! an axum listener with graceful shutdown.

use crate::config::{ConfigError, HttpConfig};
use crate::rate_limit::RateLimitState;
use crate::routes::{AppState, build_router};
use crate::auth::AuthState;
use std::sync::Arc;
use std::time::Instant;
use switchyard_gateway::{Dispatcher, HealthMonitor, ServiceRegistry};
use tracing::info;

/// Errors that can abort the serve loop.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build the application state for a configured registry.
///
/// Exposed separately so tests can drive the router without a listener.
pub fn app_state(config: &HttpConfig, registry: Arc<ServiceRegistry>) -> Result<AppState, ServeError> {
    config.validate()?;
    let rate = RateLimitState::try_new(&config.rate_limit).ok_or_else(|| {
        ConfigError::InvalidValue {
            key: "rate_limit".to_string(),
            message: "limits must be non-zero".to_string(),
        }
    })?;
    let dispatcher = Dispatcher::new(registry.clone()).with_debug(config.debug_errors);

    Ok(AppState {
        dispatcher: Arc::new(dispatcher),
        registry,
        auth: Arc::new(AuthState::new(&config.api_keys)),
        rate: Arc::new(rate),
        started_at: Instant::now(),
    })
}

/// Run the gateway until ctrl-c. Stops the health monitor on the way out.
pub async fn serve(config: HttpConfig, registry: Arc<ServiceRegistry>) -> Result<(), ServeError> {
    let addr = config.socket_addr()?;
    let state = app_state(&config, registry.clone())?;
    let monitor = HealthMonitor::with_interval(registry, config.probe_interval).spawn();

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "switchyard gateway listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    monitor.stop().await;
    info!("switchyard gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
