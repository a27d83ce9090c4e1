use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use verified_km::api;
use verified_km::config;
use verified_km::error::AppError;
use verified_km::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = config::Config::from_env()?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false);
    if config.log_json {
        subscriber.json().init();
    } else {
        subscriber.compact().init();
    }

    tracing::info!(
        earth_radius_km = config.distance.earth_radius_km,
        max_speed_kmh = config.distance.max_speed_kmh,
        jump_threshold_km = config.distance.jump_threshold_km,
        "distance verification configured"
    );

    let shared_state = Arc::new(AppState::new(config.distance));
    let app = api::rest::router(shared_state);

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(http_port = config.http_port, "http server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
