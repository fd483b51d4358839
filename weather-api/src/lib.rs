//! HTTP surface of the weather proxy.
//!
//! All routes are GET and live under `/api`:
//! - `/api/test`
//! - `/api/weather/current`, `/api/weather/current/coords`
//! - `/api/weather/forecast`, `/api/weather/forecast/coords`
//! - `/api/geocoding`

use anyhow::Context;
use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use weather_core::{Config, WeatherService, provider_from_config};

pub mod error;
pub mod extract;
pub mod handlers;

pub use error::ApiError;
pub use extract::ApiQuery;

#[derive(Debug, Clone)]
pub struct AppState {
    pub service: WeatherService,
}

impl AppState {
    pub fn new(service: WeatherService) -> Self {
        Self { service }
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/test", get(handlers::health))
        .route("/weather/current", get(handlers::current_weather))
        .route("/weather/current/coords", get(handlers::current_weather_at))
        .route("/weather/forecast", get(handlers::forecast))
        .route("/weather/forecast/coords", get(handlers::forecast_at))
        .route("/geocoding", get(handlers::geocoding));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `config.bind_addr` and serve until Ctrl-C.
pub async fn serve(config: &Config) -> anyhow::Result<()> {
    let provider = provider_from_config(config)?;
    let state = AppState::new(WeatherService::from_config(provider, config)?);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, "weather API listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("weather API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
