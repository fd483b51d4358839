use crate::{
    Config,
    error::Result,
    model::{Coordinates, ForecastSeries, LocationQuery},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use serde_json::Value;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// Raw upstream calls. One method per upstream endpoint, no orchestration.
///
/// Current weather and geocoding documents are returned as upstream sent
/// them.
///
/// Implementations report failures tagged with the stage of the endpoint they
/// called; [`crate::WeatherService`] re-tags them when a call is made on
/// behalf of another step.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_weather(&self, query: &LocationQuery) -> Result<Value>;

    async fn forecast_series(&self, coords: Coordinates) -> Result<ForecastSeries>;

    async fn geocode(&self, query: &str, limit: u32) -> Result<Value>;
}

/// Construct the OpenWeatherMap provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let api_key = config.require_api_key()?;
    let provider = OpenWeatherProvider::builder(api_key)
        .base_url(&config.upstream_base_url)
        .units(&config.units)
        .timeout(config.request_timeout())
        .build()?;

    Ok(Arc::new(provider))
}
