use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use crate::{
    error::{Result, Stage, WeatherError},
    model::{Coordinates, ForecastSeries, LocationQuery},
};

use super::WeatherProvider;

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
const CURRENT_PATH: &str = "/data/2.5/weather";
const FORECAST_PATH: &str = "/data/2.5/forecast";
const GEOCODING_PATH: &str = "/geo/1.0/direct";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    units: String,
    http: Client,
}

#[derive(Debug)]
pub struct OpenWeatherProviderBuilder {
    api_key: String,
    base_url: String,
    units: String,
    timeout: Duration,
}

impl OpenWeatherProviderBuilder {
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn units(mut self, units: &str) -> Self {
        self.units = units.to_string();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> reqwest::Result<OpenWeatherProvider> {
        let http = Client::builder().timeout(self.timeout).build()?;

        Ok(OpenWeatherProvider {
            api_key: self.api_key,
            base_url: self.base_url,
            units: self.units,
            http,
        })
    }
}

impl OpenWeatherProvider {
    pub fn builder(api_key: impl Into<String>) -> OpenWeatherProviderBuilder {
        OpenWeatherProviderBuilder {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            units: "metric".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        stage: Stage,
        path: &str,
        params: Vec<(&'static str, String)>,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%stage, %url, "requesting OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(&params)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| WeatherError::transport(stage, e))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| WeatherError::transport(stage, e))?;

        if !status.is_success() {
            tracing::warn!(
                %stage,
                status = status.as_u16(),
                body = %truncate_body(&body),
                "OpenWeather request failed"
            );
            return Err(WeatherError::Upstream {
                stage,
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            WeatherError::InvalidResponse(format!("Failed to parse OpenWeather {stage} JSON: {e}"))
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_weather(&self, query: &LocationQuery) -> Result<Value> {
        let mut params = query.upstream_params();
        params.push(("units", self.units.clone()));

        self.get_json(Stage::CurrentWeather, CURRENT_PATH, params).await
    }

    async fn forecast_series(&self, coords: Coordinates) -> Result<ForecastSeries> {
        let mut params = LocationQuery::Coordinates(coords).upstream_params();
        params.push(("units", self.units.clone()));

        self.get_json(Stage::Forecast, FORECAST_PATH, params).await
    }

    async fn geocode(&self, query: &str, limit: u32) -> Result<Value> {
        let params = vec![("q", query.to_string()), ("limit", limit.to_string())];

        self.get_json(Stage::Geocoding, GEOCODING_PATH, params).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
