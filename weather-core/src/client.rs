//! Client for the proxy's own HTTP API, used by display front ends.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::{
    Config,
    model::{Coordinates, CurrentConditions, ForecastPayload, GeocodingResult},
};

/// Queries shorter than this are not sent to the geocoding endpoint.
pub const MIN_SEARCH_LEN: usize = 2;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Weather data not available (status {0})")]
    Status(StatusCode),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct WeatherServiceClient {
    base_url: String,
    http: Client,
}

impl WeatherServiceClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        Self::new(&config.service_base_url, config.request_timeout())
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let res = self.http.get(&url).query(query).send().await?;

        if !res.status().is_success() {
            return Err(ClientError::Status(res.status()));
        }

        Ok(res.json().await?)
    }

    pub async fn fetch_current_weather(&self, city: &str) -> Result<CurrentConditions, ClientError> {
        self.get("/weather/current", &[("city", city.to_string())])
            .await
            .inspect_err(|e| tracing::error!("Error fetching weather data: {e}"))
    }

    pub async fn fetch_current_weather_at(
        &self,
        coords: Coordinates,
    ) -> Result<CurrentConditions, ClientError> {
        self.get("/weather/current/coords", &coord_params(coords))
            .await
            .inspect_err(|e| tracing::error!("Error fetching weather data: {e}"))
    }

    pub async fn fetch_forecast(&self, city: &str) -> Result<ForecastPayload, ClientError> {
        self.get("/weather/forecast", &[("city", city.to_string())])
            .await
            .inspect_err(|e| tracing::error!("Error fetching forecast data: {e}"))
    }

    pub async fn fetch_forecast_at(
        &self,
        coords: Coordinates,
    ) -> Result<ForecastPayload, ClientError> {
        self.get("/weather/forecast/coords", &coord_params(coords))
            .await
            .inspect_err(|e| tracing::error!("Error fetching forecast data: {e}"))
    }

    /// Location suggestions for a free-text query.
    ///
    /// Never fails: short queries and any error yield an empty list.
    pub async fn search_locations(&self, query: &str) -> Vec<GeocodingResult> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_LEN {
            return Vec::new();
        }

        match self.get("/geocoding", &[("q", query.to_string())]).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!("Error searching locations: {e}");
                Vec::new()
            }
        }
    }
}

fn coord_params(coords: Coordinates) -> [(&'static str, String); 2] {
    [("lat", coords.lat.to_string()), ("lon", coords.lon.to_string())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> WeatherServiceClient {
        WeatherServiceClient::new(&format!("{}/api/", server.uri()), Duration::from_secs(5))
            .unwrap()
    }

    #[tokio::test]
    async fn search_returns_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/geocoding"))
            .and(query_param("q", "Lisbon"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "name": "Lisbon", "lat": 38.7, "lon": -9.1, "country": "PT" }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let results = client(&server).search_locations(" Lisbon ").await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].country, "PT");
    }

    #[tokio::test]
    async fn search_swallows_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/geocoding"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": "Failed to fetch location data", "status": 401
            })))
            .expect(1)
            .mount(&server)
            .await;

        assert!(client(&server).search_locations("Lisbon").await.is_empty());
    }

    #[tokio::test]
    async fn short_search_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        assert!(client(&server).search_locations("L").await.is_empty());
    }

    #[tokio::test]
    async fn current_weather_error_carries_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/weather/current"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": "Failed to fetch weather data", "status": 404, "body": ""
            })))
            .mount(&server)
            .await;

        let err = client(&server).fetch_current_weather("Atlantis").await.unwrap_err();
        assert!(matches!(err, ClientError::Status(s) if s == StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[tokio::test]
    async fn forecast_by_coordinates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/weather/forecast/coords"))
            .and(query_param("lat", "10.5"))
            .and(query_param("lon", "20.25"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "city": { "name": "Somewhere", "country": "XX" },
                "forecast": [
                    { "dt": 1684540800, "main": { "temp": 20.0, "temp_min": 18.0, "temp_max": 22.0 },
                      "weather": [{ "id": 800, "main": "Clear", "description": "clear sky", "icon": "01d" }] }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let payload = client(&server)
            .fetch_forecast_at(Coordinates::new(10.5, 20.25))
            .await
            .unwrap();
        assert_eq!(payload.city.name, "Somewhere");
        assert_eq!(payload.forecast.len(), 1);
    }
}
