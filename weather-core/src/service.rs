//! Request orchestration on top of a [`WeatherProvider`].
//!
//! This is where the caller-facing operations live: parameter validation,
//! resolve-then-fetch for city forecasts, and the daily aggregation. The HTTP
//! layer maps the results one-to-one onto responses.

use std::sync::Arc;

use serde_json::Value;

use crate::{
    Config,
    error::{Result, Stage, WeatherError},
    forecast::DailyAggregator,
    model::{Coordinates, ForecastPayload, LocationQuery, ProxiedForecast},
    provider::WeatherProvider,
};

/// Values applied when a request leaves a parameter out.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDefaults {
    pub city: String,
    pub geocoding_limit: u32,
}

impl Default for QueryDefaults {
    fn default() -> Self {
        Self {
            city: "London".to_string(),
            geocoding_limit: 5,
        }
    }
}

impl From<&Config> for QueryDefaults {
    fn from(config: &Config) -> Self {
        Self {
            city: config.default_city.clone(),
            geocoding_limit: config.geocoding_limit,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
    aggregator: DailyAggregator,
    defaults: QueryDefaults,
}

impl WeatherService {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self {
            provider,
            aggregator: DailyAggregator::default(),
            defaults: QueryDefaults::default(),
        }
    }

    pub fn from_config(
        provider: Arc<dyn WeatherProvider>,
        config: &Config,
    ) -> anyhow::Result<Self> {
        let aggregator =
            DailyAggregator::new(config.forecast_days).with_offset(config.forecast_offset()?);

        Ok(Self::new(provider)
            .with_defaults(QueryDefaults::from(config))
            .with_aggregator(aggregator))
    }

    pub fn with_defaults(mut self, defaults: QueryDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_aggregator(mut self, aggregator: DailyAggregator) -> Self {
        self.aggregator = aggregator;
        self
    }

    /// Turn an optional `city` parameter into a query, falling back to the
    /// default city when it is absent or blank.
    pub fn city_query(&self, city: Option<&str>) -> LocationQuery {
        let city = city
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(&self.defaults.city);
        LocationQuery::city(city)
    }

    /// Upstream current-weather document, unmodified.
    pub async fn current_weather(&self, query: &LocationQuery) -> Result<Value> {
        tracing::info!(%query, "fetching current weather");
        self.provider
            .current_weather(query)
            .await
            .map_err(|e| e.at(Stage::CurrentWeather))
    }

    /// Daily forecast for a city or a coordinate pair.
    ///
    /// A city is first resolved to coordinates through a current-weather
    /// lookup; if that fails the forecast endpoint is never called and the
    /// failure is reported as a coordinate-resolution failure.
    pub async fn forecast(&self, query: &LocationQuery) -> Result<ProxiedForecast> {
        let coords = match query {
            LocationQuery::Coordinates(coords) => *coords,
            LocationQuery::City(_) => self.resolve_coordinates(query).await?,
        };

        tracing::info!(lat = coords.lat, lon = coords.lon, "fetching forecast");
        let series = self
            .provider
            .forecast_series(coords)
            .await
            .map_err(|e| e.at(Stage::Forecast))?;

        let forecast = self.aggregator.aggregate(series.list);
        tracing::debug!(days = forecast.len(), "aggregated forecast");

        Ok(ForecastPayload {
            city: series.city,
            forecast,
        })
    }

    /// Free-text location search. A blank query is rejected before any
    /// upstream call; `limit` defaults to the configured geocoding limit.
    pub async fn search_locations(&self, query: &str, limit: Option<u32>) -> Result<Value> {
        let query = query.trim();
        if query.is_empty() {
            return Err(WeatherError::Validation("Search query is required".to_string()));
        }

        let limit = limit.unwrap_or(self.defaults.geocoding_limit);
        tracing::info!(query, limit, "searching locations");
        self.provider
            .geocode(query, limit)
            .await
            .map_err(|e| e.at(Stage::Geocoding))
    }

    async fn resolve_coordinates(&self, query: &LocationQuery) -> Result<Coordinates> {
        tracing::info!(%query, "resolving city coordinates");
        let current = self
            .provider
            .current_weather(query)
            .await
            .map_err(|e| e.at(Stage::Coordinates))?;

        current
            .get("coord")
            .and_then(|coord| serde_json::from_value::<Coordinates>(coord.clone()).ok())
            .ok_or_else(|| {
                WeatherError::InvalidResponse(format!("No coordinates returned for {query}"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ForecastSeries;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct FakeProvider {
        current_calls: AtomicUsize,
        forecast_calls: AtomicUsize,
        geocode_calls: AtomicUsize,
        fail_current_with: Option<u16>,
        no_coord: bool,
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        async fn current_weather(&self, query: &LocationQuery) -> Result<Value> {
            self.current_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(status) = self.fail_current_with {
                return Err(WeatherError::Upstream {
                    stage: Stage::CurrentWeather,
                    status,
                    body: "nope".into(),
                });
            }

            let mut doc = json!({ "name": query.to_string(), "main": { "temp": 12 }, "dt": 0 });
            if !self.no_coord {
                doc["coord"] = json!({ "lat": 51.5, "lon": -0.1 });
            }
            Ok(doc)
        }

        async fn forecast_series(&self, coords: Coordinates) -> Result<ForecastSeries> {
            self.forecast_calls.fetch_add(1, Ordering::SeqCst);
            let list = (0..40i64)
                .map(|i| json!({ "dt": 1_684_540_800 + i * 3 * 3600, "main": { "temp": i } }))
                .collect();
            Ok(ForecastSeries {
                city: json!({ "name": "London", "country": "GB", "coord": coords }),
                list,
            })
        }

        async fn geocode(&self, query: &str, limit: u32) -> Result<Value> {
            self.geocode_calls.fetch_add(1, Ordering::SeqCst);
            Ok((0..limit)
                .map(|i| json!({ "name": format!("{query} {i}"), "lat": 0, "lon": 0 }))
                .collect())
        }
    }

    fn service(fake: FakeProvider) -> (WeatherService, Arc<FakeProvider>) {
        let fake = Arc::new(fake);
        (WeatherService::new(fake.clone()), fake)
    }

    fn coordinate_query() -> LocationQuery {
        LocationQuery::Coordinates(Coordinates::new(1.0, 2.0))
    }

    #[test]
    fn city_query_falls_back_to_default() {
        let (svc, _) = service(FakeProvider::default());
        assert_eq!(svc.city_query(None), LocationQuery::city("London"));
        assert_eq!(svc.city_query(Some("  ")), LocationQuery::city("London"));
        assert_eq!(svc.city_query(Some("Paris")), LocationQuery::city("Paris"));

        let svc = svc.with_defaults(QueryDefaults {
            city: "Oslo".into(),
            geocoding_limit: 2,
        });
        assert_eq!(svc.city_query(None), LocationQuery::city("Oslo"));
    }

    #[tokio::test]
    async fn current_weather_is_returned_unmodified() {
        let (svc, _) = service(FakeProvider::default());
        let doc = svc.current_weather(&LocationQuery::city("Paris")).await.unwrap();

        assert_eq!(doc["main"], json!({ "temp": 12 }));
        assert_eq!(doc.get("sys"), None);
    }

    #[tokio::test]
    async fn city_forecast_resolves_then_fetches() {
        let (svc, fake) = service(FakeProvider::default());
        let payload = svc.forecast(&LocationQuery::city("London")).await.unwrap();

        assert_eq!(payload.forecast.len(), 4);
        assert_eq!(payload.city["name"], "London");
        assert_eq!(fake.current_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fake.forecast_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn coordinate_forecast_skips_resolution() {
        let (svc, fake) = service(FakeProvider::default());
        let payload = svc.forecast(&coordinate_query()).await.unwrap();

        assert_eq!(payload.city["coord"], json!({ "lat": 1.0, "lon": 2.0 }));
        assert_eq!(fake.current_calls.load(Ordering::SeqCst), 0);
        assert_eq!(fake.forecast_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_resolution_short_circuits() {
        let (svc, fake) = service(FakeProvider {
            fail_current_with: Some(404),
            ..Default::default()
        });

        let err = svc.forecast(&LocationQuery::city("Atlantis")).await.unwrap_err();

        assert!(matches!(
            err,
            WeatherError::Upstream { stage: Stage::Coordinates, status: 404, .. }
        ));
        assert_eq!(fake.forecast_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_coord_in_resolution_is_invalid_response() {
        let (svc, fake) = service(FakeProvider {
            no_coord: true,
            ..Default::default()
        });

        let err = svc.forecast(&LocationQuery::city("Nowhere")).await.unwrap_err();
        assert!(matches!(err, WeatherError::InvalidResponse(_)));
        assert_eq!(fake.forecast_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn blank_search_rejected_before_upstream() {
        let (svc, fake) = service(FakeProvider::default());
        let err = svc.search_locations("   ", None).await.unwrap_err();

        assert!(matches!(err, WeatherError::Validation(_)));
        assert_eq!(fake.geocode_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn search_uses_default_limit() {
        let (svc, _) = service(FakeProvider::default());
        let count = |v: Value| v.as_array().map(Vec::len);
        assert_eq!(count(svc.search_locations("Paris", None).await.unwrap()), Some(5));
        assert_eq!(count(svc.search_locations("Paris", Some(2)).await.unwrap()), Some(2));
    }

    #[tokio::test]
    async fn configured_forecast_days_cap_output() {
        let mut cfg = Config::default();
        cfg.forecast_days = 2;
        let svc = WeatherService::from_config(Arc::new(FakeProvider::default()), &cfg).unwrap();

        assert_eq!(svc.forecast(&coordinate_query()).await.unwrap().forecast.len(), 2);
    }

    #[tokio::test]
    async fn configured_offset_moves_day_boundaries() {
        // Samples start at 00:00Z; at -01:00 the first one falls on the previous day.
        let mut cfg = Config::default();
        cfg.forecast_utc_offset_secs = -3600;
        let svc = WeatherService::from_config(Arc::new(FakeProvider::default()), &cfg).unwrap();

        let payload = svc.forecast(&coordinate_query()).await.unwrap();
        let dts: Vec<i64> =
            payload.forecast.days().iter().filter_map(|s| s["dt"].as_i64()).collect();
        assert_eq!(dts[..2], [1_684_540_800, 1_684_540_800 + 3 * 3600]);
    }

    #[test]
    fn out_of_range_offset_is_rejected() {
        let mut cfg = Config::default();
        cfg.forecast_utc_offset_secs = 100_000;
        assert!(WeatherService::from_config(Arc::new(FakeProvider::default()), &cfg).is_err());
    }
}
