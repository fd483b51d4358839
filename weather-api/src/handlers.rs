use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use weather_core::{Coordinates, LocationQuery, ProxiedForecast, WeatherError};

use crate::{AppState, error::ApiError, extract::ApiQuery};

#[derive(Debug, Deserialize)]
pub struct CityParams {
    pub city: Option<String>,
}

/// Raw coordinate parameters; validated by [`Coordinates::from_params`] so
/// that missing or malformed values produce our own 400 envelope.
#[derive(Debug, Deserialize)]
pub struct CoordParams {
    pub lat: Option<String>,
    pub lon: Option<String>,
}

impl CoordParams {
    fn query(&self) -> Result<LocationQuery, WeatherError> {
        Coordinates::from_params(self.lat.as_deref(), self.lon.as_deref())
            .map(LocationQuery::Coordinates)
    }
}

#[derive(Debug, Deserialize)]
pub struct GeocodingParams {
    #[serde(default)]
    pub q: String,
    pub limit: Option<String>,
}

impl GeocodingParams {
    fn limit(&self) -> Result<Option<u32>, WeatherError> {
        match self.limit.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|l| *l > 0)
                .map(Some)
                .ok_or_else(|| WeatherError::Validation("Limit must be a positive number".into())),
        }
    }
}

/// GET /api/test
pub async fn health() -> Json<Value> {
    Json(json!({ "message": "API test is working!" }))
}

/// GET /api/weather/current?city=
pub async fn current_weather(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<CityParams>,
) -> Result<Json<Value>, ApiError> {
    let query = state.service.city_query(params.city.as_deref());
    Ok(Json(state.service.current_weather(&query).await?))
}

/// GET /api/weather/current/coords?lat=&lon=
pub async fn current_weather_at(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<CoordParams>,
) -> Result<Json<Value>, ApiError> {
    let query = params.query()?;
    Ok(Json(state.service.current_weather(&query).await?))
}

/// GET /api/weather/forecast?city=
pub async fn forecast(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<CityParams>,
) -> Result<Json<ProxiedForecast>, ApiError> {
    let query = state.service.city_query(params.city.as_deref());
    Ok(Json(state.service.forecast(&query).await?))
}

/// GET /api/weather/forecast/coords?lat=&lon=
pub async fn forecast_at(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<CoordParams>,
) -> Result<Json<ProxiedForecast>, ApiError> {
    let query = params.query()?;
    Ok(Json(state.service.forecast(&query).await?))
}

/// GET /api/geocoding?q=&limit=
pub async fn geocoding(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<GeocodingParams>,
) -> Result<Json<Value>, ApiError> {
    let limit = params.limit()?;
    Ok(Json(state.service.search_locations(&params.q, limit).await?))
}
