use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::WeatherError;

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Build coordinates from raw query parameters.
    ///
    /// Both values must be present, non-blank and numeric; anything else is a
    /// validation failure so callers can reject the request before any
    /// upstream traffic.
    pub fn from_params(lat: Option<&str>, lon: Option<&str>) -> Result<Self, WeatherError> {
        let (Some(lat), Some(lon)) = (non_blank(lat), non_blank(lon)) else {
            return Err(WeatherError::Validation(
                "Latitude and longitude are required".to_string(),
            ));
        };

        let parse = |raw: &str| {
            raw.parse::<f64>().ok().filter(|v| v.is_finite()).ok_or_else(|| {
                WeatherError::Validation("Latitude and longitude must be numbers".to_string())
            })
        };

        Ok(Self::new(parse(lat)?, parse(lon)?))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// What a weather lookup is keyed on.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    City(String),
    Coordinates(Coordinates),
}

impl LocationQuery {
    pub fn city(name: impl Into<String>) -> Self {
        Self::City(name.into())
    }

    /// Query parameters identifying the location on the upstream API.
    pub(crate) fn upstream_params(&self) -> Vec<(&'static str, String)> {
        match self {
            LocationQuery::City(name) => vec![("q", name.clone())],
            LocationQuery::Coordinates(c) => {
                vec![("lat", c.lat.to_string()), ("lon", c.lon.to_string())]
            }
        }
    }
}

impl std::fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationQuery::City(name) => f.write_str(name),
            LocationQuery::Coordinates(c) => write!(f, "{},{}", c.lat, c.lon),
        }
    }
}

/// One entry of the upstream `weather` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub main: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    #[serde(default)]
    pub speed: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deg: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Temperature block shared by current conditions and forecast samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Readings {
    pub temp: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feels_like: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<u8>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Upstream current-weather document.
///
/// Only the fields the proxy and the display layer read are typed; every
/// other key is kept in `extra` so the document is passed through intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coord: Option<Coordinates>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sys: SystemInfo,
    pub main: Readings,
    #[serde(default)]
    pub weather: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind: Option<Wind>,
    pub dt: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CurrentConditions {
    pub fn primary_condition(&self) -> Option<&Condition> {
        self.weather.first()
    }
}

/// A single 3-hourly forecast entry, sourced verbatim from upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    /// Epoch seconds on the upstream clock.
    pub dt: i64,
    pub main: Readings,
    #[serde(default)]
    pub weather: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind: Option<Wind>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ForecastSample {
    pub fn primary_condition(&self) -> Option<&Condition> {
        self.weather.first()
    }
}

/// Upstream `city` object of a forecast response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastCity {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coord: Option<Coordinates>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Raw upstream forecast series, before aggregation.
///
/// Entries stay as upstream JSON so that the proxy returns them untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastSeries {
    #[serde(default)]
    pub city: Value,
    #[serde(default)]
    pub list: Vec<Value>,
}

/// At most one sample per calendar day, in first-seen order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailyForecast<S = ForecastSample>(Vec<S>);

impl<S> DailyForecast<S> {
    pub(crate) fn from_samples(samples: Vec<S>) -> Self {
        Self(samples)
    }

    pub fn days(&self) -> &[S] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<S> {
        self.0
    }
}

impl<'a, S> IntoIterator for &'a DailyForecast<S> {
    type Item = &'a S;
    type IntoIter = std::slice::Iter<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Body of the forecast endpoints: `{city, forecast}`.
///
/// Display clients read it through the typed defaults; the proxy itself
/// builds a [`ProxiedForecast`] holding upstream JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPayload<C = ForecastCity, S = ForecastSample> {
    pub city: C,
    pub forecast: DailyForecast<S>,
}

pub type ProxiedForecast = ForecastPayload<Value, Value>;

/// One match returned by the geocoding endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodingResult {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GeocodingResult {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }

    /// "Name, State, Country", omitting the state when upstream has none.
    pub fn display_name(&self) -> String {
        match &self.state {
            Some(state) => format!("{}, {}, {}", self.name, state, self.country),
            None => format!("{}, {}", self.name, self.country),
        }
    }
}
