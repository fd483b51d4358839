//! Presentation helpers shared by display front ends.

use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// Temperature unit shown to the user. Upstream data is always metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn toggle(self) -> Self {
        match self {
            Self::Celsius => Self::Fahrenheit,
            Self::Fahrenheit => Self::Celsius,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
        }
    }

    /// Convert a Celsius reading into this unit.
    pub fn from_celsius(&self, celsius: f64) -> f64 {
        match self {
            Self::Celsius => celsius,
            Self::Fahrenheit => convert_to_fahrenheit(celsius),
        }
    }

    /// Rounded reading with its unit symbol, e.g. `"13°C"`.
    pub fn format(&self, celsius: f64) -> String {
        format!("{}{}", self.from_celsius(celsius).round(), self.symbol())
    }
}

pub fn convert_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// `"Saturday, May 20, 2023"`, in UTC.
pub fn format_date(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%A, %B %-d, %Y").to_string())
        .unwrap_or_default()
}

/// Short weekday for forecast cards, e.g. `"Sat"`.
pub fn format_weekday(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%a").to_string())
        .unwrap_or_default()
}

const DIRECTIONS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// 16-point compass direction for a wind bearing in degrees.
pub fn wind_direction(degrees: f64) -> &'static str {
    let index = (degrees.rem_euclid(360.0) / 22.5).round() as usize % DIRECTIONS.len();
    DIRECTIONS[index]
}

/// Text label for an OpenWeatherMap icon code such as `"04d"`.
pub fn condition_label(icon: &str) -> &'static str {
    let night = icon.ends_with('n');
    match icon.get(..2) {
        Some("01") if night => "clear night",
        Some("01") => "sunny",
        Some("02") if night => "partly cloudy night",
        Some("02") => "partly cloudy",
        Some("03") => "cloudy",
        Some("04") => "overcast",
        Some("09") => "showers",
        Some("10") => "rain",
        Some("11") => "thunderstorm",
        Some("13") => "snow",
        Some("50") => "mist",
        _ => "unknown",
    }
}
