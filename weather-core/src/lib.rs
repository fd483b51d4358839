//! Core library for the weather proxy.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The upstream OpenWeatherMap client
//! - Daily forecast aggregation
//! - Caller-facing operations ([`WeatherService`]) and their error taxonomy
//! - A client for the proxy's own HTTP API plus display helpers
//!
//! It is used by `weather-api` and `weather-cli`.

pub mod client;
pub mod config;
pub mod display;
pub mod error;
pub mod forecast;
pub mod model;
pub mod provider;
pub mod service;

pub use client::{ClientError, WeatherServiceClient};
pub use config::Config;
pub use display::TemperatureUnit;
pub use error::{Stage, WeatherError};
pub use forecast::{DailyAggregator, Timestamped};
pub use model::{
    Coordinates, CurrentConditions, DailyForecast, ForecastCity, ForecastPayload, ForecastSample,
    GeocodingResult, LocationQuery, ProxiedForecast,
};
pub use provider::{WeatherProvider, provider_from_config};
pub use service::{QueryDefaults, WeatherService};
