use std::fmt;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use weather_core::{
    Config, Coordinates, GeocodingResult, TemperatureUnit, WeatherServiceClient,
};

use crate::render;

const LOAD_FAILED: &str = "Failed to load weather data";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather proxy server and terminal front end")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API.
    Serve {
        /// Listen address, e.g. "0.0.0.0:8000".
        #[arg(long)]
        bind: Option<String>,
    },

    /// Store the OpenWeatherMap API key and defaults in the config file.
    Configure,

    /// Show current conditions.
    Current(LookupArgs),

    /// Show the daily forecast.
    Forecast(LookupArgs),

    /// Search locations by name.
    Search {
        query: String,

        /// Pick one of the matches and show its weather.
        #[arg(long)]
        select: bool,

        /// Show temperatures in Fahrenheit.
        #[arg(short, long)]
        fahrenheit: bool,
    },
}

#[derive(Debug, Args)]
pub struct LookupArgs {
    /// City name; defaults to the configured city.
    pub city: Option<String>,

    #[arg(long, requires = "lon", conflicts_with = "city", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Show temperatures in Fahrenheit.
    #[arg(short, long)]
    pub fahrenheit: bool,
}

impl LookupArgs {
    fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.lat?, self.lon?))
    }
}

fn unit(fahrenheit: bool) -> TemperatureUnit {
    let unit = TemperatureUnit::default();
    if fahrenheit { unit.toggle() } else { unit }
}

/// Geocoding match as shown in the selection prompt.
struct Suggestion(GeocodingResult);

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.display_name())
    }
}

impl Cli {
    /// Default log filter when `RUST_LOG` is unset.
    pub fn default_log_filter(&self) -> &'static str {
        match self.command {
            Command::Serve { .. } => "info",
            _ => "warn",
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;

        match self.command {
            Command::Serve { bind } => {
                if let Some(bind) = bind {
                    config.bind_addr = bind;
                }
                weather_api::serve(&config).await
            }
            Command::Configure => configure(config),
            Command::Current(args) => {
                let client = WeatherServiceClient::from_config(&config)?;
                let current = match args.coordinates() {
                    Some(coords) => client.fetch_current_weather_at(coords).await,
                    None => {
                        let city = args.city.as_deref().unwrap_or(&config.default_city);
                        client.fetch_current_weather(city).await
                    }
                };

                let Ok(current) = current else { bail!(LOAD_FAILED) };
                println!("{}", render::current(&current, unit(args.fahrenheit)));
                Ok(())
            }
            Command::Forecast(args) => {
                let client = WeatherServiceClient::from_config(&config)?;
                let forecast = match args.coordinates() {
                    Some(coords) => client.fetch_forecast_at(coords).await,
                    None => {
                        let city = args.city.as_deref().unwrap_or(&config.default_city);
                        client.fetch_forecast(city).await
                    }
                };

                let Ok(forecast) = forecast else { bail!(LOAD_FAILED) };
                println!("{}", render::forecast(&forecast, unit(args.fahrenheit)));
                Ok(())
            }
            Command::Search {
                query,
                select,
                fahrenheit,
            } => {
                let client = WeatherServiceClient::from_config(&config)?;
                let results = client.search_locations(&query).await;

                if !select || results.is_empty() {
                    println!("{}", render::locations(&results));
                    return Ok(());
                }

                let options = results.into_iter().map(Suggestion).collect();
                let Suggestion(choice) = inquire::Select::new("Location:", options)
                    .prompt()
                    .context("Location selection cancelled")?;

                let coords = choice.coordinates();
                let (Ok(current), Ok(forecast)) = (
                    client.fetch_current_weather_at(coords).await,
                    client.fetch_forecast_at(coords).await,
                ) else {
                    bail!(LOAD_FAILED)
                };

                let shown = unit(fahrenheit);
                println!("{}\n", render::current(&current, shown));
                println!("{}", render::forecast(&forecast, shown));
                Ok(())
            }
        }
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let api_key = inquire::Password::new("OpenWeatherMap API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let default_city = inquire::Text::new("Default city:")
        .with_default(&config.default_city)
        .prompt()
        .context("Failed to read default city")?;

    config.set_api_key(api_key.trim().to_string());
    config.default_city = default_city.trim().to_string();
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
