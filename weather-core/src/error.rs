/// Which upstream call a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CurrentWeather,
    Coordinates,
    Forecast,
    Geocoding,
}

impl Stage {
    /// Caller-facing message used in the error envelope.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Stage::CurrentWeather => "Failed to fetch weather data",
            Stage::Coordinates => "Failed to fetch city coordinates",
            Stage::Forecast => "Failed to fetch forecast data",
            Stage::Geocoding => "Failed to fetch location data",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Stage::CurrentWeather => "current weather",
            Stage::Coordinates => "city coordinates",
            Stage::Forecast => "forecast",
            Stage::Geocoding => "geocoding",
        })
    }
}

/// Weather lookup errors.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    /// A required parameter is missing or malformed. Raised before any
    /// upstream call.
    #[error("{0}")]
    Validation(String),

    /// Upstream answered with a non-success status.
    #[error("{stage} request failed with status {status}")]
    Upstream {
        stage: Stage,
        status: u16,
        body: String,
    },

    /// The request never produced a response (connect failure, timeout, ...).
    #[error("{stage} request failed: {message}")]
    Transport { stage: Stage, message: String },

    /// Upstream answered successfully but the body is not what we expect.
    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),
}

impl WeatherError {
    /// The request URL carries the API key, so it never reaches the message.
    pub(crate) fn transport(stage: Stage, err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "upstream request timed out".to_string()
        } else if err.is_connect() {
            "could not connect to upstream".to_string()
        } else {
            err.without_url().to_string()
        };
        WeatherError::Transport { stage, message }
    }

    /// Re-attribute an upstream or transport failure to another stage.
    pub fn at(self, stage: Stage) -> Self {
        match self {
            WeatherError::Upstream { status, body, .. } => {
                WeatherError::Upstream { stage, status, body }
            }
            WeatherError::Transport { message, .. } => WeatherError::Transport { stage, message },
            other => other,
        }
    }
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;
