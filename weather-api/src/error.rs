use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use weather_core::WeatherError;

/// JSON error envelope returned by every endpoint.
///
/// Validation failures are 400 `{error}`. Upstream failures are 500 with the
/// upstream status and body echoed back; anything else is 500 with a generic
/// `error` and a diagnostic `message`.
#[derive(Debug)]
pub struct ApiError(pub WeatherError);

impl From<WeatherError> for ApiError {
    fn from(err: WeatherError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self.0 {
            WeatherError::Validation(message) => {
                (StatusCode::BAD_REQUEST, json!({ "error": message }))
            }
            WeatherError::Upstream {
                stage,
                status,
                body,
            } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": stage.failure_message(),
                    "status": status,
                    "body": body,
                }),
            ),
            WeatherError::Transport { stage, message } => {
                tracing::error!(%stage, %message, "upstream transport failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "An error occurred", "message": message }),
                )
            }
            WeatherError::InvalidResponse(message) => {
                tracing::error!(%message, "unusable upstream response");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "An error occurred", "message": message }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
