use thiserror::Error;

/// Failures surfaced by the collaborators and recovered at the session
/// boundary. Display strings double as the user-facing messages.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error(
        "OpenWeather API key is not configured.\n\
         Hint: run `meteo configure` or set the OPENWEATHER_API_KEY environment variable."
    )]
    MissingCredential,

    #[error("City not found")]
    CityNotFound,

    #[error("OpenWeather request failed with status {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("Geolocation is not supported in this environment")]
    GeolocationUnsupported,

    #[error("Geolocation failed: {0}")]
    GeolocationDenied(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to parse provider response: {0}")]
    Parse(#[from] serde_json::Error),
}
