use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::WeatherError,
    model::{Coordinates, ForecastPayload, GeoMatch},
};

pub mod openweather;

/// The weather backend as the session controller sees it: free-text
/// geocoding plus a coordinate-keyed 5-day/3-hour forecast.
#[async_trait]
pub trait WeatherApi: Send + Sync + Debug {
    /// Resolve a city name to its single best match.
    async fn geocode(&self, city: &str) -> Result<GeoMatch, WeatherError>;

    /// Fetch the forecast payload for the given coordinates.
    async fn fetch_forecast(&self, coords: Coordinates) -> Result<ForecastPayload, WeatherError>;
}
