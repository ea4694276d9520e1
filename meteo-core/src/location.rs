//! Current-position lookup.
//!
//! The CLI has no browser geolocation, so the default implementation derives
//! an approximate position from the caller's IP address. No credential is
//! required for this collaborator.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;

use crate::{error::WeatherError, model::Coordinates};

const IP_API_URL: &str = "http://ip-api.com/json";

/// Seam for "where am I right now".
#[async_trait]
pub trait Locator: Send + Sync + Debug {
    async fn current_position(&self) -> Result<Coordinates, WeatherError>;
}

/// IP-based position lookup.
#[derive(Debug, Clone)]
pub struct IpLocator {
    http: Client,
    url: String,
}

impl IpLocator {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
            url: IP_API_URL.to_string(),
        }
    }
}

impl Default for IpLocator {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

#[async_trait]
impl Locator for IpLocator {
    async fn current_position(&self) -> Result<Coordinates, WeatherError> {
        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| WeatherError::GeolocationDenied(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            tracing::debug!(%status, "IP position lookup failed");
            return Err(WeatherError::GeolocationDenied(format!(
                "lookup failed with status {status}"
            )));
        }

        let body: IpApiResponse = res
            .json()
            .await
            .map_err(|e| WeatherError::GeolocationDenied(e.to_string()))?;

        match (body.status.as_str(), body.lat, body.lon) {
            ("success", Some(lat), Some(lon)) => {
                tracing::debug!(lat, lon, "resolved current position");
                Ok(Coordinates { lat, lon })
            }
            _ => Err(WeatherError::GeolocationDenied(
                body.message
                    .unwrap_or_else(|| "position unavailable".to_string()),
            )),
        }
    }
}
