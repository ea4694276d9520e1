use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    config::Config,
    error::WeatherError,
    model::{Coordinates, ForecastPayload, GeoMatch, RawSample},
    tiles::{TileCoord, TileLayer},
};

use super::WeatherApi;

const FORECAST_URL: &str = "https://api.openweathermap.org/data/2.5/forecast";
const GEOCODING_URL: &str = "https://api.openweathermap.org/geo/1.0/direct";
const TILE_URL: &str = "https://tile.openweathermap.org/map";

/// Language for the provider's localized condition descriptions.
const LANG: &str = "en";

/// Client for the OpenWeather forecast, geocoding and tile endpoints.
///
/// The API key precondition is checked at construction, before any network
/// call is possible.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    http: Client,
    forecast_url: String,
    geocoding_url: String,
    tile_url: String,
}

impl OpenWeatherClient {
    pub fn new(config: &Config) -> Result<Self, WeatherError> {
        let api_key = config.require_api_key()?;
        Ok(Self {
            api_key,
            http: Client::new(),
            forecast_url: FORECAST_URL.to_string(),
            geocoding_url: GEOCODING_URL.to_string(),
            tile_url: TILE_URL.to_string(),
        })
    }

    async fn get_checked(
        &self,
        url: &str,
        query: &[(&str, &str)],
        what: &str,
    ) -> Result<String, WeatherError> {
        let res = self.http.get(url).query(query).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            tracing::warn!(%status, what, "OpenWeather request failed");
            return Err(WeatherError::Provider {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        Ok(body)
    }

    /// PNG tile URL for one overlay tile.
    pub fn tile_url(&self, layer: TileLayer, tile: TileCoord) -> String {
        format!(
            "{}/{}/{}/{}/{}.png?appid={}",
            self.tile_url,
            layer.as_str(),
            tile.z,
            tile.x,
            tile.y,
            self.api_key
        )
    }

    /// Tile URL template with `{z}/{x}/{y}` placeholders, for map widgets.
    pub fn tile_template(&self, layer: TileLayer) -> String {
        format!(
            "{}/{}/{{z}}/{{x}}/{{y}}.png?appid={}",
            self.tile_url,
            layer.as_str(),
            self.api_key
        )
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    icon: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    dt_txt: String,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
    #[serde(default)]
    timezone: i32,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwGeoMatch {
    name: String,
    country: Option<String>,
    lat: f64,
    lon: f64,
}

impl From<OwForecastEntry> for RawSample {
    fn from(entry: OwForecastEntry) -> Self {
        let (icon, description) = entry
            .weather
            .into_iter()
            .next()
            .map(|w| (w.icon, w.description))
            .unwrap_or_else(|| ("01d".to_string(), "Unknown".to_string()));

        RawSample {
            dt: entry.dt,
            temperature: entry.main.temp,
            temperature_min: entry.main.temp_min,
            temperature_max: entry.main.temp_max,
            feels_like: entry.main.feels_like,
            humidity: entry.main.humidity,
            wind_speed: entry.wind.speed,
            condition_icon: icon,
            condition_description: description,
            text_timestamp: entry.dt_txt,
        }
    }
}

#[async_trait]
impl WeatherApi for OpenWeatherClient {
    async fn geocode(&self, city: &str) -> Result<GeoMatch, WeatherError> {
        let body = self
            .get_checked(
                &self.geocoding_url,
                &[("q", city), ("limit", "1"), ("appid", self.api_key.as_str())],
                "geocoding",
            )
            .await?;

        let matches: Vec<OwGeoMatch> = serde_json::from_str(&body)?;

        let best = matches.into_iter().next().ok_or(WeatherError::CityNotFound)?;
        tracing::debug!(city, name = %best.name, "geocoded");

        Ok(GeoMatch {
            name: best.name,
            country: best.country,
            lat: best.lat,
            lon: best.lon,
        })
    }

    async fn fetch_forecast(&self, coords: Coordinates) -> Result<ForecastPayload, WeatherError> {
        let lat = coords.lat.to_string();
        let lon = coords.lon.to_string();
        let body = self
            .get_checked(
                &self.forecast_url,
                &[
                    ("lat", lat.as_str()),
                    ("lon", lon.as_str()),
                    ("units", "metric"),
                    ("lang", LANG),
                    ("appid", self.api_key.as_str()),
                ],
                "forecast",
            )
            .await?;

        let parsed: OwForecastResponse = serde_json::from_str(&body)?;
        tracing::debug!(samples = parsed.list.len(), city = %parsed.city.name, "forecast fetched");

        Ok(ForecastPayload {
            location_name: parsed.city.name,
            utc_offset_secs: parsed.city.timezone,
            samples: parsed.list.into_iter().map(RawSample::from).collect(),
        })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}
