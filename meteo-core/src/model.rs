use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A geographic point, WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Best match returned by the geocoding endpoint for a free-text city query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoMatch {
    pub name: String,
    pub country: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

impl GeoMatch {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.lat,
            lon: self.lon,
        }
    }

    /// "Lyon, FR" when a country code is present, "Lyon" otherwise.
    pub fn label(&self) -> String {
        match self.country.as_deref() {
            Some(country) => format!("{}, {}", self.name, country),
            None => self.name.clone(),
        }
    }
}

/// One 3-hour forecast data point, immutable once received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSample {
    /// Forecast time, epoch seconds.
    pub dt: i64,
    pub temperature: f64,
    pub temperature_min: f64,
    pub temperature_max: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    /// Opaque provider icon code, e.g. "10d".
    pub condition_icon: String,
    pub condition_description: String,
    /// Provider-formatted UTC time string, e.g. "2026-08-06 12:00:00".
    pub text_timestamp: String,
}

impl RawSample {
    pub fn time_utc(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.dt, 0).unwrap_or_default()
    }

    /// Calendar-date grouping key derived from the timestamp, "YYYY-MM-DD".
    pub fn day_key(&self) -> String {
        self.time_utc().format("%Y-%m-%d").to_string()
    }

    /// Midday samples are preferred as the representative of their day.
    pub fn is_midday(&self) -> bool {
        self.text_timestamp.contains("12:00:00")
    }
}

/// A complete 5-day/3-hour forecast response, replaced wholesale on every
/// successful fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastPayload {
    pub location_name: String,
    /// Offset of the forecast location from UTC, seconds. Display only.
    pub utc_offset_secs: i32,
    /// Chronological, provider-sorted, up to 40 entries.
    pub samples: Vec<RawSample>,
}

impl ForecastPayload {
    pub fn first_day_key(&self) -> Option<String> {
        self.samples.first().map(RawSample::day_key)
    }
}

/// Builds a plausible 3-hour sample for unit tests across the crate.
#[cfg(test)]
pub(crate) fn sample_at(dt: i64) -> RawSample {
    RawSample {
        dt,
        temperature: 20.0,
        temperature_min: 18.0,
        temperature_max: 22.0,
        feels_like: 19.5,
        humidity: 60,
        wind_speed: 3.2,
        condition_icon: "01d".to_string(),
        condition_description: "clear sky".to_string(),
        text_timestamp: DateTime::from_timestamp(dt, 0)
            .unwrap_or_default()
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
    }
}
