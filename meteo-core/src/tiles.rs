//! Weather overlay layers, slippy-map tile math and icon URLs.

use std::convert::TryFrom;
use std::f64::consts::PI;

use crate::model::Coordinates;

const ICON_URL_BASE: &str = "https://openweathermap.org/img/wn";

/// Web-Mercator latitude limit; values beyond it are clamped.
pub const MAX_TILE_LATITUDE: f64 = 85.05112878;

/// Overlay layers the tile endpoint can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileLayer {
    Rain,
    Temp,
    Wind,
}

impl TileLayer {
    /// Provider layer key used in tile URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            TileLayer::Rain => "precipitation_new",
            TileLayer::Temp => "temp_new",
            TileLayer::Wind => "wind_new",
        }
    }

    /// Human-readable name for display.
    pub fn label(&self) -> &'static str {
        match self {
            TileLayer::Rain => "Rain",
            TileLayer::Temp => "Temperature",
            TileLayer::Wind => "Wind",
        }
    }

    pub const fn all() -> &'static [TileLayer] {
        &[TileLayer::Rain, TileLayer::Temp, TileLayer::Wind]
    }
}

impl std::fmt::Display for TileLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TileLayer {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "rain" | "precipitation" | "precipitation_new" => Ok(TileLayer::Rain),
            "temp" | "temperature" | "temp_new" => Ok(TileLayer::Temp),
            "wind" | "wind_new" => Ok(TileLayer::Wind),
            _ => Err(anyhow::anyhow!(
                "Unknown layer '{value}'. Supported layers: rain, temp, wind."
            )),
        }
    }
}

/// Slippy-map tile address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
    pub z: u8,
}

/// Condition icon URL for an opaque provider icon code. No credential needed.
pub fn icon_url(code: &str) -> String {
    format!("{ICON_URL_BASE}/{code}@2x.png")
}

/// Converts coordinates to the tile containing them at the given zoom.
pub fn lat_lon_to_tile(coords: Coordinates, zoom: u8) -> TileCoord {
    let zoom_factor = 2f64.powi(i32::from(zoom));
    let latitude = coords.lat.clamp(-MAX_TILE_LATITUDE, MAX_TILE_LATITUDE);
    let lat_rad = latitude.to_radians();

    let x = ((coords.lon + 180.0) / 360.0 * zoom_factor).floor();
    let y = ((1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * zoom_factor).floor();

    TileCoord {
        x: x as i32,
        y: y as i32,
        z: zoom,
    }
}
