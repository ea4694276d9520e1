//! State for the map view: a center, a zoom level and a weather overlay.
//!
//! Follows the same trigger/guard discipline as the forecast session but
//! never fetches a forecast; the only network call is geocoding.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    location::Locator,
    model::Coordinates,
    provider::WeatherApi,
    session::{LABEL_CURRENT_POSITION, MSG_GEOLOCATION_HINT},
    tiles::{self, TileCoord, TileLayer},
};

/// Lyon, the default center before any position is resolved.
pub const DEFAULT_COORDS: Coordinates = Coordinates {
    lat: 45.7578,
    lon: 4.832,
};
pub const DEFAULT_LABEL: &str = "Lyon, FR";
pub const DEFAULT_ZOOM: u8 = 6;
/// Zoom applied after a successful city search.
pub const SEARCH_ZOOM: u8 = 9;

#[derive(Debug, Clone)]
pub struct MapState {
    pub coords: Coordinates,
    pub zoom: u8,
    pub location_label: String,
    pub active_layer: TileLayer,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for MapState {
    fn default() -> Self {
        Self {
            coords: DEFAULT_COORDS,
            zoom: DEFAULT_ZOOM,
            location_label: DEFAULT_LABEL.to_string(),
            active_layer: TileLayer::Rain,
            loading: false,
            error: None,
        }
    }
}

pub struct MapSession {
    api: Arc<dyn WeatherApi>,
    locator: Arc<dyn Locator>,
    state: Mutex<MapState>,
    alive: AtomicBool,
}

impl MapSession {
    pub fn new(api: Arc<dyn WeatherApi>, locator: Arc<dyn Locator>) -> Self {
        Self {
            api,
            locator,
            state: Mutex::new(MapState::default()),
            alive: AtomicBool::new(true),
        }
    }

    fn state(&self) -> MutexGuard<'_, MapState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    pub fn close(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> MapState {
        self.state().clone()
    }

    pub fn set_layer(&self, layer: TileLayer) {
        self.state().active_layer = layer;
    }

    pub fn set_zoom(&self, zoom: u8) {
        self.state().zoom = zoom;
    }

    /// Tile containing the current center at the current zoom.
    pub fn center_tile(&self) -> TileCoord {
        let state = self.state();
        tiles::lat_lon_to_tile(state.coords, state.zoom)
    }

    /// Mount-time trigger: recenter on the resolved position, keep the
    /// default center on failure.
    pub async fn start(&self) {
        if !self.is_alive() {
            return;
        }

        match self.locator.current_position().await {
            Ok(coords) => {
                if !self.is_alive() {
                    return;
                }
                let mut state = self.state();
                state.coords = coords;
                state.location_label = LABEL_CURRENT_POSITION.to_string();
            }
            Err(err) => {
                if !self.is_alive() {
                    return;
                }
                tracing::debug!(error = %err, "map geolocation failed");
                self.state().error = Some(MSG_GEOLOCATION_HINT.to_string());
            }
        }
    }

    /// Recenter on a searched city. Blank queries are a no-op.
    pub async fn search(&self, query: &str) {
        if !self.is_alive() {
            return;
        }

        let query = query.trim();
        if query.is_empty() {
            return;
        }

        {
            let mut state = self.state();
            state.loading = true;
            state.error = None;
        }

        let result = self.api.geocode(query).await;

        if !self.is_alive() {
            return;
        }

        let mut state = self.state();
        match result {
            Ok(city) => {
                state.coords = city.coordinates();
                state.zoom = SEARCH_ZOOM;
                state.location_label = city.label();
            }
            Err(err) => {
                state.error = Some(err.to_string());
            }
        }
        state.loading = false;
    }
}
