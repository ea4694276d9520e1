//! Orchestration of geolocation, geocoding and forecast fetches.
//!
//! The session owns the query text, the active payload and the loading/error
//! flags. Triggers never propagate failures to the caller; they land in the
//! state as a human-readable message, last error wins. Derived views are
//! recomputed from the payload on every read, never cached.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    aggregate::{self, CurvePoint, DailyAggregate, HourlyEntry},
    location::Locator,
    model::{Coordinates, ForecastPayload, RawSample},
    provider::WeatherApi,
};

pub(crate) const LABEL_CURRENT_POSITION: &str = "Current position";
pub(crate) const LABEL_MY_POSITION: &str = "My position";
pub(crate) const MSG_GEOLOCATION_HINT: &str = "Geolocation unavailable. Use the city search.";
pub(crate) const MSG_POSITION_FAILED: &str = "Unable to determine current position.";

/// Everything a view needs to render one forecast session.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub query_text: String,
    pub location_label: Option<String>,
    pub payload: Option<ForecastPayload>,
    pub loading: bool,
    pub error: Option<String>,
    /// Advisory day selection; views fall back to the first day when it does
    /// not match any aggregate.
    pub selected_day: Option<String>,
}

/// Re-entrant Idle → Loading → Ready/Failed controller over one view's
/// forecast state.
pub struct ForecastSession {
    api: Arc<dyn WeatherApi>,
    locator: Arc<dyn Locator>,
    state: Mutex<SessionState>,
    /// Cleared on teardown; async completions check it before touching state.
    alive: AtomicBool,
}

impl ForecastSession {
    pub fn new(api: Arc<dyn WeatherApi>, locator: Arc<dyn Locator>) -> Self {
        Self {
            api,
            locator,
            state: Mutex::new(SessionState::default()),
            alive: AtomicBool::new(true),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Stops any not-yet-settled completion from mutating state.
    pub fn close(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> SessionState {
        self.state().clone()
    }

    pub fn set_query(&self, text: impl Into<String>) {
        self.state().query_text = text.into();
    }

    /// Sets the advisory day selection. Never touches the payload.
    pub fn select_day(&self, day_key: impl Into<String>) {
        self.state().selected_day = Some(day_key.into());
    }

    /// Mount-time trigger: attempt to resolve the current position once.
    /// No retry is scheduled on failure.
    pub async fn start(&self) {
        if !self.is_alive() {
            return;
        }

        match self.locator.current_position().await {
            Ok(coords) => {
                self.load_coordinates(coords, Some(LABEL_CURRENT_POSITION))
                    .await;
            }
            Err(err) => {
                if !self.is_alive() {
                    return;
                }
                tracing::debug!(error = %err, "initial geolocation failed");
                self.state().error = Some(MSG_GEOLOCATION_HINT.to_string());
            }
        }
    }

    /// City-search trigger. Blank queries are a no-op: no network call, no
    /// state change.
    pub async fn submit_search(&self) {
        if !self.is_alive() {
            return;
        }

        let query = self.state().query_text.trim().to_string();
        if query.is_empty() {
            return;
        }

        match self.api.geocode(&query).await {
            Ok(city) => {
                let label = city.label();
                self.load_coordinates(city.coordinates(), Some(label.as_str()))
                    .await;
            }
            Err(err) => {
                if !self.is_alive() {
                    return;
                }
                self.state().error = Some(err.to_string());
            }
        }
    }

    /// User-initiated "use my location" trigger. Independent of the
    /// mount-time attempt, with its own failure message.
    pub async fn use_my_location(&self) {
        if !self.is_alive() {
            return;
        }

        {
            let mut state = self.state();
            state.query_text.clear();
            state.error = None;
        }

        match self.locator.current_position().await {
            Ok(coords) => self.load_coordinates(coords, Some(LABEL_MY_POSITION)).await,
            Err(err) => {
                if !self.is_alive() {
                    return;
                }
                tracing::debug!(error = %err, "explicit geolocation failed");
                self.state().error = Some(MSG_POSITION_FAILED.to_string());
            }
        }
    }

    /// Coordinate-based fetch shared by all triggers. Replaces the payload
    /// wholesale on success; `loading` returns to false on every settled
    /// path.
    pub async fn load_coordinates(&self, coords: Coordinates, label: Option<&str>) {
        {
            let mut state = self.state();
            state.error = None;
            state.loading = true;
        }

        let result = self.api.fetch_forecast(coords).await;

        if !self.is_alive() {
            // The view is gone; the settled result must not be applied.
            return;
        }

        let mut state = self.state();
        match result {
            Ok(payload) => {
                let label = label
                    .map(str::to_string)
                    .filter(|l| !l.is_empty())
                    .or_else(|| {
                        Some(payload.location_name.clone()).filter(|n| !n.is_empty())
                    })
                    .unwrap_or_else(|| LABEL_CURRENT_POSITION.to_string());

                state.location_label = Some(label);
                state.selected_day = payload.first_day_key();
                state.payload = Some(payload);
            }
            Err(err) => {
                state.error = Some(err.to_string());
            }
        }
        state.loading = false;
    }

    // Derived views, recomputed from the payload on every call.

    pub fn current(&self) -> Option<RawSample> {
        aggregate::current_sample(self.state().payload.as_ref()).cloned()
    }

    pub fn daily(&self) -> Vec<DailyAggregate> {
        aggregate::group_by_day(self.state().payload.as_ref())
    }

    pub fn hourly(&self) -> Vec<HourlyEntry> {
        aggregate::hourly_window(self.state().payload.as_ref())
    }

    /// Samples of the selected day, falling back to the first day.
    pub fn selected_day_samples(&self) -> Vec<RawSample> {
        let state = self.state();
        let days = aggregate::group_by_day(state.payload.as_ref());
        aggregate::select_day(&days, state.selected_day.as_deref())
            .map(|day| day.samples.clone())
            .unwrap_or_default()
    }

    /// Temperature polyline for the selected day.
    pub fn temperature_curve(&self, width: f64, height: f64, padding: f64) -> Vec<CurvePoint> {
        aggregate::temperature_curve(&self.selected_day_samples(), width, height, padding)
    }
}
