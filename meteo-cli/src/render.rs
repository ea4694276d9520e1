//! Terminal rendering of the session's derived views.

use meteo_core::ForecastSession;
use meteo_core::aggregate::{CurvePoint, round_half_up};
use meteo_core::tiles;

const CURVE_WIDTH: usize = 60;
const CURVE_HEIGHT: usize = 10;

/// Render everything the session currently knows: current conditions, the
/// hourly window, daily summaries and the selected day's temperature curve.
pub fn session(session: &ForecastSession) {
    let state = session.snapshot();

    if state.loading {
        println!("Loading weather...");
    }
    if let Some(error) = &state.error {
        println!("! {error}");
    }

    let Some(current) = session.current() else {
        if state.error.is_none() && !state.loading {
            println!("No weather data. Allow geolocation or search for a city.");
        }
        return;
    };

    let label = state.location_label.as_deref().unwrap_or("My position");
    println!();
    println!("=== {label} ===");
    println!(
        "{}°C  {}",
        round_half_up(current.temperature),
        current.condition_description
    );
    println!(
        "feels like {}°  min {}°  max {}°",
        round_half_up(current.feels_like),
        round_half_up(current.temperature_min),
        round_half_up(current.temperature_max)
    );
    println!(
        "humidity {}%  wind {} m/s  [{}]",
        current.humidity,
        current.wind_speed,
        tiles::icon_url(&current.condition_icon)
    );

    let hourly = session.hourly();
    if !hourly.is_empty() {
        println!();
        println!("Next hours:");
        for entry in &hourly {
            println!(
                "  {}  {:>3}°  {}",
                entry.display_time, entry.rounded_temperature, entry.condition_description
            );
        }
    }

    let daily = session.daily();
    if !daily.is_empty() {
        println!();
        println!("Daily:");
        for day in &daily {
            let marker = if state.selected_day.as_deref() == Some(day.day_key.as_str()) {
                '>'
            } else {
                ' '
            };
            println!(
                "{marker} {}  {}..{}°  {}",
                day.label,
                round_half_up(day.min_temperature),
                round_half_up(day.max_temperature),
                day.representative_description
            );
        }

        println!();
        println!("Day temperature (°C):");
        curve(&session.temperature_curve(
            CURVE_WIDTH as f64,
            CURVE_HEIGHT as f64,
            1.0,
        ));
    }
}

/// Rasterize the polyline vertices onto a character grid.
fn curve(points: &[CurvePoint]) {
    if points.is_empty() {
        return;
    }

    let mut grid = vec![vec![' '; CURVE_WIDTH]; CURVE_HEIGHT];
    for point in points {
        let col = (point.x.round() as usize).min(CURVE_WIDTH - 1);
        let row = (point.y.round() as usize).min(CURVE_HEIGHT - 1);
        grid[row][col] = '*';
    }

    for row in grid {
        println!("  {}", row.into_iter().collect::<String>());
    }
}
