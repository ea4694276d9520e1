use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use inquire::Text;

use meteo_core::{
    Config, ForecastSession, IpLocator, MapSession, OpenWeatherClient, TileLayer,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "meteo", version, about = "Weather dashboard CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure,

    /// Show the forecast for a city, or for the current position.
    Show {
        /// City name; omit to resolve the current position instead.
        city: Option<String>,

        /// Day to plot, "YYYY-MM-DD"; defaults to the first forecast day.
        #[arg(long)]
        day: Option<String>,
    },

    /// Interactive dashboard: repeated searches against one session.
    Dashboard,

    /// Print overlay tile URLs for a location.
    Map {
        /// City name; omit to resolve the current position instead.
        city: Option<String>,

        /// Overlay layer: rain, temp or wind.
        #[arg(long, default_value = "rain")]
        layer: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, day } => show(city, day).await,
            Command::Dashboard => dashboard().await,
            Command::Map { city, layer } => map(city, &layer).await,
        }
    }
}

fn build_session() -> Result<ForecastSession> {
    let config = Config::load()?;
    let client = OpenWeatherClient::new(&config)?;
    Ok(ForecastSession::new(
        Arc::new(client),
        Arc::new(IpLocator::new()),
    ))
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    if config.has_api_key() {
        println!("An API key is already configured; it will be replaced.");
    }

    let key = Text::new("OpenWeather API key:").prompt()?;
    config.set_api_key(key.trim().to_string());
    config.save()?;

    println!("Saved to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(city: Option<String>, day: Option<String>) -> Result<()> {
    let session = build_session()?;

    match city {
        Some(city) => {
            session.set_query(city);
            session.submit_search().await;
        }
        None => session.start().await,
    }

    if let Some(day) = day {
        session.select_day(day);
    }

    render::session(&session);
    Ok(())
}

async fn dashboard() -> Result<()> {
    let session = build_session()?;

    println!("Resolving your position...");
    session.start().await;
    render::session(&session);

    loop {
        let Ok(input) = Text::new("City (':l' = my location, empty quits):").prompt() else {
            break;
        };
        let trimmed = input.trim();

        if trimmed.is_empty() {
            break;
        }
        if trimmed == ":l" {
            session.use_my_location().await;
        } else {
            session.set_query(trimmed);
            session.submit_search().await;
        }

        render::session(&session);
    }

    session.close();
    Ok(())
}

async fn map(city: Option<String>, layer: &str) -> Result<()> {
    let config = Config::load()?;
    let client = Arc::new(OpenWeatherClient::new(&config)?);
    let layer = TileLayer::try_from(layer)?;

    let map = MapSession::new(client.clone(), Arc::new(IpLocator::new()));
    map.set_layer(layer);

    match city {
        Some(city) => map.search(&city).await,
        None => map.start().await,
    }

    let state = map.snapshot();
    if let Some(err) = &state.error {
        println!("! {err}");
    }

    let tile = map.center_tile();
    println!(
        "{} ({:.4}, {:.4}) zoom {}",
        state.location_label, state.coords.lat, state.coords.lon, state.zoom
    );
    println!("Active layer: {} ({})", state.active_layer.label(), state.active_layer);
    println!("Base map:     https://tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png");
    println!("Overlay:      {}", client.tile_template(state.active_layer));
    println!("Center tile:  {}", client.tile_url(state.active_layer, tile));

    Ok(())
}
