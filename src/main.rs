mod api;
mod app;
mod classify;
mod config;
mod error;
mod location;
mod models;
mod render;
mod search;
mod state;
mod units;
mod video;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::warn;

use crate::api::client::WeatherClient;
use crate::app::WeatherApp;
use crate::config::AppConfig;
use crate::location::{LocationResolver, StaticProvider};
use crate::render::ConsoleSink;
use crate::search::CITY_CATALOG;
use crate::video::{LogSurface, VideoBackground};

#[derive(Parser)]
#[command(name = "skycast", about = "Weather lookup client with ambient video backgrounds")]
struct Cli {
    /// Path to config.toml (defaults to ./config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Display units (metric or imperial), overriding the config
    #[arg(short, long)]
    unit: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the current location and show conditions there, falling back
    /// to the default city when no location is available
    Current,
    /// Look up conditions for a free-text city query
    Lookup {
        /// City name (catalog names resolve to their provider id)
        query: String,
    },
    /// Filter the city catalog and fetch conditions for the top match
    Search {
        /// Search term matched against local and English names
        term: String,
    },
    /// List the built-in city catalog
    Cities,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skycast=info".into()),
        )
        .init();

    // Load .env if present (override system env vars)
    dotenvy::dotenv_override().ok();

    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(label) = &cli.unit {
        config.units = label.parse()?;
    }

    match cli.command {
        Commands::Current => {
            let mut app = build_app(&config)?;
            app.start().await;
        }
        Commands::Lookup { query } => {
            let mut app = build_app(&config)?;
            app.submit(&query).await;
        }
        Commands::Search { term } => {
            let mut app = build_app(&config)?;
            app.picker_mut().filter(&term);

            let matches = app.picker().visible().to_vec();
            if matches.is_empty() {
                println!("No catalog city matches {term:?}");
                return Ok(());
            }

            println!("\n{:<12} {:>10}", "City", "Id");
            println!("{}", "-".repeat(24));
            for city in &matches {
                println!("{:<12} {:>10}", city.label(), city.id);
            }

            app.picker_mut().move_selection(1);
            app.commit_selection().await;
        }
        Commands::Cities => {
            println!("\n{:<12} {:>10}", "City", "Id");
            println!("{}", "-".repeat(24));
            for city in CITY_CATALOG {
                println!("{:<12} {:>10}", city.label(), city.id);
            }
        }
    }

    Ok(())
}

fn build_app(config: &AppConfig) -> Result<WeatherApp<StaticProvider, LogSurface, ConsoleSink>> {
    if config.api.api_key.is_empty() {
        warn!("no API key configured (set OPENWEATHER_API_KEY); requests will be rejected upstream");
    }

    let client = WeatherClient::new(&config.api)?;
    let provider = StaticProvider::new(config.location.lat, config.location.lon);
    let resolver = LocationResolver::new(
        provider,
        Duration::from_secs(config.location.timeout_secs),
        Duration::from_secs(config.location.max_age_secs),
    );
    let video = VideoBackground::new(
        LogSurface::new(),
        config.video.base_url.clone(),
        Duration::from_secs(config.video.preload_timeout_secs),
    );

    Ok(WeatherApp::new(client, resolver, video, ConsoleSink, config))
}
