use anyhow::{Context, anyhow, bail};
use citycast_core::{
    City, Config, Coordinates, FileCityStore, FixedLocation, LocationManager, LocationSource,
    NoLocation, Units, WeatherViewModel, api_from_config,
};
use clap::{Parser, Subcommand};
use inquire::{CustomUserError, Select, Text, validator::Validation};
use std::sync::Arc;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "citycast", version, about = "Current weather for your city")]
pub struct Cli {
    /// Log requests and state changes to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the OpenWeather API key and units.
    Configure,

    /// Show weather for the saved city, or for the given coordinates.
    Show {
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },

    /// Search cities by name and show weather for the chosen one.
    Search {
        /// City name, optionally with state and country, e.g. "Springfield,IL,US".
        query: String,

        /// Take the first match instead of prompting.
        #[arg(long)]
        first: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { lat, lon } => {
                let here = lat.zip(lon).map(|(lat, lon)| Coordinates { lat, lon });
                show(here).await
            }
            Command::Search { query, first } => search(&query, first).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load_from(&Config::config_file_path()?)?;

    let api_key = Text::new("OpenWeather API key:")
        .with_initial_value(config.api_key.as_deref().unwrap_or_default())
        .with_validator(|input: &str| {
            let verdict = if input.trim().is_empty() {
                Validation::Invalid("API key must not be empty".into())
            } else {
                Validation::Valid
            };
            Ok::<_, CustomUserError>(verdict)
        })
        .prompt()
        .context("Failed to read API key")?;

    let starting = Units::all().iter().position(|u| *u == config.units).unwrap_or_default();
    let units = Select::new("Units:", Units::all().to_vec())
        .with_starting_cursor(starting)
        .prompt()
        .context("Failed to read units")?;

    config.set_api_key(api_key);
    config.units = units;
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn build_view_model(
    config: &Config,
    here: Option<Coordinates>,
) -> anyhow::Result<WeatherViewModel> {
    let client = Arc::new(api_from_config(config)?);
    let store = FileCityStore::open_default()?;
    tracing::debug!(path = %store.path().display(), "Using city store");

    let source: Box<dyn LocationSource> = match here {
        Some(coords) => Box::new(FixedLocation(coords)),
        None => Box::new(NoLocation),
    };

    Ok(WeatherViewModel::new(
        Box::new(Arc::clone(&client)),
        Box::new(LocationManager::new(source, client)),
        Box::new(store),
        config.icon_base_url.clone(),
    ))
}

async fn show(here: Option<Coordinates>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let vm = build_view_model(&config, here)?;

    if here.is_some() {
        vm.fetch_location_weather().await;
    } else {
        vm.fetch_initial_data().await;
    }

    let state = vm.state();
    if !state.has_weather() && state.error_message.is_none() {
        if here.is_some() {
            bail!("Could not resolve a city at the given coordinates (run with -v for details).");
        }
        bail!(
            "No saved city and no location available.\n\
             Hint: run `citycast search <city>` or pass --lat/--lon."
        );
    }

    render::print_weather(&state, config.units)
}

async fn search(query: &str, first: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let vm = build_view_model(&config, None)?;

    vm.fetch_cities(query).await;
    let results = vm.state().cities_search_results;

    if results.is_empty() {
        bail!("No cities found matching '{query}'.");
    }

    let city = if first || results.len() == 1 {
        results.into_iter().next().ok_or_else(|| anyhow!("No cities found"))?
    } else {
        pick_city(results)?
    };

    vm.select_city(&city).await;
    render::print_weather(&vm.state(), config.units)
}

fn pick_city(cities: Vec<City>) -> anyhow::Result<City> {
    let labels: Vec<String> = cities.iter().map(City::formatted_name).collect();
    let chosen = Select::new("Select a city:", labels)
        .raw_prompt()
        .context("Failed to read city selection")?;

    cities.into_iter().nth(chosen.index).ok_or_else(|| anyhow!("Selected city out of range"))
}
