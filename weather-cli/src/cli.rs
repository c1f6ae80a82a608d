use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use inquire::{CustomType, InquireError, Password, PasswordDisplayMode, Select, Text};
use std::{path::PathBuf, process::ExitCode};
use weather_dashboard_core::{Config, Dashboard, Units, WeatherClient, WeatherError};

use crate::render::TerminalSurface;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dashboard", version, about = "Weather dashboard for the terminal")]
pub struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store API key, units and timeout in the config file.
    Configure,

    /// Fetch current conditions and the 24-hour forecast for a city.
    Show {
        /// City name, e.g. "London" or "Paris,FR".
        city: String,

        /// Save the raw API payloads after a successful fetch.
        #[arg(long)]
        export: bool,

        /// Directory for the exported snapshot.
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,

        /// Print the chart specifications as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Prompt for cities repeatedly and save snapshots on request.
    Interactive {
        /// Directory for exported snapshots.
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
}

const FETCH_AGAIN: &str = "Fetch another city";
const SAVE: &str = "Save data";
const QUIT: &str = "Quit";

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, export, out, json } => {
                let config = load_config()?;
                let export_dir = export_dir(out, &config);
                let dashboard = Dashboard::new(WeatherClient::from_config(&config)?);
                let mut surface = TerminalSurface::new(dashboard.units(), json);

                match dashboard.trigger_fetch(&city, &mut surface).await {
                    Ok(_) => {}
                    Err(WeatherError::InvalidInput) => {
                        return Err(WeatherError::InvalidInput.into());
                    }
                    // Already reported by the surface; print the detail and fail.
                    Err(err) => {
                        eprintln!("{err}");
                        return Ok(ExitCode::FAILURE);
                    }
                }

                if export {
                    let path = dashboard.trigger_export(&export_dir, Local::now().naive_local())?;
                    eprintln!("Data saved to {}", path.display());
                }

                Ok(ExitCode::SUCCESS)
            }
            Command::Interactive { out } => {
                let config = load_config()?;
                let export_dir = export_dir(out, &config);
                let dashboard = Dashboard::new(WeatherClient::from_config(&config)?);
                interactive(&dashboard, &export_dir).await
            }
        }
    }
}

fn load_config() -> anyhow::Result<Config> {
    Config::load()?.with_env_overrides()
}

fn export_dir(out: Option<PathBuf>, config: &Config) -> PathBuf {
    out.or_else(|| config.export_dir.clone()).unwrap_or_else(|| PathBuf::from("."))
}

async fn interactive(
    dashboard: &Dashboard,
    export_dir: &std::path::Path,
) -> anyhow::Result<ExitCode> {
    let mut surface = TerminalSurface::new(dashboard.units(), false);
    eprintln!("Ready - enter a city to fetch weather data");

    loop {
        let city = match Text::new("Enter City:").with_placeholder("city name").prompt() {
            Ok(city) => city,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e).context("Failed to read city"),
        };

        if let Err(err) = dashboard.trigger_fetch(&city, &mut surface).await {
            eprintln!("{err}");
        }

        let mut options = vec![FETCH_AGAIN, QUIT];
        if dashboard.current().is_some() {
            options.insert(1, SAVE);
        }

        let choice = match Select::new("Next:", options).prompt() {
            Ok(choice) => choice,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e).context("Failed to read choice"),
        };

        match choice {
            SAVE => match dashboard.trigger_export(export_dir, Local::now().naive_local()) {
                Ok(path) => eprintln!("Data saved to {}", path.display()),
                Err(err) => eprintln!("{}\n{err}", err.status_label()),
            },
            QUIT => break,
            _ => {}
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn configure() -> anyhow::Result<ExitCode> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeatherMap API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Get a free key from openweathermap.org")
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key);
    }

    let starting = Units::all().iter().position(|u| *u == config.units).unwrap_or(0);
    config.units = Select::new("Units:", Units::all().to_vec())
        .with_starting_cursor(starting)
        .prompt()
        .context("Failed to read units")?;

    config.timeout_secs = CustomType::<u64>::new("Request timeout (seconds):")
        .with_default(config.timeout_secs)
        .with_error_message("Please type a whole number of seconds")
        .prompt()
        .context("Failed to read timeout")?;

    let current_dir = config
        .export_dir
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let dir = Text::new("Snapshot directory (empty for current directory):")
        .with_initial_value(&current_dir)
        .prompt()
        .context("Failed to read snapshot directory")?;
    config.export_dir = Some(dir.trim()).filter(|d| !d.is_empty()).map(PathBuf::from);

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());

    Ok(ExitCode::SUCCESS)
}
