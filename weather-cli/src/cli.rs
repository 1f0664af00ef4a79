use std::{fmt, path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, Select, Text};
use weather_widget_core::{
    Config, Coordinates, WeatherPanel, WeatherWidget,
    geolocation::geolocator_from_config,
    provider::provider_from_settings,
};

use crate::terminal::{InfoBanner, StderrNotifier, print_card, print_json};

type TerminalWidget = WeatherWidget<StderrNotifier, InfoBanner>;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-widget", version, about = "Current weather by city or location")]
pub struct Cli {
    /// OpenWeather API key; overrides `api_key` in the config file.
    #[arg(long, global = true, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Read settings from this file instead of the platform config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show current weather for a city.
    City {
        /// City name, e.g. "Paris" or "Paris,FR".
        city: String,

        /// Print the reading as JSON instead of the card.
        #[arg(long)]
        json: bool,
    },

    /// Show current weather for this device's location.
    Here {
        /// Latitude of a fixed position.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude of a fixed position.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Do not fall back to an IP address lookup.
        #[arg(long)]
        no_ip_lookup: bool,

        /// Print the reading as JSON instead of the card.
        #[arg(long)]
        json: bool,
    },

    /// Prompt for the key and run lookups from a menu (default).
    Interactive,
}

#[derive(Debug, Clone, Copy)]
enum Action {
    ByCity,
    ByLocation,
    ChangeKey,
    Quit,
}

impl Action {
    const ALL: [Action; 4] = [
        Action::ByCity,
        Action::ByLocation,
        Action::ChangeKey,
        Action::Quit,
    ];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::ByCity => "Get weather for a city",
            Action::ByLocation => "Use my location",
            Action::ChangeKey => "Change API key",
            Action::Quit => "Quit",
        })
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        let mut config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };
        tracing::debug!(path = ?self.config, "configuration loaded");

        let api_key = self
            .api_key
            .clone()
            .or_else(|| config.api_key().map(str::to_owned))
            .unwrap_or_default();

        match self.command.unwrap_or(Command::Interactive) {
            Command::City { city, json } => {
                let mut widget = build_widget(&config, None)?;
                widget.inputs_mut().api_key = api_key;
                widget.inputs_mut().city = city;

                let ok = widget.fetch_weather().await.is_ok();
                finish(&widget, ok, json)
            }
            Command::Here {
                lat,
                lon,
                no_ip_lookup,
                json,
            } => {
                if no_ip_lookup {
                    config.geolocation.ip_lookup = false;
                }
                let explicit = lat.zip(lon).map(|(lat, lon)| Coordinates::new(lat, lon));

                let mut widget = build_widget(&config, explicit)?;
                widget.inputs_mut().api_key = api_key;

                let ok = widget.fetch_weather_by_location().await.is_ok();
                finish(&widget, ok, json)
            }
            Command::Interactive => {
                let mut widget = build_widget(&config, None)?;
                widget.inputs_mut().api_key = api_key;
                widget.inputs_mut().city = config.city.clone().unwrap_or_default();

                interactive(&mut widget).await?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

fn build_widget(config: &Config, explicit: Option<Coordinates>) -> anyhow::Result<TerminalWidget> {
    let provider = provider_from_settings(&config.provider)
        .context("Failed to set up the weather provider client")?;
    let geolocator = geolocator_from_config(explicit, config)
        .context("Failed to set up the location service")?;

    Ok(WeatherWidget::new(
        provider,
        geolocator,
        WeatherPanel::new(config.provider.icon_base_url.clone()),
        StderrNotifier,
        InfoBanner::default(),
    ))
}

fn finish(widget: &TerminalWidget, ok: bool, json: bool) -> anyhow::Result<ExitCode> {
    if !ok {
        return Ok(ExitCode::FAILURE);
    }

    match widget.reading() {
        Some(reading) if json => print_json(reading)?,
        reading => print_card(widget.panel(), reading),
    }
    Ok(ExitCode::SUCCESS)
}

async fn interactive(widget: &mut TerminalWidget) -> anyhow::Result<()> {
    widget.open();

    if widget.inputs().api_key.trim().is_empty() {
        match prompt_api_key() {
            Ok(key) => widget.inputs_mut().api_key = key,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }
    }

    loop {
        let hint = if widget.modal().is_visible() {
            "What would you like to do?"
        } else {
            "What next?"
        };

        let action = match Select::new(hint, Action::ALL.to_vec()).prompt() {
            Ok(action) => action,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        match action {
            Action::ByCity => {
                let initial = widget.inputs().city.clone();
                let city = match Text::new("City:").with_initial_value(&initial).prompt() {
                    Ok(city) => city,
                    Err(InquireError::OperationCanceled) => continue,
                    Err(InquireError::OperationInterrupted) => break,
                    Err(e) => return Err(e.into()),
                };
                widget.inputs_mut().city = city;

                if widget.fetch_weather().await.is_ok() {
                    print_card(widget.panel(), widget.reading());
                }
            }
            Action::ByLocation => {
                if widget.fetch_weather_by_location().await.is_ok() {
                    print_card(widget.panel(), widget.reading());
                }
            }
            Action::ChangeKey => match prompt_api_key() {
                Ok(key) => widget.inputs_mut().api_key = key,
                Err(InquireError::OperationCanceled) => continue,
                Err(InquireError::OperationInterrupted) => break,
                Err(e) => return Err(e.into()),
            },
            Action::Quit => break,
        }
    }

    Ok(())
}

fn prompt_api_key() -> Result<String, InquireError> {
    Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn here_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from(["weather-widget", "here", "--lat", "-33.9", "--lon", "151.2"])
            .expect("arguments should parse");

        match cli.command {
            Some(Command::Here { lat, lon, .. }) => {
                assert_eq!(lat, Some(-33.9));
                assert_eq!(lon, Some(151.2));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn lat_without_lon_is_rejected() {
        let res = Cli::try_parse_from(["weather-widget", "here", "--lat", "10"]);
        assert!(res.is_err());
    }

    #[test]
    fn no_subcommand_means_interactive() {
        let cli = Cli::try_parse_from(["weather-widget"]).expect("arguments should parse");
        assert!(cli.command.is_none());
    }

    #[test]
    fn every_here_flag_is_documented() {
        let cmd = Cli::command();
        let here = cmd.find_subcommand("here").expect("here subcommand");
        for arg in here.get_arguments() {
            assert!(arg.get_help().is_some(), "--{} has no help text", arg.get_id());
        }
    }

    #[test]
    fn city_takes_json_flag() {
        let cli = Cli::try_parse_from(["weather-widget", "city", "Paris", "--json"])
            .expect("arguments should parse");
        assert!(matches!(
            cli.command,
            Some(Command::City { ref city, json: true }) if city == "Paris"
        ));
    }
}
