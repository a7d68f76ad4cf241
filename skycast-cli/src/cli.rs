use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use skycast_core::{Config, IpLocator, OpenWeatherProvider, Theme, UiStatus, WeatherSession};

use crate::term::TermScreen;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Terminal weather widget")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure,

    /// Show current conditions for a place.
    Show {
        /// Place name, e.g. "Paris" or "Springfield,US".
        place: String,

        /// Also fetch the 5-day forecast.
        #[arg(long)]
        forecast: bool,
    },

    /// Show current conditions for the current position (IP-derived).
    Here {
        /// Also fetch the 5-day forecast.
        #[arg(long)]
        forecast: bool,
    },

    /// Show or set the persisted theme preference.
    Theme {
        /// "light" or "dark"; prints the current theme when omitted.
        value: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { place, forecast } => {
                let session = build_session(forecast, false)?;
                session.search(&place).await;
                finish(&session)
            }
            Command::Here { forecast } => {
                let session = build_session(forecast, true)?;
                session.locate().await;
                finish(&session)
            }
            Command::Theme { value } => theme(value),
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.set_api_key(api_key);
    config.save()?;

    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}

fn theme(value: Option<String>) -> anyhow::Result<()> {
    let mut config = Config::load()?;

    match value {
        Some(value) => {
            let theme = Theme::try_from(value.as_str())?;
            config.set_theme(theme);
            config.save()?;
            println!("Theme set to {theme}");
        }
        None => println!("{}", config.theme()),
    }

    Ok(())
}

fn build_session(
    forecast: bool,
    with_locator: bool,
) -> anyhow::Result<WeatherSession<TermScreen>> {
    let config = Config::load()?;
    let options = config.client_options()?;
    let provider = Arc::new(OpenWeatherProvider::new(options));

    let mut session = WeatherSession::new(provider, TermScreen::new()).with_forecast(forecast);
    if with_locator {
        session = session.with_locator(Arc::new(IpLocator::new()));
    }

    Ok(session)
}

fn finish(session: &WeatherSession<TermScreen>) -> anyhow::Result<()> {
    let screen = session.screen();
    let screen = screen.lock();

    if session.status() == UiStatus::Error {
        anyhow::bail!("{}", screen.message().unwrap_or("request failed"));
    }

    print!("{}", screen.render());
    Ok(())
}
