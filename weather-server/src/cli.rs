use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use tracing::info;
use weather_core::{Config, ReportRequest, WeatherQuery, WeatherService};

use crate::http::{self, AppState};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather API with outfit and activity advice")]
pub struct Cli {
    /// Use this config file instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API.
    Serve {
        /// Interface to bind; defaults to the configured host.
        #[arg(long)]
        host: Option<String>,

        /// Port to bind; defaults to the configured port.
        #[arg(long)]
        port: Option<u16>,
    },

    /// Interactively store API keys and the request token.
    Configure,

    /// Print the weather report for a location as JSON.
    Show {
        /// Location understood by the weather provider, e.g. "Kyiv".
        location: String,

        /// Forecast day as YYYY-MM-DD; if absent, means "now".
        #[arg(long)]
        date: Option<String>,

        /// Ask for outfit recommendations.
        #[arg(long)]
        outfit: bool,

        /// Ask for activity recommendations.
        #[arg(long)]
        activities: bool,

        /// Name echoed back in the report.
        #[arg(long)]
        requester: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Serve { host, port } => {
                let config = load_config(self.config.as_ref())?;
                let api_token = config.require_api_token()?;
                let service = WeatherService::from_config(&config)?;

                let host = host.unwrap_or_else(|| config.server.host.clone());
                let port = port.unwrap_or(config.server.port);
                let addr = tokio::net::lookup_host((host.as_str(), port))
                    .await
                    .with_context(|| format!("Failed to resolve listen address {host}:{port}"))?
                    .next()
                    .ok_or_else(|| anyhow!("No address found for {host}:{port}"))?;

                let state =
                    AppState { service: Arc::new(service), api_token: Arc::from(api_token) };
                http::serve(state, addr).await?;
            }
            Command::Configure => {
                let path = match self.config {
                    Some(path) => path,
                    None => Config::config_file_path()?,
                };
                configure(path)?;
            }
            Command::Show { location, date, outfit, activities, requester } => {
                let config = load_config(self.config.as_ref())?;
                let service = WeatherService::from_config(&config)?;

                let request = ReportRequest {
                    query: WeatherQuery::new(location, date),
                    requester_name: requester,
                    include_outfit: outfit,
                    include_activities: activities,
                };

                let report = service.report(&request).await.map_err(|e| {
                    anyhow!("{e} (status {})", e.status_code())
                })?;
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }

        Ok(())
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(path) => {
            let mut config = Config::load_from(path)?;
            config.apply_env_overrides();
            Ok(config)
        }
        None => Config::load(),
    }
}

/// Prompt for each credential, keeping the stored value when the answer is empty.
fn configure(path: PathBuf) -> anyhow::Result<()> {
    let mut config = Config::load_from(&path)?;

    if let Some(key) = prompt_secret("Weather provider (Visual Crossing) API key:")? {
        config.weather.api_key = Some(key);
    }
    if let Some(key) = prompt_secret("LLM service (OpenRouter) API key:")? {
        config.llm.api_key = Some(key);
    }
    config.llm.model = Text::new("LLM model:").with_default(&config.llm.model).prompt()?;
    if let Some(token) = prompt_secret("Token required from API callers:")? {
        config.server.api_token = Some(token);
    }

    config.save_to(&path)?;
    info!(path = %path.display(), "configuration saved");
    println!("Configuration saved to {}", path.display());
    Ok(())
}

fn prompt_secret(message: &str) -> anyhow::Result<Option<String>> {
    let answer = Password::new(message)
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_help_message("leave empty to keep the current value")
        .prompt()?;

    let answer = answer.trim();
    Ok((!answer.is_empty()).then(|| answer.to_string()))
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
    fn show_parses_flags() {
        let cli = Cli::try_parse_from([
            "weather",
            "show",
            "Kyiv",
            "--date",
            "2030-05-03",
            "--outfit",
            "--requester",
            "Olena",
        ])
        .unwrap();

        match cli.command {
            Command::Show { location, date, outfit, activities, requester } => {
                assert_eq!(location, "Kyiv");
                assert_eq!(date.as_deref(), Some("2030-05-03"));
                assert!(outfit);
                assert!(!activities);
                assert_eq!(requester.as_deref(), Some("Olena"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn serve_accepts_global_config_path() {
        let cli = Cli::try_parse_from(["weather", "serve", "--port", "9000", "--config", "/tmp/w.toml"])
            .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/w.toml")));
        assert!(matches!(cli.command, Command::Serve { host: None, port: Some(9000) }));
    }

    #[test]
    fn explicit_config_path_is_loaded_with_defaults_when_missing() {
        let path = std::env::temp_dir().join("weather-server-missing/config.toml");
        let config = load_config(Some(&path)).unwrap();

        assert_eq!(config.server.port, Config::default().server.port);
    }
}
