use crate::{Config, error::WeatherError, provider::visualcrossing::VisualCrossingProvider};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use std::{fmt::Debug, sync::Arc};

pub mod visualcrossing;

/// Source of raw timeline documents: `currentConditions` and/or a `days` list.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch the timeline for `location`, scoped to `date` when given.
    async fn fetch_timeline(
        &self,
        location: &str,
        date: Option<NaiveDate>,
    ) -> Result<Value, WeatherError>;
}

/// Construct the weather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let api_key = config.weather_api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for the weather provider.\n\
                 Hint: run `weather configure` or set WEATHER_API_KEY."
        )
    })?;

    Ok(Arc::new(VisualCrossingProvider::with_base_url(
        api_key.to_owned(),
        config.weather.base_url.clone(),
    )))
}
