use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::error::WeatherError;

use super::WeatherProvider;

/// Client for the Visual Crossing timeline API.
#[derive(Debug, Clone)]
pub struct VisualCrossingProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl VisualCrossingProvider {
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self { api_key, base_url, http: Client::new() }
    }

    /// `{base_url}/{location}[/{date}]`, with each segment percent-encoded.
    fn timeline_url(&self, location: &str, date: Option<NaiveDate>) -> Result<Url, WeatherError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            WeatherError::WeatherFetchFailed(format!(
                "invalid weather provider URL '{}': {e}",
                self.base_url
            ))
        })?;

        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                WeatherError::WeatherFetchFailed(format!(
                    "weather provider URL '{}' cannot take path segments",
                    self.base_url
                ))
            })?;
            segments.pop_if_empty().push(location);
            if let Some(date) = date {
                segments.push(&date.format("%Y-%m-%d").to_string());
            }
        }

        Ok(url)
    }
}

#[async_trait]
impl WeatherProvider for VisualCrossingProvider {
    #[instrument(skip(self), fields(provider = "visualcrossing"))]
    async fn fetch_timeline(
        &self,
        location: &str,
        date: Option<NaiveDate>,
    ) -> Result<Value, WeatherError> {
        let url = self.timeline_url(location, date)?;
        debug!(path = url.path(), "requesting weather timeline");

        let res = self
            .http
            .get(url)
            .query(&[
                ("unitGroup", "metric"),
                ("key", self.api_key.as_str()),
                ("contentType", "json"),
            ])
            .send()
            .await
            .map_err(|e| {
                WeatherError::WeatherFetchFailed(format!(
                    "request to weather provider failed: {e}"
                ))
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            WeatherError::WeatherFetchFailed(format!(
                "failed to read weather provider response body: {e}"
            ))
        })?;

        if !status.is_success() {
            warn!(%status, body = %truncate_body(&body), "weather provider request failed");
            return Err(WeatherError::Provider { status: status.as_u16(), body });
        }

        serde_json::from_str(&body).map_err(|e| {
            WeatherError::WeatherFetchFailed(format!(
                "failed to parse weather provider JSON: {e}"
            ))
        })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
