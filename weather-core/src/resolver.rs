use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::{
    error::WeatherError,
    model::{ResolvedWeather, WeatherQuery, WeatherRecord},
    provider::WeatherProvider,
};

/// Decides between current conditions and a forecast day, and picks the
/// matching record out of the provider's timeline.
#[derive(Debug, Clone)]
pub struct WeatherResolver {
    provider: Arc<dyn WeatherProvider>,
}

impl WeatherResolver {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    pub async fn resolve(&self, query: &WeatherQuery) -> Result<ResolvedWeather, WeatherError> {
        self.resolve_on(query, Utc::now().date_naive()).await
    }

    /// Resolve `query` treating `today` as the current date.
    ///
    /// The date is validated before the provider is contacted.
    pub async fn resolve_on(
        &self,
        query: &WeatherQuery,
        today: NaiveDate,
    ) -> Result<ResolvedWeather, WeatherError> {
        let Some(date) = query.date.as_deref() else {
            let raw = self.provider.fetch_timeline(&query.location, None).await?;
            let record = current_conditions(&raw)?;
            return Ok(ResolvedWeather { record, is_forecast: false, raw });
        };

        let requested = parse_requested_date(date, today)?;
        let raw = self.provider.fetch_timeline(&query.location, Some(requested)).await?;
        let record =
            forecast_day(&raw, date)?.ok_or_else(|| WeatherError::ForecastNotFound(date.to_string()))?;

        debug!(location = %query.location, date, "resolved forecast day");
        Ok(ResolvedWeather { record, is_forecast: true, raw })
    }
}

/// Parse a `YYYY-MM-DD` date and reject anything before `today`.
///
/// Only the canonical spelling is accepted; forms chrono tolerates such as
/// `+2030-05-03` or `2030-5-3` could never match a provider day label.
pub fn parse_requested_date(date: &str, today: NaiveDate) -> Result<NaiveDate, WeatherError> {
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .filter(|parsed| parsed.format("%Y-%m-%d").to_string() == date)
        .ok_or_else(|| WeatherError::InvalidDate(date.to_string()))?;

    if parsed < today {
        return Err(WeatherError::PastDateRejected(date.to_string()));
    }

    Ok(parsed)
}

/// The `currentConditions` object, or an empty record when the provider sent none.
fn current_conditions(raw: &Value) -> Result<WeatherRecord, WeatherError> {
    match raw.get("currentConditions") {
        Some(value) if !value.is_null() => decode_record(value),
        _ => Ok(WeatherRecord::default()),
    }
}

/// Linear scan of `days` for an exact `datetime` match.
fn forecast_day(raw: &Value, date: &str) -> Result<Option<WeatherRecord>, WeatherError> {
    let Some(days) = raw.get("days").and_then(Value::as_array) else {
        return Ok(None);
    };

    days.iter()
        .find(|day| day.get("datetime").and_then(Value::as_str) == Some(date))
        .map(decode_record)
        .transpose()
}

fn decode_record(value: &Value) -> Result<WeatherRecord, WeatherError> {
    WeatherRecord::deserialize(value).map_err(|e| {
        WeatherError::WeatherFetchFailed(format!("unexpected weather record shape: {e}"))
    })
}
