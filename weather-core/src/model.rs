use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// What the caller asked for: a provider-understood location and an optional
/// `YYYY-MM-DD` date. The date is validated by the resolver, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherQuery {
    pub location: String,
    pub date: Option<String>,
}

impl WeatherQuery {
    pub fn new(location: impl Into<String>, date: Option<String>) -> Self {
        Self { location: location.into(), date }
    }
}

/// A single weather observation or daily forecast, as the provider reports it.
///
/// Every field is optional: providers routinely omit or null out values.
/// Numbers are kept as the provider wrote them, so `15` stays an integer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    #[serde(rename = "temp")]
    pub temperature_c: Option<Number>,
    pub conditions: Option<String>,
    #[serde(rename = "precip")]
    pub precipitation_mm: Option<Number>,
    pub humidity: Option<Number>,
    #[serde(rename = "windspeed")]
    pub wind_speed_kph: Option<Number>,
    pub pressure: Option<Number>,
    #[serde(rename = "cloudcover")]
    pub cloud_cover: Option<Number>,
    pub visibility: Option<Number>,
    /// `YYYY-MM-DD` for forecast days, `HH:MM:SS` for current conditions.
    pub datetime: Option<String>,
}

/// Output of the resolver: the matching record plus the payload it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedWeather {
    pub record: WeatherRecord,
    pub is_forecast: bool,
    pub raw: Value,
}

impl ResolvedWeather {
    /// Human-readable location resolved by the provider.
    pub fn location_label(&self) -> &str {
        self.raw
            .get("resolvedAddress")
            .and_then(Value::as_str)
            .unwrap_or("unknown location")
    }
}

/// What the LLM gave back: a category -> suggestion object when a fenced
/// JSON block could be parsed, otherwise the raw reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RecommendationResult {
    Structured(Map<String, Value>),
    Fallback { text: String },
}

impl RecommendationResult {
    pub fn is_structured(&self) -> bool {
        matches!(self, RecommendationResult::Structured(_))
    }
}
