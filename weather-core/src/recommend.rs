use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;
use serde_json::{Map, Number, Value};
use tracing::{debug, warn};

use crate::{
    Config,
    error::WeatherError,
    model::{RecommendationResult, ResolvedWeather},
    recommend::openrouter::OpenRouterClient,
};

pub mod openrouter;

/// Single-shot text completion: one user prompt in, the first choice's text out.
#[async_trait]
pub trait CompletionClient: Send + Sync + Debug {
    async fn complete(&self, prompt: &str) -> Result<String, WeatherError>;
}

/// Construct the completion client from config.
pub fn completion_client_from_config(
    config: &Config,
) -> anyhow::Result<Arc<dyn CompletionClient>> {
    let api_key = config.llm_api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for the recommendation service.\n\
                 Hint: run `weather configure` or set OPENROUTER_API_KEY."
        )
    })?;

    Ok(Arc::new(OpenRouterClient::new(
        api_key.to_owned(),
        config.llm.base_url.clone(),
        config.llm.model.clone(),
    )))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecommendationCategory {
    Outfit,
    Activity,
}

impl RecommendationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationCategory::Outfit => "outfit",
            RecommendationCategory::Activity => "activity",
        }
    }

    fn instructions(&self) -> &'static str {
        match self {
            RecommendationCategory::Outfit => {
                "Please provide outfit recommendations for this weather. Include suggestions for:\n\
                 1. Top clothing (shirt, sweater, etc.)\n\
                 2. Bottom clothing (pants, skirt, etc.)\n\
                 3. Outerwear (jacket, coat, etc. if needed)\n\
                 4. Footwear\n\
                 5. Accessories (umbrella, hat, scarf, etc. if needed)\n"
            }
            RecommendationCategory::Activity => {
                "Please recommend activities or places to visit (like parks, museums, outdoor events) \
                 based on the weather conditions. Make suggestions for:\n\
                 1. Places like parks or exhibitions for this specific weather conditions.\n"
            }
        }
    }
}

impl std::fmt::Display for RecommendationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A weather summary paired with the kind of advice wanted for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationRequest {
    pub weather_summary: String,
    pub category: RecommendationCategory,
}

impl RecommendationRequest {
    pub fn new(resolved: &ResolvedWeather, category: RecommendationCategory) -> Self {
        Self { weather_summary: weather_summary(resolved), category }
    }

    pub fn prompt(&self) -> String {
        format!(
            "Based on this weather information: {}\n{}\
             Format as a JSON object with these categories as keys and recommendations as values.",
            self.weather_summary,
            self.category.instructions(),
        )
    }
}

/// One-line description of the resolved weather, with missing numbers as `0`.
pub fn weather_summary(resolved: &ResolvedWeather) -> String {
    let record = &resolved.record;
    let (kind, when) = if resolved.is_forecast {
        ("Forecasted", record.datetime.as_deref().unwrap_or("forecast date"))
    } else {
        ("Current", "current weather")
    };

    format!(
        "{kind} weather for {when} in {location}: Temperature: {temp}°C, Conditions: {conditions}, \
         Precipitation: {precip}mm, Humidity: {humidity}%, Wind speed: {wind} km/h.",
        location = resolved.location_label(),
        temp = or_zero(&record.temperature_c),
        conditions = record.conditions.as_deref().unwrap_or("unknown"),
        precip = or_zero(&record.precipitation_mm),
        humidity = or_zero(&record.humidity),
        wind = or_zero(&record.wind_speed_kph),
    )
}

fn or_zero(value: &Option<Number>) -> String {
    value.as_ref().map_or_else(|| "0".to_string(), Number::to_string)
}

const FENCE_OPEN: &str = "```json\n";
const FENCE_CLOSE: &str = "\n```";

/// Contents of the first ```` ```json ```` fenced block in `text`, if any.
pub fn fenced_json_block(text: &str) -> Option<&str> {
    let start = text.find(FENCE_OPEN)? + FENCE_OPEN.len();
    let rest = &text[start..];
    let end = rest.find(FENCE_CLOSE)?;
    Some(&rest[..end])
}

/// Turn a free-form LLM reply into a recommendation.
///
/// Never fails: a reply without a parseable fenced JSON object comes back
/// verbatim as [`RecommendationResult::Fallback`].
pub fn extract_recommendation(reply: &str) -> RecommendationResult {
    let Some(block) = fenced_json_block(reply) else {
        return RecommendationResult::Fallback { text: reply.to_string() };
    };

    match serde_json::from_str::<Map<String, Value>>(block) {
        Ok(map) => RecommendationResult::Structured(map),
        Err(e) => {
            warn!(error = %e, "fenced JSON block in LLM reply did not parse as an object");
            RecommendationResult::Fallback { text: reply.to_string() }
        }
    }
}

/// Asks the completion service for advice about a resolved forecast.
#[derive(Debug, Clone)]
pub struct RecommendationExtractor {
    client: Arc<dyn CompletionClient>,
}

impl RecommendationExtractor {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    pub async fn extract(
        &self,
        resolved: &ResolvedWeather,
        category: RecommendationCategory,
    ) -> Result<RecommendationResult, WeatherError> {
        let request = RecommendationRequest::new(resolved, category);
        debug!(%category, "requesting recommendations");
        let reply = self.client.complete(&request.prompt()).await?;
        let result = extract_recommendation(&reply);
        debug!(%category, structured = result.is_structured(), "recommendations received");
        Ok(result)
    }
}
