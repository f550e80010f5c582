use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Number;
use tracing::info;

use crate::{
    Config,
    error::WeatherError,
    model::{RecommendationResult, WeatherQuery, WeatherRecord},
    provider::provider_from_config,
    recommend::{RecommendationCategory, RecommendationExtractor, completion_client_from_config},
    resolver::WeatherResolver,
};

/// A validated query plus what to include alongside the weather.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub query: WeatherQuery,
    pub requester_name: Option<String>,
    pub include_outfit: bool,
    pub include_activities: bool,
}

/// Weather fields as returned to callers. Numbers pass through as the
/// provider sent them; absent ones stay `null`, except precipitation which
/// defaults to `0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedWeather {
    pub temp_c: Option<Number>,
    pub wind_kph: Option<Number>,
    pub pressure_mb: Option<Number>,
    pub humidity: Option<Number>,
    pub conditions: String,
    pub precipitation_mm: Number,
    pub cloud_cover: Option<Number>,
    pub visibility_km: Option<Number>,
}

impl FormattedWeather {
    pub fn from_record(record: &WeatherRecord) -> Self {
        Self {
            temp_c: record.temperature_c.clone(),
            wind_kph: record.wind_speed_kph.clone(),
            pressure_mb: record.pressure.clone(),
            humidity: record.humidity.clone(),
            conditions: record.conditions.clone().unwrap_or_else(|| "Unknown".to_string()),
            precipitation_mm: record.precipitation_mm.clone().unwrap_or_else(|| 0.into()),
            cloud_cover: record.cloud_cover.clone(),
            visibility_km: record.visibility.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub requester_name: String,
    pub timestamp: String,
    pub location: String,
    pub date: String,
    pub weather: FormattedWeather,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_recommendations: Option<RecommendationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outfit_recommendations: Option<RecommendationResult>,
}

/// Runs the resolver and, on request, the extractor, then assembles the report.
///
/// Calls are strictly sequential: weather, then outfit, then activities.
#[derive(Debug, Clone)]
pub struct WeatherService {
    resolver: WeatherResolver,
    extractor: RecommendationExtractor,
}

impl WeatherService {
    pub fn new(resolver: WeatherResolver, extractor: RecommendationExtractor) -> Self {
        Self { resolver, extractor }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let resolver = WeatherResolver::new(provider_from_config(config)?);
        let extractor = RecommendationExtractor::new(completion_client_from_config(config)?);
        Ok(Self::new(resolver, extractor))
    }

    pub async fn report(&self, request: &ReportRequest) -> Result<WeatherReport, WeatherError> {
        self.report_at(request, Utc::now()).await
    }

    /// Build the report as if the request arrived at `now`.
    pub async fn report_at(
        &self,
        request: &ReportRequest,
        now: DateTime<Utc>,
    ) -> Result<WeatherReport, WeatherError> {
        let query = &request.query;
        let resolved = self.resolver.resolve_on(query, now.date_naive()).await?;
        let weather = FormattedWeather::from_record(&resolved.record);

        let outfit_recommendations = if request.include_outfit {
            Some(self.extractor.extract(&resolved, RecommendationCategory::Outfit).await?)
        } else {
            None
        };

        let activity_recommendations = if request.include_activities {
            Some(self.extractor.extract(&resolved, RecommendationCategory::Activity).await?)
        } else {
            None
        };

        info!(
            location = %query.location,
            forecast = resolved.is_forecast,
            outfit = request.include_outfit,
            activities = request.include_activities,
            "weather report assembled"
        );

        Ok(WeatherReport {
            requester_name: request
                .requester_name
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            timestamp: now.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            location: query.location.clone(),
            date: query.date.clone().unwrap_or_else(|| now.format("%Y-%m-%d").to_string()),
            weather,
            activity_recommendations,
            outfit_recommendations,
        })
    }
}
