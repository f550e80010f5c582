use thiserror::Error;

/// Every failure the weather pipeline can report, each tied to the HTTP
/// status code it surfaces with.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Invalid date format: {0}. Use YYYY-MM-DD format.")]
    InvalidDate(String),

    #[error("Cannot show weather for past dates: {0}")]
    PastDateRejected(String),

    #[error("No forecast available for the given date: {0}")]
    ForecastNotFound(String),

    /// Non-success answer from the weather provider; body is kept verbatim.
    #[error("{body}")]
    Provider { status: u16, body: String },

    #[error("Recommendation service failed: {0}")]
    RecommendationService(String),

    #[error("Failed to get weather data: {0}")]
    WeatherFetchFailed(String),
}

impl WeatherError {
    pub fn status_code(&self) -> u16 {
        match self {
            WeatherError::InvalidDate(_) | WeatherError::PastDateRejected(_) => 400,
            WeatherError::ForecastNotFound(_) => 404,
            WeatherError::Provider { status, .. } => *status,
            WeatherError::RecommendationService(_) | WeatherError::WeatherFetchFailed(_) => 500,
        }
    }
}
