//! Core library for the weather API.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weather provider client and the current/forecast resolution rules
//! - Prompting an LLM for outfit and activity advice and extracting its answer
//! - Assembling everything into the report returned to callers
//!
//! It is used by `weather-server`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod recommend;
pub mod report;
pub mod resolver;

pub use config::{Config, LlmConfig, ServerConfig, WeatherProviderConfig};
pub use error::WeatherError;
pub use model::{RecommendationResult, ResolvedWeather, WeatherQuery, WeatherRecord};
pub use provider::WeatherProvider;
pub use recommend::{CompletionClient, RecommendationCategory, RecommendationExtractor};
pub use report::{FormattedWeather, ReportRequest, WeatherReport, WeatherService};
pub use resolver::WeatherResolver;
