//! HTTP surface: token check, request decoding and error-to-status mapping.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Deserializer};
use serde_json::json;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use weather_core::{ReportRequest, WeatherError, WeatherQuery, WeatherReport, WeatherService};

#[derive(Debug, Clone)]
pub struct AppState {
    pub service: Arc<WeatherService>,
    pub api_token: Arc<str>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Weather(#[from] WeatherError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Weather(err) => StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        warn!(%status, %message, "request failed");
        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// Body of `POST /weather/api/v1/current`.
#[derive(Debug, Deserialize)]
pub struct WeatherApiRequest {
    pub token: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    pub requester_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_false")]
    pub include_outfit: bool,
    #[serde(default, deserialize_with = "null_as_false")]
    pub include_activities: bool,
}

fn null_as_false<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home_page))
        .route("/weather/api/v1/current", post(current_weather))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "weather API listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("weather API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

async fn home_page() -> Html<&'static str> {
    Html("<p><h2>KMA L2 Weather API.</h2></p>")
}

async fn current_weather(
    State(state): State<AppState>,
    payload: Result<Json<WeatherApiRequest>, JsonRejection>,
) -> Result<Json<WeatherReport>, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let token = body
        .token
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("token is required".into()))?;
    if token != &*state.api_token {
        return Err(ApiError::Forbidden("wrong API token".into()));
    }

    let location =
        body.location.ok_or_else(|| ApiError::BadRequest("location is required".into()))?;

    info!(
        location = %location,
        date = ?body.date,
        outfit = body.include_outfit,
        activities = body.include_activities,
        "weather request"
    );

    let request = ReportRequest {
        query: WeatherQuery::new(location, body.date),
        requester_name: body.requester_name,
        include_outfit: body.include_outfit,
        include_activities: body.include_activities,
    };

    let report = state.service.report(&request).await?;
    Ok(Json(report))
}
