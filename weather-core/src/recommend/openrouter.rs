use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::WeatherError;

use super::CompletionClient;

/// Chat-completion client for OpenRouter and other OpenAI-compatible APIs.
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    api_key: String,
    base_url: String,
    model: String,
    http: Client,
}

impl OpenRouterClient {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self { api_key, base_url, model, http: Client::new() }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

#[async_trait]
impl CompletionClient for OpenRouterClient {
    #[instrument(skip_all, fields(model = %self.model))]
    async fn complete(&self, prompt: &str) -> Result<String, WeatherError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage { role: "user", content: prompt }],
        };

        let res = self
            .http
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                WeatherError::RecommendationService(format!("request to LLM service failed: {e}"))
            })?;

        let status = res.status();
        let text = res.text().await.map_err(|e| {
            WeatherError::RecommendationService(format!("failed to read LLM response body: {e}"))
        })?;

        if !status.is_success() {
            return Err(WeatherError::RecommendationService(format!(
                "LLM service returned status {status}: {text}"
            )));
        }

        let parsed: ChatResponse = serde_json::from_str(&text).map_err(|e| {
            WeatherError::RecommendationService(format!("failed to parse LLM response: {e}"))
        })?;

        let reply = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| {
                WeatherError::RecommendationService("LLM response contained no choices".into())
            })?
            .message
            .content
            .unwrap_or_default();

        debug!(chars = reply.len(), "received LLM completion");
        Ok(reply)
    }
}
