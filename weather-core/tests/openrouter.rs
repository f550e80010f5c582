//! Completion client against a mock OpenAI-compatible server.

use serde_json::json;
use weather_core::{
    CompletionClient, RecommendationCategory, RecommendationExtractor, RecommendationResult,
    ResolvedWeather, WeatherError, WeatherRecord, recommend::openrouter::OpenRouterClient,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path},
};

const MODEL: &str = "deepseek/deepseek-chat:free";

fn client(server: &MockServer) -> OpenRouterClient {
    OpenRouterClient::new("LLM_KEY".into(), format!("{}/api/v1", server.uri()), MODEL.into())
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "gen-1",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": content}},
            {"index": 1, "message": {"role": "assistant", "content": "ignored"}}
        ]
    })
}

#[tokio::test]
async fn sends_single_user_message_and_returns_first_choice() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .and(header("authorization", "Bearer LLM_KEY"))
        .and(body_partial_json(json!({
            "model": MODEL,
            "messages": [{"role": "user", "content": "What should I wear?"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("A raincoat.")))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client(&server).complete("What should I wear?").await.unwrap();

    assert_eq!(reply, "A raincoat.");
}

#[tokio::test]
async fn error_status_is_a_service_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let err = client(&server).complete("hi").await.unwrap_err();

    assert!(matches!(err, WeatherError::RecommendationService(_)));
    assert!(err.to_string().contains("429"));
}

#[tokio::test]
async fn empty_choices_is_a_service_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let err = client(&server).complete("hi").await.unwrap_err();

    assert!(err.to_string().contains("no choices"));
}

#[tokio::test]
async fn extractor_parses_fenced_reply_from_service() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "Sure!\n```json\n{\"top\": \"T-shirt\", \"footwear\": \"Sneakers\"}\n```",
        )))
        .mount(&server)
        .await;

    let extractor = RecommendationExtractor::new(std::sync::Arc::new(client(&server)));
    let resolved = ResolvedWeather {
        record: WeatherRecord { temperature_c: Some(24.into()), ..WeatherRecord::default() },
        is_forecast: false,
        raw: json!({"resolvedAddress": "Lviv, Ukraine"}),
    };

    let result = extractor.extract(&resolved, RecommendationCategory::Outfit).await.unwrap();

    let map = match result {
        RecommendationResult::Structured(map) => map,
        other => panic!("expected structured result, got {other:?}"),
    };
    assert_eq!(map["top"], "T-shirt");
    assert_eq!(map["footwear"], "Sneakers");
}
