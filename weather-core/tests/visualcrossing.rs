//! Weather provider client against a mock Visual Crossing server.

use chrono::NaiveDate;
use serde_json::json;
use weather_core::{
    WeatherError, WeatherProvider, WeatherQuery, WeatherResolver,
    provider::visualcrossing::VisualCrossingProvider,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn provider(server: &MockServer) -> VisualCrossingProvider {
    VisualCrossingProvider::with_base_url("TEST_KEY".into(), format!("{}/timeline", server.uri()))
}

#[tokio::test]
async fn current_request_sends_metric_json_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/timeline/Kyiv"))
        .and(query_param("unitGroup", "metric"))
        .and(query_param("key", "TEST_KEY"))
        .and(query_param("contentType", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resolvedAddress": "Kyiv, Ukraine",
            "currentConditions": {"temp": 15, "conditions": "Clear", "humidity": 60}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let raw = provider(&server).fetch_timeline("Kyiv", None).await.unwrap();

    assert_eq!(raw["currentConditions"]["conditions"], "Clear");
}

#[tokio::test]
async fn forecast_request_appends_date_to_path() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/timeline/Kyiv/2030-05-03"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "days": [{"datetime": "2030-05-03", "temp": 19.5}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let date = NaiveDate::from_ymd_opt(2030, 5, 3);
    let raw = provider(&server).fetch_timeline("Kyiv", date).await.unwrap();

    assert_eq!(raw["days"][0]["temp"], 19.5);
}

#[tokio::test]
async fn non_success_status_is_carried_with_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Bad API Request:Invalid location"))
        .mount(&server)
        .await;

    let err = provider(&server).fetch_timeline("Nowhere", None).await.unwrap_err();

    match err {
        WeatherError::Provider { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body, "Bad API Request:Invalid location");
        }
        other => panic!("expected provider error, got {other:?}"),
    }
}

#[tokio::test]
async fn undecodable_body_is_a_fetch_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = provider(&server).fetch_timeline("Kyiv", None).await.unwrap_err();

    assert!(matches!(err, WeatherError::WeatherFetchFailed(_)));
    assert_eq!(err.status_code(), 500);
}

#[tokio::test]
async fn resolver_reports_missing_forecast_day_as_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/timeline/Kyiv/2030-05-08"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "days": [{"datetime": "2030-05-07"}]
        })))
        .mount(&server)
        .await;

    let resolver = WeatherResolver::new(std::sync::Arc::new(provider(&server)));
    let today = NaiveDate::from_ymd_opt(2030, 5, 1).unwrap();

    let err = resolver
        .resolve_on(&WeatherQuery::new("Kyiv", Some("2030-05-08".into())), today)
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn non_canonical_date_never_reaches_the_provider() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"days": []})))
        .expect(0)
        .mount(&server)
        .await;

    let resolver = WeatherResolver::new(std::sync::Arc::new(provider(&server)));
    let today = NaiveDate::from_ymd_opt(2030, 5, 1).unwrap();

    for date in ["+2030-05-03", " 2030-05-03"] {
        let err = resolver
            .resolve_on(&WeatherQuery::new("Kyiv", Some(date.into())), today)
            .await
            .unwrap_err();
        assert!(matches!(err, WeatherError::InvalidDate(_)), "{date:?} gave {err:?}");
    }
}

#[tokio::test]
async fn past_date_never_reaches_the_provider() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let resolver = WeatherResolver::new(std::sync::Arc::new(provider(&server)));
    let today = NaiveDate::from_ymd_opt(2030, 5, 1).unwrap();

    let err = resolver
        .resolve_on(&WeatherQuery::new("Kyiv", Some("2020-01-01".into())), today)
        .await
        .unwrap_err();

    assert!(matches!(err, WeatherError::PastDateRejected(_)));
}
