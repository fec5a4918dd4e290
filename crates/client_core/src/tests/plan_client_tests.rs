use super::*;

use axum::http::StatusCode;
use serde_json::json;

use crate::{
    test_support::{agra_plan_body, refused_url, MockPlanService, AGRA_INPUT},
    validation::validate,
};

fn agra_record() -> StudentRecord {
    validate(AGRA_INPUT).expect("valid record")
}

fn client_for(base_url: &str) -> HttpPlanClient {
    HttpPlanClient::new(base_url, PlanClientOptions::default()).expect("client")
}

#[test]
fn endpoint_appends_generate_plan_path() {
    assert_eq!(
        plan_endpoint("http://127.0.0.1:8000").expect("url").as_str(),
        "http://127.0.0.1:8000/generate_plan"
    );
    assert_eq!(
        plan_endpoint("http://127.0.0.1:8000/").expect("url").as_str(),
        "http://127.0.0.1:8000/generate_plan"
    );
    assert_eq!(
        plan_endpoint("https://plans.example.org/api/v1").expect("url").as_str(),
        "https://plans.example.org/api/v1/generate_plan"
    );
    assert!(plan_endpoint("not a url").is_err());
}

#[tokio::test]
async fn posts_record_under_data_and_returns_plan_verbatim() {
    let service = MockPlanService::ok_json(&agra_plan_body());
    let base_url = service.spawn().await.expect("spawn server");

    let plan = client_for(&base_url)
        .request_plan(&agra_record())
        .await
        .expect("plan");

    assert_eq!(serde_json::to_value(&plan).expect("encode"), agra_plan_body());
    assert_eq!(
        service.received().await,
        vec![json!({"data": {"studentId": 1000001608, "roName": "AGRA", "Overall": 3.0}})]
    );
}

#[tokio::test]
async fn non_success_status_is_http_error() {
    let service = MockPlanService::responding(StatusCode::INTERNAL_SERVER_ERROR, "boom");
    let base_url = service.spawn().await.expect("spawn server");

    let err = client_for(&base_url)
        .request_plan(&agra_record())
        .await
        .expect_err("must fail");
    assert_eq!(err, RequestError::HttpError(500));

    let service = MockPlanService::responding(StatusCode::UNPROCESSABLE_ENTITY, "{}");
    let base_url = service.spawn().await.expect("spawn server");
    let err = client_for(&base_url)
        .request_plan(&agra_record())
        .await
        .expect_err("must fail");
    assert_eq!(err, RequestError::HttpError(422));
}

#[tokio::test]
async fn error_body_is_service_error() {
    let service = MockPlanService::ok_json(&json!({"error": "model unavailable"}));
    let base_url = service.spawn().await.expect("spawn server");

    let err = client_for(&base_url)
        .request_plan(&agra_record())
        .await
        .expect_err("must fail");
    assert_eq!(err, RequestError::ServiceError("model unavailable".into()));
}

#[tokio::test]
async fn unparseable_body_is_malformed_response() {
    let service = MockPlanService::responding(StatusCode::OK, "<html>gateway</html>");
    let base_url = service.spawn().await.expect("spawn server");

    let err = client_for(&base_url)
        .request_plan(&agra_record())
        .await
        .expect_err("must fail");
    assert!(matches!(err, RequestError::MalformedResponse(_)), "{err:?}");
}

#[tokio::test]
async fn refused_connection_is_transport_error() {
    let base_url = refused_url().await.expect("free port");

    let err = client_for(&base_url)
        .request_plan(&agra_record())
        .await
        .expect_err("must fail");
    assert_eq!(err.kind(), shared::error::RequestErrorKind::Transport);
}

#[tokio::test]
async fn slow_service_hits_the_deadline() {
    let service = MockPlanService::ok_json(&agra_plan_body()).with_delay(Duration::from_secs(5));
    let base_url = service.spawn().await.expect("spawn server");
    let client = HttpPlanClient::new(
        &base_url,
        PlanClientOptions {
            request_timeout: Duration::from_millis(200),
            connect_timeout: Duration::from_secs(2),
        },
    )
    .expect("client");

    let err = client
        .request_plan(&agra_record())
        .await
        .expect_err("must time out");
    match err {
        RequestError::TransportError(message) => {
            assert!(message.contains("timed out"), "{message}")
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
