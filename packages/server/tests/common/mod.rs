use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use ingestion::testing::{sample_posts, ScenarioHarness, TestScenario};
use server_core::kernel::ServerDeps;
use server_core::server::build_app;
use tower::ServiceExt;

pub const ENTITY_RESPONSE: &str =
    r#"{"brands":["Tnuva","Osem"],"coupons":["DANA10"],"products":["Pasta Maker"]}"#;

/// Router over an in-memory pipeline for `chef_dana`.
pub fn test_app() -> (Router, ScenarioHarness) {
    let harness = TestScenario::new("chef_dana")
        .with_posts(sample_posts(
            "Dana Cohen",
            &["Use code DANA10 at Tnuva", "Osem pasta night"],
        ))
        .with_entity_response(ENTITY_RESPONSE)
        .build();

    let app = build_app(ServerDeps::new(harness.ingestion.clone()));
    (app, harness)
}

pub async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();
    (status, body)
}

pub async fn send_json(app: &Router, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, body) = send(app, method, uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}
