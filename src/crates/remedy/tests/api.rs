//! HTTP tests for the remedy router.

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use common::*;
use remedy::api::{create_router, AppState};
use remedy::{EscalationPolicy, Resolver};
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt;

fn app(resolver: Resolver) -> Router {
    create_router(AppState::new(resolver))
}

async fn post_json(app: Router, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn missing_disease() -> Value {
    json!({"error": "Please provide a disease in the request body"})
}

#[tokio::test]
async fn test_predict_accepted() {
    let app = app(resolver_with(MockGenerator::replying(
        "Use colchicine for acute gout flares.",
    )));

    let (status, body) = post_json(app, r#"{"disease": "Gout"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "disease": "gout",
            "treatment": "Use colchicine for acute gout flares.",
            "source": "model"
        })
    );
}

#[tokio::test]
async fn test_predict_missing_disease_never_generates() {
    let generator = MockGenerator::replying("Use rest.");
    let resolver = resolver_with(generator.clone());
    let app = app(resolver);

    for body in [r#"{}"#, r#"{"disease": null}"#, r#"{"disease": 42}"#, r#"{"disease": "  "}"#, "not json", ""] {
        let (status, value) = post_json(app.clone(), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body:?}");
        assert_eq!(value, missing_disease());
    }

    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_predict_without_content_type() {
    let generator = MockGenerator::replying("Use rest.");
    let app = app(resolver_with(generator.clone()));

    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .body(Body::from(r#"{"disease": "gout"}"#))
        .unwrap();
    let (status, value) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value, missing_disease());
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_predict_warns_on_unreliable_candidate() {
    let app = app(resolver_with(MockGenerator::replying("Take it easy.")));

    let (status, body) = post_json(app, r#"{"disease": "gout"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["treatment"], "Take it easy.");
    assert_eq!(body["warning"], "Generated treatment may not be accurate");
}

#[tokio::test]
async fn test_predict_knowledge_base_fallback() {
    let app = app(resolver_with(MockGenerator::replying(
        "Hypertension is a chronic condition affecting blood pressure.",
    )));

    let (status, body) = post_json(app, r#"{"disease": "Hypertension"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["treatment"],
        "Use ACE inhibitors like lisinopril and maintain a low-sodium diet."
    );
    assert_eq!(body["source"], "knowledge_base");
    assert!(body.get("warning").is_none());
}

#[tokio::test]
async fn test_predict_model_unavailable() {
    let app = app(resolver_without_model(None, EscalationPolicy::Disabled));

    let (status, body) = post_json(app.clone(), r#"{"disease": "gout"}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"error": "Model not loaded and disease not found in database"})
    );

    let (status, body) = post_json(app, r#"{"disease": "diabetes"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "knowledge_base");
}

#[tokio::test(start_paused = true)]
async fn test_predict_escalation_timeout() {
    let app = app(resolver_with_agent(
        MockGenerator::replying("Take it easy."),
        MockAgent::slow("Too late.", Duration::from_secs(600)),
        EscalationPolicy::OnReject,
    ));

    let (status, body) = post_json(app, r#"{"disease": "gout"}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"error": "Proxy AI failed: Task timeout exceeded after 3s"})
    );
}

#[tokio::test]
async fn test_predict_failure_is_isolated_to_request() {
    let app = app(resolver_with_agent(
        MockGenerator::replying("Take it easy."),
        MockAgent::crashing(),
        EscalationPolicy::OnReject,
    ));

    let (status, _) = post_json(app.clone(), r#"{"disease": "gout"}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, body) = post_json(app, r#"{"disease": "asthma"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "knowledge_base");
}

#[tokio::test]
async fn test_predict_always_corroborates() {
    let app = app(resolver_with_agent(
        MockGenerator::replying("Manage with allopurinol."),
        MockAgent::answering("Use NSAIDs during flares."),
        EscalationPolicy::Always,
    ));

    let (status, body) = post_json(app, r#"{"disease": "gout"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["treatment"], "Manage with allopurinol.");
    assert_eq!(body["biogpt_treatment"], "Manage with allopurinol.");
    assert_eq!(body["proxy_treatment"], "Use NSAIDs during flares.");
}

#[tokio::test]
async fn test_health_reports_state() {
    let app = app(resolver_with_agent(
        MockGenerator::replying("Use rest."),
        MockAgent::empty_handed(),
        EscalationPolicy::Always,
    ));

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "status": "ok",
            "model": "ready",
            "escalation": "always",
            "knowledge_entries": 10
        })
    );
}

#[tokio::test]
async fn test_health_with_failed_model() {
    let app = app(resolver_without_model(None, EscalationPolicy::OnReject));

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (_, body) = send(app, request).await;

    assert_eq!(body["model"], "failed");
    assert_eq!(body["escalation"], "disabled");
}
