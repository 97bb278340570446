//! Handler generation tests against a mocked Gemini API.
//!
//! Requires the postgres-test container.

#![cfg(feature = "docker")]

use serde_json::{json, Value};
use test_harness::TestEnv;

async fn capture_json(env: &TestEnv, path: &str, payload: Value) -> String {
    let response =
        env.client.post(env.url(&format!("/capture/{path}"))).json(&payload).send().await.unwrap();
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn generates_handler_code_from_captured_payloads() {
    let mut env = TestEnv::new().await.unwrap();
    env.start_server().await.unwrap();

    let generated = "const handler = (body: unknown) => { /* ... */ };";
    env.gemini.mock_generate_content(generated).await;

    let first =
        capture_json(&env, "stripe", json!({"type": "payment_intent.succeeded", "amount": 42}))
            .await;
    let second = capture_json(&env, "stripe", json!({"type": "invoice.paid"})).await;

    let response = env
        .client
        .post(env.url("/api/v1/handler/generate"))
        .json(&json!({"webhookIds": [first, second]}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], generated);
    assert_eq!(env.gemini.request_count().await, 1);
}

#[tokio::test]
async fn unknown_ids_are_skipped() {
    let mut env = TestEnv::new().await.unwrap();
    env.start_server().await.unwrap();

    env.gemini.mock_generate_content("export {};").await;

    let known = capture_json(&env, "github", json!({"action": "opened"})).await;
    let unknown = uuid::Uuid::now_v7().to_string();

    let response = env
        .client
        .post(env.url("/api/v1/handler/generate"))
        .json(&json!({"webhookIds": [known, unknown]}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 201);
}

#[tokio::test]
async fn upstream_failure_maps_to_bad_gateway() {
    let mut env = TestEnv::new().await.unwrap();
    env.start_server().await.unwrap();

    env.gemini.mock_generate_failure(429).await;

    let id = capture_json(&env, "stripe", json!({"type": "charge.failed"})).await;

    let response = env
        .client
        .post(env.url("/api/v1/handler/generate"))
        .json(&json!({"webhookIds": [id]}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 502);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Handler generation failed.");
}
