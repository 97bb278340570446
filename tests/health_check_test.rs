//! Health endpoint tests against the live server.
//!
//! Requires the postgres-test container.

#![cfg(feature = "docker")]

use serde_json::Value;
use test_harness::TestEnv;

#[tokio::test]
async fn health_reports_database_up() {
    let mut env = TestEnv::new().await.unwrap();
    env.start_server().await.unwrap();

    let response = env.client.get(env.url("/health")).send().await.unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["database"]["status"], "up");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn liveness_answers_without_database_access() {
    let mut env = TestEnv::new().await.unwrap();
    env.start_server().await.unwrap();

    let response = env.client.get(env.url("/live")).send().await.unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "alive");
}

#[tokio::test]
async fn legacy_healthy_probe_answers_ok() {
    let mut env = TestEnv::new().await.unwrap();
    env.start_server().await.unwrap();

    let response = env.client.get(env.url("/api/v1/healthy")).send().await.unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}
