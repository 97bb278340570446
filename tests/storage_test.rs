//! Repository-level tests against a real database.
//!
//! Requires the postgres-test container.

#![cfg(feature = "docker")]

use std::collections::HashMap;

use hookscope_core::{storage::Storage, NewWebhook};
use test_harness::TestEnv;

fn sample(pathname: &str, body: Option<&str>) -> NewWebhook {
    NewWebhook {
        method: "POST".to_string(),
        pathname: pathname.to_string(),
        ip: "203.0.113.7".to_string(),
        status_code: 200,
        content_type: Some("application/json".to_string()),
        content_length: body.map(|b| i32::try_from(b.len()).unwrap()),
        query_params: None,
        headers: HashMap::from([("host".to_string(), "example.test".to_string())]),
        body: body.map(ToString::to_string),
    }
}

#[tokio::test]
async fn create_then_find_round_trips() {
    let env = TestEnv::new().await.unwrap();
    let storage = Storage::new(env.db.clone());

    let id = storage.webhooks.create(&sample("/stripe", Some("{\"a\":1}"))).await.unwrap();

    let webhook = storage.webhooks.find_by_id(id).await.unwrap().expect("row exists");
    assert_eq!(webhook.id, id);
    assert_eq!(webhook.pathname, "/stripe");
    assert_eq!(webhook.headers()["host"], "example.test");
    assert_eq!(webhook.body.as_deref(), Some("{\"a\":1}"));
}

#[tokio::test]
async fn find_bodies_skips_missing_and_bodyless_rows() {
    let env = TestEnv::new().await.unwrap();
    let storage = Storage::new(env.db.clone());

    let with_body = storage.webhooks.create(&sample("/a", Some("first"))).await.unwrap();
    let without_body = storage.webhooks.create(&sample("/b", None)).await.unwrap();
    let second_body = storage.webhooks.create(&sample("/c", Some("second"))).await.unwrap();
    let unknown = hookscope_core::WebhookId::new();

    let bodies = storage
        .webhooks
        .find_bodies(&[with_body, without_body, second_body, unknown])
        .await
        .unwrap();

    // Rows come back in id order, which is capture order
    assert_eq!(bodies, vec!["first".to_string(), "second".to_string()]);
}

#[tokio::test]
async fn count_tracks_inserts_and_deletes() {
    let env = TestEnv::new().await.unwrap();
    let storage = Storage::new(env.db.clone());

    assert_eq!(storage.webhooks.count().await.unwrap(), 0);

    let id = storage.webhooks.create(&sample("/x", None)).await.unwrap();
    assert_eq!(storage.webhooks.count().await.unwrap(), 1);

    assert!(storage.webhooks.delete(id).await.unwrap());
    assert_eq!(storage.webhooks.count().await.unwrap(), 0);
    assert!(!storage.webhooks.delete(id).await.unwrap());
}
