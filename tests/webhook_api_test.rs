//! Listing, pagination, detail, and deletion tests against the live API.
//!
//! Requires the postgres-test container.

#![cfg(feature = "docker")]

use std::collections::HashSet;

use serde_json::Value;
use test_harness::TestEnv;
use uuid::Uuid;

async fn capture(env: &TestEnv, path: &str) -> String {
    let response = env
        .client
        .post(env.url(&format!("/capture/{path}")))
        .body(format!("payload for {path}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn listing_pages_walk_without_overlap() {
    let mut env = TestEnv::new().await.unwrap();
    env.start_server().await.unwrap();

    for i in 0..25 {
        capture(&env, &format!("source-{i}")).await;
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0;

    loop {
        let url = match &cursor {
            Some(cursor) => env.url(&format!("/api/v1/webhooks?limit=10&cursor={cursor}")),
            None => env.url("/api/v1/webhooks?limit=10"),
        };

        let page: Value = env.client.get(url).send().await.unwrap().json().await.unwrap();
        let webhooks = page["webhooks"].as_array().unwrap();
        pages += 1;

        // Newest-first within the page
        let ids: Vec<&str> = webhooks.iter().map(|w| w["id"].as_str().unwrap()).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(ids, sorted, "page {pages} is not newest-first");

        for id in ids {
            assert!(seen.insert(id.to_string()), "id {id} appeared on two pages");
        }

        match page["nextCursor"].as_str() {
            Some(next) => cursor = Some(next.to_string()),
            None => break,
        }
    }

    assert_eq!(pages, 3);
    assert_eq!(seen.len(), 25);
}

#[tokio::test]
async fn default_limit_is_ten() {
    let mut env = TestEnv::new().await.unwrap();
    env.start_server().await.unwrap();

    for i in 0..12 {
        capture(&env, &format!("n{i}")).await;
    }

    let page: Value =
        env.client.get(env.url("/api/v1/webhooks")).send().await.unwrap().json().await.unwrap();

    assert_eq!(page["webhooks"].as_array().unwrap().len(), 10);
    assert!(page["nextCursor"].is_string());
}

#[tokio::test]
async fn exact_fit_page_has_no_cursor() {
    let mut env = TestEnv::new().await.unwrap();
    env.start_server().await.unwrap();

    for i in 0..5 {
        capture(&env, &format!("n{i}")).await;
    }

    let page: Value = env
        .client
        .get(env.url("/api/v1/webhooks?limit=5"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(page["webhooks"].as_array().unwrap().len(), 5);
    assert!(page["nextCursor"].is_null());
}

#[tokio::test]
async fn detail_of_unknown_webhook_is_404() {
    let mut env = TestEnv::new().await.unwrap();
    env.start_server().await.unwrap();

    let response = env
        .client
        .get(env.url(&format!("/api/v1/webhooks/{}", Uuid::now_v7())))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Webhook not found.");
}

#[tokio::test]
async fn delete_removes_the_webhook() {
    let mut env = TestEnv::new().await.unwrap();
    env.start_server().await.unwrap();

    let id = capture(&env, "to-delete").await;

    let response =
        env.client.delete(env.url(&format!("/api/v1/webhooks/{id}"))).send().await.unwrap();
    assert_eq!(response.status(), 204);

    let response = env.client.get(env.url(&format!("/api/v1/webhooks/{id}"))).send().await.unwrap();
    assert_eq!(response.status(), 404);

    // Deleting again reports not found
    let response =
        env.client.delete(env.url(&format!("/api/v1/webhooks/{id}"))).send().await.unwrap();
    assert_eq!(response.status(), 404);
}
