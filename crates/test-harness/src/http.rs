//! HTTP mocking utilities for the Gemini generation API.

use std::time::Duration;

use hookscope_codegen::{GeminiClient, GeminiConfig};
use serde_json::json;
use wiremock::{
    matchers::{method, path_regex},
    Mock, MockServer as WiremockServer, ResponseTemplate,
};

/// Mocked Gemini API server.
///
/// Stands in for the hosted `generateContent` endpoint so integration tests
/// can drive handler generation without network access or an API key quota.
pub struct GeminiMock {
    server: WiremockServer,
}

impl GeminiMock {
    /// Starts a new mock server on a random port.
    pub async fn start() -> Self {
        Self { server: WiremockServer::start().await }
    }

    /// Base URL to configure the client with.
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Builds a `GeminiClient` pointed at this mock.
    pub fn client(&self) -> GeminiClient {
        GeminiClient::new(GeminiConfig {
            api_key: "test-key".to_string(),
            base_url: self.url(),
            timeout: Duration::from_secs(5),
            ..GeminiConfig::default()
        })
        .expect("mock client config is valid")
    }

    /// Mocks a successful generation returning the given code.
    pub async fn mock_generate_content(&self, code: &str) {
        Mock::given(method("POST"))
            .and(path_regex(r"^/models/.+:generateContent$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [{"text": code}]
                    }
                }]
            })))
            .mount(&self.server)
            .await;
    }

    /// Mocks a generation failure with the given status code.
    pub async fn mock_generate_failure(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path_regex(r"^/models/.+:generateContent$"))
            .respond_with(ResponseTemplate::new(status).set_body_string("mocked failure"))
            .mount(&self.server)
            .await;
    }

    /// Returns the number of generation requests received.
    pub async fn request_count(&self) -> usize {
        self.server.received_requests().await.map_or(0, |reqs| reqs.len())
    }
}
