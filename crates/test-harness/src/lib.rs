//! Test harness for Hookscope integration tests.
//!
//! Provides isolated Postgres databases, a mocked Gemini API, and a helper
//! for running the full application against a random local port.

pub mod database;
pub mod http;

use std::{net::SocketAddr, time::Duration};

use anyhow::{Context, Result};
use hookscope_api::{create_router, AppState};
use hookscope_core::storage::Storage;
use sqlx::PgPool;
use tracing_subscriber::EnvFilter;

pub use crate::http::GeminiMock;

/// Default capture body cap used by tests.
pub const TEST_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Test environment with all necessary infrastructure.
pub struct TestEnv {
    /// Pool into this test's private database.
    pub db: PgPool,
    /// Mocked Gemini API.
    pub gemini: GeminiMock,
    /// Plain HTTP client for driving the server.
    pub client: reqwest::Client,
    /// Address of the spawned application server, once started.
    pub server_addr: Option<SocketAddr>,
}

impl TestEnv {
    /// Creates a new test environment with an isolated database and a
    /// running mock Gemini server.
    pub async fn new() -> Result<Self> {
        // Initialize tracing for tests
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("warn,hookscope=debug")),
            )
            .with_test_writer()
            .try_init();

        let db = database::setup_test_database().await?;
        let gemini = GeminiMock::start().await;
        let client = reqwest::Client::new();

        Ok(Self { db, gemini, client, server_addr: None })
    }

    /// Starts the full application on a random local port.
    pub async fn start_server(&mut self) -> Result<SocketAddr> {
        let storage = Storage::new(self.db.clone());
        let state = AppState::new(
            storage,
            self.gemini.client(),
            TEST_MAX_BODY_BYTES,
            Duration::from_secs(10),
        );

        let addr = spawn_app(state).await?;
        self.server_addr = Some(addr);
        Ok(addr)
    }

    /// Returns the base URL for making requests to the test server.
    pub fn base_url(&self) -> String {
        self.server_addr
            .map(|addr| format!("http://{addr}"))
            .unwrap_or_else(|| "http://localhost:3333".to_string())
    }

    /// Convenience for `{base_url}{path}`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url())
    }
}

/// Spawns the router on an ephemeral port and returns its address.
///
/// Connection info is propagated so capture handlers can record the peer
/// address, matching the production server setup.
pub async fn spawn_app(state: AppState) -> Result<SocketAddr> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("Failed to bind test listener")?;
    let addr = listener.local_addr().context("Failed to read test listener address")?;

    tokio::spawn(async move {
        if let Err(e) =
            axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await
        {
            tracing::error!("Test server failed: {}", e);
        }
    });

    Ok(addr)
}
