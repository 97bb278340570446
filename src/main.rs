//! Hookscope webhook capture service.
//!
//! Main entry point for the Hookscope server. Initializes configuration,
//! the database pool, and the HTTP server, and coordinates graceful
//! startup and shutdown.

use std::time::Duration;

use anyhow::{Context, Result};
use hookscope_api::{AppState, Config};
use hookscope_codegen::GeminiClient;
use hookscope_core::storage::Storage;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first so RUST_LOG from config.toml is honored
    let config = Config::load()?;

    init_tracing(&config.rust_log);

    info!("Starting Hookscope webhook capture service");
    info!(
        database_url = %config.database_url_masked(),
        host = %config.host,
        port = config.port,
        max_connections = config.database_max_connections,
        "Configuration loaded"
    );

    let db_pool = create_database_pool(&config).await?;
    info!("Database connection pool established");

    run_migrations(&db_pool).await?;
    info!("Database migrations completed");

    let codegen = GeminiClient::new(config.gemini_config())
        .context("Failed to configure the Gemini client; is GOOGLE_GENERATIVE_AI_API_KEY set?")?;

    let state = AppState::new(
        Storage::new(db_pool.clone()),
        codegen,
        config.capture_max_body_bytes,
        Duration::from_secs(config.request_timeout),
    );

    let addr = config.parse_server_addr()?;
    info!(addr = %addr, "Hookscope is ready to capture webhooks");

    hookscope_api::start_server(state, addr).await.context("HTTP server failed")?;

    db_pool.close().await;
    info!("Database connections closed");

    info!("Hookscope shutdown complete");
    Ok(())
}

/// Initializes tracing with environment-based configuration.
fn init_tracing(default_filter: &str) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_default();

    let fmt_layer = fmt::layer().with_target(true).with_file(true).with_line_number(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}

/// Creates the database connection pool with retry logic.
async fn create_database_pool(config: &Config) -> Result<sqlx::PgPool> {
    let mut retries = 0;
    const MAX_RETRIES: u32 = 5;
    const RETRY_DELAY: Duration = Duration::from_secs(2);

    loop {
        match PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connection_timeout))
            .connect(&config.database_url)
            .await
        {
            Ok(pool) => {
                // Verify connection works
                sqlx::query("SELECT 1")
                    .fetch_one(&pool)
                    .await
                    .context("Failed to verify database connection")?;

                return Ok(pool);
            },
            Err(_e) if retries < MAX_RETRIES => {
                retries += 1;
                info!(
                    attempt = retries,
                    max_retries = MAX_RETRIES,
                    "Database connection failed, retrying..."
                );
                tokio::time::sleep(RETRY_DELAY).await;
            },
            Err(e) => {
                return Err(e).context("Failed to create database connection pool after retries");
            },
        }
    }
}

/// Runs database migrations.
async fn run_migrations(pool: &sqlx::PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS webhooks (
            id UUID PRIMARY KEY,
            method TEXT NOT NULL,
            pathname TEXT NOT NULL,
            ip TEXT NOT NULL,
            status_code INTEGER NOT NULL DEFAULT 200,
            content_type TEXT,
            content_length INTEGER,
            query_params JSONB,
            headers JSONB NOT NULL DEFAULT '{}'::jsonb,
            body TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create webhooks table")?;

    // Listing reads newest-first by id
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_webhooks_id_desc ON webhooks(id DESC)")
        .execute(pool)
        .await
        .context("Failed to create webhooks id index")?;

    Ok(())
}
