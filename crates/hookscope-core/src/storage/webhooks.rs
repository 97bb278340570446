//! Repository for captured-webhook database operations.
//!
//! Provides insert, cursor-paginated listing, detail lookup, deletion, and
//! the body sampling query used by handler generation.

use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::Result,
    models::{NewWebhook, Webhook, WebhookId, WebhookSummary},
};

const SELECT_COLUMNS: &str = "id, method, pathname, ip, status_code, content_type, \
                              content_length, query_params, headers, body, created_at";

/// One page of webhook summaries.
///
/// `next_cursor` is the id of the last summary on the page when more rows
/// remain, and `None` when this page exhausts the table.
#[derive(Debug, Clone)]
pub struct WebhookPage {
    /// Summaries in newest-first order.
    pub webhooks: Vec<WebhookSummary>,
    /// Cursor to pass back for the next page, if any.
    pub next_cursor: Option<WebhookId>,
}

/// Repository for captured-webhook database operations.
pub struct Repository {
    pool: Arc<PgPool>,
}

impl Repository {
    /// Creates a new repository instance.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Returns a reference to the database pool.
    pub fn pool(&self) -> Arc<PgPool> {
        self.pool.clone()
    }

    /// Records a captured webhook and returns its generated id.
    ///
    /// The id is assigned here (UUIDv7) so callers get the cursor-orderable
    /// identifier back without a second query. `created_at` is assigned by
    /// the database.
    ///
    /// # Errors
    ///
    /// Returns error if the insert fails.
    pub async fn create(&self, webhook: &NewWebhook) -> Result<WebhookId> {
        let id = WebhookId::new();

        let query_params = webhook
            .query_params
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| crate::CoreError::InvalidInput(format!("query params: {e}")))?;
        let headers = serde_json::to_value(&webhook.headers)
            .map_err(|e| crate::CoreError::InvalidInput(format!("headers: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO webhooks (
                id, method, pathname, ip, status_code,
                content_type, content_length, query_params, headers, body
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(id.0)
        .bind(&webhook.method)
        .bind(&webhook.pathname)
        .bind(&webhook.ip)
        .bind(webhook.status_code)
        .bind(&webhook.content_type)
        .bind(webhook.content_length)
        .bind(query_params)
        .bind(headers)
        .bind(&webhook.body)
        .execute(&*self.pool)
        .await?;

        Ok(id)
    }

    /// Finds a webhook by id.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn find_by_id(&self, id: WebhookId) -> Result<Option<Webhook>> {
        let webhook = sqlx::query_as::<_, Webhook>(&format!(
            "SELECT {SELECT_COLUMNS} FROM webhooks WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(webhook)
    }

    /// Lists a page of webhook summaries, newest first.
    ///
    /// Fetches `limit + 1` rows so the presence of a following page is known
    /// without a count query. When `cursor` is set, only rows with a smaller
    /// id are returned; UUIDv7 byte ordering makes that equivalent to
    /// "captured earlier".
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn list(&self, limit: usize, cursor: Option<WebhookId>) -> Result<WebhookPage> {
        let fetch = i64::try_from(limit).unwrap_or(i64::MAX).saturating_add(1);

        let rows = match cursor {
            Some(cursor) => {
                sqlx::query_as::<_, WebhookSummary>(
                    r#"
                    SELECT id, method, pathname, created_at
                    FROM webhooks
                    WHERE id < $1
                    ORDER BY id DESC
                    LIMIT $2
                    "#,
                )
                .bind(cursor.0)
                .bind(fetch)
                .fetch_all(&*self.pool)
                .await?
            },
            None => {
                sqlx::query_as::<_, WebhookSummary>(
                    r#"
                    SELECT id, method, pathname, created_at
                    FROM webhooks
                    ORDER BY id DESC
                    LIMIT $1
                    "#,
                )
                .bind(fetch)
                .fetch_all(&*self.pool)
                .await?
            },
        };

        Ok(paginate(rows, limit))
    }

    /// Deletes a webhook by id.
    ///
    /// Returns `false` when no row existed, so the caller can report
    /// not-found.
    ///
    /// # Errors
    ///
    /// Returns error if the delete fails.
    pub async fn delete(&self, id: WebhookId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM webhooks WHERE id = $1")
            .bind(id.0)
            .execute(&*self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Fetches the non-null bodies of the given webhooks.
    ///
    /// Used by handler generation to sample payloads. Unknown ids and rows
    /// without a body are silently skipped; rows come back in id order.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn find_bodies(&self, ids: &[WebhookId]) -> Result<Vec<String>> {
        let raw: Vec<Uuid> = ids.iter().map(|id| id.0).collect();

        let bodies: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT body FROM webhooks
            WHERE id = ANY($1) AND body IS NOT NULL
            ORDER BY id
            "#,
        )
        .bind(&raw)
        .fetch_all(&*self.pool)
        .await?;

        Ok(bodies)
    }

    /// Counts all captured webhooks.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM webhooks").fetch_one(&*self.pool).await?;

        Ok(count.0)
    }
}

/// Turns an over-fetched row set into a page with a continuation cursor.
///
/// `rows` holds up to `limit + 1` entries; the extra row only signals that
/// more data exists and is dropped from the page.
fn paginate(mut rows: Vec<WebhookSummary>, limit: usize) -> WebhookPage {
    let has_more = rows.len() > limit;
    rows.truncate(limit);

    let next_cursor = if has_more { rows.last().map(|w| w.id) } else { None };

    WebhookPage { webhooks: rows, next_cursor }
}
