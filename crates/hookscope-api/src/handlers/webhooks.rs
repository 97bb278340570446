//! Listing, detail, and deletion handlers for captured webhooks.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hookscope_core::{WebhookId, WebhookSummary};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::{error::ApiError, AppState};

const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 100;

/// One page of the webhook listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    /// Summaries in newest-first order.
    pub webhooks: Vec<WebhookSummary>,
    /// Cursor to pass back as `?cursor=` for the next page, null on the
    /// last page.
    pub next_cursor: Option<WebhookId>,
}

/// Lists captured webhooks, newest first.
///
/// `limit` defaults to 10 and must be between 1 and 100. `cursor` is the
/// `nextCursor` value from a previous page.
#[instrument(name = "list_webhooks", skip(state, params))]
pub async fn list_webhooks(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let limit = match params.get("limit") {
        Some(raw) => raw
            .parse::<usize>()
            .ok()
            .filter(|limit| (1..=MAX_LIMIT).contains(limit))
            .ok_or_else(|| {
                ApiError::InvalidInput(format!("limit must be between 1 and {MAX_LIMIT}"))
            })?,
        None => DEFAULT_LIMIT,
    };

    let cursor = match params.get("cursor") {
        Some(raw) => Some(
            raw.parse::<WebhookId>()
                .map_err(|_| ApiError::InvalidInput("cursor must be a valid UUID".to_string()))?,
        ),
        None => None,
    };

    let page = state.storage.webhooks.list(limit, cursor).await?;

    debug!(count = page.webhooks.len(), has_more = page.next_cursor.is_some(), "Listed webhooks");

    Ok(Json(ListResponse { webhooks: page.webhooks, next_cursor: page.next_cursor }).into_response())
}

/// Returns the full record of one captured webhook.
#[instrument(name = "get_webhook", skip(state))]
pub async fn get_webhook(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;

    let webhook = state
        .storage
        .webhooks
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Webhook not found.".to_string()))?;

    Ok(Json(webhook).into_response())
}

/// Deletes one captured webhook.
#[instrument(name = "delete_webhook", skip(state))]
pub async fn delete_webhook(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;

    if !state.storage.webhooks.delete(id).await? {
        return Err(ApiError::NotFound("Webhook not found.".to_string()));
    }

    info!(webhook_id = %id, "Webhook deleted");

    Ok(StatusCode::NO_CONTENT.into_response())
}

fn parse_id(raw: &str) -> Result<WebhookId, ApiError> {
    raw.parse::<WebhookId>()
        .map_err(|_| ApiError::InvalidInput("id must be a valid UUID".to_string()))
}
