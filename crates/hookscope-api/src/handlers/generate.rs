//! Handler-code generation endpoint.
//!
//! Takes a set of captured webhook ids, samples their stored bodies, and
//! asks the model for a typed TypeScript handler covering those payloads.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hookscope_codegen::prompt::{handler_prompt, SYSTEM_PROMPT};
use hookscope_core::WebhookId;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{error::ApiError, AppState};

/// Request body for handler generation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Ids of the captured webhooks whose bodies seed the prompt.
    pub webhook_ids: Vec<String>,
}

/// Response carrying the generated handler source.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    /// Generated TypeScript source, without markdown fencing.
    pub code: String,
}

/// Generates a TypeScript handler from the selected webhook payloads.
///
/// Ids that do not exist or have no stored body are skipped; the prompt is
/// built from whatever bodies remain.
#[instrument(name = "generate_handler", skip(state, request))]
pub async fn generate_handler(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Response, ApiError> {
    let ids: Vec<WebhookId> = request
        .webhook_ids
        .iter()
        .map(|raw| raw.parse::<WebhookId>())
        .collect::<Result<_, _>>()
        .map_err(|_| ApiError::InvalidInput("webhookIds must contain valid UUIDs".to_string()))?;

    let bodies = state.storage.webhooks.find_bodies(&ids).await?;

    info!(requested = ids.len(), sampled = bodies.len(), "Generating handler code");

    let prompt = handler_prompt(&bodies.join("\n\n"));
    let code = state.codegen.generate(SYSTEM_PROMPT, &prompt).await?;

    Ok((StatusCode::CREATED, Json(GenerateResponse { code })).into_response())
}
