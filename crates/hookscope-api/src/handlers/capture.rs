//! Capture handlers that record arbitrary inbound requests.
//!
//! Any method on `/capture` or below it is accepted and persisted verbatim:
//! method, path, client address, headers, query parameters, and body. The
//! caller gets the generated id back so the request can be looked up later.

use std::{collections::HashMap, convert::Infallible, net::SocketAddr};

use axum::{
    extract::{ConnectInfo, FromRequestParts, Path, Query, State},
    http::{request::Parts, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use hookscope_core::{NewWebhook, WebhookId};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::{error::ApiError, AppState};

/// Status code recorded for every captured request.
///
/// The capture endpoint itself answers 201; the recorded code reflects what
/// a real receiver would have returned.
const RECORDED_STATUS: i32 = 200;

/// Response from a successful capture.
#[derive(Debug, Serialize)]
pub struct CaptureResponse {
    /// Identifier of the recorded webhook.
    pub id: WebhookId,
}

/// Client address extractor.
///
/// Prefers the first `X-Forwarded-For` entry so captures behind a proxy
/// record the original caller, then falls back to the peer address. Never
/// rejects; a request with neither records `"unknown"`.
pub struct ClientIp(pub String);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(forwarded) = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
        {
            return Ok(Self(forwarded.to_string()));
        }

        let ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map_or_else(|| "unknown".to_string(), |info| info.0.ip().to_string());

        Ok(Self(ip))
    }
}

/// Captures a request sent to `/capture` itself.
///
/// Recorded with an empty pathname, matching a receiver mounted at the
/// capture root.
#[instrument(name = "capture_root", skip_all, fields(method = %method))]
pub async fn capture_root(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    method: Method,
    Query(params): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    record(&state, method, String::new(), ip, params, headers, body).await
}

/// Captures a request sent to any path below `/capture`.
#[instrument(name = "capture_webhook", skip_all, fields(method = %method, path = %path))]
pub async fn capture_webhook(
    State(state): State<AppState>,
    Path(path): Path<String>,
    ClientIp(ip): ClientIp,
    method: Method,
    Query(params): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    record(&state, method, format!("/{path}"), ip, params, headers, body).await
}

/// Persists one captured request and answers 201 with its id.
async fn record(
    state: &AppState,
    method: Method,
    pathname: String,
    ip: String,
    params: Vec<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    if body.len() > state.max_body_bytes {
        return Err(ApiError::PayloadTooLarge { limit: state.max_body_bytes });
    }

    let content_type = headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);

    let content_length = headers
        .get(axum::http::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<i32>().ok());

    let query_params = flatten_query(params);
    let flat_headers = flatten_headers(&headers);
    let body = normalize_body(&body, content_type.as_deref());

    let webhook = NewWebhook {
        method: method.to_string(),
        pathname,
        ip,
        status_code: RECORDED_STATUS,
        content_type,
        content_length,
        query_params,
        headers: flat_headers,
        body,
    };

    let id = state.storage.webhooks.create(&webhook).await?;

    info!(webhook_id = %id, method = %webhook.method, pathname = %webhook.pathname, "Webhook captured");

    Ok((StatusCode::CREATED, Json(CaptureResponse { id })).into_response())
}

/// Flattens query pairs into a map, joining repeated names with `", "`.
fn flatten_query(params: Vec<(String, String)>) -> Option<HashMap<String, String>> {
    if params.is_empty() {
        return None;
    }

    let mut map: HashMap<String, String> = HashMap::new();
    for (name, value) in params {
        map.entry(name)
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    Some(map)
}

/// Flattens headers into a map, joining repeated names with `", "`.
fn flatten_headers(headers: &HeaderMap) -> HashMap<String, String> {
    let mut map: HashMap<String, String> = HashMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        map.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    map
}

/// Converts the raw body to stored text.
///
/// JSON payloads are stored pretty-printed so they read well in the
/// dashboard; anything else is stored as lossy UTF-8. Empty bodies are
/// stored as NULL.
fn normalize_body(body: &Bytes, content_type: Option<&str>) -> Option<String> {
    if body.is_empty() {
        return None;
    }

    let text = String::from_utf8_lossy(body).into_owned();

    if content_type.is_some_and(|ct| ct.contains("application/json")) {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&text) {
            if let Ok(pretty) = serde_json::to_string_pretty(&value) {
                return Some(pretty);
            }
        }
        debug!("Body declared as JSON but failed to parse, storing raw text");
    }

    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_query_values_are_joined() {
        let params = vec![
            ("tag".to_string(), "a".to_string()),
            ("tag".to_string(), "b".to_string()),
            ("id".to_string(), "7".to_string()),
        ];

        let map = flatten_query(params).unwrap();

        assert_eq!(map["tag"], "a, b");
        assert_eq!(map["id"], "7");
    }

    #[test]
    fn empty_query_is_not_recorded() {
        assert!(flatten_query(Vec::new()).is_none());
    }

    #[test]
    fn duplicate_headers_are_joined() {
        let mut headers = HeaderMap::new();
        headers.append("x-tag", "a".parse().unwrap());
        headers.append("x-tag", "b".parse().unwrap());
        headers.insert("content-type", "application/json".parse().unwrap());

        let map = flatten_headers(&headers);

        assert_eq!(map["x-tag"], "a, b");
        assert_eq!(map["content-type"], "application/json");
    }

    #[test]
    fn json_bodies_are_pretty_printed() {
        let body = Bytes::from_static(b"{\"event\":\"ping\",\"n\":1}");
        let stored = normalize_body(&body, Some("application/json")).unwrap();

        assert!(stored.contains("\"event\": \"ping\""));
        assert!(stored.contains('\n'));
    }

    #[test]
    fn malformed_json_is_stored_raw() {
        let body = Bytes::from_static(b"{not json");
        let stored = normalize_body(&body, Some("application/json")).unwrap();

        assert_eq!(stored, "{not json");
    }

    #[test]
    fn non_json_bodies_are_stored_verbatim() {
        let body = Bytes::from_static(b"plain text payload");
        let stored = normalize_body(&body, Some("text/plain")).unwrap();

        assert_eq!(stored, "plain text payload");
    }

    #[test]
    fn empty_body_is_null() {
        assert!(normalize_body(&Bytes::new(), None).is_none());
    }
}
