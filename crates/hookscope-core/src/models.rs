//! Domain models and the strongly-typed webhook identifier.
//!
//! Defines the captured-webhook record, its list-view projection, and the
//! `WebhookId` newtype. Identifiers are UUIDv7 so they sort by creation time
//! and double as the pagination cursor.

use std::{
    collections::HashMap,
    fmt,
    str::FromStr,
    sync::{LazyLock, Mutex},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::{
    timestamp::{context::ContextV7, Timestamp},
    Uuid,
};

type PgDb = sqlx::Postgres;
type PgValueRef<'r> = sqlx::postgres::PgValueRef<'r>;
type PgTypeInfo = sqlx::postgres::PgTypeInfo;
type PgArgumentBuffer = sqlx::postgres::PgArgumentBuffer;
type EncodeResult =
    Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync + 'static>>;
type BoxDynError = sqlx::error::BoxDynError;

/// Shared v7 context so ids generated within the same millisecond still
/// order by creation sequence.
static ID_CONTEXT: LazyLock<Mutex<ContextV7>> = LazyLock::new(|| Mutex::new(ContextV7::new()));

/// Strongly-typed webhook identifier.
///
/// Wraps a UUIDv7. The timestamp prefix makes ids monotonically orderable,
/// so the id of the last row on a page is the cursor for the next page.
///
/// # Example
///
/// ```
/// use hookscope_core::models::WebhookId;
/// let a = WebhookId::new();
/// let b = WebhookId::new();
/// assert!(a < b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WebhookId(pub Uuid);

impl WebhookId {
    /// Creates a new time-ordered webhook ID.
    pub fn new() -> Self {
        Self(Uuid::new_v7(Timestamp::now(&*ID_CONTEXT.lock().unwrap())))
    }
}

impl Default for WebhookId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WebhookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for WebhookId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl FromStr for WebhookId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl sqlx::Type<PgDb> for WebhookId {
    fn type_info() -> PgTypeInfo {
        <Uuid as sqlx::Type<PgDb>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, PgDb> for WebhookId {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let uuid = <Uuid as sqlx::Decode<PgDb>>::decode(value)?;
        Ok(Self(uuid))
    }
}

impl sqlx::Encode<'_, PgDb> for WebhookId {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> EncodeResult {
        <Uuid as sqlx::Encode<PgDb>>::encode_by_ref(&self.0, buf)
    }
}

/// One captured inbound HTTP request.
///
/// Immutable once recorded: created on capture, read via list/detail queries,
/// deleted explicitly by id. Field names serialize in camelCase to preserve
/// the wire contract the dashboard consumes.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    /// Unique time-ordered identifier.
    pub id: WebhookId,

    /// HTTP method, verbatim.
    pub method: String,

    /// Request path with the `/capture` prefix stripped.
    pub pathname: String,

    /// Client address the request arrived from.
    pub ip: String,

    /// Status code returned to the captured caller.
    pub status_code: i32,

    /// Content-Type header, when present.
    pub content_type: Option<String>,

    /// Content-Length header, when present and parseable.
    pub content_length: Option<i32>,

    /// Query parameters flattened to name -> value.
    pub query_params: Option<sqlx::types::Json<HashMap<String, String>>>,

    /// Request headers flattened to name -> value.
    pub headers: sqlx::types::Json<HashMap<String, String>>,

    /// Raw body text. JSON payloads are stored pretty-printed.
    pub body: Option<String>,

    /// When the request was captured.
    pub created_at: DateTime<Utc>,
}

impl Webhook {
    /// Headers as a regular map for easy access.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers.0
    }

    /// Query parameters as a regular map, when any were recorded.
    pub fn query_params(&self) -> Option<&HashMap<String, String>> {
        self.query_params.as_ref().map(|q| &q.0)
    }
}

/// List-view projection of a webhook.
///
/// Carries only what the listing needs; the detail query returns the full
/// record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WebhookSummary {
    /// Unique time-ordered identifier.
    pub id: WebhookId,

    /// HTTP method, verbatim.
    pub method: String,

    /// Request path with the `/capture` prefix stripped.
    pub pathname: String,

    /// When the request was captured.
    pub created_at: DateTime<Utc>,
}

/// Data for a webhook about to be recorded.
///
/// The repository assigns the id and the database assigns `created_at`.
#[derive(Debug, Clone)]
pub struct NewWebhook {
    /// HTTP method, verbatim.
    pub method: String,
    /// Request path with the `/capture` prefix stripped.
    pub pathname: String,
    /// Client address the request arrived from.
    pub ip: String,
    /// Status code returned to the captured caller.
    pub status_code: i32,
    /// Content-Type header, when present.
    pub content_type: Option<String>,
    /// Content-Length header, when present and parseable.
    pub content_length: Option<i32>,
    /// Query parameters flattened to name -> value.
    pub query_params: Option<HashMap<String, String>>,
    /// Request headers flattened to name -> value.
    pub headers: HashMap<String, String>,
    /// Raw body text, when the request carried one.
    pub body: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic() {
        let ids: Vec<WebhookId> = (0..64).map(|_| WebhookId::new()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted, "ids generated in sequence must already be ordered");
    }

    #[test]
    fn ids_order_by_timestamp() {
        let earlier = Uuid::new_v7(Timestamp::from_unix(uuid::NoContext, 1_700_000_000, 0));
        let later = Uuid::new_v7(Timestamp::from_unix(uuid::NoContext, 1_700_000_001, 0));
        assert!(WebhookId(earlier) < WebhookId(later));
    }

    #[test]
    fn id_round_trips_through_string() {
        let id = WebhookId::new();
        let parsed: WebhookId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn webhook_serializes_in_camel_case() {
        let webhook = Webhook {
            id: WebhookId::new(),
            method: "POST".to_string(),
            pathname: "/stripe".to_string(),
            ip: "203.0.113.7".to_string(),
            status_code: 200,
            content_type: Some("application/json".to_string()),
            content_length: Some(42),
            query_params: None,
            headers: sqlx::types::Json(HashMap::new()),
            body: Some("{}".to_string()),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&webhook).unwrap();
        assert_eq!(json["statusCode"], 200);
        assert_eq!(json["contentType"], "application/json");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("status_code").is_none());
    }
}
