use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored webhook. The signing secret is AES-256-GCM encrypted at rest and
/// never serialized back to clients.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Webhook {
    pub id: Uuid,
    pub form_id: Uuid,
    pub url: String,
    pub events: serde_json::Value,
    #[serde(skip_serializing)]
    pub secret: Option<Vec<u8>>,
    pub active: bool,
    pub failure_count: i32,
    pub last_triggered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
