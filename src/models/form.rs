use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Form {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub public: bool,
    pub questions: serde_json::Value,
    pub sections: serde_json::Value,
    pub settings: serde_json::Value,
    pub submission_count: i64,
    pub view_count: i64,
    pub last_submission_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing shape: no question/section payloads.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct FormSummary {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub public: bool,
    pub submission_count: i64,
    pub view_count: i64,
    pub last_submission_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
