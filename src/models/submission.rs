use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub form_id: Uuid,
    pub answers: serde_json::Value,
    pub submitter_name: Option<String>,
    pub submitter_email: Option<String>,
    pub submitter_ip_hash: Option<String>,
    pub submitter_user_id: Option<Uuid>,
    pub submitted_at: DateTime<Utc>,
}
