use chrono::Utc;
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;

/// Events webhooks can subscribe to.
pub mod events {
    pub const SUBMISSION_CREATED: &str = "submission.created";
    pub const FORM_UPDATED: &str = "form.updated";
    pub const FORM_DELETED: &str = "form.deleted";

    pub const ALL: [(&str, &str); 3] = [
        (SUBMISSION_CREATED, "Fired when a new submission is stored"),
        (FORM_UPDATED, "Fired when the form definition changes"),
        (FORM_DELETED, "Fired when the form is deleted"),
    ];
}

pub const SOURCE: &str = "formerr";
pub const USER_AGENT: &str = "Formerr-Webhooks/1.0";

#[derive(Debug)]
pub struct DeliveryOutcome {
    pub success: bool,
    pub status_code: Option<u16>,
    pub response_time_ms: Option<u64>,
    pub error: Option<String>,
}

/// Generate a webhook signing secret (`whsec_` + 32 hex chars).
pub fn generate_secret() -> String {
    let bytes: [u8; 16] = rand::random();
    format!("whsec_{}", hex::encode(bytes))
}

/// HMAC-SHA256 signature over the exact request body, GitHub-style prefix.
pub fn sign(body: &str, secret: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(body.as_bytes());
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

/// Delivery envelope shared by live and test deliveries.
pub fn build_payload(event: &str, form_id: Uuid, data: serde_json::Value) -> serde_json::Value {
    json!({
        "event": event,
        "timestamp": Utc::now().to_rfc3339(),
        "form_id": form_id,
        "data": data,
        "delivery_id": Uuid::now_v7(),
        "source": SOURCE,
    })
}

/// Queue one delivery per active webhook on the form subscribed to `event`.
/// Failures are logged, never surfaced to the request that triggered them.
pub async fn enqueue_event(pool: &PgPool, form_id: Uuid, event: &str, data: serde_json::Value) {
    let webhooks = match db::webhooks::list_subscribed(pool, form_id, event).await {
        Ok(hooks) => hooks,
        Err(e) => {
            tracing::error!("Failed to load webhooks for form {form_id}: {e}");
            return;
        }
    };

    for webhook in &webhooks {
        let payload = build_payload(event, form_id, data.clone());
        if let Err(e) = db::webhook_deliveries::enqueue(pool, webhook.id, event, &payload).await {
            tracing::error!("Failed to enqueue delivery for webhook {}: {e}", webhook.id);
        }
    }
}

/// Outbound HTTP sender for webhook deliveries.
pub struct Dispatcher {
    client: reqwest::Client,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .user_agent(USER_AGENT)
                .build()
                .expect("Failed to build reqwest client"),
        }
    }

    /// POST the payload to the target URL with signing headers.
    /// 2xx counts as delivered; anything else is a failure.
    pub async fn send(
        &self,
        url: &str,
        payload: &serde_json::Value,
        secret: Option<&str>,
    ) -> DeliveryOutcome {
        let body = payload.to_string();

        let event = payload["event"].as_str().unwrap_or("unknown");
        let delivery_id = payload["delivery_id"].as_str().unwrap_or("");
        let timestamp = payload["timestamp"].as_str().unwrap_or("");

        let mut req = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header("X-Formerr-Event", event)
            .header("X-Formerr-Delivery", delivery_id)
            .header("X-Formerr-Timestamp", timestamp);

        if let Some(secret) = secret {
            req = req.header("X-Formerr-Signature", sign(&body, secret));
        }

        let started = std::time::Instant::now();
        match req.body(body).send().await {
            Ok(resp) => {
                let status = resp.status().as_u16();
                DeliveryOutcome {
                    success: (200..300).contains(&status),
                    status_code: Some(status),
                    response_time_ms: Some(started.elapsed().as_millis() as u64),
                    error: if (200..300).contains(&status) {
                        None
                    } else {
                        Some(format!("Endpoint returned {status}"))
                    },
                }
            }
            Err(e) => DeliveryOutcome {
                success: false,
                status_code: None,
                response_time_ms: Some(started.elapsed().as_millis() as u64),
                error: Some(if e.is_timeout() {
                    "timeout".to_string()
                } else {
                    format!("Request failed: {e}")
                }),
            },
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_matches_known_vector() {
        // Computed with: echo -n '{"a":1}' | openssl dgst -sha256 -hmac "secret"
        let sig = sign(r#"{"a":1}"#, "secret");
        assert_eq!(
            sig,
            "sha256=aa9e2e3575f5d7098b6caccd790888c36d5fdb63342a73bada2d6a51747a8494"
        );
    }

    #[test]
    fn payload_envelope_fields() {
        let form_id = Uuid::now_v7();
        let payload = build_payload(events::SUBMISSION_CREATED, form_id, json!({"x": 1}));
        assert_eq!(payload["event"], events::SUBMISSION_CREATED);
        assert_eq!(payload["source"], SOURCE);
        assert!(payload["delivery_id"].is_string());
        assert_eq!(payload["data"]["x"], 1);
    }

    #[test]
    fn generated_secret_has_prefix() {
        let secret = generate_secret();
        assert!(secret.starts_with("whsec_"));
        assert_eq!(secret.len(), 6 + 32);
    }
}
