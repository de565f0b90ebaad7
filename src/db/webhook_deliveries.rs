use sqlx::PgPool;
use uuid::Uuid;

use crate::models::WebhookDelivery;

pub async fn enqueue(
    pool: &PgPool,
    webhook_id: Uuid,
    event: &str,
    payload: &serde_json::Value,
) -> Result<WebhookDelivery, sqlx::Error> {
    sqlx::query_as::<_, WebhookDelivery>(
        "INSERT INTO webhook_deliveries (webhook_id, event, payload)
         VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(webhook_id)
    .bind(event)
    .bind(payload)
    .fetch_one(pool)
    .await
}

/// Atomically claim the next ready delivery using SELECT FOR UPDATE SKIP LOCKED.
pub async fn claim_next(pool: &PgPool) -> Result<Option<WebhookDelivery>, sqlx::Error> {
    sqlx::query_as::<_, WebhookDelivery>(
        "UPDATE webhook_deliveries SET status = 'processing', attempts = attempts + 1
         WHERE id = (
             SELECT id FROM webhook_deliveries
             WHERE status IN ('pending', 'failed')
               AND attempts < max_attempts
               AND next_attempt_at <= now()
             ORDER BY next_attempt_at ASC
             LIMIT 1
             FOR UPDATE SKIP LOCKED
         )
         RETURNING *",
    )
    .fetch_optional(pool)
    .await
}

pub async fn mark_completed(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE webhook_deliveries SET status = 'completed', completed_at = now()
         WHERE id = $1",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Mark as failed with exponential backoff. If max attempts reached, stays 'failed' permanently.
pub async fn mark_failed(
    pool: &PgPool,
    id: Uuid,
    attempts: i32,
    max_attempts: i32,
    error: &str,
) -> Result<(), sqlx::Error> {
    if attempts >= max_attempts {
        sqlx::query(
            "UPDATE webhook_deliveries SET status = 'failed', last_error = $2, completed_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .bind(error)
        .execute(pool)
        .await?;
    } else {
        // Retry with exponential backoff: 2^attempts seconds
        let backoff_secs = 2_i64.pow(attempts as u32);
        sqlx::query(
            "UPDATE webhook_deliveries
             SET status = 'failed',
                 last_error = $2,
                 next_attempt_at = now() + make_interval(secs => $3::double precision)
             WHERE id = $1",
        )
        .bind(id)
        .bind(error)
        .bind(backoff_secs as f64)
        .execute(pool)
        .await?;
    }
    Ok(())
}
