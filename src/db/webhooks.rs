use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Webhook;

pub async fn create(
    pool: &PgPool,
    form_id: Uuid,
    url: &str,
    events: &serde_json::Value,
    secret: &[u8],
    active: bool,
) -> Result<Webhook, sqlx::Error> {
    sqlx::query_as::<_, Webhook>(
        "INSERT INTO webhooks (form_id, url, events, secret, active)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(form_id)
    .bind(url)
    .bind(events)
    .bind(secret)
    .bind(active)
    .fetch_one(pool)
    .await
}

pub async fn list_for_form(pool: &PgPool, form_id: Uuid) -> Result<Vec<Webhook>, sqlx::Error> {
    sqlx::query_as::<_, Webhook>(
        "SELECT * FROM webhooks WHERE form_id = $1 ORDER BY created_at DESC",
    )
    .bind(form_id)
    .fetch_all(pool)
    .await
}

/// Owner-scoped lookup through the owning form.
pub async fn find_by_id(
    pool: &PgPool,
    id: Uuid,
    owner_id: Uuid,
) -> Result<Option<Webhook>, sqlx::Error> {
    sqlx::query_as::<_, Webhook>(
        "SELECT w.* FROM webhooks w
         JOIN forms f ON w.form_id = f.id
         WHERE w.id = $1 AND f.owner_id = $2",
    )
    .bind(id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_id_unscoped(pool: &PgPool, id: Uuid) -> Result<Option<Webhook>, sqlx::Error> {
    sqlx::query_as::<_, Webhook>("SELECT * FROM webhooks WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Active webhooks on a form subscribed to the given event.
pub async fn list_subscribed(
    pool: &PgPool,
    form_id: Uuid,
    event: &str,
) -> Result<Vec<Webhook>, sqlx::Error> {
    sqlx::query_as::<_, Webhook>(
        "SELECT * FROM webhooks
         WHERE form_id = $1 AND active = true AND events @> $2",
    )
    .bind(form_id)
    .bind(serde_json::json!([event]))
    .fetch_all(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    owner_id: Uuid,
    url: Option<&str>,
    events: Option<&serde_json::Value>,
    active: Option<bool>,
) -> Result<Option<Webhook>, sqlx::Error> {
    sqlx::query_as::<_, Webhook>(
        "UPDATE webhooks w SET
             url = COALESCE($3, w.url),
             events = COALESCE($4, w.events),
             active = COALESCE($5, w.active)
         FROM forms f
         WHERE w.id = $1 AND w.form_id = f.id AND f.owner_id = $2
         RETURNING w.*",
    )
    .bind(id)
    .bind(owner_id)
    .bind(url)
    .bind(events)
    .bind(active)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid, owner_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM webhooks w USING forms f
         WHERE w.id = $1 AND w.form_id = f.id AND f.owner_id = $2",
    )
    .bind(id)
    .bind(owner_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Bump delivery stats: success resets the failure streak, failure extends it.
pub async fn record_delivery(pool: &PgPool, id: Uuid, success: bool) -> Result<(), sqlx::Error> {
    if success {
        sqlx::query(
            "UPDATE webhooks SET last_triggered_at = now(), failure_count = 0 WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
    } else {
        sqlx::query(
            "UPDATE webhooks SET last_triggered_at = now(), failure_count = failure_count + 1
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
    }
    Ok(())
}
