use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::crypto;
use crate::db;
use crate::dispatch::{self, events};
use crate::error::AppError;
use crate::models::Webhook;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct CreateWebhook {
    pub url: String,
    #[serde(default = "default_events")]
    pub events: Vec<String>,
    pub secret: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

#[derive(Deserialize)]
pub struct UpdateWebhook {
    pub url: Option<String>,
    pub events: Option<Vec<String>>,
    pub active: Option<bool>,
}

fn default_events() -> Vec<String> {
    vec![events::SUBMISSION_CREATED.to_string()]
}

fn default_active() -> bool {
    true
}

fn validate_url(url: &str) -> Result<(), AppError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(AppError::BadRequest(
            "Webhook URL must start with http:// or https://".to_string(),
        ));
    }
    Ok(())
}

fn validate_events(requested: &[String]) -> Result<(), AppError> {
    if requested.is_empty() {
        return Err(AppError::BadRequest(
            "At least one event is required".to_string(),
        ));
    }
    for event in requested {
        if !events::ALL.iter().any(|(name, _)| *name == event.as_str()) {
            return Err(AppError::BadRequest(format!("Unknown event: {event}")));
        }
    }
    Ok(())
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(form_id): Path<Uuid>,
    Json(req): Json<CreateWebhook>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    db::forms::find_by_id(&state.pool, form_id, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Form not found".to_string()))?;

    validate_url(&req.url)?;
    validate_events(&req.events)?;

    let secret = req.secret.unwrap_or_else(dispatch::generate_secret);
    let encrypted = crypto::encrypt(&secret, &state.config.encryption_key)
        .map_err(AppError::Internal)?;

    let events_json = json!(req.events);
    let webhook = db::webhooks::create(
        &state.pool,
        form_id,
        &req.url,
        &events_json,
        &encrypted,
        req.active,
    )
    .await?;

    tracing::info!("Webhook {} created on form {form_id}", webhook.id);

    // The signing secret is shown exactly once, at creation.
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": webhook.id,
            "form_id": webhook.form_id,
            "url": webhook.url,
            "events": webhook.events,
            "active": webhook.active,
            "secret": secret,
            "created_at": webhook.created_at,
        })),
    ))
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(form_id): Path<Uuid>,
) -> Result<Json<Vec<Webhook>>, AppError> {
    db::forms::find_by_id(&state.pool, form_id, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Form not found".to_string()))?;

    let webhooks = db::webhooks::list_for_form(&state.pool, form_id).await?;
    Ok(Json(webhooks))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateWebhook>,
) -> Result<Json<Webhook>, AppError> {
    if let Some(url) = &req.url {
        validate_url(url)?;
    }
    if let Some(requested) = &req.events {
        validate_events(requested)?;
    }

    let events_json = req.events.map(|e| json!(e));
    let webhook = db::webhooks::update(
        &state.pool,
        id,
        auth.user_id,
        req.url.as_deref(),
        events_json.as_ref(),
        req.active,
    )
    .await?
    .ok_or_else(|| AppError::NotFound("Webhook not found".to_string()))?;

    Ok(Json(webhook))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let deleted = db::webhooks::delete(&state.pool, id, auth.user_id).await?;
    if !deleted {
        return Err(AppError::NotFound("Webhook not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Fire a synchronous test delivery and report the outcome.
pub async fn test(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let webhook = db::webhooks::find_by_id(&state.pool, id, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Webhook not found".to_string()))?;

    let secret = match webhook.secret.as_deref() {
        Some(encrypted) => Some(
            crypto::decrypt(encrypted, &state.config.encryption_key)
                .map_err(AppError::Internal)?,
        ),
        None => None,
    };

    let payload = dispatch::build_payload(
        "webhook.test",
        webhook.form_id,
        json!({
            "message": "Test delivery",
            "webhook_id": webhook.id,
        }),
    );

    let outcome = state
        .dispatcher
        .send(&webhook.url, &payload, secret.as_deref())
        .await;

    db::webhooks::record_delivery(&state.pool, webhook.id, outcome.success).await?;

    Ok(Json(json!({
        "success": outcome.success,
        "status_code": outcome.status_code,
        "response_time_ms": outcome.response_time_ms,
        "error": outcome.error,
    })))
}

/// Events a webhook can subscribe to, plus how deliveries are signed.
pub async fn events(_auth: AuthUser) -> Json<serde_json::Value> {
    let listed: Vec<serde_json::Value> = events::ALL
        .iter()
        .map(|(name, description)| json!({ "name": name, "description": description }))
        .collect();

    Json(json!({
        "events": listed,
        "signature": {
            "header": "X-Formerr-Signature",
            "algorithm": "HMAC-SHA256",
            "format": "sha256=<hex digest of the raw request body>",
        },
    }))
}
