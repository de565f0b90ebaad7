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
use crate::models::{Form, FormSummary};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct CreateForm {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub public: bool,
    #[serde(default = "empty_array")]
    pub questions: serde_json::Value,
    #[serde(default = "empty_array")]
    pub sections: serde_json::Value,
    #[serde(default = "empty_object")]
    pub settings: serde_json::Value,
}

#[derive(Deserialize)]
pub struct UpdateForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub public: Option<bool>,
    pub questions: Option<serde_json::Value>,
    pub sections: Option<serde_json::Value>,
    pub settings: Option<serde_json::Value>,
}

fn empty_array() -> serde_json::Value {
    json!([])
}

fn empty_object() -> serde_json::Value {
    json!({})
}

fn validate_title(title: &str) -> Result<(), AppError> {
    if title.trim().is_empty() {
        return Err(AppError::BadRequest("Title must not be empty".to_string()));
    }
    if title.len() > 200 {
        return Err(AppError::BadRequest(
            "Title must be at most 200 characters".to_string(),
        ));
    }
    Ok(())
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Vec<FormSummary>>, AppError> {
    let forms = db::forms::list_summaries(&state.pool, auth.user_id).await?;
    Ok(Json(forms))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<CreateForm>,
) -> Result<(StatusCode, Json<Form>), AppError> {
    validate_title(&req.title)?;

    let form = db::forms::create(
        &state.pool,
        auth.user_id,
        &db::forms::NewForm {
            title: req.title.trim(),
            description: req.description.as_deref(),
            public: req.public,
            questions: &req.questions,
            sections: &req.sections,
            settings: &req.settings,
        },
    )
    .await?;

    tracing::info!("Form {} created by {}", form.id, auth.username);

    Ok((StatusCode::CREATED, Json(form)))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Form>, AppError> {
    let form = db::forms::find_by_id(&state.pool, id, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Form not found".to_string()))?;
    Ok(Json(form))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateForm>,
) -> Result<Json<Form>, AppError> {
    if let Some(title) = &req.title {
        validate_title(title)?;
    }

    let form = db::forms::update(
        &state.pool,
        id,
        auth.user_id,
        &db::forms::FormChanges {
            title: req.title.as_deref().map(str::trim),
            description: req.description.as_deref(),
            public: req.public,
            questions: req.questions.as_ref(),
            sections: req.sections.as_ref(),
            settings: req.settings.as_ref(),
        },
    )
    .await?
    .ok_or_else(|| AppError::NotFound("Form not found".to_string()))?;

    dispatch::enqueue_event(
        &state.pool,
        form.id,
        events::FORM_UPDATED,
        json!({
            "id": form.id,
            "title": form.title,
            "public": form.public,
        }),
    )
    .await;

    Ok(Json(form))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let form = db::forms::find_by_id(&state.pool, id, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Form not found".to_string()))?;

    // Deleting the form cascades its webhooks, so the deletion notice has to
    // go out directly instead of through the queue. Capture targets first.
    let hooks = db::webhooks::list_subscribed(&state.pool, form.id, events::FORM_DELETED).await?;
    let targets: Vec<(String, Option<String>)> = hooks
        .iter()
        .map(|hook| {
            let secret = hook
                .secret
                .as_deref()
                .and_then(|s| crypto::decrypt(s, &state.config.encryption_key).ok());
            (hook.url.clone(), secret)
        })
        .collect();

    db::forms::delete(&state.pool, id, auth.user_id).await?;

    tracing::info!("Form {} deleted by {}", id, auth.username);

    if !targets.is_empty() {
        let payload = dispatch::build_payload(
            events::FORM_DELETED,
            form.id,
            json!({ "id": form.id, "title": form.title }),
        );
        let state = state.clone();
        tokio::spawn(async move {
            for (url, secret) in targets {
                let outcome = state
                    .dispatcher
                    .send(&url, &payload, secret.as_deref())
                    .await;
                if !outcome.success {
                    tracing::warn!(
                        "form.deleted notice to {url} failed: {}",
                        outcome.error.unwrap_or_default()
                    );
                }
            }
        });
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn stats(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let form = db::forms::find_by_id(&state.pool, id, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Form not found".to_string()))?;

    let conversion_rate = if form.view_count > 0 {
        (form.submission_count as f64 / form.view_count as f64) * 100.0
    } else {
        0.0
    };

    Ok(Json(json!({
        "form_id": form.id,
        "title": form.title,
        "submission_count": form.submission_count,
        "view_count": form.view_count,
        "conversion_rate": (conversion_rate * 10.0).round() / 10.0,
        "last_submission_at": form.last_submission_at,
        "created_at": form.created_at,
    })))
}
