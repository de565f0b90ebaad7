use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::extractor::OptionalAuthUser;
use crate::db;
use crate::dispatch::{self, events};
use crate::error::AppError;
use crate::models::Form;
use crate::state::SharedState;
use crate::submission::{answers, metadata};

const DEFAULT_RATE_LIMIT: u32 = 10;
const DEFAULT_RATE_WINDOW_SECS: u64 = 60;

#[derive(Deserialize)]
pub struct SubmitRequest {
    pub answers: Vec<answers::Answer>,
    pub submitter_name: Option<String>,
    pub submitter_email: Option<String>,
}

/// Fetch a public form for rendering. Counts a view.
pub async fn get_form(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    let form = db::forms::find_public(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Form not found".to_string()))?;

    record_event(&state, &form, "view", &headers, peer).await;

    if let Err(e) = db::forms::record_view(&state.pool, form.id).await {
        tracing::warn!("Failed to bump view count for form {}: {e}", form.id);
    }

    Ok(Json(json!({
        "id": form.id,
        "title": form.title,
        "description": form.description,
        "questions": form.questions,
        "sections": form.sections,
        "settings": form.settings,
    })))
}

/// Preview a public form for editors and embeds. Does not count a view.
pub async fn preview(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let form = db::forms::find_public(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Form not found".to_string()))?;

    let total_questions = form.questions.as_array().map(|q| q.len()).unwrap_or(0);

    Ok(Json(json!({
        "id": form.id,
        "title": form.title,
        "description": form.description,
        "questions": form.questions,
        "sections": form.sections,
        "settings": form.settings,
        "preview": true,
        "meta": {
            "total_questions": total_questions,
            "created_at": form.created_at,
        },
    })))
}

pub async fn submit(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    OptionalAuthUser(auth): OptionalAuthUser,
    Json(req): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let form = db::forms::find_public(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Form not found".to_string()))?;

    let require_login = form
        .settings
        .get("require_login")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    if require_login && auth.is_none() {
        return Err(AppError::Unauthorized(
            "This form requires you to be logged in".to_string(),
        ));
    }

    let ip = metadata::client_ip(&headers, Some(peer.ip()), &state.config.trusted_proxies);
    let (limit, window_secs) = rate_limit_settings(&form);
    if let Err(retry_after) = state.submission_limiter.check(form.id, ip, limit, window_secs) {
        return Err(AppError::RateLimited(format!(
            "Too many submissions, try again in {retry_after} seconds"
        )));
    }

    let missing = answers::missing_required(&form.questions, &req.answers);
    if !missing.is_empty() {
        return Err(AppError::BadRequest(format!(
            "Missing required answers: {}",
            missing.join(", ")
        )));
    }

    let answers_json = serde_json::to_value(&req.answers)
        .map_err(|e| AppError::Internal(format!("Failed to serialize answers: {e}")))?;
    let ip_hash = metadata::hash_ip(ip);

    let submission = db::submissions::create(
        &state.pool,
        form.id,
        &db::submissions::NewSubmission {
            answers: &answers_json,
            submitter_name: req.submitter_name.as_deref(),
            submitter_email: req.submitter_email.as_deref(),
            submitter_ip_hash: Some(&ip_hash),
            submitter_user_id: auth.as_ref().map(|a| a.user_id),
        },
    )
    .await?;

    db::forms::record_submission(&state.pool, form.id).await?;
    record_event(&state, &form, "submit", &headers, peer).await;

    dispatch::enqueue_event(
        &state.pool,
        form.id,
        events::SUBMISSION_CREATED,
        json!({
            "submission_id": submission.id,
            "form_title": form.title,
            "submitter_name": submission.submitter_name,
            "answers": submission.answers,
        }),
    )
    .await;

    notify_owner(&state, &form, submission.submitter_name.clone());

    let thank_you = form
        .settings
        .get("thank_you_message")
        .and_then(|v| v.as_str())
        .unwrap_or("Thanks for your submission!");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": submission.id,
            "message": thank_you,
            "redirect_url": form.settings.get("redirect_url").and_then(|v| v.as_str()),
        })),
    ))
}

fn rate_limit_settings(form: &Form) -> (u32, u64) {
    let rl = form.settings.get("rate_limit");
    let limit = rl
        .and_then(|v| v.get("limit"))
        .and_then(|v| v.as_u64())
        .map(|v| v as u32)
        .unwrap_or(DEFAULT_RATE_LIMIT);
    let window = rl
        .and_then(|v| v.get("window_secs"))
        .and_then(|v| v.as_u64())
        .unwrap_or(DEFAULT_RATE_WINDOW_SECS);
    (limit.max(1), window.max(1))
}

async fn record_event(
    state: &SharedState,
    form: &Form,
    event_type: &str,
    headers: &HeaderMap,
    peer: SocketAddr,
) {
    let ip = metadata::client_ip(headers, Some(peer.ip()), &state.config.trusted_proxies);
    let result = db::analytics::record_event(
        &state.pool,
        form.id,
        event_type,
        metadata::user_agent(headers).as_deref(),
        metadata::referrer(headers).as_deref(),
        Some(&metadata::hash_ip(ip)),
    )
    .await;

    if let Err(e) = result {
        tracing::warn!("Failed to record {event_type} event for form {}: {e}", form.id);
    }
}

/// Email the owner about a new submission, unless the form opts out.
fn notify_owner(state: &SharedState, form: &Form, submitter_name: Option<String>) {
    let Some(mailer) = state.system_mailer.clone() else {
        return;
    };

    let notifications_on = form
        .settings
        .get("email_notifications")
        .and_then(|v| v.as_bool())
        .unwrap_or(true);
    if !notifications_on {
        return;
    }

    let pool = state.pool.clone();
    let owner_id = form.owner_id;
    let form_title = form.title.clone();
    let submission_count = form.submission_count + 1;

    tokio::spawn(async move {
        let owner = match db::users::find_by_id(&pool, owner_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!("Failed to load owner {owner_id}: {e}");
                return;
            }
        };

        let Some(email) = owner.email else {
            return;
        };

        if let Err(e) = mailer
            .send_submission_notification(
                &email,
                &form_title,
                submitter_name.as_deref(),
                submission_count,
            )
            .await
        {
            tracing::warn!("Submission notification to {email} failed: {e}");
        }
    });
}
