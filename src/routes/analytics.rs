use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct TimelineParams {
    pub days: Option<i64>,
}

pub async fn dashboard(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let total_forms = db::analytics::total_forms(&state.pool, auth.user_id).await?;
    let total_submissions = db::analytics::total_submissions(&state.pool, auth.user_id).await?;
    let this_month = db::analytics::month_submissions(&state.pool, auth.user_id).await?;
    let last_month = db::analytics::last_month_submissions(&state.pool, auth.user_id).await?;
    let top_forms = db::analytics::top_forms(&state.pool, auth.user_id, 5).await?;

    let growth_rate = if last_month > 0 {
        let raw = (this_month - last_month) as f64 / last_month as f64 * 100.0;
        (raw * 10.0).round() / 10.0
    } else {
        0.0
    };

    let top: Vec<serde_json::Value> = top_forms
        .iter()
        .map(|f| {
            json!({
                "id": f.id,
                "title": f.title,
                "submission_count": f.submission_count,
                "view_count": f.view_count,
            })
        })
        .collect();

    Ok(Json(json!({
        "total_forms": total_forms,
        "total_submissions": total_submissions,
        "submissions_this_month": this_month,
        "submissions_last_month": last_month,
        "growth_rate": growth_rate,
        "top_forms": top,
    })))
}

/// Live dashboard snapshot: last-24h activity plus current totals.
pub async fn realtime(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let last_24h = db::analytics::submissions_timeline(&state.pool, auth.user_id, 1).await?;
    let total_forms = db::analytics::total_forms(&state.pool, auth.user_id).await?;
    let total_submissions = db::analytics::total_submissions(&state.pool, auth.user_id).await?;

    let timeline: Vec<serde_json::Value> = last_24h
        .iter()
        .map(|b| json!({ "date": b.day, "count": b.count }))
        .collect();

    Ok(Json(json!({
        "last_24h": timeline,
        "total_forms": total_forms,
        "total_submissions": total_submissions,
        "refresh_interval_secs": 30,
    })))
}

pub async fn timeline(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(params): Query<TimelineParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let days = params.days.unwrap_or(30).clamp(1, 365);
    let buckets = db::analytics::submissions_timeline(&state.pool, auth.user_id, days).await?;

    let timeline: Vec<serde_json::Value> = buckets
        .iter()
        .map(|b| json!({ "date": b.day, "count": b.count }))
        .collect();

    Ok(Json(json!({ "days": days, "timeline": timeline })))
}

pub async fn form_stats(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Query(params): Query<TimelineParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let form = db::forms::find_by_id(&state.pool, id, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Form not found".to_string()))?;

    let days = params.days.unwrap_or(30).clamp(1, 365);
    let buckets = db::analytics::form_timeline(&state.pool, form.id, days).await?;
    let views = db::analytics::form_event_count(&state.pool, form.id, "view").await?;

    let conversion_rate = if form.view_count > 0 {
        let raw = form.submission_count as f64 / form.view_count as f64 * 100.0;
        (raw * 10.0).round() / 10.0
    } else {
        0.0
    };

    let timeline: Vec<serde_json::Value> = buckets
        .iter()
        .map(|b| json!({ "date": b.day, "count": b.count }))
        .collect();

    Ok(Json(json!({
        "form_id": form.id,
        "title": form.title,
        "submission_count": form.submission_count,
        "view_count": form.view_count,
        "tracked_views": views,
        "conversion_rate": conversion_rate,
        "days": days,
        "timeline": timeline,
    })))
}
