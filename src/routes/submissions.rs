use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::models::Submission;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Deserialize)]
pub struct ExportParams {
    pub format: Option<String>,
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(form_id): Path<Uuid>,
    Query(params): Query<ListParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    db::forms::find_by_id(&state.pool, form_id, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Form not found".to_string()))?;

    let page = params.page.unwrap_or(1).max(1);
    let per_page = params.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let submissions =
        db::submissions::list_for_form(&state.pool, form_id, auth.user_id, per_page, offset)
            .await?;
    let total = db::submissions::count_for_form(&state.pool, form_id, auth.user_id).await?;

    Ok(Json(serde_json::json!({
        "submissions": submissions,
        "total": total,
        "page": page,
        "per_page": per_page,
        "total_pages": (total as f64 / per_page as f64).ceil() as i64,
    })))
}

/// Recent submissions across every form the caller owns.
pub async fn recent(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(params): Query<ListParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let page = params.page.unwrap_or(1).max(1);
    let per_page = params.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let submissions =
        db::submissions::list_for_owner(&state.pool, auth.user_id, per_page, offset).await?;

    Ok(Json(serde_json::json!({
        "submissions": submissions,
        "page": page,
        "per_page": per_page,
    })))
}

pub async fn export(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(form_id): Path<Uuid>,
    Query(params): Query<ExportParams>,
) -> Result<impl IntoResponse, AppError> {
    db::forms::find_by_id(&state.pool, form_id, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Form not found".to_string()))?;

    let submissions =
        db::submissions::list_for_export(&state.pool, form_id, auth.user_id).await?;

    match params.format.as_deref().unwrap_or("json") {
        "csv" => {
            let csv = export_csv(&submissions);
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv"),
                    (
                        header::CONTENT_DISPOSITION,
                        "attachment; filename=\"submissions.csv\"",
                    ),
                ],
                csv,
            )
                .into_response())
        }
        _ => Ok(Json(submissions).into_response()),
    }
}

fn export_csv(submissions: &[Submission]) -> String {
    use std::fmt::Write;
    let mut csv = String::new();

    // One column per question id seen across the export
    let mut question_ids: Vec<String> = Vec::new();
    for sub in submissions {
        if let Some(answers) = sub.answers.as_array() {
            for answer in answers {
                if let Some(id) = answer.get("question_id").and_then(|v| v.as_str()) {
                    if !question_ids.iter().any(|q| q == id) {
                        question_ids.push(id.to_string());
                    }
                }
            }
        }
    }

    let _ = write!(csv, "id,submitted_at,submitter_name,submitter_email");
    for id in &question_ids {
        let _ = write!(csv, ",{}", csv_escape(id));
    }
    let _ = writeln!(csv);

    for sub in submissions {
        let _ = write!(
            csv,
            "{},{},{},{}",
            sub.id,
            sub.submitted_at.to_rfc3339(),
            csv_escape(sub.submitter_name.as_deref().unwrap_or("")),
            csv_escape(sub.submitter_email.as_deref().unwrap_or("")),
        );
        for id in &question_ids {
            let val = answer_value(&sub.answers, id);
            let _ = write!(csv, ",{val}");
        }
        let _ = writeln!(csv);
    }

    csv
}

fn answer_value(answers: &serde_json::Value, question_id: &str) -> String {
    let Some(list) = answers.as_array() else {
        return String::new();
    };

    list.iter()
        .find(|a| a.get("question_id").and_then(|v| v.as_str()) == Some(question_id))
        .and_then(|a| a.get("value"))
        .map(|v| match v {
            serde_json::Value::String(s) => csv_escape(s),
            other => csv_escape(&other.to_string()),
        })
        .unwrap_or_default()
}

fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
