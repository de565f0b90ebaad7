use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::state::SharedState;

const MAX_RECIPIENTS: usize = 50;

#[derive(Deserialize)]
pub struct InvitationRequest {
    pub form_id: Uuid,
    pub emails: Vec<String>,
    pub message: Option<String>,
}

pub async fn send_invitations(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<InvitationRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Some(mailer) = state.system_mailer.clone() else {
        return Err(AppError::BadRequest(
            "Email delivery is not configured".to_string(),
        ));
    };

    if req.emails.is_empty() {
        return Err(AppError::BadRequest(
            "At least one recipient is required".to_string(),
        ));
    }
    if req.emails.len() > MAX_RECIPIENTS {
        return Err(AppError::BadRequest(format!(
            "At most {MAX_RECIPIENTS} recipients per request"
        )));
    }

    let form = db::forms::find_by_id(&state.pool, req.form_id, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Form not found".to_string()))?;

    let base = state
        .config
        .frontend_url
        .as_deref()
        .unwrap_or(&state.config.base_url);
    let form_url = format!("{base}/f/{}", form.id);

    let sender = db::users::find_by_id(&state.pool, auth.user_id)
        .await?
        .and_then(|u| u.name)
        .unwrap_or_else(|| auth.username.clone());

    let mut sent = 0;
    let mut results = Vec::with_capacity(req.emails.len());
    for email in &req.emails {
        let outcome = mailer
            .send_form_invitation(
                email,
                &form.title,
                &form_url,
                &sender,
                req.message.as_deref(),
            )
            .await;

        match outcome {
            Ok(()) => {
                sent += 1;
                results.push(json!({ "email": email, "sent": true }));
            }
            Err(e) => {
                tracing::warn!("Invitation to {email} failed: {e}");
                results.push(json!({ "email": email, "sent": false, "error": e }));
            }
        }
    }

    Ok(Json(json!({
        "sent": sent,
        "failed": req.emails.len() - sent,
        "results": results,
    })))
}
