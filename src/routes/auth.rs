use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use serde_json::json;

use crate::auth::extractor::AuthUser;
use crate::auth::github;
use crate::auth::jwt::{self, Claims};
use crate::db;
use crate::error::AppError;
use crate::state::SharedState;

const STATE_COOKIE: &str = "oauth_state";

/// Start the GitHub OAuth flow: remember a random state in a short-lived
/// cookie and send the browser to GitHub's consent page.
pub async fn github_login(State(state): State<SharedState>, jar: CookieJar) -> impl IntoResponse {
    let oauth_state = github::generate_state();
    let url = state
        .github
        .authorize_url(&state.config.github_redirect_uri(), &oauth_state);

    let cookie = Cookie::build((STATE_COOKIE, oauth_state))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::minutes(10))
        .build();

    (jar.add(cookie), Redirect::temporary(&url))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    pub code: String,
    pub state: String,
}

pub async fn github_callback(
    State(state): State<SharedState>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<Response, AppError> {
    let expected = jar
        .get(STATE_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| AppError::Unauthorized("Missing OAuth state cookie".to_string()))?;

    if params.state != expected {
        return Err(AppError::Unauthorized(
            "OAuth state mismatch".to_string(),
        ));
    }

    let jar = jar.remove(Cookie::build((STATE_COOKIE, "")).path("/").build());

    let access_token = state
        .github
        .exchange_code(&params.code, &state.config.github_redirect_uri())
        .await
        .map_err(AppError::Unauthorized)?;

    let profile = state
        .github
        .fetch_profile(&access_token)
        .await
        .map_err(AppError::Unauthorized)?;

    let user = db::users::upsert_from_github(&state.pool, &profile).await?;

    tracing::info!("User {} logged in via GitHub", user.username);

    let claims = Claims::new(user.id, user.username.clone());
    let token = jwt::encode_token(&claims, &state.config.jwt_secret)
        .map_err(AppError::Internal)?;

    // Browser flows land back on the frontend; API-only deployments get JSON.
    let response = match &state.config.frontend_url {
        Some(frontend) => {
            Redirect::temporary(&format!("{frontend}/auth/callback#token={token}"))
                .into_response()
        }
        None => Json(json!({
            "access_token": token,
            "token_type": "bearer",
            "user": user,
        }))
        .into_response(),
    };

    Ok((jar, response).into_response())
}

pub async fn me(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user = db::users::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))?;

    Ok(Json(json!({ "user": user })))
}
