pub mod auth;
pub mod config;
pub mod crypto;
pub mod db;
pub mod dispatch;
pub mod email;
pub mod error;
pub mod models;
pub mod rate_limit;
pub mod routes;
pub mod state;
pub mod submission;
pub mod worker;

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use serde_json::json;
use sqlx::PgPool;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::auth::github::GithubOAuth;
use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::email::SystemMailer;
use crate::rate_limit::SubmissionRateLimiter;
use crate::state::{AppState, SharedState};

pub fn build_app(pool: PgPool, config: Config) -> (Router, SharedState) {
    let github = GithubOAuth::new(
        config.github_client_id.clone(),
        config.github_client_secret.clone(),
    );

    let system_mailer = config.smtp.as_ref().and_then(|smtp| {
        match SystemMailer::new(smtp) {
            Ok(mailer) => {
                tracing::info!("System SMTP configured");
                Some(Arc::new(mailer))
            }
            Err(e) => {
                tracing::warn!("System SMTP not available: {e}");
                None
            }
        }
    });

    let max_body_size = config.max_body_size;

    let state: SharedState = Arc::new(AppState {
        pool,
        config,
        github,
        dispatcher: Dispatcher::new(),
        system_mailer,
        submission_limiter: SubmissionRateLimiter::new(),
    });

    // Periodic sweep of stale rate-limiter windows
    {
        let state = state.clone();
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(std::time::Duration::from_secs(300));
            loop {
                tick.tick().await;
                state
                    .submission_limiter
                    .cleanup(std::time::Duration::from_secs(3600));
            }
        });
    }

    let app = Router::new()
        .merge(routes::api_routes())
        .merge(routes::public_routes())
        .merge(routes::auth_routes())
        .route("/", axum::routing::get(root))
        .route("/health", axum::routing::get(health))
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state.clone());

    (app, state)
}

async fn root() -> axum::Json<serde_json::Value> {
    axum::Json(json!({
        "service": "formerr",
        "message": "Formerr API is running",
    }))
}

async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(json!({ "status": "ok" }))
}
