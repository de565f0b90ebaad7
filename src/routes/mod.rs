pub mod analytics;
pub mod auth;
pub mod email;
pub mod forms;
pub mod public;
pub mod submissions;
pub mod webhooks;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Forms
        .route("/api/forms", get(forms::list).post(forms::create))
        .route(
            "/api/forms/{id}",
            get(forms::get).put(forms::update).delete(forms::delete),
        )
        .route("/api/forms/{id}/stats", get(forms::stats))
        // Submissions
        .route("/api/forms/{id}/submissions", get(submissions::list))
        .route(
            "/api/forms/{id}/submissions/export",
            get(submissions::export),
        )
        .route("/api/submissions", get(submissions::recent))
        // Webhooks
        .route(
            "/api/forms/{id}/webhooks",
            get(webhooks::list).post(webhooks::create),
        )
        .route("/api/webhooks/events", get(webhooks::events))
        .route(
            "/api/webhooks/{id}",
            put(webhooks::update).delete(webhooks::delete),
        )
        .route("/api/webhooks/{id}/test", post(webhooks::test))
        // Email
        .route("/api/email/invitations", post(email::send_invitations))
        // Analytics
        .route("/api/analytics/dashboard", get(analytics::dashboard))
        .route(
            "/api/analytics/dashboard/real-time",
            get(analytics::realtime),
        )
        .route("/api/analytics/timeline", get(analytics::timeline))
        .route("/api/analytics/forms/{id}", get(analytics::form_stats))
}

/// Unauthenticated form rendering and submission. Embedded forms are served
/// from arbitrary origins, so these routes are the only ones with open CORS.
pub fn public_routes() -> Router<SharedState> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/public/forms/{id}", get(public::get_form))
        .route("/api/public/forms/{id}/preview", get(public::preview))
        .route("/api/public/forms/{id}/submit", post(public::submit))
        .layer(cors)
}

pub fn auth_routes() -> Router<SharedState> {
    Router::new()
        .route("/auth/github", get(auth::github_login))
        .route("/auth/github/callback", get(auth::github_callback))
        .route("/auth/me", get(auth::me))
}
