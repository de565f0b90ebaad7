use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::github::GithubOAuth;
use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::email::SystemMailer;
use crate::rate_limit::SubmissionRateLimiter;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub github: GithubOAuth,
    pub dispatcher: Dispatcher,
    pub system_mailer: Option<Arc<SystemMailer>>,
    pub submission_limiter: SubmissionRateLimiter,
}
