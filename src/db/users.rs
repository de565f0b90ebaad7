use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::github::GithubProfile;
use crate::models::User;

/// Insert the user on first login, refresh profile fields on every subsequent
/// one. Keyed by the immutable GitHub account id, not the username.
pub async fn upsert_from_github(
    pool: &PgPool,
    profile: &GithubProfile,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (github_id, username, name, email, avatar_url, github_url)
         VALUES ($1, $2, $3, $4, $5, $6)
         ON CONFLICT (github_id) DO UPDATE SET
             username = EXCLUDED.username,
             name = EXCLUDED.name,
             email = EXCLUDED.email,
             avatar_url = EXCLUDED.avatar_url,
             updated_at = now(),
             last_login_at = now()
         RETURNING *",
    )
    .bind(profile.id)
    .bind(&profile.login)
    .bind(&profile.name)
    .bind(&profile.email)
    .bind(&profile.avatar_url)
    .bind(&profile.html_url)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}
