use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Submission;

pub struct NewSubmission<'a> {
    pub answers: &'a serde_json::Value,
    pub submitter_name: Option<&'a str>,
    pub submitter_email: Option<&'a str>,
    pub submitter_ip_hash: Option<&'a str>,
    pub submitter_user_id: Option<Uuid>,
}

pub async fn create(
    pool: &PgPool,
    form_id: Uuid,
    submission: &NewSubmission<'_>,
) -> Result<Submission, sqlx::Error> {
    sqlx::query_as::<_, Submission>(
        "INSERT INTO submissions
             (form_id, answers, submitter_name, submitter_email, submitter_ip_hash, submitter_user_id)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(form_id)
    .bind(submission.answers)
    .bind(submission.submitter_name)
    .bind(submission.submitter_email)
    .bind(submission.submitter_ip_hash)
    .bind(submission.submitter_user_id)
    .fetch_one(pool)
    .await
}

/// Owner-scoped listing for a single form, newest first.
pub async fn list_for_form(
    pool: &PgPool,
    form_id: Uuid,
    owner_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(
        "SELECT s.* FROM submissions s
         JOIN forms f ON s.form_id = f.id
         WHERE s.form_id = $1 AND f.owner_id = $2
         ORDER BY s.submitted_at DESC LIMIT $3 OFFSET $4",
    )
    .bind(form_id)
    .bind(owner_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

/// Recent submissions across every form the user owns.
pub async fn list_for_owner(
    pool: &PgPool,
    owner_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(
        "SELECT s.* FROM submissions s
         JOIN forms f ON s.form_id = f.id
         WHERE f.owner_id = $1
         ORDER BY s.submitted_at DESC LIMIT $2 OFFSET $3",
    )
    .bind(owner_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count_for_form(
    pool: &PgPool,
    form_id: Uuid,
    owner_id: Uuid,
) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM submissions s
         JOIN forms f ON s.form_id = f.id
         WHERE s.form_id = $1 AND f.owner_id = $2",
    )
    .bind(form_id)
    .bind(owner_id)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

pub async fn list_for_export(
    pool: &PgPool,
    form_id: Uuid,
    owner_id: Uuid,
) -> Result<Vec<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(
        "SELECT s.* FROM submissions s
         JOIN forms f ON s.form_id = f.id
         WHERE s.form_id = $1 AND f.owner_id = $2
         ORDER BY s.submitted_at DESC",
    )
    .bind(form_id)
    .bind(owner_id)
    .fetch_all(pool)
    .await
}
