use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Form, FormSummary};

pub struct NewForm<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub public: bool,
    pub questions: &'a serde_json::Value,
    pub sections: &'a serde_json::Value,
    pub settings: &'a serde_json::Value,
}

pub struct FormChanges<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub public: Option<bool>,
    pub questions: Option<&'a serde_json::Value>,
    pub sections: Option<&'a serde_json::Value>,
    pub settings: Option<&'a serde_json::Value>,
}

pub async fn create(pool: &PgPool, owner_id: Uuid, form: &NewForm<'_>) -> Result<Form, sqlx::Error> {
    sqlx::query_as::<_, Form>(
        "INSERT INTO forms (owner_id, title, description, public, questions, sections, settings)
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(owner_id)
    .bind(form.title)
    .bind(form.description)
    .bind(form.public)
    .bind(form.questions)
    .bind(form.sections)
    .bind(form.settings)
    .fetch_one(pool)
    .await
}

pub async fn list_summaries(pool: &PgPool, owner_id: Uuid) -> Result<Vec<FormSummary>, sqlx::Error> {
    sqlx::query_as::<_, FormSummary>(
        "SELECT id, title, description, public, submission_count, view_count,
                last_submission_at, created_at
         FROM forms WHERE owner_id = $1 ORDER BY created_at DESC",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(
    pool: &PgPool,
    id: Uuid,
    owner_id: Uuid,
) -> Result<Option<Form>, sqlx::Error> {
    sqlx::query_as::<_, Form>("SELECT * FROM forms WHERE id = $1 AND owner_id = $2")
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await
}

/// Unscoped public lookup — used by the unauthenticated endpoints.
pub async fn find_public(pool: &PgPool, id: Uuid) -> Result<Option<Form>, sqlx::Error> {
    sqlx::query_as::<_, Form>("SELECT * FROM forms WHERE id = $1 AND public = true")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    owner_id: Uuid,
    changes: &FormChanges<'_>,
) -> Result<Option<Form>, sqlx::Error> {
    sqlx::query_as::<_, Form>(
        "UPDATE forms SET
             title = COALESCE($3, title),
             description = COALESCE($4, description),
             public = COALESCE($5, public),
             questions = COALESCE($6, questions),
             sections = COALESCE($7, sections),
             settings = COALESCE($8, settings),
             updated_at = now()
         WHERE id = $1 AND owner_id = $2 RETURNING *",
    )
    .bind(id)
    .bind(owner_id)
    .bind(changes.title)
    .bind(changes.description)
    .bind(changes.public)
    .bind(changes.questions)
    .bind(changes.sections)
    .bind(changes.settings)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid, owner_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM forms WHERE id = $1 AND owner_id = $2")
        .bind(id)
        .bind(owner_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn record_submission(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE forms SET submission_count = submission_count + 1, last_submission_at = now()
         WHERE id = $1",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn record_view(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE forms SET view_count = view_count + 1 WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
