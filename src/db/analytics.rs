use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DayCount {
    pub day: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TopForm {
    pub id: Uuid,
    pub title: String,
    pub submission_count: i64,
    pub view_count: i64,
}

pub async fn record_event(
    pool: &PgPool,
    form_id: Uuid,
    event_type: &str,
    user_agent: Option<&str>,
    referrer: Option<&str>,
    ip_hash: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO analytics_events (form_id, event_type, user_agent, referrer, ip_hash)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(form_id)
    .bind(event_type)
    .bind(user_agent)
    .bind(referrer)
    .bind(ip_hash)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn total_forms(pool: &PgPool, owner_id: Uuid) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM forms WHERE owner_id = $1")
        .bind(owner_id)
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

pub async fn total_submissions(pool: &PgPool, owner_id: Uuid) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM submissions s
         JOIN forms f ON s.form_id = f.id WHERE f.owner_id = $1",
    )
    .bind(owner_id)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

/// Submissions in the current calendar month.
pub async fn month_submissions(pool: &PgPool, owner_id: Uuid) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM submissions s
         JOIN forms f ON s.form_id = f.id
         WHERE f.owner_id = $1 AND s.submitted_at >= date_trunc('month', now())",
    )
    .bind(owner_id)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

/// Submissions in the previous calendar month.
pub async fn last_month_submissions(pool: &PgPool, owner_id: Uuid) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM submissions s
         JOIN forms f ON s.form_id = f.id
         WHERE f.owner_id = $1
           AND s.submitted_at >= date_trunc('month', now()) - interval '1 month'
           AND s.submitted_at < date_trunc('month', now())",
    )
    .bind(owner_id)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

pub async fn top_forms(
    pool: &PgPool,
    owner_id: Uuid,
    limit: i64,
) -> Result<Vec<TopForm>, sqlx::Error> {
    sqlx::query_as::<_, TopForm>(
        "SELECT id, title, submission_count, view_count FROM forms
         WHERE owner_id = $1 ORDER BY submission_count DESC LIMIT $2",
    )
    .bind(owner_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Daily submission counts over the trailing window, across all owned forms.
pub async fn submissions_timeline(
    pool: &PgPool,
    owner_id: Uuid,
    days: i64,
) -> Result<Vec<DayCount>, sqlx::Error> {
    sqlx::query_as::<_, DayCount>(
        "SELECT date_trunc('day', s.submitted_at)::date AS day, COUNT(*) AS count
         FROM submissions s
         JOIN forms f ON s.form_id = f.id
         WHERE f.owner_id = $1
           AND s.submitted_at >= now() - make_interval(days => $2::int)
         GROUP BY day ORDER BY day",
    )
    .bind(owner_id)
    .bind(days)
    .fetch_all(pool)
    .await
}

/// Daily submission counts for a single form.
pub async fn form_timeline(
    pool: &PgPool,
    form_id: Uuid,
    days: i64,
) -> Result<Vec<DayCount>, sqlx::Error> {
    sqlx::query_as::<_, DayCount>(
        "SELECT date_trunc('day', submitted_at)::date AS day, COUNT(*) AS count
         FROM submissions
         WHERE form_id = $1 AND submitted_at >= now() - make_interval(days => $2::int)
         GROUP BY day ORDER BY day",
    )
    .bind(form_id)
    .bind(days)
    .fetch_all(pool)
    .await
}

pub async fn form_event_count(
    pool: &PgPool,
    form_id: Uuid,
    event_type: &str,
) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM analytics_events WHERE form_id = $1 AND event_type = $2",
    )
    .bind(form_id)
    .bind(event_type)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}
