//! Video domain - DB queries for the videos table

use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres};

use crate::models::{PostVideoReq, Video};

/// Row shape consumed by in-process search ranking: the video text fields
/// plus the owner's display name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SearchRow {
    pub bv: String,
    pub title: String,
    pub description: String,
    pub owner_name: Option<String>,
}

/// Fetch a full video row by bv.
pub async fn get_video<'e, E>(executor: E, bv: &str) -> Result<Option<Video>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        SELECT bv, owner_mid, title, description, duration,
               commit_time, public_time, is_public, review_time
        FROM videos
        WHERE bv = $1
        "#,
    )
    .bind(bv)
    .fetch_optional(executor)
    .await
}

/// Insert a freshly posted video; always non-public until reviewed.
pub async fn insert_video<'e, E>(
    executor: E,
    bv: &str,
    owner_mid: i64,
    req: &PostVideoReq,
    public_time: DateTime<Utc>,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        r#"
        INSERT INTO videos (bv, owner_mid, title, description, duration,
                            commit_time, public_time, is_public)
        VALUES ($1, $2, $3, $4, $5, now(), $6, false)
        "#,
    )
    .bind(bv)
    .bind(owner_mid)
    .bind(&req.title)
    .bind(&req.description)
    .bind(req.duration)
    .bind(public_time)
    .execute(executor)
    .await?;
    Ok(())
}

/// Rewrite the mutable fields and force re-review (is_public back to false).
pub async fn update_video<'e, E>(
    executor: E,
    bv: &str,
    req: &PostVideoReq,
    public_time: DateTime<Utc>,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        r#"
        UPDATE videos
        SET title = $2, description = $3, public_time = $4,
            is_public = false, review_time = NULL
        WHERE bv = $1
        "#,
    )
    .bind(bv)
    .bind(&req.title)
    .bind(&req.description)
    .bind(public_time)
    .execute(executor)
    .await?;
    Ok(())
}

/// Publish a reviewed video and stamp the review time.
pub async fn mark_public<'e, E>(executor: E, bv: &str) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("UPDATE videos SET is_public = true, review_time = now() WHERE bv = $1")
        .bind(bv)
        .execute(executor)
        .await?;
    Ok(())
}

/// Delete the video row itself. Dependent rows must already be gone; the
/// service runs the full cascade inside one transaction.
pub async fn delete_video_row<'e, E>(executor: E, bv: &str) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("DELETE FROM videos WHERE bv = $1")
        .bind(bv)
        .execute(executor)
        .await?;
    Ok(())
}

/// All videos joined with their owner's display name, for search scoring.
/// Kept as a full scan on purpose; ranking happens in process.
pub async fn list_for_search<'e, E>(executor: E) -> Result<Vec<SearchRow>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        SELECT v.bv, v.title, v.description, u.name AS owner_name
        FROM videos v
        JOIN users u ON v.owner_mid = u.mid
        "#,
    )
    .fetch_all(executor)
    .await
}
