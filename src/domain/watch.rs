//! Watch-record domain - DB queries for user_video_watch

use sqlx::{Executor, Postgres};

/// Whether the user has a watch record for the video. Gates danmu posting
/// and danmu likes.
pub async fn has_watched<'e, E>(executor: E, mid: i64, bv: &str) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT 1::bigint FROM user_video_watch WHERE mid = $1 AND bv = $2")
            .bind(mid)
            .bind(bv)
            .fetch_optional(executor)
            .await?;
    Ok(row.is_some())
}

/// Distinct-watcher count, the search tie-breaker.
pub async fn view_count<'e, E>(executor: E, bv: &str) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(mid) FROM user_video_watch WHERE bv = $1")
            .bind(bv)
            .fetch_one(executor)
            .await?;
    Ok(count)
}

/// Every watch_time recorded for the video, for average-view-rate.
pub async fn watch_times<'e, E>(executor: E, bv: &str) -> Result<Vec<f64>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows: Vec<(f64,)> =
        sqlx::query_as("SELECT watch_time FROM user_video_watch WHERE bv = $1")
            .bind(bv)
            .fetch_all(executor)
            .await?;
    Ok(rows.into_iter().map(|(t,)| t).collect())
}

/// Remove all watch records for a video (deletion cascade).
pub async fn delete_for_video<'e, E>(executor: E, bv: &str) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("DELETE FROM user_video_watch WHERE bv = $1")
        .bind(bv)
        .execute(executor)
        .await?;
    Ok(())
}
