//! Danmu domain - DB queries for danmus and danmu_like

use sqlx::{Executor, Postgres};

use crate::models::Danmu;

/// Fetch a danmu by id.
pub async fn get_danmu<'e, E>(executor: E, id: i64) -> Result<Option<Danmu>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"SELECT id, bv, mid, content, time, post_time FROM danmus WHERE id = $1"#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Insert a danmu stamped with the current time; returns the generated id.
pub async fn insert_danmu<'e, E>(
    executor: E,
    bv: &str,
    mid: i64,
    content: &str,
    time: f64,
) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO danmus (bv, mid, content, time, post_time)
        VALUES ($1, $2, $3, $4, now())
        RETURNING id
        "#,
    )
    .bind(bv)
    .bind(mid)
    .bind(content)
    .bind(time)
    .fetch_one(executor)
    .await?;
    Ok(id)
}

/// Danmu ids within `[time_start, time_end]` on a video. With `dedupe`,
/// comments with identical content collapse to the earliest (lowest id).
pub async fn ids_in_range<'e, E>(
    executor: E,
    bv: &str,
    time_start: f64,
    time_end: f64,
    dedupe: bool,
) -> Result<Vec<i64>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let query = if dedupe {
        r#"
        SELECT MIN(id) AS id FROM danmus
        WHERE bv = $1 AND time >= $2 AND time <= $3
        GROUP BY content
        "#
    } else {
        r#"
        SELECT id FROM danmus
        WHERE bv = $1 AND time >= $2 AND time <= $3
        "#
    };

    let rows: Vec<(i64,)> = sqlx::query_as(query)
        .bind(bv)
        .bind(time_start)
        .bind(time_end)
        .fetch_all(executor)
        .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Every danmu playback offset on a video, for hotspot bucketing.
pub async fn times_for_video<'e, E>(executor: E, bv: &str) -> Result<Vec<f64>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows: Vec<(f64,)> = sqlx::query_as("SELECT time FROM danmus WHERE bv = $1")
        .bind(bv)
        .fetch_all(executor)
        .await?;
    Ok(rows.into_iter().map(|(t,)| t).collect())
}

/// Whether (user, danmu) is in the like set.
pub async fn is_liked<'e, E>(executor: E, mid: i64, danmu_id: i64) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT 1::bigint FROM danmu_like WHERE mid = $1 AND danmu_id = $2")
            .bind(mid)
            .bind(danmu_id)
            .fetch_optional(executor)
            .await?;
    Ok(row.is_some())
}

pub async fn insert_like<'e, E>(executor: E, mid: i64, danmu_id: i64) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("INSERT INTO danmu_like (mid, danmu_id) VALUES ($1, $2)")
        .bind(mid)
        .bind(danmu_id)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn delete_like<'e, E>(executor: E, mid: i64, danmu_id: i64) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("DELETE FROM danmu_like WHERE mid = $1 AND danmu_id = $2")
        .bind(mid)
        .bind(danmu_id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Remove likes on every danmu of a video (deletion cascade, before the
/// danmus themselves go).
pub async fn delete_likes_for_video<'e, E>(executor: E, bv: &str) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        "DELETE FROM danmu_like WHERE danmu_id IN (SELECT id FROM danmus WHERE bv = $1)",
    )
    .bind(bv)
    .execute(executor)
    .await?;
    Ok(())
}

/// Remove all danmus for a video (deletion cascade).
pub async fn delete_for_video<'e, E>(executor: E, bv: &str) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("DELETE FROM danmus WHERE bv = $1")
        .bind(bv)
        .execute(executor)
        .await?;
    Ok(())
}
