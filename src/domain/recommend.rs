//! Recommendation domain - ranking queries and external stored procedures
//!
//! The composite-score and co-watch rankings run as single SQL statements;
//! per-user and friend scoring live in stored functions owned by the
//! database, invoked here by name.

use sqlx::{Executor, Postgres};

/// Up to `limit` other videos ranked by how many watchers they share with
/// `bv`, descending.
pub async fn co_watched_top<'e, E>(
    executor: E,
    bv: &str,
    limit: i64,
) -> Result<Vec<String>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT v.bv
        FROM user_video_watch uvw
        JOIN videos v ON uvw.bv = v.bv
        WHERE uvw.mid IN (SELECT mid FROM user_video_watch WHERE bv = $1)
          AND uvw.bv != $1
        GROUP BY v.bv
        ORDER BY COUNT(uvw.mid) DESC
        LIMIT $2
        "#,
    )
    .bind(bv)
    .bind(limit)
    .fetch_all(executor)
    .await?;
    Ok(rows.into_iter().map(|(bv,)| bv).collect())
}

/// General ranking: sum of the precomputed rate aggregates plus average
/// danmus per distinct viewer, missing components as zero. The danmu average
/// is bigint division, so it truncates; the observed ordering depends on
/// that.
pub async fn general_ranking<'e, E>(
    executor: E,
    limit: i64,
    offset: i64,
) -> Result<Vec<String>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT v.bv
        FROM videos v
        LEFT JOIN video_stats vs ON v.bv = vs.bv
        LEFT JOIN video_aggregates va ON v.bv = va.bv
        LEFT JOIN (
            SELECT bv, COUNT(*) / NULLIF(COUNT(DISTINCT mid), 0) AS danmu_avg
            FROM danmus
            GROUP BY bv
        ) danmu_data ON v.bv = danmu_data.bv
        ORDER BY COALESCE(vs.like_rate, 0) + COALESCE(vs.coin_rate, 0)
               + COALESCE(vs.fav_rate, 0) + COALESCE(va.avg_finish, 0)
               + COALESCE(danmu_data.danmu_avg, 0) DESC
        OFFSET $1 LIMIT $2
        "#,
    )
    .bind(offset)
    .bind(limit)
    .fetch_all(executor)
    .await?;
    Ok(rows.into_iter().map(|(bv,)| bv).collect())
}

/// Delegate per-user video scoring to the database.
pub async fn videos_for_user<'e, E>(
    executor: E,
    mid: i64,
    page_size: i32,
    page_num: i32,
) -> Result<Vec<String>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows: Vec<(String,)> = sqlx::query_as("SELECT recommend_videos_for_user($1, $2, $3)")
        .bind(mid)
        .bind(page_size)
        .bind(page_num)
        .fetch_all(executor)
        .await?;
    Ok(rows.into_iter().map(|(bv,)| bv).collect())
}

/// Delegate friend scoring to the database; returns candidate mids.
pub async fn friends_for_user<'e, E>(
    executor: E,
    mid: i64,
    page_size: i32,
    page_num: i32,
) -> Result<Vec<i64>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows: Vec<(i64,)> = sqlx::query_as("SELECT recommend_friends($1, $2, $3)")
        .bind(mid)
        .bind(page_size)
        .bind(page_num)
        .fetch_all(executor)
        .await?;
    Ok(rows.into_iter().map(|(mid,)| mid).collect())
}

/// Externally owned aggregate refresh procedures, invoked by name.
pub async fn refresh_video_aggregates<'e, E>(executor: E) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("CALL update_video_aggregates()")
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn refresh_interaction_aggregates<'e, E>(executor: E) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("CALL update_video_interactions_aggregates()")
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn refresh_video_stats<'e, E>(executor: E) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("CALL update_video_stats()")
        .execute(executor)
        .await?;
    Ok(())
}
