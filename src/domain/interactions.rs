//! Interaction domain - DB queries for user_video_interaction
//!
//! One row per (user, video), created lazily on first interaction; the three
//! flags toggle independently afterwards.

use sqlx::{Executor, Postgres};

use crate::models::Interaction;

/// The three independent flags, with their column names for query building.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    Favorited,
    Coined,
    Liked,
}

impl Flag {
    fn column(&self) -> &'static str {
        match self {
            Flag::Favorited => "is_favorited",
            Flag::Coined => "is_coined",
            Flag::Liked => "is_liked",
        }
    }
}

/// Fetch the interaction row for (user, video), if one exists yet.
pub async fn get_interaction<'e, E>(
    executor: E,
    mid: i64,
    bv: &str,
) -> Result<Option<Interaction>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        SELECT mid, is_favorited, is_coined, is_liked
        FROM user_video_interaction
        WHERE mid = $1 AND bv = $2
        "#,
    )
    .bind(mid)
    .bind(bv)
    .fetch_optional(executor)
    .await
}

/// Create the lazy row with exactly one flag set.
pub async fn insert_with_flag<'e, E>(
    executor: E,
    mid: i64,
    bv: &str,
    flag: Flag,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        r#"
        INSERT INTO user_video_interaction (mid, bv, is_favorited, is_coined, is_liked)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(mid)
    .bind(bv)
    .bind(flag == Flag::Favorited)
    .bind(flag == Flag::Coined)
    .bind(flag == Flag::Liked)
    .execute(executor)
    .await?;
    Ok(())
}

/// Set one flag on an existing row. Column name comes from the `Flag` enum,
/// never from caller input.
pub async fn set_flag<'e, E>(
    executor: E,
    mid: i64,
    bv: &str,
    flag: Flag,
    value: bool,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let query = format!(
        "UPDATE user_video_interaction SET {} = $3 WHERE mid = $1 AND bv = $2",
        flag.column()
    );
    sqlx::query(&query)
        .bind(mid)
        .bind(bv)
        .bind(value)
        .execute(executor)
        .await?;
    Ok(())
}

/// Remove all interaction rows for a video (deletion cascade).
pub async fn delete_for_video<'e, E>(executor: E, bv: &str) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("DELETE FROM user_video_interaction WHERE bv = $1")
        .bind(bv)
        .execute(executor)
        .await?;
    Ok(())
}
