//! User domain - DB queries for users

use sqlx::{Executor, Postgres};

/// Current coin balance, or None if the user row is missing.
pub async fn coin_balance<'e, E>(executor: E, mid: i64) -> Result<Option<i64>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let row: Option<(i64,)> = sqlx::query_as("SELECT coin FROM users WHERE mid = $1")
        .bind(mid)
        .fetch_optional(executor)
        .await?;
    Ok(row.map(|(c,)| c))
}

/// Spend one coin. The balance check happens in the service before this runs,
/// inside the same transaction.
pub async fn spend_coin<'e, E>(executor: E, mid: i64) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("UPDATE users SET coin = coin - 1 WHERE mid = $1")
        .bind(mid)
        .execute(executor)
        .await?;
    Ok(())
}
