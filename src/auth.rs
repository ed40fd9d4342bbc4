//! Credential resolution against the users table
//!
//! Treated as a capability check by every service: a credential either
//! resolves to an `Identity` (mid + role) or the operation fails with
//! `AuthenticationFailed`. A credential may carry a password for its mid and
//! qq/wechat bindings; every channel that resolves must point at the same
//! user.

use sqlx::{Executor, PgPool, Postgres};
use tracing::warn;

use crate::error::{ServiceError, ServiceResult};
use crate::models::{Credentials, Identity, Role};

#[derive(Debug, sqlx::FromRow)]
struct UserAuthRow {
    mid: i64,
    identity: String,
}

/// Look up a user by mid + password.
async fn lookup_by_password<'e, E>(
    executor: E,
    mid: i64,
    password: &str,
) -> Result<Option<UserAuthRow>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as("SELECT mid, identity FROM users WHERE mid = $1 AND password = $2")
        .bind(mid)
        .bind(password)
        .fetch_optional(executor)
        .await
}

/// Look up a user by a third-party binding column.
async fn lookup_by_qq<'e, E>(executor: E, qq: &str) -> Result<Option<UserAuthRow>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as("SELECT mid, identity FROM users WHERE qq = $1")
        .bind(qq)
        .fetch_optional(executor)
        .await
}

async fn lookup_by_wechat<'e, E>(
    executor: E,
    wechat: &str,
) -> Result<Option<UserAuthRow>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as("SELECT mid, identity FROM users WHERE wechat = $1")
        .bind(wechat)
        .fetch_optional(executor)
        .await
}

/// Resolve credentials to an identity, or fail with `AuthenticationFailed`.
///
/// Resolution order: mid + password, then qq, then wechat. Channels that are
/// present must agree on the user; a contradiction is a failure, not a pick.
pub async fn authenticate(db: &PgPool, creds: &Credentials) -> ServiceResult<Identity> {
    let mut resolved: Option<UserAuthRow> = None;

    if creds.mid > 0 && !creds.password.is_empty() {
        match lookup_by_password(db, creds.mid, &creds.password).await? {
            Some(row) => resolved = Some(row),
            None => {
                warn!(mid = creds.mid, "authentication failed: bad mid/password");
                return Err(ServiceError::AuthenticationFailed);
            }
        }
    }

    if let Some(qq) = creds.qq.as_deref() {
        match lookup_by_qq(db, qq).await? {
            Some(row) if resolved.as_ref().is_none_or(|r| r.mid == row.mid) => {
                resolved.get_or_insert(row);
            }
            _ => {
                warn!("authentication failed: qq binding missing or contradictory");
                return Err(ServiceError::AuthenticationFailed);
            }
        }
    }

    if let Some(wechat) = creds.wechat.as_deref() {
        match lookup_by_wechat(db, wechat).await? {
            Some(row) if resolved.as_ref().is_none_or(|r| r.mid == row.mid) => {
                resolved.get_or_insert(row);
            }
            _ => {
                warn!("authentication failed: wechat binding missing or contradictory");
                return Err(ServiceError::AuthenticationFailed);
            }
        }
    }

    match resolved {
        Some(row) => Ok(Identity {
            mid: row.mid,
            role: Role::from_db(&row.identity),
        }),
        None => {
            warn!(mid = creds.mid, "authentication failed: no usable credential");
            Err(ServiceError::AuthenticationFailed)
        }
    }
}
