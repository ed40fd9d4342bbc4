//! Per-user video interactions: like, favorite, coin
//!
//! Like and favorite are toggles over the lazily created interaction row;
//! coin is a one-directional spend. None of them may target the caller's own
//! video. Toggle races resolve last-writer-wins, which is acceptable.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::{info, warn};

use crate::auth;
use crate::domain::interactions::{self, Flag};
use crate::domain::{users, videos};
use crate::error::{ServiceError, ServiceResult};
use crate::models::{Credentials, Identity, Video};
use crate::services::refresh::RefreshCoordinator;

pub struct InteractionService {
    db: PgPool,
    refresh: Arc<RefreshCoordinator>,
}

/// Toggle transition: a missing row counts as "flag off".
fn toggled(current: Option<bool>) -> bool {
    !current.unwrap_or(false)
}

/// Coin preconditions beyond the shared ones: a positive balance and no
/// earlier coin on this video.
fn check_coin_spend(balance: i64, already_coined: bool) -> ServiceResult<()> {
    if balance <= 0 {
        return Err(ServiceError::ResourceExhausted);
    }
    if already_coined {
        return Err(ServiceError::AlreadyDone);
    }
    Ok(())
}

impl InteractionService {
    pub fn new(db: PgPool, refresh: Arc<RefreshCoordinator>) -> Self {
        Self { db, refresh }
    }

    /// Shared precondition: caller authenticates, video exists, caller is
    /// not the owner.
    async fn check_target(&self, creds: &Credentials, bv: &str) -> ServiceResult<(Identity, Video)> {
        let identity = auth::authenticate(&self.db, creds).await?;
        let video = videos::get_video(&self.db, bv)
            .await?
            .ok_or(ServiceError::NotFound)?;
        if video.owner_mid == identity.mid {
            warn!(bv, mid = identity.mid, "self-interaction rejected");
            return Err(ServiceError::PermissionDenied);
        }
        Ok((identity, video))
    }

    /// Toggle one flag for (caller, video); returns the new flag value.
    async fn toggle_flag(&self, creds: &Credentials, bv: &str, flag: Flag) -> ServiceResult<bool> {
        let (identity, _) = self.check_target(creds, bv).await?;

        let row = interactions::get_interaction(&self.db, identity.mid, bv).await?;
        let new_value = match row {
            Some(existing) => {
                let current = match flag {
                    Flag::Favorited => existing.is_favorited,
                    Flag::Coined => existing.is_coined,
                    Flag::Liked => existing.is_liked,
                };
                let next = toggled(Some(current));
                interactions::set_flag(&self.db, identity.mid, bv, flag, next).await?;
                next
            }
            None => {
                interactions::insert_with_flag(&self.db, identity.mid, bv, flag).await?;
                true
            }
        };

        self.refresh.mark_stale();
        Ok(new_value)
    }

    /// Toggle the like flag; returns true when the video is now liked.
    pub async fn like_video(&self, creds: &Credentials, bv: &str) -> ServiceResult<bool> {
        self.toggle_flag(creds, bv, Flag::Liked).await
    }

    /// Toggle the favorite flag; returns true when the video is now favorited.
    pub async fn collect_video(&self, creds: &Credentials, bv: &str) -> ServiceResult<bool> {
        self.toggle_flag(creds, bv, Flag::Favorited).await
    }

    /// Spend one coin on the video. Never toggles back: a second coin on the
    /// same video is rejected and the balance is untouched.
    pub async fn coin_video(&self, creds: &Credentials, bv: &str) -> ServiceResult<()> {
        let (identity, _) = self.check_target(creds, bv).await?;

        let mut tx = self.db.begin().await?;
        let balance = users::coin_balance(&mut *tx, identity.mid)
            .await?
            .ok_or(ServiceError::NotFound)?;
        let row = interactions::get_interaction(&mut *tx, identity.mid, bv).await?;
        check_coin_spend(balance, row.is_some_and(|r| r.is_coined))?;

        match row {
            Some(_) => interactions::set_flag(&mut *tx, identity.mid, bv, Flag::Coined, true).await?,
            None => interactions::insert_with_flag(&mut *tx, identity.mid, bv, Flag::Coined).await?,
        }
        users::spend_coin(&mut *tx, identity.mid).await?;
        tx.commit().await?;

        self.refresh.mark_stale();
        info!(bv, mid = identity.mid, "coined video");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Two consecutive toggles by the same user restore the original value.
    #[test]
    fn toggle_is_an_involution() {
        for start in [None, Some(false), Some(true)] {
            let once = toggled(start);
            let twice = toggled(Some(once));
            assert_eq!(twice, start.unwrap_or(false));
        }
    }

    #[test]
    fn first_interaction_turns_flag_on() {
        assert!(toggled(None));
    }

    #[test]
    fn coin_requires_balance_and_is_one_directional() {
        assert!(check_coin_spend(3, false).is_ok());
        assert!(matches!(
            check_coin_spend(0, false),
            Err(ServiceError::ResourceExhausted)
        ));
        assert!(matches!(
            check_coin_spend(3, true),
            Err(ServiceError::AlreadyDone)
        ));
        // Balance is checked first, but either way no spend happens.
        assert!(check_coin_spend(0, true).is_err());
    }
}
