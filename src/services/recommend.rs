//! Recommendation operations
//!
//! Mostly thin delegation: co-watch ranking and the composite-score general
//! ranking run as single queries; per-user and friend scoring live in stored
//! functions. The general ranking lazily refreshes the aggregate tables
//! first when anything marked them stale.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::{info, warn};

use crate::auth;
use crate::domain::recommend;
use crate::error::{ServiceError, ServiceResult};
use crate::models::Credentials;
use crate::services::refresh::RefreshCoordinator;

/// How many co-watched videos recommend_next_video returns at most.
const NEXT_VIDEO_LIMIT: i64 = 5;

pub struct RecommenderService {
    db: PgPool,
    refresh: Arc<RefreshCoordinator>,
}

impl RecommenderService {
    pub fn new(db: PgPool, refresh: Arc<RefreshCoordinator>) -> Self {
        Self { db, refresh }
    }

    /// Up to five other videos ranked by shared watchers with `bv`. An
    /// unknown bv and a video nobody co-watched both come back as NotFound.
    pub async fn recommend_next_video(&self, bv: &str) -> ServiceResult<Vec<String>> {
        let result = recommend::co_watched_top(&self.db, bv, NEXT_VIDEO_LIMIT).await?;
        if result.is_empty() {
            warn!(bv, "no co-watched videos found");
            return Err(ServiceError::NotFound);
        }
        Ok(result)
    }

    /// Composite-score ranking over the precomputed aggregates, refreshed
    /// first if stale. Pagination here is mandatory and validated.
    pub async fn general_recommendations(
        &self,
        page_size: i32,
        page_num: i32,
    ) -> ServiceResult<Vec<String>> {
        self.refresh.refresh_if_stale(&self.db).await;

        if page_size <= 0 || page_num <= 0 {
            return Err(ServiceError::ValidationFailed("non-positive pagination"));
        }
        let offset = (page_num as i64 - 1) * page_size as i64;
        let result = recommend::general_ranking(&self.db, page_size as i64, offset).await?;
        info!(count = result.len(), "general recommendations computed");
        Ok(result)
    }

    /// Delegate per-user scoring to the database after authentication.
    pub async fn recommend_videos_for_user(
        &self,
        creds: &Credentials,
        page_size: i32,
        page_num: i32,
    ) -> ServiceResult<Vec<String>> {
        let identity = auth::authenticate(&self.db, creds).await?;
        let result =
            recommend::videos_for_user(&self.db, identity.mid, page_size, page_num).await?;
        if result.is_empty() {
            return Err(ServiceError::NotFound);
        }
        Ok(result)
    }

    /// Delegate friend scoring to the database; a successful call also
    /// triggers a best-effort aggregate refresh.
    pub async fn recommend_friends(
        &self,
        creds: &Credentials,
        page_size: i32,
        page_num: i32,
    ) -> ServiceResult<Vec<i64>> {
        let identity = auth::authenticate(&self.db, creds).await?;
        let result =
            recommend::friends_for_user(&self.db, identity.mid, page_size, page_num).await?;
        if result.is_empty() {
            return Err(ServiceError::NotFound);
        }
        self.refresh.refresh_now(&self.db).await;
        Ok(result)
    }
}
