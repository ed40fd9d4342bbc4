//! Danmu operations: posting, display, likes
//!
//! Posting and liking are gated on a watch record: only users who have
//! actually viewed a video may comment on it or like its comments.

use sqlx::PgPool;
use tracing::{info, warn};

use crate::auth;
use crate::domain::{danmu, videos, watch};
use crate::error::{ServiceError, ServiceResult};
use crate::models::Credentials;

pub struct DanmuService {
    db: PgPool,
}

impl DanmuService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Post a danmu at playback offset `time`. The video must be public, the
    /// offset within `[0, duration]`, and the caller must have watched the
    /// video. Returns the assigned danmu id.
    pub async fn send_danmu(
        &self,
        creds: &Credentials,
        bv: &str,
        content: &str,
        time: f64,
    ) -> ServiceResult<i64> {
        let identity = auth::authenticate(&self.db, creds).await?;

        let video = videos::get_video(&self.db, bv)
            .await?
            .ok_or(ServiceError::NotFound)?;
        if !video.is_public {
            warn!(bv, "send danmu rejected: video not public");
            return Err(ServiceError::NotFound);
        }
        if time < 0.0 || time > video.duration {
            warn!(bv, time, "send danmu rejected: offset outside video");
            return Err(ServiceError::ValidationFailed("time outside video duration"));
        }
        if !watch::has_watched(&self.db, identity.mid, bv).await? {
            warn!(bv, mid = identity.mid, "send danmu rejected: no watch record");
            return Err(ServiceError::PermissionDenied);
        }

        let id = danmu::insert_danmu(&self.db, bv, identity.mid, content, time).await?;
        info!(bv, id, "sent danmu");
        Ok(id)
    }

    /// Danmu ids within `[time_start, time_end]`. With `dedupe`, identical
    /// content collapses to the earliest occurrence.
    pub async fn display_danmu(
        &self,
        bv: &str,
        time_start: f64,
        time_end: f64,
        dedupe: bool,
    ) -> ServiceResult<Vec<i64>> {
        let ids = danmu::ids_in_range(&self.db, bv, time_start, time_end, dedupe).await?;
        Ok(ids)
    }

    /// Toggle the caller's like on a danmu; returns true when now liked,
    /// false when the like was removed.
    pub async fn like_danmu(&self, creds: &Credentials, danmu_id: i64) -> ServiceResult<bool> {
        let identity = auth::authenticate(&self.db, creds).await?;

        let target = danmu::get_danmu(&self.db, danmu_id)
            .await?
            .ok_or(ServiceError::NotFound)?;
        if !watch::has_watched(&self.db, identity.mid, &target.bv).await? {
            warn!(danmu_id, mid = identity.mid, "like danmu rejected: no watch record");
            return Err(ServiceError::PermissionDenied);
        }

        if danmu::is_liked(&self.db, identity.mid, danmu_id).await? {
            danmu::delete_like(&self.db, identity.mid, danmu_id).await?;
            Ok(false)
        } else {
            danmu::insert_like(&self.db, identity.mid, danmu_id).await?;
            Ok(true)
        }
    }
}
