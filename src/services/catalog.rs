//! Video catalog operations: post, update, review, delete
//!
//! Each operation is authenticate, then validate against persisted state,
//! then write. Deletion cascades across four dependent tables inside one
//! transaction so a failure leaves everything untouched.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth;
use crate::domain::{danmu, interactions, videos, watch};
use crate::error::{ServiceError, ServiceResult};
use crate::models::{Credentials, PostVideoReq, Video};
use crate::services::refresh::RefreshCoordinator;

pub struct CatalogService {
    db: PgPool,
    refresh: Arc<RefreshCoordinator>,
}

/// Field validation shared by post and update. Returns the scheduled public
/// time, which is mandatory.
fn validate_req(req: &PostVideoReq) -> ServiceResult<DateTime<Utc>> {
    if req.title.is_empty() {
        return Err(ServiceError::ValidationFailed("title is empty"));
    }
    if req.description.is_empty() {
        return Err(ServiceError::ValidationFailed("description is empty"));
    }
    if req.duration < 0.0 {
        return Err(ServiceError::ValidationFailed("duration is negative"));
    }
    req.public_time
        .ok_or(ServiceError::ValidationFailed("public time is missing"))
}

/// Whether the update actually changes a mutable field. Content equality,
/// not identity: title, description and public time are compared by value.
fn has_changes(stored: &Video, req: &PostVideoReq, public_time: DateTime<Utc>) -> bool {
    stored.title != req.title
        || stored.description != req.description
        || stored.public_time != Some(public_time)
}

impl CatalogService {
    pub fn new(db: PgPool, refresh: Arc<RefreshCoordinator>) -> Self {
        Self { db, refresh }
    }

    /// Post a new video; it stays non-public until reviewed. Returns the
    /// freshly generated bv.
    pub async fn post_video(&self, creds: &Credentials, req: &PostVideoReq) -> ServiceResult<String> {
        let identity = auth::authenticate(&self.db, creds).await?;
        let public_time = validate_req(req)?;

        let bv = Uuid::new_v4().to_string();
        videos::insert_video(&self.db, &bv, identity.mid, req, public_time).await?;
        self.refresh.mark_stale();
        info!(bv, mid = identity.mid, "posted video");
        Ok(bv)
    }

    /// Delete a video and every dependent row, all-or-nothing. Allowed for
    /// the owner and for superusers.
    pub async fn delete_video(&self, creds: &Credentials, bv: &str) -> ServiceResult<()> {
        let identity = auth::authenticate(&self.db, creds).await?;

        let video = videos::get_video(&self.db, bv)
            .await?
            .ok_or(ServiceError::NotFound)?;
        if video.owner_mid != identity.mid && !identity.is_superuser() {
            warn!(bv, mid = identity.mid, "delete denied: not owner or superuser");
            return Err(ServiceError::PermissionDenied);
        }

        let mut tx = self.db.begin().await?;
        watch::delete_for_video(&mut *tx, bv).await?;
        interactions::delete_for_video(&mut *tx, bv).await?;
        danmu::delete_likes_for_video(&mut *tx, bv).await?;
        danmu::delete_for_video(&mut *tx, bv).await?;
        videos::delete_video_row(&mut *tx, bv).await?;
        tx.commit().await?;

        self.refresh.mark_stale();
        info!(bv, "deleted video");
        Ok(())
    }

    /// Rewrite title/description/public time. Duration is immutable; a
    /// request that changes nothing is rejected. An accepted update forces
    /// re-review (public flag drops back to false).
    pub async fn update_video_info(
        &self,
        creds: &Credentials,
        bv: &str,
        req: &PostVideoReq,
    ) -> ServiceResult<()> {
        auth::authenticate(&self.db, creds).await?;
        let public_time = validate_req(req)?;

        let video = videos::get_video(&self.db, bv)
            .await?
            .ok_or(ServiceError::NotFound)?;
        if video.duration != req.duration {
            warn!(bv, "update rejected: duration is immutable");
            return Err(ServiceError::ValidationFailed("duration is immutable"));
        }
        if !has_changes(&video, req, public_time) {
            return Err(ServiceError::NoChange);
        }

        videos::update_video(&self.db, bv, req, public_time).await?;
        info!(bv, "updated video info");
        Ok(())
    }

    /// Publish a video. Superuser-only, and never the uploader's own video;
    /// re-reviewing an already public video is rejected.
    pub async fn review_video(&self, creds: &Credentials, bv: &str) -> ServiceResult<()> {
        let identity = auth::authenticate(&self.db, creds).await?;
        if !identity.is_superuser() {
            warn!(bv, mid = identity.mid, "review denied: not a superuser");
            return Err(ServiceError::PermissionDenied);
        }

        let video = videos::get_video(&self.db, bv)
            .await?
            .ok_or(ServiceError::NotFound)?;
        if video.owner_mid == identity.mid {
            warn!(bv, "review denied: self-review");
            return Err(ServiceError::PermissionDenied);
        }
        if video.is_public {
            return Err(ServiceError::AlreadyDone);
        }

        videos::mark_public(&self.db, bv).await?;
        info!(bv, "reviewed video");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn req(title: &str, description: &str, duration: f64) -> PostVideoReq {
        PostVideoReq {
            title: title.into(),
            description: description.into(),
            duration,
            public_time: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
        }
    }

    fn stored(req: &PostVideoReq) -> Video {
        Video {
            bv: "bv-test".into(),
            owner_mid: 1,
            title: req.title.clone(),
            description: req.description.clone(),
            duration: req.duration,
            commit_time: Utc::now(),
            public_time: req.public_time,
            is_public: false,
            review_time: None,
        }
    }

    #[test]
    fn validation_requires_fields() {
        assert!(matches!(
            validate_req(&req("", "d", 10.0)),
            Err(ServiceError::ValidationFailed("title is empty"))
        ));
        assert!(matches!(
            validate_req(&req("t", "", 10.0)),
            Err(ServiceError::ValidationFailed("description is empty"))
        ));
        assert!(matches!(
            validate_req(&req("t", "d", -1.0)),
            Err(ServiceError::ValidationFailed("duration is negative"))
        ));
        assert!(validate_req(&req("t", "d", 0.0)).is_ok());

        let mut missing = req("t", "d", 10.0);
        missing.public_time = None;
        assert!(matches!(
            validate_req(&missing),
            Err(ServiceError::ValidationFailed("public time is missing"))
        ));
    }

    // The no-change check deliberately compares field content, not object
    // identity: an update echoing the stored values back is rejected.
    #[test]
    fn no_change_detected_by_content() {
        let request = req("t", "d", 10.0);
        let video = stored(&request);
        assert!(!has_changes(&video, &request, request.public_time.unwrap()));

        let mut retitled = request.clone();
        retitled.title = "new title".into();
        assert!(has_changes(&video, &retitled, retitled.public_time.unwrap()));

        let moved = req("t", "d", 10.0);
        let later = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        assert!(has_changes(&video, &moved, later));
    }
}
