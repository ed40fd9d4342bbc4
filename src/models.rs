//! Shared data models used across modules

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Caller credentials as handed in by the request layer: a numeric user id
/// plus password, optionally backed by qq/wechat bindings.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub mid: i64,
    pub password: String,
    pub qq: Option<String>,
    pub wechat: Option<String>,
}

/// Role attached to a resolved identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Ordinary,
    Superuser,
}

impl Role {
    /// Parse the `identity` column; anything unrecognized is ordinary.
    pub fn from_db(s: &str) -> Self {
        match s {
            "SUPERUSER" => Role::Superuser,
            _ => Role::Ordinary,
        }
    }
}

/// A successfully authenticated caller.
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    pub mid: i64,
    pub role: Role,
}

impl Identity {
    pub fn is_superuser(&self) -> bool {
        self.role == Role::Superuser
    }
}

/// Request body for posting or updating a video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostVideoReq {
    pub title: String,
    pub description: String,
    /// Seconds; immutable after creation.
    pub duration: f64,
    /// Scheduled public time; required.
    pub public_time: Option<DateTime<Utc>>,
}

/// A video row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Video {
    pub bv: String,
    pub owner_mid: i64,
    pub title: String,
    pub description: String,
    pub duration: f64,
    pub commit_time: DateTime<Utc>,
    pub public_time: Option<DateTime<Utc>>,
    pub is_public: bool,
    pub review_time: Option<DateTime<Utc>>,
}

/// A danmu (timed comment) row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Danmu {
    pub id: i64,
    pub bv: String,
    pub mid: i64,
    pub content: String,
    /// Playback offset in seconds, within `[0, video.duration]`.
    pub time: f64,
    pub post_time: DateTime<Utc>,
}

/// Per-(user, video) interaction flags; created lazily on first interaction.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct Interaction {
    pub mid: i64,
    pub is_favorited: bool,
    pub is_coined: bool,
    pub is_liked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parsing_defaults_to_ordinary() {
        assert_eq!(Role::from_db("SUPERUSER"), Role::Superuser);
        assert_eq!(Role::from_db("ORDINARY"), Role::Ordinary);
        assert_eq!(Role::from_db("garbage"), Role::Ordinary);
    }
}
