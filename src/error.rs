//! Error taxonomy shared by all service operations
//!
//! Every operation returns `Result<T, ServiceError>`: one failure channel per
//! call, with the cause preserved so tests and logs can tell a missing video
//! from a permission problem even though callers only branch on success.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Credentials did not resolve to a known user.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// The referenced video or danmu does not exist (or has no usable data).
    #[error("not found")]
    NotFound,

    /// Caller is not the owner and does not hold the required role.
    #[error("permission denied")]
    PermissionDenied,

    /// Malformed input: bad time range, immutable field change, blank
    /// keywords, non-positive pagination where pagination is mandatory.
    #[error("validation failed: {0}")]
    ValidationFailed(&'static str),

    /// Update request matched the stored row field for field.
    #[error("no change")]
    NoChange,

    /// Caller's coin balance is empty.
    #[error("insufficient coin balance")]
    ResourceExhausted,

    /// One-directional action already performed (e.g. double coin,
    /// re-review of a public video).
    #[error("already done")]
    AlreadyDone,

    /// Store connectivity or query failure; the operation is aborted and any
    /// open transaction rolls back.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_cause() {
        assert_eq!(ServiceError::NotFound.to_string(), "not found");
        assert_eq!(
            ServiceError::ValidationFailed("duration is immutable").to_string(),
            "validation failed: duration is immutable"
        );
        assert_eq!(
            ServiceError::ResourceExhausted.to_string(),
            "insufficient coin balance"
        );
    }
}
