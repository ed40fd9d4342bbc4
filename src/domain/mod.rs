//! Entity-level DB queries
//!
//! All functions use the generic Executor pattern, allowing them to work with
//! both `&PgPool` (for standalone queries) and `&mut PgConnection` (for
//! transactions). Services own the transaction boundaries.

pub mod danmu;
pub mod interactions;
pub mod recommend;
pub mod users;
pub mod videos;
pub mod watch;
