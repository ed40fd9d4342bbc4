//! Backend service logic for a danmu video-sharing platform
//!
//! Library crate consumed by a request-handling layer: posting, reviewing
//! and searching videos, danmu comments, per-user interactions
//! (like/coin/favorite), and recommendation lists, all backed by a Postgres
//! store. Construct the services over one `PgPool` and a shared
//! `RefreshCoordinator`:
//!
//! ```ignore
//! let refresh = Arc::new(RefreshCoordinator::new());
//! let catalog = CatalogService::new(pool.clone(), refresh.clone());
//! let search = SearchService::new(pool.clone());
//! ```

pub mod auth;
pub mod domain;
pub mod error;
pub mod models;
pub mod services;

pub use error::{ServiceError, ServiceResult};
pub use models::{Credentials, Identity, PostVideoReq, Role};
pub use services::catalog::CatalogService;
pub use services::danmu::DanmuService;
pub use services::interaction::InteractionService;
pub use services::recommend::RecommenderService;
pub use services::refresh::RefreshCoordinator;
pub use services::search::SearchService;
