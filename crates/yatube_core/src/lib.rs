//! Core domain logic for the yatube blogging platform.
//! This crate is the single source of truth for content, follow-graph and
//! access-control invariants; rendering and routing stay outside it.

pub mod config;
pub mod db;
pub mod feed;
pub mod logging;
pub mod model;
pub mod policy;
pub mod repo;
pub mod service;
pub mod urls;

pub use config::{ConfigError, CoreConfig};
pub use feed::paginator::{Page, Paginator};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::comment::{Comment, CommentDraft, CommentEntry, CommentId};
pub use model::follow::Follow;
pub use model::group::{Group, GroupDraft, GroupId};
pub use model::post::{Post, PostDraft, PostEntry, PostId};
pub use model::user::{User, UserId};
pub use model::{FieldError, ValidationError};
pub use policy::{AccessPolicy, AccessState, Denial, RequestContext, Viewer};
pub use repo::{RepoError, RepoResult, SqliteStore, Store};
pub use service::feed_service::{FeedService, GroupFeed, ProfileFeed};
pub use service::follow_service::{FollowCounts, FollowService};
pub use service::group_service::GroupService;
pub use service::post_service::{PostDetail, PostFormContext, PostService};
pub use service::user_service::UserService;
pub use service::{ServiceError, ServiceResult, ViewOutcome, WriteOutcome};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
