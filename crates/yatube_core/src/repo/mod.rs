//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per entity.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Write paths validate drafts before SQL mutations.
//! - Read paths reject undecodable persisted rows instead of masking them.
//! - Repository APIs return semantic errors (`NotFound`, `Conflict`) in
//!   addition to DB transport errors.

use crate::db::DbError;
use crate::model::user::UserId;
use crate::model::ValidationError;
use comment_repo::{CommentRepository, SqliteCommentRepository};
use follow_repo::{FollowRepository, SqliteFollowRepository};
use group_repo::{GroupRepository, SqliteGroupRepository};
use post_repo::{PostRepository, SqlitePostRepository};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use user_repo::{SqliteUserRepository, UserRepository};
use uuid::Uuid;

pub mod comment_repo;
pub mod follow_repo;
pub mod group_repo;
pub mod post_repo;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by all entity repositories.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    /// Target row does not exist.
    NotFound {
        entity: &'static str,
        key: String,
    },
    /// A unique column already holds `value`.
    Conflict {
        entity: &'static str,
        field: &'static str,
        value: String,
    },
    InvalidData(String),
}

impl RepoError {
    pub(crate) fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, key } => write!(f, "{entity} not found: {key}"),
            Self::Conflict {
                entity,
                field,
                value,
            } => write!(f, "{entity} with {field} `{value}` already exists"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::Conflict { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Bundle of entity repositories handed to services.
///
/// Services depend on this seam only, so they stay storage-agnostic.
pub trait Store {
    type Users: UserRepository;
    type Groups: GroupRepository;
    type Posts: PostRepository;
    type Comments: CommentRepository;
    type Follows: FollowRepository;

    fn users(&self) -> &Self::Users;
    fn groups(&self) -> &Self::Groups;
    fn posts(&self) -> &Self::Posts;
    fn comments(&self) -> &Self::Comments;
    fn follows(&self) -> &Self::Follows;
}

/// All SQLite repositories over one migrated connection.
#[derive(Clone, Copy)]
pub struct SqliteStore<'conn> {
    users: SqliteUserRepository<'conn>,
    groups: SqliteGroupRepository<'conn>,
    posts: SqlitePostRepository<'conn>,
    comments: SqliteCommentRepository<'conn>,
    follows: SqliteFollowRepository<'conn>,
}

impl<'conn> SqliteStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            users: SqliteUserRepository::new(conn),
            groups: SqliteGroupRepository::new(conn),
            posts: SqlitePostRepository::new(conn),
            comments: SqliteCommentRepository::new(conn),
            follows: SqliteFollowRepository::new(conn),
        }
    }
}

impl<'conn> Store for SqliteStore<'conn> {
    type Users = SqliteUserRepository<'conn>;
    type Groups = SqliteGroupRepository<'conn>;
    type Posts = SqlitePostRepository<'conn>;
    type Comments = SqliteCommentRepository<'conn>;
    type Follows = SqliteFollowRepository<'conn>;

    fn users(&self) -> &Self::Users {
        &self.users
    }

    fn groups(&self) -> &Self::Groups {
        &self.groups
    }

    fn posts(&self) -> &Self::Posts {
        &self.posts
    }

    fn comments(&self) -> &Self::Comments {
        &self.comments
    }

    fn follows(&self) -> &Self::Follows {
        &self.follows
    }
}

pub(crate) fn parse_user_id(value: &str, column: &str) -> RepoResult<UserId> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn count_to_u64(value: i64, column: &str) -> RepoResult<u64> {
    u64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("negative count `{value}` in {column}")))
}
