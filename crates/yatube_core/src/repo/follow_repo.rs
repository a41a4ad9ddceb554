//! Follow graph repository.
//!
//! # Invariants
//! - `unique_follow(user, author)` holds; inserts use `INSERT OR IGNORE`
//!   so a repeated follow is a no-op rather than a constraint error.
//! - Removing a missing edge is a no-op.

use crate::model::follow::Follow;
use crate::model::user::UserId;
use crate::repo::{count_to_u64, RepoResult};
use rusqlite::{params, Connection};

pub trait FollowRepository {
    /// Inserts the edge; returns `false` when it already existed.
    fn follow(&self, edge: &Follow) -> RepoResult<bool>;
    /// Removes the edge; returns `false` when it did not exist.
    fn unfollow(&self, edge: &Follow) -> RepoResult<bool>;
    fn is_following(&self, edge: &Follow) -> RepoResult<bool>;
    fn follower_count(&self, author: UserId) -> RepoResult<u64>;
    fn following_count(&self, user: UserId) -> RepoResult<u64>;
}

/// SQLite-backed follow repository.
#[derive(Clone, Copy)]
pub struct SqliteFollowRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFollowRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl FollowRepository for SqliteFollowRepository<'_> {
    fn follow(&self, edge: &Follow) -> RepoResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO follows (user_uuid, author_uuid) VALUES (?1, ?2);",
            params![edge.user.to_string(), edge.author.to_string()],
        )?;
        Ok(inserted == 1)
    }

    fn unfollow(&self, edge: &Follow) -> RepoResult<bool> {
        let removed = self.conn.execute(
            "DELETE FROM follows WHERE user_uuid = ?1 AND author_uuid = ?2;",
            params![edge.user.to_string(), edge.author.to_string()],
        )?;
        Ok(removed > 0)
    }

    fn is_following(&self, edge: &Follow) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM follows WHERE user_uuid = ?1 AND author_uuid = ?2
            );",
            params![edge.user.to_string(), edge.author.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn follower_count(&self, author: UserId) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM follows WHERE author_uuid = ?1;",
            [author.to_string()],
            |row| row.get(0),
        )?;
        count_to_u64(count, "follows.author_uuid")
    }

    fn following_count(&self, user: UserId) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM follows WHERE user_uuid = ?1;",
            [user.to_string()],
            |row| row.get(0),
        )?;
        count_to_u64(count, "follows.user_uuid")
    }
}
