//! User mirror repository.
//!
//! # Invariants
//! - `username` is unique; duplicates surface as `RepoError::Conflict`.
//! - Deleting a user cascades their posts, comments and follow edges.

use crate::db::is_unique_violation;
use crate::model::user::{User, UserId};
use crate::repo::{parse_user_id, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT uuid, username FROM users";

pub trait UserRepository {
    fn create_user(&self, user: &User) -> RepoResult<UserId>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn get_user_by_username(&self, username: &str) -> RepoResult<Option<User>>;
    fn delete_user(&self, id: UserId) -> RepoResult<()>;
}

/// SQLite-backed user repository.
#[derive(Clone, Copy)]
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &User) -> RepoResult<UserId> {
        user.validate()?;

        self.conn
            .execute(
                "INSERT INTO users (uuid, username) VALUES (?1, ?2);",
                params![user.id.to_string(), user.username.as_str()],
            )
            .map_err(|err| {
                if is_unique_violation(&err) {
                    RepoError::Conflict {
                        entity: "user",
                        field: "username",
                        value: user.username.clone(),
                    }
                } else {
                    err.into()
                }
            })?;

        Ok(user.id)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let row = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE uuid = ?1;"),
                [id.to_string()],
                raw_user_row,
            )
            .optional()?;
        row.map(parse_user).transpose()
    }

    fn get_user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let row = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE username = ?1;"),
                [username],
                raw_user_row,
            )
            .optional()?;
        row.map(parse_user).transpose()
    }

    fn delete_user(&self, id: UserId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM users WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found("user", id));
        }
        Ok(())
    }
}

fn raw_user_row(row: &Row<'_>) -> rusqlite::Result<(String, String)> {
    Ok((row.get("uuid")?, row.get("username")?))
}

fn parse_user((uuid, username): (String, String)) -> RepoResult<User> {
    Ok(User::with_id(parse_user_id(&uuid, "users.uuid")?, username))
}
