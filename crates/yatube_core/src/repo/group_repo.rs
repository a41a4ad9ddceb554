//! Group repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `slug` is unique; duplicates surface as `RepoError::Conflict`.
//! - Deleting a group detaches its posts (`group_id = NULL`).

use crate::db::is_unique_violation;
use crate::model::group::{Group, GroupDraft, GroupId};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const GROUP_SELECT_SQL: &str = "SELECT id, title, slug, description FROM groups";

pub trait GroupRepository {
    fn create_group(&self, draft: &GroupDraft) -> RepoResult<Group>;
    fn update_group(&self, id: GroupId, draft: &GroupDraft) -> RepoResult<Group>;
    fn get_group(&self, id: GroupId) -> RepoResult<Option<Group>>;
    fn get_group_by_slug(&self, slug: &str) -> RepoResult<Option<Group>>;
    /// Lists all groups ordered by title.
    fn list_groups(&self) -> RepoResult<Vec<Group>>;
    /// Deletes a group and returns how many posts were detached from it.
    fn delete_group(&self, id: GroupId) -> RepoResult<u64>;
}

/// SQLite-backed group repository.
#[derive(Clone, Copy)]
pub struct SqliteGroupRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGroupRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl GroupRepository for SqliteGroupRepository<'_> {
    fn create_group(&self, draft: &GroupDraft) -> RepoResult<Group> {
        draft.validate()?;

        self.conn
            .execute(
                "INSERT INTO groups (title, slug, description) VALUES (?1, ?2, ?3);",
                params![
                    draft.title.as_str(),
                    draft.slug.as_str(),
                    draft.description.as_str()
                ],
            )
            .map_err(|err| slug_conflict(err, draft))?;

        Ok(Group {
            id: self.conn.last_insert_rowid(),
            title: draft.title.clone(),
            slug: draft.slug.clone(),
            description: draft.description.clone(),
        })
    }

    fn update_group(&self, id: GroupId, draft: &GroupDraft) -> RepoResult<Group> {
        draft.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE groups
                 SET title = ?1, slug = ?2, description = ?3
                 WHERE id = ?4;",
                params![
                    draft.title.as_str(),
                    draft.slug.as_str(),
                    draft.description.as_str(),
                    id
                ],
            )
            .map_err(|err| slug_conflict(err, draft))?;

        if changed == 0 {
            return Err(RepoError::not_found("group", id));
        }

        Ok(Group {
            id,
            title: draft.title.clone(),
            slug: draft.slug.clone(),
            description: draft.description.clone(),
        })
    }

    fn get_group(&self, id: GroupId) -> RepoResult<Option<Group>> {
        Ok(self
            .conn
            .query_row(
                &format!("{GROUP_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_group_row,
            )
            .optional()?)
    }

    fn get_group_by_slug(&self, slug: &str) -> RepoResult<Option<Group>> {
        Ok(self
            .conn
            .query_row(
                &format!("{GROUP_SELECT_SQL} WHERE slug = ?1;"),
                [slug],
                parse_group_row,
            )
            .optional()?)
    }

    fn list_groups(&self) -> RepoResult<Vec<Group>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GROUP_SELECT_SQL} ORDER BY title ASC, id ASC;"))?;
        let groups = stmt
            .query_map([], parse_group_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(groups)
    }

    fn delete_group(&self, id: GroupId) -> RepoResult<u64> {
        let tx = self.conn.unchecked_transaction()?;
        let detached: i64 = tx.query_row(
            "SELECT COUNT(*) FROM posts WHERE group_id = ?1;",
            [id],
            |row| row.get(0),
        )?;
        let changed = tx.execute("DELETE FROM groups WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::not_found("group", id));
        }
        tx.commit()?;
        crate::repo::count_to_u64(detached, "posts.group_id")
    }
}

fn parse_group_row(row: &Row<'_>) -> rusqlite::Result<Group> {
    Ok(Group {
        id: row.get("id")?,
        title: row.get("title")?,
        slug: row.get("slug")?,
        description: row.get("description")?,
    })
}

fn slug_conflict(err: rusqlite::Error, draft: &GroupDraft) -> RepoError {
    if is_unique_violation(&err) {
        RepoError::Conflict {
            entity: "group",
            field: "slug",
            value: draft.slug.clone(),
        }
    } else {
        err.into()
    }
}
