//! Post repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist posts and serve the filtered, ordered listings feeds need.
//! - Keep post/author/group joins inside the persistence boundary.
//!
//! # Invariants
//! - Listings are ordered `pub_date DESC, id DESC`.
//! - `pub_date` and `author` are never written by updates.
//! - Deleting a post cascades its comments via the schema.

use crate::model::group::{Group, GroupId};
use crate::model::post::{Post, PostDraft, PostEntry, PostId};
use crate::model::user::{User, UserId};
use crate::repo::{count_to_u64, parse_user_id, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const POST_SELECT_SQL: &str = "SELECT id, text, pub_date, author_uuid, group_id, image FROM posts";

const POST_ENTRY_SELECT_SQL: &str = "SELECT
    p.id AS id,
    p.text AS text,
    p.pub_date AS pub_date,
    p.author_uuid AS author_uuid,
    p.group_id AS group_id,
    p.image AS image,
    u.username AS author_username,
    g.title AS group_title,
    g.slug AS group_slug,
    g.description AS group_description,
    (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comment_count
FROM posts p
INNER JOIN users u ON u.uuid = p.author_uuid
LEFT JOIN groups g ON g.id = p.group_id";

/// Which posts a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostFilter {
    #[default]
    All,
    Group(GroupId),
    Author(UserId),
    /// Posts whose author is followed by this user.
    FollowedBy(UserId),
}

impl PostFilter {
    fn where_clause(&self) -> (&'static str, Option<Value>) {
        match self {
            Self::All => ("", None),
            Self::Group(id) => (" WHERE p.group_id = ?", Some(Value::Integer(*id))),
            Self::Author(id) => (" WHERE p.author_uuid = ?", Some(Value::Text(id.to_string()))),
            Self::FollowedBy(id) => (
                " WHERE p.author_uuid IN (
                    SELECT f.author_uuid FROM follows f WHERE f.user_uuid = ?
                )",
                Some(Value::Text(id.to_string())),
            ),
        }
    }
}

/// Query options for post listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostListQuery {
    pub filter: PostFilter,
    pub limit: u32,
    pub offset: u64,
}

pub trait PostRepository {
    fn create_post(&self, author: UserId, draft: &PostDraft) -> RepoResult<Post>;
    /// Replaces the editable fields (`text`, `group`, `image`).
    fn update_post(&self, id: PostId, draft: &PostDraft) -> RepoResult<Post>;
    fn get_post(&self, id: PostId) -> RepoResult<Option<Post>>;
    fn get_post_entry(&self, id: PostId) -> RepoResult<Option<PostEntry>>;
    /// Deletes a post together with its comments.
    fn delete_post(&self, id: PostId) -> RepoResult<()>;
    fn list_posts(&self, query: &PostListQuery) -> RepoResult<Vec<PostEntry>>;
    fn count_posts(&self, filter: &PostFilter) -> RepoResult<u64>;
}

/// SQLite-backed post repository.
#[derive(Clone, Copy)]
pub struct SqlitePostRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePostRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PostRepository for SqlitePostRepository<'_> {
    fn create_post(&self, author: UserId, draft: &PostDraft) -> RepoResult<Post> {
        draft.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO posts (text, author_uuid, group_id, image) VALUES (?1, ?2, ?3, ?4);",
            params![
                draft.text.as_str(),
                author.to_string(),
                draft.group,
                draft.image.as_deref(),
            ],
        )?;
        let id = tx.last_insert_rowid();
        let post = load_post(&tx, id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("post {id} missing after insert"))
        })?;
        tx.commit()?;

        Ok(post)
    }

    fn update_post(&self, id: PostId, draft: &PostDraft) -> RepoResult<Post> {
        draft.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE posts SET text = ?1, group_id = ?2, image = ?3 WHERE id = ?4;",
            params![draft.text.as_str(), draft.group, draft.image.as_deref(), id],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("post", id));
        }
        let post = load_post(&tx, id)?
            .ok_or_else(|| RepoError::InvalidData(format!("post {id} missing after update")))?;
        tx.commit()?;

        Ok(post)
    }

    fn get_post(&self, id: PostId) -> RepoResult<Option<Post>> {
        load_post(self.conn, id)
    }

    fn get_post_entry(&self, id: PostId) -> RepoResult<Option<PostEntry>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{POST_ENTRY_SELECT_SQL} WHERE p.id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_entry_row(row)?));
        }
        Ok(None)
    }

    fn delete_post(&self, id: PostId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM posts WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::not_found("post", id));
        }
        Ok(())
    }

    fn list_posts(&self, query: &PostListQuery) -> RepoResult<Vec<PostEntry>> {
        let (clause, filter_value) = query.filter.where_clause();
        let sql = format!(
            "{POST_ENTRY_SELECT_SQL}{clause} ORDER BY p.pub_date DESC, p.id DESC LIMIT ? OFFSET ?;"
        );
        let mut bind_values: Vec<Value> = filter_value.into_iter().collect();
        bind_values.push(Value::Integer(i64::from(query.limit)));
        bind_values.push(Value::Integer(
            i64::try_from(query.offset).unwrap_or(i64::MAX),
        ));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }

        Ok(entries)
    }

    fn count_posts(&self, filter: &PostFilter) -> RepoResult<u64> {
        let (clause, filter_value) = filter.where_clause();
        let sql = format!("SELECT COUNT(*) FROM posts p{clause};");
        let count: i64 = self.conn.query_row(
            &sql,
            params_from_iter(filter_value.into_iter()),
            |row| row.get(0),
        )?;
        count_to_u64(count, "posts")
    }
}

fn load_post(conn: &Connection, id: PostId) -> RepoResult<Option<Post>> {
    let row = conn
        .query_row(
            &format!("{POST_SELECT_SQL} WHERE id = ?1;"),
            [id],
            |row| {
                Ok((
                    row.get::<_, PostId>("id")?,
                    row.get::<_, String>("text")?,
                    row.get::<_, i64>("pub_date")?,
                    row.get::<_, String>("author_uuid")?,
                    row.get::<_, Option<GroupId>>("group_id")?,
                    row.get::<_, Option<String>>("image")?,
                ))
            },
        )
        .optional()?;

    row.map(|(id, text, pub_date, author, group, image)| {
        Ok(Post {
            id,
            text,
            pub_date,
            author: parse_user_id(&author, "posts.author_uuid")?,
            group,
            image,
        })
    })
    .transpose()
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<PostEntry> {
    let author_text: String = row.get("author_uuid")?;
    let author_id = parse_user_id(&author_text, "posts.author_uuid")?;
    let group_id: Option<GroupId> = row.get("group_id")?;

    let group = match group_id {
        Some(id) => Some(Group {
            id,
            title: row.get("group_title")?,
            slug: row.get("group_slug")?,
            description: row.get("group_description")?,
        }),
        None => None,
    };

    Ok(PostEntry {
        post: Post {
            id: row.get("id")?,
            text: row.get("text")?,
            pub_date: row.get("pub_date")?,
            author: author_id,
            group: group_id,
            image: row.get("image")?,
        },
        author: User::with_id(author_id, row.get::<_, String>("author_username")?),
        group,
        comment_count: count_to_u64(row.get("comment_count")?, "comments")?,
    })
}
