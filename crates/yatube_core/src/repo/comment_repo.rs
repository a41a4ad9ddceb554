//! Comment repository. Comments are append-only; they disappear only
//! through the post or user cascade.

use crate::model::comment::{Comment, CommentDraft, CommentEntry, CommentId};
use crate::model::post::PostId;
use crate::model::user::{User, UserId};
use crate::repo::{count_to_u64, parse_user_id, RepoResult};
use rusqlite::{params, Connection, Row};

pub trait CommentRepository {
    fn add_comment(
        &self,
        post: PostId,
        author: UserId,
        draft: &CommentDraft,
    ) -> RepoResult<Comment>;
    /// Lists comments of one post, oldest first.
    fn list_comments(&self, post: PostId) -> RepoResult<Vec<CommentEntry>>;
    fn count_comments(&self, post: PostId) -> RepoResult<u64>;
}

/// SQLite-backed comment repository.
#[derive(Clone, Copy)]
pub struct SqliteCommentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCommentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CommentRepository for SqliteCommentRepository<'_> {
    fn add_comment(
        &self,
        post: PostId,
        author: UserId,
        draft: &CommentDraft,
    ) -> RepoResult<Comment> {
        draft.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO comments (post_id, author_uuid, text) VALUES (?1, ?2, ?3);",
            params![post, author.to_string(), draft.text.as_str()],
        )?;
        let id: CommentId = tx.last_insert_rowid();
        let created: i64 = tx.query_row(
            "SELECT created FROM comments WHERE id = ?1;",
            [id],
            |row| row.get(0),
        )?;
        tx.commit()?;

        Ok(Comment {
            id,
            post,
            author,
            text: draft.text.clone(),
            created,
        })
    }

    fn list_comments(&self, post: PostId) -> RepoResult<Vec<CommentEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                c.id AS id,
                c.post_id AS post_id,
                c.author_uuid AS author_uuid,
                c.text AS text,
                c.created AS created,
                u.username AS author_username
             FROM comments c
             INNER JOIN users u ON u.uuid = c.author_uuid
             WHERE c.post_id = ?1
             ORDER BY c.created ASC, c.id ASC;",
        )?;
        let mut rows = stmt.query([post])?;
        let mut comments = Vec::new();
        while let Some(row) = rows.next()? {
            comments.push(parse_comment_row(row)?);
        }
        Ok(comments)
    }

    fn count_comments(&self, post: PostId) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM comments WHERE post_id = ?1;",
            [post],
            |row| row.get(0),
        )?;
        count_to_u64(count, "comments")
    }
}

fn parse_comment_row(row: &Row<'_>) -> RepoResult<CommentEntry> {
    let author_text: String = row.get("author_uuid")?;
    let author = parse_user_id(&author_text, "comments.author_uuid")?;

    Ok(CommentEntry {
        comment: Comment {
            id: row.get("id")?,
            post: row.get("post_id")?,
            author,
            text: row.get("text")?,
            created: row.get("created")?,
        },
        author: User::with_id(author, row.get::<_, String>("author_username")?),
    })
}
