//! Post and comment use-cases.
//!
//! # Responsibility
//! - Create and edit posts behind the access policy.
//! - Assemble the post detail view with comments.
//! - Append comments.
//!
//! # Invariants
//! - Only the author can edit a post; anyone else is redirected to the
//!   post's read view and nothing is written.
//! - A post is addressed by `(username, post_id)`; a mismatch is `NotFound`.
//! - Event logs carry ids only, never post or comment text.

use crate::config::{ConfigError, CoreConfig};
use crate::model::comment::{Comment, CommentDraft, CommentEntry};
use crate::model::follow::Follow;
use crate::model::group::Group;
use crate::model::post::{Post, PostDraft, PostEntry, PostId};
use crate::model::user::User;
use crate::model::ValidationError;
use crate::policy::{AccessPolicy, RequestContext};
use crate::repo::comment_repo::CommentRepository;
use crate::repo::follow_repo::FollowRepository;
use crate::repo::group_repo::GroupRepository;
use crate::repo::post_repo::{PostFilter, PostRepository};
use crate::repo::user_repo::UserRepository;
use crate::repo::Store;
use crate::service::{ServiceError, ServiceResult, ViewOutcome, WriteOutcome};
use crate::urls;
use log::info;
use serde::Serialize;

const INVALID_GROUP_MESSAGE: &str =
    "select a valid choice; that choice is not one of the available choices";

/// Data the post create/edit form renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostFormContext {
    /// Selectable groups, ordered by title.
    pub groups: Vec<Group>,
    /// Post being edited; `None` on the create form.
    pub post: Option<Post>,
}

/// Post detail view payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostDetail {
    pub entry: PostEntry,
    /// Total posts by the same author.
    pub author_post_count: u64,
    /// Oldest first.
    pub comments: Vec<CommentEntry>,
    /// Whether the requester follows the author.
    pub following: bool,
}

pub struct PostService<S: Store> {
    store: S,
    policy: AccessPolicy,
}

impl<S: Store> PostService<S> {
    pub fn new(store: S, config: &CoreConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            store,
            policy: AccessPolicy::new(config),
        })
    }

    /// Opens the create form.
    pub fn new_post_form(
        &self,
        ctx: &RequestContext,
    ) -> ServiceResult<ViewOutcome<PostFormContext>> {
        if let Err(denial) = self.policy.require_authenticated(ctx) {
            return Ok(denial.into());
        }
        Ok(ViewOutcome::Render(PostFormContext {
            groups: self.store.groups().list_groups()?,
            post: None,
        }))
    }

    /// Creates a post authored by the requester and redirects to the index.
    pub fn create_post(
        &self,
        ctx: &RequestContext,
        draft: &PostDraft,
    ) -> ServiceResult<WriteOutcome<Post>> {
        let author = match self.policy.require_authenticated(ctx) {
            Ok(user) => user,
            Err(denial) => return Ok(denial.into()),
        };
        if let Err(errors) = self.check_draft(draft)? {
            return Ok(WriteOutcome::Invalid {
                errors,
                redirect: None,
            });
        }

        let post = self.store.posts().create_post(author.id, draft)?;
        info!(
            "event=post_create module=service status=ok post_id={} author={} group_id={}",
            post.id,
            author.id,
            post.group.map_or_else(|| "none".to_string(), |id| id.to_string())
        );
        Ok(WriteOutcome::Committed {
            value: post,
            redirect: urls::index(),
        })
    }

    /// Opens the edit form for the post's author.
    pub fn edit_post_form(
        &self,
        ctx: &RequestContext,
        username: &str,
        post_id: PostId,
    ) -> ServiceResult<ViewOutcome<PostFormContext>> {
        if let Err(denial) = self.policy.require_authenticated(ctx) {
            return Ok(denial.into());
        }
        let (author, post) = self.addressed_post(username, post_id)?;
        if let Err(denial) =
            self.policy
                .require_author(ctx, post.author, urls::post(&author.username, post.id))
        {
            return Ok(denial.into());
        }
        Ok(ViewOutcome::Render(PostFormContext {
            groups: self.store.groups().list_groups()?,
            post: Some(post),
        }))
    }

    /// Replaces the editable fields of a post when the requester is its author.
    ///
    /// `pub_date` and `author` are kept. Success redirects to the post view.
    pub fn edit_post(
        &self,
        ctx: &RequestContext,
        username: &str,
        post_id: PostId,
        draft: &PostDraft,
    ) -> ServiceResult<WriteOutcome<Post>> {
        if let Err(denial) = self.policy.require_authenticated(ctx) {
            return Ok(denial.into());
        }
        let (author, post) = self.addressed_post(username, post_id)?;
        let read_location = urls::post(&author.username, post.id);
        if let Err(denial) = self
            .policy
            .require_author(ctx, post.author, read_location.clone())
        {
            return Ok(denial.into());
        }
        if let Err(errors) = self.check_draft(draft)? {
            return Ok(WriteOutcome::Invalid {
                errors,
                redirect: None,
            });
        }

        let updated = self.store.posts().update_post(post.id, draft)?;
        info!(
            "event=post_edit module=service status=ok post_id={} author={}",
            updated.id, updated.author
        );
        Ok(WriteOutcome::Committed {
            value: updated,
            redirect: read_location,
        })
    }

    /// Loads the post detail view.
    pub fn post_view(
        &self,
        ctx: &RequestContext,
        username: &str,
        post_id: PostId,
    ) -> ServiceResult<PostDetail> {
        let (author, post) = self.addressed_post(username, post_id)?;
        let entry = self
            .store
            .posts()
            .get_post_entry(post.id)?
            .ok_or_else(|| ServiceError::not_found("post", post.id))?;
        let author_post_count = self
            .store
            .posts()
            .count_posts(&PostFilter::Author(author.id))?;
        let comments = self.store.comments().list_comments(post.id)?;
        let following = match ctx.user() {
            Some(viewer) => self
                .store
                .follows()
                .is_following(&Follow::new(viewer.id, author.id))?,
            None => false,
        };

        Ok(PostDetail {
            entry,
            author_post_count,
            comments,
            following,
        })
    }

    /// Appends a comment by the requester and redirects back to the post.
    ///
    /// An empty comment is dropped; the redirect still happens and the
    /// form errors are reported alongside it.
    pub fn add_comment(
        &self,
        ctx: &RequestContext,
        username: &str,
        post_id: PostId,
        draft: &CommentDraft,
    ) -> ServiceResult<WriteOutcome<Comment>> {
        let commenter = match self.policy.require_authenticated(ctx) {
            Ok(user) => user,
            Err(denial) => return Ok(denial.into()),
        };
        let (author, post) = self.addressed_post(username, post_id)?;
        let redirect = urls::post(&author.username, post.id);
        if let Err(errors) = draft.validate() {
            return Ok(WriteOutcome::Invalid {
                errors,
                redirect: Some(redirect),
            });
        }

        let comment = self
            .store
            .comments()
            .add_comment(post.id, commenter.id, draft)?;
        info!(
            "event=comment_add module=service status=ok comment_id={} post_id={} author={}",
            comment.id, post.id, commenter.id
        );
        Ok(WriteOutcome::Committed {
            value: comment,
            redirect,
        })
    }

    /// Removes a post and its comments. Not reachable by end users.
    pub fn delete_post(&self, post_id: PostId) -> ServiceResult<()> {
        self.store.posts().delete_post(post_id)?;
        info!("event=post_delete module=service status=ok post_id={post_id}");
        Ok(())
    }

    fn addressed_post(&self, username: &str, post_id: PostId) -> ServiceResult<(User, Post)> {
        let author = self
            .store
            .users()
            .get_user_by_username(username)?
            .ok_or_else(|| ServiceError::not_found("user", username))?;
        let post = self
            .store
            .posts()
            .get_post(post_id)?
            .filter(|post| post.author == author.id)
            .ok_or_else(|| ServiceError::not_found("post", post_id))?;
        Ok((author, post))
    }

    /// Field checks plus the group lookup the form's choice list implies.
    fn check_draft(&self, draft: &PostDraft) -> ServiceResult<Result<(), ValidationError>> {
        let mut errors = match draft.validate() {
            Ok(()) => ValidationError::default(),
            Err(errors) => errors,
        };
        if let Some(group_id) = draft.group {
            if self.store.groups().get_group(group_id)?.is_none() {
                errors.push("group", INVALID_GROUP_MESSAGE);
            }
        }
        Ok(errors.into_result())
    }
}
