//! Follow graph use-cases.
//!
//! # Invariants
//! - Following twice leaves exactly one edge.
//! - Unfollowing a missing edge changes nothing and is not an error.
//! - Following yourself is skipped; no edge is written.

use crate::config::{ConfigError, CoreConfig};
use crate::model::follow::Follow;
use crate::model::user::{User, UserId};
use crate::policy::{AccessPolicy, RequestContext};
use crate::repo::follow_repo::FollowRepository;
use crate::repo::user_repo::UserRepository;
use crate::repo::Store;
use crate::service::{ServiceError, ServiceResult, WriteOutcome};
use crate::urls;
use log::info;
use serde::Serialize;

/// Follow-graph counters shown on a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FollowCounts {
    pub followers: u64,
    pub following: u64,
}

pub struct FollowService<S: Store> {
    store: S,
    policy: AccessPolicy,
}

impl<S: Store> FollowService<S> {
    pub fn new(store: S, config: &CoreConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            store,
            policy: AccessPolicy::new(config),
        })
    }

    /// Subscribes the requester to `username`, then redirects to the profile.
    ///
    /// The committed value is `true` only when a new edge was written.
    pub fn follow(
        &self,
        ctx: &RequestContext,
        username: &str,
    ) -> ServiceResult<WriteOutcome<bool>> {
        let user = match self.policy.require_authenticated(ctx) {
            Ok(user) => user,
            Err(denial) => return Ok(denial.into()),
        };
        let author = self.author(username)?;
        let edge = Follow::new(user.id, author.id);

        let created = if edge.is_self_follow() {
            info!(
                "event=follow module=service status=skipped reason=self_follow user={}",
                user.id
            );
            false
        } else {
            let created = self.store.follows().follow(&edge)?;
            info!(
                "event=follow module=service status=ok user={} author={} created={created}",
                user.id, author.id
            );
            created
        };

        Ok(WriteOutcome::Committed {
            value: created,
            redirect: urls::profile(&author.username),
        })
    }

    /// Removes the requester's edge to `username` if present.
    ///
    /// The committed value is `true` only when an edge was removed.
    pub fn unfollow(
        &self,
        ctx: &RequestContext,
        username: &str,
    ) -> ServiceResult<WriteOutcome<bool>> {
        let user = match self.policy.require_authenticated(ctx) {
            Ok(user) => user,
            Err(denial) => return Ok(denial.into()),
        };
        let author = self.author(username)?;
        let edge = Follow::new(user.id, author.id);

        let removed = if edge.is_self_follow() {
            false
        } else {
            self.store.follows().unfollow(&edge)?
        };
        info!(
            "event=unfollow module=service status=ok user={} author={} removed={removed}",
            user.id, author.id
        );

        Ok(WriteOutcome::Committed {
            value: removed,
            redirect: urls::profile(&author.username),
        })
    }

    pub fn is_following(&self, user: UserId, author: UserId) -> ServiceResult<bool> {
        Ok(self
            .store
            .follows()
            .is_following(&Follow::new(user, author))?)
    }

    pub fn counts(&self, user: UserId) -> ServiceResult<FollowCounts> {
        Ok(FollowCounts {
            followers: self.store.follows().follower_count(user)?,
            following: self.store.follows().following_count(user)?,
        })
    }

    fn author(&self, username: &str) -> ServiceResult<User> {
        self.store
            .users()
            .get_user_by_username(username)?
            .ok_or_else(|| ServiceError::not_found("user", username))
    }
}
