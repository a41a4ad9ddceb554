//! Feed use-cases: index, group, profile and following feeds.
//!
//! # Invariants
//! - Every feed is ordered `pub_date DESC` and paginated by the configured
//!   page size.
//! - Index pages are cached per resolved page number and served until the
//!   TTL elapses or `invalidate_index` is called, even if posts change
//!   meanwhile.
//! - The following feed requires an authenticated requester.

use crate::config::{ConfigError, CoreConfig};
use crate::feed::cache::{PageCache, DEFAULT_MAX_PAGES};
use crate::feed::{assemble, fetch, locate, paginator::Page};
use crate::model::follow::Follow;
use crate::model::group::Group;
use crate::model::post::PostEntry;
use crate::model::user::User;
use crate::policy::{AccessPolicy, RequestContext};
use crate::repo::follow_repo::FollowRepository;
use crate::repo::group_repo::GroupRepository;
use crate::repo::post_repo::PostFilter;
use crate::repo::user_repo::UserRepository;
use crate::repo::Store;
use crate::service::follow_service::FollowCounts;
use crate::service::{ServiceError, ServiceResult, ViewOutcome};
use log::debug;
use serde::Serialize;

/// Group feed payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupFeed {
    pub group: Group,
    pub page: Page<PostEntry>,
}

/// Profile feed payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileFeed {
    pub author: User,
    pub page: Page<PostEntry>,
    /// Total posts by the author across all pages.
    pub post_count: u64,
    /// Whether the requester follows the author.
    pub following: bool,
    pub counts: FollowCounts,
}

pub struct FeedService<S: Store> {
    store: S,
    policy: AccessPolicy,
    page_size: u32,
    index_cache: PageCache<Page<PostEntry>>,
}

impl<S: Store> FeedService<S> {
    pub fn new(store: S, config: &CoreConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            store,
            policy: AccessPolicy::new(config),
            page_size: config.page_size,
            index_cache: PageCache::new(config.index_cache_ttl(), DEFAULT_MAX_PAGES),
        })
    }

    /// Global feed. Cached per resolved page number, so every raw value that
    /// lands on the same page shares one entry.
    pub fn index(&self, raw_page: Option<&str>) -> ServiceResult<Page<PostEntry>> {
        let posts = self.store.posts();
        let (paginator, number) = locate(posts, &PostFilter::All, raw_page, self.page_size)?;
        if let Some(page) = self.index_cache.get(number) {
            return Ok(page);
        }

        let page = fetch(posts, PostFilter::All, &paginator, number)?;
        debug!(
            "event=feed_assemble module=service feed=index page={} count={}",
            page.number, page.count
        );
        self.index_cache.put(number, page.clone());
        Ok(page)
    }

    /// Drops every cached index page.
    pub fn invalidate_index(&self) {
        self.index_cache.invalidate();
    }

    /// Index pages currently held in the cache.
    pub fn cached_index_pages(&self) -> u64 {
        self.index_cache.len()
    }

    pub fn group_feed(&self, slug: &str, raw_page: Option<&str>) -> ServiceResult<GroupFeed> {
        let group = self
            .store
            .groups()
            .get_group_by_slug(slug)?
            .ok_or_else(|| ServiceError::not_found("group", slug))?;
        let page = assemble(
            self.store.posts(),
            PostFilter::Group(group.id),
            raw_page,
            self.page_size,
        )?;
        Ok(GroupFeed { group, page })
    }

    pub fn profile_feed(
        &self,
        ctx: &RequestContext,
        username: &str,
        raw_page: Option<&str>,
    ) -> ServiceResult<ProfileFeed> {
        let author = self
            .store
            .users()
            .get_user_by_username(username)?
            .ok_or_else(|| ServiceError::not_found("user", username))?;
        let page = assemble(
            self.store.posts(),
            PostFilter::Author(author.id),
            raw_page,
            self.page_size,
        )?;
        let following = match ctx.user() {
            Some(viewer) => self
                .store
                .follows()
                .is_following(&Follow::new(viewer.id, author.id))?,
            None => false,
        };
        let counts = FollowCounts {
            followers: self.store.follows().follower_count(author.id)?,
            following: self.store.follows().following_count(author.id)?,
        };

        Ok(ProfileFeed {
            post_count: page.count,
            author,
            page,
            following,
            counts,
        })
    }

    /// Posts by authors the requester follows.
    pub fn follow_feed(
        &self,
        ctx: &RequestContext,
        raw_page: Option<&str>,
    ) -> ServiceResult<ViewOutcome<Page<PostEntry>>> {
        let user = match self.policy.require_authenticated(ctx) {
            Ok(user) => user,
            Err(denial) => return Ok(denial.into()),
        };
        let page = assemble(
            self.store.posts(),
            PostFilter::FollowedBy(user.id),
            raw_page,
            self.page_size,
        )?;
        Ok(ViewOutcome::Render(page))
    }
}
