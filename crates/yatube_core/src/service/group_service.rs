//! Group administration use-cases.
//!
//! Groups are managed by admins/editors outside the request policy, so
//! these calls take no `RequestContext`.

use crate::model::group::{Group, GroupDraft};
use crate::repo::group_repo::GroupRepository;
use crate::repo::Store;
use crate::service::{ServiceError, ServiceResult};
use log::info;

pub struct GroupService<S: Store> {
    store: S,
}

impl<S: Store> GroupService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn create(&self, draft: &GroupDraft) -> ServiceResult<Group> {
        let group = self.store.groups().create_group(draft)?;
        info!(
            "event=group_create module=service status=ok group_id={} slug={}",
            group.id, group.slug
        );
        Ok(group)
    }

    /// Replaces the group addressed by `slug` with `draft`.
    pub fn edit(&self, slug: &str, draft: &GroupDraft) -> ServiceResult<Group> {
        let current = self.by_slug(slug)?;
        let group = self.store.groups().update_group(current.id, draft)?;
        info!(
            "event=group_edit module=service status=ok group_id={}",
            group.id
        );
        Ok(group)
    }

    /// Deletes a group; its posts stay and lose their group.
    ///
    /// Returns the number of detached posts.
    pub fn delete(&self, slug: &str) -> ServiceResult<u64> {
        let group = self.by_slug(slug)?;
        let detached = self.store.groups().delete_group(group.id)?;
        info!(
            "event=group_delete module=service status=ok group_id={} detached_posts={detached}",
            group.id
        );
        Ok(detached)
    }

    pub fn by_slug(&self, slug: &str) -> ServiceResult<Group> {
        self.store
            .groups()
            .get_group_by_slug(slug)?
            .ok_or_else(|| ServiceError::not_found("group", slug))
    }

    /// All groups, ordered by title; used as post form choices.
    pub fn list(&self) -> ServiceResult<Vec<Group>> {
        Ok(self.store.groups().list_groups()?)
    }
}
