//! User mirror use-cases.
//!
//! The identity provider owns accounts; these calls keep the local copy
//! in step with it.

use crate::model::user::{User, UserId};
use crate::repo::user_repo::UserRepository;
use crate::repo::Store;
use crate::service::{ServiceError, ServiceResult};
use log::info;

pub struct UserService<S: Store> {
    store: S,
}

impl<S: Store> UserService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Mirrors an identity-provider user into storage.
    pub fn register(&self, user: &User) -> ServiceResult<UserId> {
        let id = self.store.users().create_user(user)?;
        info!("event=user_register module=service status=ok user={id}");
        Ok(id)
    }

    /// Looks a user up by username; unknown names are `NotFound`.
    pub fn by_username(&self, username: &str) -> ServiceResult<User> {
        self.store
            .users()
            .get_user_by_username(username)?
            .ok_or_else(|| ServiceError::not_found("user", username))
    }

    /// Removes a user with their posts, comments and follow edges.
    pub fn delete(&self, id: UserId) -> ServiceResult<()> {
        self.store.users().delete_user(id)?;
        info!("event=user_delete module=service status=ok user={id}");
        Ok(())
    }
}
