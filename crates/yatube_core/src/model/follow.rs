//! Directed follow edge between two users.
//!
//! # Invariants
//! - At most one edge exists per `(user, author)` pair.
//! - Storage does not forbid `user == author`; the follow service skips it.

use super::user::UserId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Follow {
    /// Subscriber.
    pub user: UserId,
    /// Followed author.
    pub author: UserId,
}

impl Follow {
    pub fn new(user: UserId, author: UserId) -> Self {
        Self { user, author }
    }

    pub fn is_self_follow(&self) -> bool {
        self.user == self.author
    }
}
