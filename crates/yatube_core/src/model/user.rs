//! Mirrored identity record.
//!
//! Users are issued by the external identity provider. The core keeps a
//! copy so post, comment and follow references can cascade.

use super::{require_bounded, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable user identifier issued by the identity provider.
pub type UserId = Uuid;

const USERNAME_MAX_CHARS: usize = 150;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid username regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Unique, used in profile and post paths.
    pub username: String,
}

impl User {
    /// Creates a user with a freshly generated id.
    pub fn new(username: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), username)
    }

    /// Creates a user with an id that already exists in the identity provider.
    pub fn with_id(id: UserId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::default();
        require_bounded(&mut errors, "username", &self.username, USERNAME_MAX_CHARS);
        if errors.is_empty() && !USERNAME_RE.is_match(&self.username) {
            errors.push(
                "username",
                "enter a valid username: letters, digits and @/./+/-/_ only",
            );
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::User;

    #[test]
    fn accepts_identity_provider_usernames() {
        assert!(User::new("test-user").validate().is_ok());
        assert!(User::new("leo.tolstoy@mail+1").validate().is_ok());
    }

    #[test]
    fn rejects_blank_and_path_breaking_usernames() {
        assert!(User::new("  ").validate().is_err());
        assert!(User::new("a/b").validate().is_err());
        assert!(User::new("x".repeat(151)).validate().is_err());
    }
}
