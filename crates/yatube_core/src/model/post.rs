//! Post model.
//!
//! # Invariants
//! - `text` is non-empty after trimming.
//! - `pub_date` and `author` never change after creation.
//! - Default ordering is `pub_date DESC`, newest insertion first on ties.

use super::group::{Group, GroupId};
use super::user::{User, UserId};
use super::{require_text, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type PostId = i64;

const DISPLAY_PREFIX_CHARS: usize = 15;

/// Writable post fields accepted by the post form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDraft {
    pub text: String,
    pub group: Option<GroupId>,
    /// Reference returned by the attachment store.
    pub image: Option<String>,
}

impl PostDraft {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            group: None,
            image: None,
        }
    }

    pub fn in_group(mut self, group: GroupId) -> Self {
        self.group = Some(group);
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Checks fields that need no storage lookup.
    ///
    /// Group existence is checked by the service against storage.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::default();
        require_text(&mut errors, "text", &self.text);
        if let Some(image) = self.image.as_deref() {
            if image.trim().is_empty() {
                errors.push("image", "attachment reference cannot be blank");
            }
        }
        errors.into_result()
    }
}

/// Stored post row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub text: String,
    /// Epoch milliseconds.
    pub pub_date: i64,
    pub author: UserId,
    pub group: Option<GroupId>,
    pub image: Option<String>,
}

impl Post {
    pub fn is_authored_by(&self, user: &User) -> bool {
        self.author == user.id
    }
}

impl Display for Post {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let prefix: String = self.text.chars().take(DISPLAY_PREFIX_CHARS).collect();
        f.write_str(&prefix)
    }
}

/// Post joined with the records a feed entry renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostEntry {
    pub post: Post,
    pub author: User,
    pub group: Option<Group>,
    pub comment_count: u64,
}

#[cfg(test)]
mod tests {
    use super::{Post, PostDraft};
    use uuid::Uuid;

    #[test]
    fn whitespace_only_text_is_rejected() {
        let err = PostDraft::new(" \n\t").validate().unwrap_err();
        assert!(err.has_field("text"));
    }

    #[test]
    fn blank_image_reference_is_rejected() {
        let err = PostDraft::new("hello").with_image("  ").validate().unwrap_err();
        assert!(err.has_field("image"));
        assert!(!err.has_field("text"));
    }

    #[test]
    fn post_displays_first_fifteen_chars() {
        let post = Post {
            id: 1,
            text: "Тестовый пост для проверки".to_string(),
            pub_date: 0,
            author: Uuid::new_v4(),
            group: None,
            image: None,
        };
        assert_eq!(post.to_string(), "Тестовый пост д");
    }
}
