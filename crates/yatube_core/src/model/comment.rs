//! Comment model. Comments are append-only.

use super::post::PostId;
use super::user::{User, UserId};
use super::{require_text, ValidationError};
use serde::{Deserialize, Serialize};

pub type CommentId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentDraft {
    pub text: String,
}

impl CommentDraft {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::default();
        require_text(&mut errors, "text", &self.text);
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub post: PostId,
    pub author: UserId,
    pub text: String,
    /// Epoch milliseconds.
    pub created: i64,
}

/// Comment joined with its author for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentEntry {
    pub comment: Comment,
    pub author: User,
}
