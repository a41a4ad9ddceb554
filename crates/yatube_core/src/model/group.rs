//! Community group model.
//!
//! # Invariants
//! - `slug` is unique and URL-safe; lookups by slug are the public identity.
//! - Removing a group never removes its posts.

use super::{require_bounded, require_text, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type GroupId = i64;

const TITLE_MAX_CHARS: usize = 200;
const SLUG_MAX_CHARS: usize = 200;

static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("valid slug regex"));

/// Writable group fields, used for both create and edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDraft {
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl GroupDraft {
    pub fn new(
        title: impl Into<String>,
        slug: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            slug: slug.into(),
            description: description.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::default();
        require_bounded(&mut errors, "title", &self.title, TITLE_MAX_CHARS);
        require_bounded(&mut errors, "slug", &self.slug, SLUG_MAX_CHARS);
        if !errors.has_field("slug") && !SLUG_RE.is_match(&self.slug) {
            errors.push(
                "slug",
                "enter a valid slug: letters, numbers, underscores or hyphens",
            );
        }
        require_text(&mut errors, "description", &self.description);
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl Display for Group {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::{Group, GroupDraft};

    #[test]
    fn slug_must_be_url_safe() {
        let draft = GroupDraft::new("Cats", "cats and dogs", "about pets");
        let err = draft.validate().unwrap_err();
        assert!(err.has_field("slug"));
        assert!(!err.has_field("title"));
    }

    #[test]
    fn all_fields_are_required() {
        let err = GroupDraft::new("", "", " ").validate().unwrap_err();
        assert_eq!(err.errors.len(), 3);
    }

    #[test]
    fn group_displays_as_title() {
        let group = Group {
            id: 1,
            title: "Test group".to_string(),
            slug: "test-group".to_string(),
            description: "desc".to_string(),
        };
        assert_eq!(group.to_string(), "Test group");
    }
}
