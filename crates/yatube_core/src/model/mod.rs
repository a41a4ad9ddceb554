//! Domain model for users, groups, posts, comments and follow edges.
//!
//! # Responsibility
//! - Define plain data structures used by core business logic.
//! - Provide explicit validation functions for every writable shape.
//!
//! # Invariants
//! - Timestamps are Unix epoch milliseconds assigned by storage.
//! - `User` is referenced by content, never owned by it.

use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod comment;
pub mod follow;
pub mod group;
pub mod post;
pub mod user;

/// One rejected form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Form field name (`text`, `group`, `slug`, ...).
    pub field: &'static str,
    /// Human-readable reason.
    pub message: String,
}

/// Field-level validation failure, surfaced to callers as form errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    /// Creates an error with a single rejected field.
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut error = Self::default();
        error.push(field, message);
        error
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns whether `field` has at least one error.
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|error| error.field == field)
    }

    /// Converts the accumulated errors into a `Result`.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for error in &self.errors {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
            first = false;
        }
        Ok(())
    }
}

impl Error for ValidationError {}

pub(crate) const REQUIRED_MESSAGE: &str = "this field is required";

/// Validates a required free-text field.
pub(crate) fn require_text(errors: &mut ValidationError, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.push(field, REQUIRED_MESSAGE);
    }
}

/// Validates a bounded single-line field.
pub(crate) fn require_bounded(
    errors: &mut ValidationError,
    field: &'static str,
    value: &str,
    max_chars: usize,
) {
    if value.trim().is_empty() {
        errors.push(field, REQUIRED_MESSAGE);
    } else if value.chars().count() > max_chars {
        errors.push(
            field,
            format!("ensure this value has at most {max_chars} characters"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::ValidationError;

    #[test]
    fn display_joins_field_errors() {
        let mut error = ValidationError::single("text", "this field is required");
        error.push("group", "select a valid choice");
        assert_eq!(
            error.to_string(),
            "text: this field is required; group: select a valid choice"
        );
        assert!(error.has_field("group"));
    }

    #[test]
    fn empty_error_converts_to_ok() {
        assert!(ValidationError::default().into_result().is_ok());
    }
}
