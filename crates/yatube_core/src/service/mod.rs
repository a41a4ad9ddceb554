//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls, policy checks and feed assembly into
//!   request-level operations.
//! - Return outcomes (render, redirect, form errors) instead of responses,
//!   so the web layer stays outside the core.
//!
//! # Invariants
//! - Refused operations perform no writes.
//! - Missing targets surface as `ServiceError::NotFound`, never as panics.

use crate::model::ValidationError;
use crate::policy::Denial;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod feed_service;
pub mod follow_service;
pub mod group_service;
pub mod post_service;
pub mod user_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    /// 404-class: the addressed group, post or user does not exist.
    NotFound { entity: &'static str, key: String },
    /// Input rejected outside a form flow (admin and registration paths).
    Invalid(ValidationError),
    Repo(RepoError),
}

impl ServiceError {
    pub(crate) fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { entity, key } => write!(f, "{entity} not found: {key}"),
            Self::Invalid(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound { .. } => None,
            Self::Invalid(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, key } => Self::NotFound { entity, key },
            RepoError::Validation(err) => Self::Invalid(err),
            RepoError::Conflict {
                entity,
                field,
                value,
            } => Self::Invalid(ValidationError::single(
                field,
                format!("{entity} with this {field} already exists: `{value}`"),
            )),
            other => Self::Repo(other),
        }
    }
}

/// Result of a write request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome<T> {
    /// The write happened; the caller redirects to `redirect`.
    Committed { value: T, redirect: String },
    /// The form was rejected. With `redirect` set the caller redirects
    /// anyway; otherwise it re-renders the form with `errors`.
    Invalid {
        errors: ValidationError,
        redirect: Option<String>,
    },
    /// The requester may not perform this write.
    Denied(Denial),
}

impl<T> WriteOutcome<T> {
    /// Where the caller should redirect, if anywhere.
    pub fn redirect_location(&self) -> Option<&str> {
        match self {
            Self::Committed { redirect, .. } => Some(redirect),
            Self::Invalid { redirect, .. } => redirect.as_deref(),
            Self::Denied(denial) => Some(denial.location()),
        }
    }

    pub fn committed(self) -> Option<T> {
        match self {
            Self::Committed { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// Result of a read request that may be refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewOutcome<T> {
    Render(T),
    Denied(Denial),
}

impl<T> ViewOutcome<T> {
    pub fn rendered(self) -> Option<T> {
        match self {
            Self::Render(value) => Some(value),
            Self::Denied(_) => None,
        }
    }

    pub fn redirect_location(&self) -> Option<&str> {
        match self {
            Self::Render(_) => None,
            Self::Denied(denial) => Some(denial.location()),
        }
    }
}

impl<T> From<Denial> for ViewOutcome<T> {
    fn from(value: Denial) -> Self {
        Self::Denied(value)
    }
}

impl<T> From<Denial> for WriteOutcome<T> {
    fn from(value: Denial) -> Self {
        Self::Denied(value)
    }
}
