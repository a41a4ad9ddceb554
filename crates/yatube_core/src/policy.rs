//! Access policy over one request.
//!
//! # Responsibility
//! - Classify the requester as anonymous, authenticated non-author or author.
//! - Turn a refused operation into the redirect the caller should follow.
//!
//! # Invariants
//! - Every check takes an explicit `RequestContext`; there is no ambient
//!   current user.
//! - A refusal is never an error: it always carries a redirect location.

use crate::config::CoreConfig;
use crate::model::user::{User, UserId};
use crate::urls;
use log::info;

/// Who is making the request, as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viewer {
    Anonymous,
    Authenticated(User),
}

/// Explicit per-request context passed into every policy check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    viewer: Viewer,
    /// Requested path, used as the `next` target for login redirects.
    path: String,
}

impl RequestContext {
    pub fn new(viewer: Viewer, path: impl Into<String>) -> Self {
        Self {
            viewer,
            path: path.into(),
        }
    }

    pub fn anonymous(path: impl Into<String>) -> Self {
        Self::new(Viewer::Anonymous, path)
    }

    pub fn authenticated(user: User, path: impl Into<String>) -> Self {
        Self::new(Viewer::Authenticated(user), path)
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn user(&self) -> Option<&User> {
        match &self.viewer {
            Viewer::Anonymous => None,
            Viewer::Authenticated(user) => Some(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }
}

/// Requester classification relative to one owned resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessState {
    Anonymous,
    NonAuthor,
    Author,
}

impl AccessState {
    pub fn classify(ctx: &RequestContext, owner: UserId) -> Self {
        match ctx.user() {
            None => Self::Anonymous,
            Some(user) if user.id == owner => Self::Author,
            Some(_) => Self::NonAuthor,
        }
    }
}

/// A refused operation and where the requester goes instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    /// Anonymous requester; sent to login with a `next` parameter.
    LoginRequired { location: String },
    /// Authenticated but not the owner; sent to the read view.
    NotAuthor { location: String },
}

impl Denial {
    pub fn location(&self) -> &str {
        match self {
            Self::LoginRequired { location } | Self::NotAuthor { location } => location,
        }
    }
}

/// Authorization rules for post, comment and follow operations.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    login_url: String,
}

impl AccessPolicy {
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            login_url: config.login_url.clone(),
        }
    }

    /// Admits any authenticated requester.
    ///
    /// Gates post creation, commenting, follow/unfollow and the following feed.
    pub fn require_authenticated<'a>(&self, ctx: &'a RequestContext) -> Result<&'a User, Denial> {
        ctx.user().ok_or_else(|| self.login_required(ctx))
    }

    /// Admits only the author of the post at `read_location`.
    pub fn require_author<'a>(
        &self,
        ctx: &'a RequestContext,
        owner: UserId,
        read_location: String,
    ) -> Result<&'a User, Denial> {
        match (AccessState::classify(ctx, owner), ctx.user()) {
            (AccessState::Author, Some(user)) => Ok(user),
            (AccessState::NonAuthor, Some(user)) => {
                info!(
                    "event=access_denied module=policy reason=not_author user={} owner={}",
                    user.id, owner
                );
                Err(Denial::NotAuthor {
                    location: read_location,
                })
            }
            _ => Err(self.login_required(ctx)),
        }
    }

    fn login_required(&self, ctx: &RequestContext) -> Denial {
        info!("event=access_denied module=policy reason=login_required");
        Denial::LoginRequired {
            location: urls::login_redirect(&self.login_url, ctx.path()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AccessPolicy, AccessState, Denial, RequestContext};
    use crate::config::CoreConfig;
    use crate::model::user::User;

    fn policy() -> AccessPolicy {
        AccessPolicy::new(&CoreConfig::default())
    }

    #[test]
    fn classify_covers_three_states() {
        let author = User::new("author");
        let other = User::new("other");

        let anonymous = RequestContext::anonymous("/");
        let as_author = RequestContext::authenticated(author.clone(), "/");
        let as_other = RequestContext::authenticated(other, "/");

        assert_eq!(
            AccessState::classify(&anonymous, author.id),
            AccessState::Anonymous
        );
        assert_eq!(
            AccessState::classify(&as_author, author.id),
            AccessState::Author
        );
        assert_eq!(
            AccessState::classify(&as_other, author.id),
            AccessState::NonAuthor
        );
    }

    #[test]
    fn anonymous_is_sent_to_login_with_next() {
        let ctx = RequestContext::anonymous("/new/");
        let denial = policy().require_authenticated(&ctx).unwrap_err();
        assert_eq!(
            denial,
            Denial::LoginRequired {
                location: "/auth/login/?next=/new/".to_string()
            }
        );
    }

    #[test]
    fn non_author_is_sent_to_read_view() {
        let author = User::new("author");
        let ctx = RequestContext::authenticated(User::new("other"), "/author/1/edit/");
        let denial = policy()
            .require_author(&ctx, author.id, "/author/1/".to_string())
            .unwrap_err();
        assert_eq!(denial.location(), "/author/1/");
        assert!(matches!(denial, Denial::NotAuthor { .. }));
    }

    #[test]
    fn author_is_admitted() {
        let author = User::new("author");
        let ctx = RequestContext::authenticated(author.clone(), "/author/1/edit/");
        let admitted = policy()
            .require_author(&ctx, author.id, "/author/1/".to_string())
            .unwrap();
        assert_eq!(admitted, &author);
    }
}
