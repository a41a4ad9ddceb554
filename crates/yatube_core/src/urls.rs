//! Canonical paths of the routes the core redirects to.
//!
//! Path segments derived from user input are percent-encoded.

use crate::model::post::PostId;

pub fn index() -> String {
    "/".to_string()
}

pub fn new_post() -> String {
    "/new/".to_string()
}

pub fn follow_index() -> String {
    "/follow/".to_string()
}

pub fn group(slug: &str) -> String {
    format!("/group/{}/", segment(slug))
}

pub fn profile(username: &str) -> String {
    format!("/{}/", segment(username))
}

pub fn profile_follow(username: &str) -> String {
    format!("/{}/follow/", segment(username))
}

pub fn profile_unfollow(username: &str) -> String {
    format!("/{}/unfollow/", segment(username))
}

pub fn post(username: &str, post_id: PostId) -> String {
    format!("/{}/{post_id}/", segment(username))
}

pub fn post_edit(username: &str, post_id: PostId) -> String {
    format!("/{}/{post_id}/edit/", segment(username))
}

pub fn add_comment(username: &str, post_id: PostId) -> String {
    format!("/{}/{post_id}/comment/", segment(username))
}

/// Builds the login redirect for an anonymous request to `next`.
///
/// `/` stays literal in the `next` value.
pub fn login_redirect(login_url: &str, next: &str) -> String {
    let encoded = urlencoding::encode(next).replace("%2F", "/");
    format!("{login_url}?next={encoded}")
}

fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
