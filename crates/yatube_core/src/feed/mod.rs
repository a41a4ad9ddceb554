//! Feed assembly: filtered, reverse-chronological, paginated post listings.
//!
//! # Responsibility
//! - Resolve a raw page parameter against the size of a filtered listing.
//! - Fetch exactly one page of post entries.
//! - Cache rendered index pages for a bounded time.
//!
//! # Invariants
//! - Out-of-range page numbers clamp to the nearest valid page.
//! - An empty listing still yields one empty page.

pub mod cache;
pub mod paginator;

use crate::model::post::PostEntry;
use crate::repo::post_repo::{PostFilter, PostListQuery, PostRepository};
use crate::repo::RepoResult;
use paginator::{Page, Paginator};

/// Loads the requested page of posts matching `filter`.
pub fn assemble<P: PostRepository>(
    posts: &P,
    filter: PostFilter,
    raw_page: Option<&str>,
    per_page: u32,
) -> RepoResult<Page<PostEntry>> {
    let (paginator, number) = locate(posts, &filter, raw_page, per_page)?;
    fetch(posts, filter, &paginator, number)
}

/// Counts the listing and resolves `raw_page` to a valid page number.
pub fn locate<P: PostRepository>(
    posts: &P,
    filter: &PostFilter,
    raw_page: Option<&str>,
    per_page: u32,
) -> RepoResult<(Paginator, u32)> {
    let paginator = Paginator::new(per_page, posts.count_posts(filter)?);
    let number = paginator.resolve(raw_page);
    Ok((paginator, number))
}

/// Fetches page `number` of a listing already sized by `paginator`.
pub fn fetch<P: PostRepository>(
    posts: &P,
    filter: PostFilter,
    paginator: &Paginator,
    number: u32,
) -> RepoResult<Page<PostEntry>> {
    let items = posts.list_posts(&PostListQuery {
        filter,
        limit: paginator.per_page(),
        offset: paginator.offset(number),
    })?;
    Ok(paginator.page(number, items))
}
