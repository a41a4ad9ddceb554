use rusqlite::Connection;
use yatube_core::db::open_db_in_memory;
use yatube_core::repo::follow_repo::FollowRepository;
use yatube_core::repo::post_repo::PostRepository;
use yatube_core::urls;
use yatube_core::{
    CoreConfig, FeedService, Follow, FollowService, PostDraft, RequestContext, SqliteStore, Store,
    User, UserService, WriteOutcome,
};

fn register(conn: &Connection, username: &str) -> User {
    let user = User::new(username);
    UserService::new(SqliteStore::new(conn))
        .register(&user)
        .unwrap();
    user
}

fn edge_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM follows;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn follow_twice_leaves_exactly_one_edge() {
    let conn = open_db_in_memory().unwrap();
    let reader = register(&conn, "reader");
    let author = register(&conn, "author");
    let service = FollowService::new(SqliteStore::new(&conn), &CoreConfig::default()).unwrap();
    let ctx = RequestContext::authenticated(reader.clone(), urls::profile_follow("author"));

    let first = service.follow(&ctx, "author").unwrap();
    assert_eq!(
        first,
        WriteOutcome::Committed {
            value: true,
            redirect: "/author/".to_string()
        }
    );
    let second = service.follow(&ctx, "author").unwrap();
    assert_eq!(second.committed(), Some(false));

    assert_eq!(edge_count(&conn), 1);
    assert!(service.is_following(reader.id, author.id).unwrap());
    assert!(!service.is_following(author.id, reader.id).unwrap());
}

#[test]
fn repository_follow_is_idempotent_without_constraint_errors() {
    let conn = open_db_in_memory().unwrap();
    let reader = register(&conn, "reader");
    let author = register(&conn, "author");
    let store = SqliteStore::new(&conn);
    let edge = Follow::new(reader.id, author.id);

    assert!(store.follows().follow(&edge).unwrap());
    assert!(!store.follows().follow(&edge).unwrap());
    assert_eq!(edge_count(&conn), 1);
}

#[test]
fn unfollow_missing_edge_is_a_no_op() {
    let conn = open_db_in_memory().unwrap();
    let reader = register(&conn, "reader");
    let author = register(&conn, "author");
    let other = register(&conn, "other");
    let store = SqliteStore::new(&conn);
    store
        .follows()
        .follow(&Follow::new(other.id, author.id))
        .unwrap();
    let service = FollowService::new(store, &CoreConfig::default()).unwrap();

    let ctx = RequestContext::authenticated(reader, urls::profile_unfollow("author"));
    let outcome = service.unfollow(&ctx, "author").unwrap();

    assert_eq!(outcome.redirect_location(), Some("/author/"));
    assert_eq!(outcome.committed(), Some(false));
    assert_eq!(edge_count(&conn), 1);
}

#[test]
fn unfollow_removes_existing_edge() {
    let conn = open_db_in_memory().unwrap();
    let reader = register(&conn, "reader");
    let author = register(&conn, "author");
    let service = FollowService::new(SqliteStore::new(&conn), &CoreConfig::default()).unwrap();
    let ctx = RequestContext::authenticated(reader.clone(), "/");

    service.follow(&ctx, "author").unwrap();
    let outcome = service.unfollow(&ctx, "author").unwrap();

    assert_eq!(outcome.committed(), Some(true));
    assert!(!service.is_following(reader.id, author.id).unwrap());
}

#[test]
fn self_follow_is_skipped() {
    let conn = open_db_in_memory().unwrap();
    let author = register(&conn, "author");
    let service = FollowService::new(SqliteStore::new(&conn), &CoreConfig::default()).unwrap();
    let ctx = RequestContext::authenticated(author.clone(), "/author/follow/");

    let outcome = service.follow(&ctx, "author").unwrap();

    assert_eq!(outcome.redirect_location(), Some("/author/"));
    assert_eq!(outcome.committed(), Some(false));
    assert_eq!(edge_count(&conn), 0);
}

#[test]
fn following_unknown_user_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let reader = register(&conn, "reader");
    let service = FollowService::new(SqliteStore::new(&conn), &CoreConfig::default()).unwrap();
    let ctx = RequestContext::authenticated(reader, "/ghost/follow/");

    assert!(service.follow(&ctx, "ghost").unwrap_err().is_not_found());
    assert!(service.unfollow(&ctx, "ghost").unwrap_err().is_not_found());
}

#[test]
fn follow_counts_track_both_directions() {
    let conn = open_db_in_memory().unwrap();
    let a = register(&conn, "a");
    let b = register(&conn, "b");
    let c = register(&conn, "c");
    let service = FollowService::new(SqliteStore::new(&conn), &CoreConfig::default()).unwrap();

    service
        .follow(&RequestContext::authenticated(a.clone(), "/"), "c")
        .unwrap();
    service
        .follow(&RequestContext::authenticated(b, "/"), "c")
        .unwrap();
    service
        .follow(&RequestContext::authenticated(c.clone(), "/"), "a")
        .unwrap();

    let counts = service.counts(c.id).unwrap();
    assert_eq!(counts.followers, 2);
    assert_eq!(counts.following, 1);
    assert_eq!(service.counts(a.id).unwrap().followers, 1);
}

#[test]
fn follow_feed_shows_only_followed_authors() {
    let conn = open_db_in_memory().unwrap();
    let reader = register(&conn, "reader");
    let followed = register(&conn, "followed");
    let stranger = register(&conn, "stranger");
    let store = SqliteStore::new(&conn);
    let config = CoreConfig::default();

    store
        .posts()
        .create_post(followed.id, &PostDraft::new("from followed"))
        .unwrap();
    store
        .posts()
        .create_post(stranger.id, &PostDraft::new("from stranger"))
        .unwrap();

    let ctx = RequestContext::authenticated(reader.clone(), urls::follow_index());
    let feeds = FeedService::new(store, &config).unwrap();

    let empty = feeds.follow_feed(&ctx, None).unwrap().rendered().unwrap();
    assert!(empty.is_empty());
    assert_eq!(empty.num_pages, 1);

    FollowService::new(store, &config)
        .unwrap()
        .follow(&ctx, "followed")
        .unwrap();
    let page = feeds.follow_feed(&ctx, None).unwrap().rendered().unwrap();
    assert_eq!(page.count, 1);
    assert_eq!(page.items[0].post.text, "from followed");
    assert_eq!(page.items[0].author, followed);
}
