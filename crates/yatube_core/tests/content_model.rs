use rusqlite::Connection;
use yatube_core::db::open_db_in_memory;
use yatube_core::repo::comment_repo::CommentRepository;
use yatube_core::repo::group_repo::GroupRepository;
use yatube_core::repo::post_repo::{PostFilter, PostRepository};
use yatube_core::repo::user_repo::UserRepository;
use yatube_core::urls;
use yatube_core::{
    CommentDraft, CoreConfig, GroupDraft, GroupService, PostDraft, PostService, RepoError,
    RequestContext, ServiceError, SqliteStore, Store, User, UserService, WriteOutcome,
};

fn register(conn: &Connection, username: &str) -> User {
    let user = User::new(username);
    UserService::new(SqliteStore::new(conn))
        .register(&user)
        .unwrap();
    user
}

fn test_group(conn: &Connection) -> yatube_core::Group {
    GroupService::new(SqliteStore::new(conn))
        .create(&GroupDraft::new(
            "Test group",
            "test-group",
            "Group used by tests",
        ))
        .unwrap()
}

fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn author_creates_post_in_group_and_is_redirected_to_index() {
    let conn = open_db_in_memory().unwrap();
    let author = register(&conn, "test-user");
    let group = test_group(&conn);
    let service = PostService::new(SqliteStore::new(&conn), &CoreConfig::default()).unwrap();
    let before = count_rows(&conn, "posts");

    let ctx = RequestContext::authenticated(author.clone(), urls::new_post());
    let outcome = service
        .create_post(&ctx, &PostDraft::new("test text").in_group(group.id))
        .unwrap();

    assert_eq!(outcome.redirect_location(), Some("/"));
    let post = outcome.committed().unwrap();
    assert_eq!(count_rows(&conn, "posts"), before + 1);

    let store = SqliteStore::new(&conn);
    let newest = store.posts().get_post(post.id).unwrap().unwrap();
    assert_eq!(newest.text, "test text");
    assert_eq!(newest.author, author.id);
    assert_eq!(newest.group, Some(group.id));
    assert!(newest.pub_date > 0);
}

#[test]
fn empty_text_re_renders_form_without_writing() {
    let conn = open_db_in_memory().unwrap();
    let author = register(&conn, "test-user");
    let service = PostService::new(SqliteStore::new(&conn), &CoreConfig::default()).unwrap();

    let ctx = RequestContext::authenticated(author, urls::new_post());
    let outcome = service.create_post(&ctx, &PostDraft::new("   ")).unwrap();

    match outcome {
        WriteOutcome::Invalid { errors, redirect } => {
            assert!(errors.has_field("text"));
            assert_eq!(redirect, None);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(count_rows(&conn, "posts"), 0);
}

#[test]
fn unknown_group_is_a_field_error() {
    let conn = open_db_in_memory().unwrap();
    let author = register(&conn, "test-user");
    let service = PostService::new(SqliteStore::new(&conn), &CoreConfig::default()).unwrap();

    let ctx = RequestContext::authenticated(author, urls::new_post());
    let outcome = service
        .create_post(&ctx, &PostDraft::new("text").in_group(404))
        .unwrap();

    match outcome {
        WriteOutcome::Invalid { errors, .. } => {
            assert!(errors.has_field("group"));
            assert!(!errors.has_field("text"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(count_rows(&conn, "posts"), 0);
}

#[test]
fn repository_rejects_invalid_drafts() {
    let conn = open_db_in_memory().unwrap();
    let author = register(&conn, "test-user");
    let store = SqliteStore::new(&conn);

    let err = store
        .posts()
        .create_post(author.id, &PostDraft::new(""))
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn deleting_post_removes_its_comments() {
    let conn = open_db_in_memory().unwrap();
    let author = register(&conn, "test-user");
    let reader = register(&conn, "reader");
    let store = SqliteStore::new(&conn);

    let post = store
        .posts()
        .create_post(author.id, &PostDraft::new("commented"))
        .unwrap();
    let kept = store
        .posts()
        .create_post(author.id, &PostDraft::new("untouched"))
        .unwrap();
    for text in ["first", "second"] {
        store
            .comments()
            .add_comment(post.id, reader.id, &CommentDraft::new(text))
            .unwrap();
    }
    store
        .comments()
        .add_comment(kept.id, reader.id, &CommentDraft::new("stays"))
        .unwrap();

    let service = PostService::new(store, &CoreConfig::default()).unwrap();
    service.delete_post(post.id).unwrap();

    assert_eq!(store.posts().get_post(post.id).unwrap(), None);
    assert_eq!(store.comments().count_comments(post.id).unwrap(), 0);
    assert_eq!(store.comments().count_comments(kept.id).unwrap(), 1);
    assert!(service.delete_post(post.id).unwrap_err().is_not_found());
}

#[test]
fn deleting_group_detaches_posts() {
    let conn = open_db_in_memory().unwrap();
    let author = register(&conn, "test-user");
    let group = test_group(&conn);
    let store = SqliteStore::new(&conn);

    let post = store
        .posts()
        .create_post(author.id, &PostDraft::new("grouped").in_group(group.id))
        .unwrap();

    let detached = GroupService::new(store).delete("test-group").unwrap();
    assert_eq!(detached, 1);

    let reloaded = store.posts().get_post(post.id).unwrap().unwrap();
    assert_eq!(reloaded.group, None);
    assert_eq!(reloaded.text, "grouped");
    assert_eq!(store.groups().get_group(group.id).unwrap(), None);
}

#[test]
fn deleting_user_cascades_posts_comments_and_follows() {
    let conn = open_db_in_memory().unwrap();
    let author = register(&conn, "author");
    let reader = register(&conn, "reader");
    let store = SqliteStore::new(&conn);

    let readers_post = store
        .posts()
        .create_post(reader.id, &PostDraft::new("reader post"))
        .unwrap();
    store
        .comments()
        .add_comment(readers_post.id, author.id, &CommentDraft::new("hi"))
        .unwrap();
    store
        .posts()
        .create_post(author.id, &PostDraft::new("author post"))
        .unwrap();
    conn.execute(
        "INSERT INTO follows (user_uuid, author_uuid) VALUES (?1, ?2);",
        [reader.id.to_string(), author.id.to_string()],
    )
    .unwrap();

    UserService::new(store).delete(author.id).unwrap();

    assert_eq!(
        store.posts().count_posts(&PostFilter::Author(author.id)).unwrap(),
        0
    );
    assert_eq!(store.comments().count_comments(readers_post.id).unwrap(), 0);
    assert_eq!(count_rows(&conn, "follows"), 0);
    assert_eq!(store.users().get_user(author.id).unwrap(), None);
    assert!(store.users().get_user(reader.id).unwrap().is_some());
}

#[test]
fn duplicate_slug_and_username_are_reported_as_field_errors() {
    let conn = open_db_in_memory().unwrap();
    register(&conn, "test-user");
    test_group(&conn);
    let store = SqliteStore::new(&conn);

    let err = GroupService::new(store)
        .create(&GroupDraft::new("Other", "test-group", "dup"))
        .unwrap_err();
    match err {
        ServiceError::Invalid(errors) => assert!(errors.has_field("slug")),
        other => panic!("unexpected error: {other}"),
    }

    let err = UserService::new(store)
        .register(&User::new("test-user"))
        .unwrap_err();
    match err {
        ServiceError::Invalid(errors) => assert!(errors.has_field("username")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn group_edit_and_listing() {
    let conn = open_db_in_memory().unwrap();
    test_group(&conn);
    let service = GroupService::new(SqliteStore::new(&conn));
    service
        .create(&GroupDraft::new("Another group", "another", "second"))
        .unwrap();

    let edited = service
        .edit(
            "test-group",
            &GroupDraft::new("Renamed group", "renamed", "new description"),
        )
        .unwrap();
    assert_eq!(edited.slug, "renamed");
    assert!(service.by_slug("test-group").unwrap_err().is_not_found());

    let titles: Vec<String> = service
        .list()
        .unwrap()
        .into_iter()
        .map(|group| group.title)
        .collect();
    assert_eq!(titles, vec!["Another group", "Renamed group"]);
}

#[test]
fn post_view_collects_comments_and_author_count() {
    let conn = open_db_in_memory().unwrap();
    let author = register(&conn, "test-user");
    let reader = register(&conn, "reader");
    let store = SqliteStore::new(&conn);
    let config = CoreConfig::default();
    let service = PostService::new(store, &config).unwrap();

    let first = store
        .posts()
        .create_post(author.id, &PostDraft::new("first"))
        .unwrap();
    store
        .posts()
        .create_post(author.id, &PostDraft::new("second"))
        .unwrap();

    let reader_ctx = RequestContext::authenticated(reader.clone(), "/test-user/1/comment/");
    for text in ["nice", "agreed"] {
        let outcome = service
            .add_comment(&reader_ctx, "test-user", first.id, &CommentDraft::new(text))
            .unwrap();
        assert_eq!(
            outcome.redirect_location(),
            Some(format!("/test-user/{}/", first.id).as_str())
        );
    }

    let detail = service
        .post_view(&RequestContext::anonymous("/"), "test-user", first.id)
        .unwrap();
    assert_eq!(detail.entry.post.id, first.id);
    assert_eq!(detail.entry.author.username, "test-user");
    assert_eq!(detail.entry.comment_count, 2);
    assert_eq!(detail.author_post_count, 2);
    assert!(!detail.following);
    let texts: Vec<&str> = detail
        .comments
        .iter()
        .map(|entry| entry.comment.text.as_str())
        .collect();
    assert_eq!(texts, vec!["nice", "agreed"]);
    assert_eq!(detail.comments[0].author, reader);

    let json = serde_json::to_value(&detail).unwrap();
    assert_eq!(json["entry"]["post"]["text"], "first");
}

#[test]
fn empty_comment_is_dropped_but_still_redirects() {
    let conn = open_db_in_memory().unwrap();
    let author = register(&conn, "test-user");
    let store = SqliteStore::new(&conn);
    let service = PostService::new(store, &CoreConfig::default()).unwrap();
    let post = store
        .posts()
        .create_post(author.id, &PostDraft::new("post"))
        .unwrap();

    let ctx = RequestContext::authenticated(author, "/");
    let outcome = service
        .add_comment(&ctx, "test-user", post.id, &CommentDraft::new(" "))
        .unwrap();

    match &outcome {
        WriteOutcome::Invalid { errors, redirect } => {
            assert!(errors.has_field("text"));
            assert_eq!(redirect.as_deref(), Some(format!("/test-user/{}/", post.id).as_str()));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(store.comments().count_comments(post.id).unwrap(), 0);
}

#[test]
fn post_addressed_under_wrong_author_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let author = register(&conn, "test-user");
    register(&conn, "someone-else");
    let store = SqliteStore::new(&conn);
    let service = PostService::new(store, &CoreConfig::default()).unwrap();
    let post = store
        .posts()
        .create_post(author.id, &PostDraft::new("post"))
        .unwrap();

    let ctx = RequestContext::anonymous("/");
    assert!(service
        .post_view(&ctx, "someone-else", post.id)
        .unwrap_err()
        .is_not_found());
    assert!(service
        .post_view(&ctx, "nobody", post.id)
        .unwrap_err()
        .is_not_found());
    assert!(service
        .post_view(&ctx, "test-user", post.id + 100)
        .unwrap_err()
        .is_not_found());
}
