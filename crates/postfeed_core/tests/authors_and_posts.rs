use postfeed_core::db::open_db_in_memory;
use postfeed_core::{
    AuthorService, CreatePostRequest, NestedPostRequest, PostService, ServiceError,
    SignupRequest, SqliteAuthorRepository, SqlitePostRepository, ValidationError,
};
use rusqlite::Connection;

fn authors(conn: &Connection) -> AuthorService<SqliteAuthorRepository<'_>> {
    AuthorService::new(SqliteAuthorRepository::try_new(conn).unwrap())
}

fn posts(conn: &Connection) -> PostService<SqlitePostRepository<'_>> {
    PostService::new(SqlitePostRepository::try_new(conn).unwrap())
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

fn nested(title: Option<&str>, content: Option<&str>) -> NestedPostRequest {
    NestedPostRequest {
        title: title.map(str::to_string),
        content: content.map(str::to_string),
        image: None,
    }
}

#[test]
fn signup_creates_author_with_nested_posts_as_drafts() {
    let conn = open_db_in_memory().unwrap();
    let author = authors(&conn)
        .signup(SignupRequest {
            name: Some("Alice".to_string()),
            email: Some("alice@example.com".to_string()),
            posts: Some(vec![nested(Some("first"), Some("")), nested(Some("second"), Some("hi"))]),
        })
        .unwrap();

    assert_eq!(author.email, "alice@example.com");
    assert_eq!(author.name.as_deref(), Some("Alice"));

    let drafts = authors(&conn)
        .list_drafts(&author.id.to_string())
        .unwrap()
        .unwrap();
    assert_eq!(drafts.len(), 2);
    let first = drafts.iter().find(|post| post.title == "first").unwrap();
    assert_eq!(first.content, None);
    assert!(drafts.iter().all(|post| !post.published && post.view_count == 0));
}

#[test]
fn signup_with_untitled_nested_post_leaves_nothing_behind() {
    let conn = open_db_in_memory().unwrap();
    let err = authors(&conn)
        .signup(SignupRequest {
            name: None,
            email: Some("bob@example.com".to_string()),
            posts: Some(vec![nested(Some("ok"), None), nested(None, Some("no title"))]),
        })
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::MissingNestedField { index: 1, field: "title" })
    ));
    assert_eq!(count(&conn, "authors"), 0);
    assert_eq!(count(&conn, "posts"), 0);
}

#[test]
fn signup_without_email_is_a_validation_failure() {
    let conn = open_db_in_memory().unwrap();
    let err = authors(&conn).signup(SignupRequest::default()).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::MissingField("email"))
    ));
}

#[test]
fn duplicate_email_is_a_constraint_violation_and_rolls_back_nested_posts() {
    let conn = open_db_in_memory().unwrap();
    let request = SignupRequest {
        name: None,
        email: Some("dup@example.com".to_string()),
        posts: Some(vec![nested(Some("only"), None)]),
    };
    authors(&conn).signup(request.clone()).unwrap();

    let err = authors(&conn).signup(request).unwrap_err();
    assert!(matches!(err, ServiceError::ConstraintViolation(_)));
    assert_eq!(count(&conn, "authors"), 1);
    assert_eq!(count(&conn, "posts"), 1);
}

#[test]
fn create_post_connects_to_author_by_email() {
    let conn = open_db_in_memory().unwrap();
    let author = authors(&conn)
        .signup(SignupRequest {
            email: Some("carol@example.com".to_string()),
            ..SignupRequest::default()
        })
        .unwrap();

    let post = posts(&conn)
        .create_post(CreatePostRequest {
            title: Some("hello".to_string()),
            content: Some("world".to_string()),
            image: Some("cover.png".to_string()),
            author_email: Some("carol@example.com".to_string()),
        })
        .unwrap();

    assert_eq!(post.author_id, author.id);
    assert_eq!(post.image.as_deref(), Some("cover.png"));
    assert!(!post.published);
    assert_eq!(post.created_at, post.updated_at);
    assert_eq!(posts(&conn).list_posts().unwrap(), vec![post]);
}

#[test]
fn create_post_for_unknown_email_fails_and_creates_nothing() {
    let conn = open_db_in_memory().unwrap();
    let err = posts(&conn)
        .create_post(CreatePostRequest {
            title: Some("orphan".to_string()),
            author_email: Some("nobody@example.com".to_string()),
            ..CreatePostRequest::default()
        })
        .unwrap_err();

    assert!(matches!(err, ServiceError::ConstraintViolation(_)));
    assert_eq!(count(&conn, "posts"), 0);
}

#[test]
fn drafts_only_include_unpublished_posts_of_that_author() {
    let conn = open_db_in_memory().unwrap();
    let first = authors(&conn)
        .signup(SignupRequest {
            email: Some("one@example.com".to_string()),
            posts: Some(vec![nested(Some("keep"), None), nested(Some("publish me"), None)]),
            ..SignupRequest::default()
        })
        .unwrap();
    authors(&conn)
        .signup(SignupRequest {
            email: Some("two@example.com".to_string()),
            posts: Some(vec![nested(Some("someone else"), None)]),
            ..SignupRequest::default()
        })
        .unwrap();

    let to_publish = authors(&conn)
        .list_drafts(&first.id.to_string())
        .unwrap()
        .unwrap()
        .into_iter()
        .find(|post| post.title == "publish me")
        .unwrap();
    posts(&conn)
        .toggle_publish(&to_publish.id.to_string())
        .unwrap();

    let drafts = authors(&conn)
        .list_drafts(&first.id.to_string())
        .unwrap()
        .unwrap();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].title, "keep");
    assert_eq!(drafts[0].author_id, first.id);

    assert!(authors(&conn).list_drafts("424242").unwrap().is_none());
    assert!(authors(&conn).list_drafts("nope").unwrap().is_none());
    assert_eq!(authors(&conn).list_authors().unwrap().len(), 2);
}
