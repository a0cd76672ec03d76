use postfeed_core::db::open_db_in_memory;
use postfeed_core::{
    build_feed_query, FeedParams, PostRepository, PostService, SqlitePostRepository,
};
use rusqlite::{params, Connection};

/// Seeds one author and posts `(title, content, published, updated_at)`.
fn seed(conn: &Connection, rows: &[(&str, Option<&str>, bool, i64)]) -> Vec<i64> {
    conn.execute(
        "INSERT INTO authors (name, email) VALUES ('Grace', 'grace@example.com');",
        [],
    )
    .unwrap();
    let author_id = conn.last_insert_rowid();

    rows.iter()
        .map(|(title, content, published, updated_at)| {
            conn.execute(
                "INSERT INTO posts (title, content, published, author_id, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![title, content, published, author_id, updated_at],
            )
            .unwrap();
            conn.last_insert_rowid()
        })
        .collect()
}

fn feed_params(
    search: Option<&str>,
    skip: Option<&str>,
    take: Option<&str>,
    order: Option<&str>,
) -> FeedParams {
    FeedParams {
        search_string: search.map(str::to_string),
        skip: skip.map(str::to_string),
        take: take.map(str::to_string),
        order_by: order.map(str::to_string),
    }
}

fn titles(conn: &Connection, params: &FeedParams) -> Vec<String> {
    PostService::new(SqlitePostRepository::try_new(conn).unwrap())
        .feed(params)
        .unwrap()
        .into_iter()
        .map(|item| item.post.title)
        .collect()
}

#[test]
fn feed_without_parameters_returns_every_published_post_with_author() {
    let conn = open_db_in_memory().unwrap();
    seed(
        &conn,
        &[
            ("one", None, true, 100),
            ("draft", None, false, 200),
            ("two", Some("body"), true, 300),
        ],
    );

    let repo = SqlitePostRepository::try_new(&conn).unwrap();
    let items = repo.feed(&build_feed_query(&FeedParams::default())).unwrap();

    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|item| item.post.published));
    assert!(items
        .iter()
        .all(|item| item.author.email == "grace@example.com" && item.author.id == item.post.author_id));
}

#[test]
fn search_matches_title_or_content_among_published_posts() {
    let conn = open_db_in_memory().unwrap();
    seed(
        &conn,
        &[
            ("Learning rust", None, true, 100),
            ("Other", Some("why rust matters"), true, 200),
            ("rust draft", Some("rust"), false, 300),
            ("Go", Some("not this one"), true, 400),
        ],
    );

    let mut found = titles(&conn, &feed_params(Some("rust"), None, None, Some("asc")));
    found.sort();
    assert_eq!(found, vec!["Learning rust".to_string(), "Other".to_string()]);
}

#[test]
fn search_treats_like_wildcards_literally() {
    let conn = open_db_in_memory().unwrap();
    seed(
        &conn,
        &[
            ("100% done", None, true, 100),
            ("100 done", None, true, 200),
        ],
    );

    assert_eq!(
        titles(&conn, &feed_params(Some("100%"), None, None, None)),
        vec!["100% done".to_string()]
    );
}

#[test]
fn ordering_skip_and_take_page_through_updated_at() {
    let conn = open_db_in_memory().unwrap();
    seed(
        &conn,
        &[
            ("c", None, true, 300),
            ("a", None, true, 100),
            ("e", None, true, 500),
            ("b", None, true, 200),
            ("d", None, true, 400),
        ],
    );

    assert_eq!(
        titles(&conn, &feed_params(None, None, None, Some("asc"))),
        vec!["a", "b", "c", "d", "e"]
    );
    assert_eq!(
        titles(&conn, &feed_params(None, Some("1"), Some("2"), Some("desc"))),
        vec!["d", "c"]
    );
    assert_eq!(
        titles(&conn, &feed_params(None, Some("3"), None, Some("asc"))),
        vec!["d", "e"]
    );
}

#[test]
fn invalid_take_returns_unbounded_results_not_zero() {
    let conn = open_db_in_memory().unwrap();
    seed(
        &conn,
        &[
            ("a", None, true, 100),
            ("b", None, true, 200),
            ("c", None, true, 300),
        ],
    );

    assert_eq!(
        titles(&conn, &feed_params(None, None, Some("abc"), Some("asc"))).len(),
        3
    );
    assert_eq!(
        titles(&conn, &feed_params(None, Some("-2"), Some("-1"), Some("asc"))).len(),
        3
    );
}
