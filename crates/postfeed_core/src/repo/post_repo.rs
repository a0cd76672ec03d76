//! Post repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/read/delete APIs over the `posts` table.
//! - Execute [`FeedQuery`] descriptors by compiling them to SQL.
//! - Perform the view-increment and publish-toggle transitions.
//!
//! # Invariants
//! - `increment_views` and `toggle_published` are each one `UPDATE ...
//!   RETURNING` statement, so concurrent callers never lose a write.
//! - Every post mutation refreshes `updated_at`.
//! - Feed rows always carry their owning author.

use super::{ensure_connection_ready, RepoError, RepoResult, NOW_MS_SQL};
use crate::model::author::Author;
use crate::model::post::{NewPost, Post, PostId, PostWithAuthor};
use crate::query::feed::{FeedQuery, PostField, Predicate, SortOrder};
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Params, Row, Transaction,
    TransactionBehavior,
};

pub(crate) const POST_COLUMNS_SQL: &str =
    "id, title, content, image, published, view_count, author_id, created_at, updated_at";

/// Repository interface for post operations.
pub trait PostRepository {
    /// Creates one post owned by the author registered under `author_email`.
    fn create_post(&self, post: &NewPost) -> RepoResult<Post>;
    fn list_posts(&self) -> RepoResult<Vec<Post>>;
    fn get_post(&self, id: PostId) -> RepoResult<Option<Post>>;
    /// Deletes one post and returns the removed record.
    fn delete_post(&self, id: PostId) -> RepoResult<Post>;
    /// Atomically adds one to the view counter.
    fn increment_views(&self, id: PostId) -> RepoResult<Post>;
    /// Atomically negates the published flag.
    fn toggle_published(&self, id: PostId) -> RepoResult<Post>;
    /// Runs a feed descriptor, joining each post with its author.
    fn feed(&self, query: &FeedQuery) -> RepoResult<Vec<PostWithAuthor>>;
}

/// SQLite-backed post repository.
pub struct SqlitePostRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePostRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl PostRepository for SqlitePostRepository<'_> {
    fn create_post(&self, post: &NewPost) -> RepoResult<Post> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let author_id: Option<i64> = tx
            .query_row(
                "SELECT id FROM authors WHERE email = ?1;",
                [post.author_email.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(author_id) = author_id else {
            return Err(RepoError::MissingAuthor(post.author_email.clone()));
        };

        let created = query_one_post(
            &tx,
            &format!(
                "INSERT INTO posts (title, content, image, author_id)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING {POST_COLUMNS_SQL};"
            ),
            params![
                post.title.as_str(),
                post.content.as_deref(),
                post.image.as_deref(),
                author_id,
            ],
        )?
        .ok_or_else(|| RepoError::InvalidData("insert returned no post row".to_string()))?;

        tx.commit()?;
        Ok(created)
    }

    fn list_posts(&self) -> RepoResult<Vec<Post>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {POST_COLUMNS_SQL} FROM posts;"))?;
        let mut rows = stmt.query([])?;
        let mut posts = Vec::new();
        while let Some(row) = rows.next()? {
            posts.push(parse_post_row(row)?);
        }
        Ok(posts)
    }

    fn get_post(&self, id: PostId) -> RepoResult<Option<Post>> {
        query_one_post(
            self.conn,
            &format!("SELECT {POST_COLUMNS_SQL} FROM posts WHERE id = ?1;"),
            [id],
        )
    }

    fn delete_post(&self, id: PostId) -> RepoResult<Post> {
        query_one_post(
            self.conn,
            &format!("DELETE FROM posts WHERE id = ?1 RETURNING {POST_COLUMNS_SQL};"),
            [id],
        )?
        .ok_or(RepoError::NotFound(id))
    }

    fn increment_views(&self, id: PostId) -> RepoResult<Post> {
        query_one_post(
            self.conn,
            &format!(
                "UPDATE posts
                 SET
                    view_count = view_count + 1,
                    updated_at = {NOW_MS_SQL}
                 WHERE id = ?1
                 RETURNING {POST_COLUMNS_SQL};"
            ),
            [id],
        )?
        .ok_or(RepoError::NotFound(id))
    }

    fn toggle_published(&self, id: PostId) -> RepoResult<Post> {
        query_one_post(
            self.conn,
            &format!(
                "UPDATE posts
                 SET
                    published = 1 - published,
                    updated_at = {NOW_MS_SQL}
                 WHERE id = ?1
                 RETURNING {POST_COLUMNS_SQL};"
            ),
            [id],
        )?
        .ok_or(RepoError::NotFound(id))
    }

    fn feed(&self, query: &FeedQuery) -> RepoResult<Vec<PostWithAuthor>> {
        let mut sql = String::from(
            "SELECT
                posts.id AS id,
                posts.title AS title,
                posts.content AS content,
                posts.image AS image,
                posts.published AS published,
                posts.view_count AS view_count,
                posts.author_id AS author_id,
                posts.created_at AS created_at,
                posts.updated_at AS updated_at,
                authors.name AS author_name,
                authors.email AS author_email
             FROM posts
             INNER JOIN authors ON authors.id = posts.author_id
             WHERE ",
        );
        let mut bind_values: Vec<Value> = Vec::new();
        compile_predicate(&query.filter, &mut sql, &mut bind_values);

        if let Some(order) = query.order {
            let direction = match order.order {
                SortOrder::Asc => "ASC",
                SortOrder::Desc => "DESC",
            };
            sql.push_str(&format!(
                " ORDER BY {} {direction}, posts.id {direction}",
                column_name(order.field)
            ));
        }

        match (query.take, query.skip) {
            (Some(take), skip) => {
                sql.push_str(" LIMIT ?");
                bind_values.push(Value::Integer(to_sql_integer(take)));
                if let Some(skip) = skip {
                    sql.push_str(" OFFSET ?");
                    bind_values.push(Value::Integer(to_sql_integer(skip)));
                }
            }
            (None, Some(skip)) => {
                sql.push_str(" LIMIT -1 OFFSET ?");
                bind_values.push(Value::Integer(to_sql_integer(skip)));
            }
            (None, None) => {}
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            let post = parse_post_row(row)?;
            let author = Author {
                id: post.author_id,
                name: row.get("author_name")?,
                email: row.get("author_email")?,
            };
            items.push(PostWithAuthor { post, author });
        }

        Ok(items)
    }
}

/// Runs a statement expected to yield at most one post row.
///
/// Rows are drained fully so that write statements with `RETURNING` run to
/// completion before the statement is reset.
fn query_one_post<P: Params>(conn: &Connection, sql: &str, params: P) -> RepoResult<Option<Post>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut found = None;
    while let Some(row) = rows.next()? {
        if found.is_none() {
            found = Some(parse_post_row(row)?);
        }
    }
    Ok(found)
}

fn compile_predicate(predicate: &Predicate, sql: &mut String, bind_values: &mut Vec<Value>) {
    match predicate {
        Predicate::Equals(field, value) => {
            sql.push_str(&format!("{} = ?", column_name(*field)));
            bind_values.push(Value::Integer(i64::from(*value)));
        }
        Predicate::Contains(field, needle) => {
            sql.push_str(&format!("{} LIKE ? ESCAPE '\\'", column_name(*field)));
            bind_values.push(Value::Text(format!("%{}%", escape_like(needle))));
        }
        Predicate::And(parts) => compile_group(parts, " AND ", "1 = 1", sql, bind_values),
        Predicate::Or(parts) => compile_group(parts, " OR ", "1 = 0", sql, bind_values),
    }
}

fn compile_group(
    parts: &[Predicate],
    joiner: &str,
    empty: &str,
    sql: &mut String,
    bind_values: &mut Vec<Value>,
) {
    if parts.is_empty() {
        sql.push_str(empty);
        return;
    }
    sql.push('(');
    for (index, part) in parts.iter().enumerate() {
        if index > 0 {
            sql.push_str(joiner);
        }
        compile_predicate(part, sql, bind_values);
    }
    sql.push(')');
}

fn column_name(field: PostField) -> &'static str {
    match field {
        PostField::Title => "posts.title",
        PostField::Content => "posts.content",
        PostField::Published => "posts.published",
        PostField::UpdatedAt => "posts.updated_at",
    }
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn to_sql_integer(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

pub(crate) fn parse_post_row(row: &Row<'_>) -> RepoResult<Post> {
    let published = match row.get::<_, i64>("published")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid published value `{other}` in posts.published"
            )));
        }
    };

    let view_count: i64 = row.get("view_count")?;
    if view_count < 0 {
        return Err(RepoError::InvalidData(format!(
            "negative view_count `{view_count}` in posts.view_count"
        )));
    }

    Ok(Post {
        id: row.get("id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        image: row.get("image")?,
        published,
        view_count,
        author_id: row.get("author_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
