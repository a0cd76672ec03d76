//! Author repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Signup writes the author and every nested post in one transaction.
//! - Duplicate emails surface as [`RepoError::Constraint`].

use super::post_repo::{parse_post_row, POST_COLUMNS_SQL};
use super::{ensure_connection_ready, RepoResult};
use crate::model::author::{Author, AuthorId, NewAuthor};
use crate::model::post::Post;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

/// Repository interface for author operations.
pub trait AuthorRepository {
    /// Creates one author plus its nested posts, all or nothing.
    fn create_author_with_posts(&self, author: &NewAuthor) -> RepoResult<Author>;
    fn list_authors(&self) -> RepoResult<Vec<Author>>;
    fn get_author(&self, id: AuthorId) -> RepoResult<Option<Author>>;
    /// Lists unpublished posts of one author.
    ///
    /// Returns `None` when the author does not exist.
    fn list_drafts(&self, author_id: AuthorId) -> RepoResult<Option<Vec<Post>>>;
}

/// SQLite-backed author repository.
pub struct SqliteAuthorRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAuthorRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl AuthorRepository for SqliteAuthorRepository<'_> {
    fn create_author_with_posts(&self, author: &NewAuthor) -> RepoResult<Author> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        tx.execute(
            "INSERT INTO authors (name, email) VALUES (?1, ?2);",
            params![author.name.as_deref(), author.email.as_str()],
        )?;
        let author_id = tx.last_insert_rowid();

        for post in &author.posts {
            tx.execute(
                "INSERT INTO posts (title, content, image, author_id)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    post.title.as_str(),
                    post.content.as_deref(),
                    post.image.as_deref(),
                    author_id,
                ],
            )?;
        }

        tx.commit()?;
        Ok(Author {
            id: author_id,
            name: author.name.clone(),
            email: author.email.clone(),
        })
    }

    fn list_authors(&self) -> RepoResult<Vec<Author>> {
        let mut stmt = self.conn.prepare("SELECT id, name, email FROM authors;")?;
        let mut rows = stmt.query([])?;
        let mut authors = Vec::new();
        while let Some(row) = rows.next()? {
            authors.push(parse_author_row(row)?);
        }
        Ok(authors)
    }

    fn get_author(&self, id: AuthorId) -> RepoResult<Option<Author>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, email FROM authors WHERE id = ?1;")?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_author_row(row)?));
        }
        Ok(None)
    }

    fn list_drafts(&self, author_id: AuthorId) -> RepoResult<Option<Vec<Post>>> {
        if self.get_author(author_id)?.is_none() {
            return Ok(None);
        }

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {POST_COLUMNS_SQL}
             FROM posts
             WHERE author_id = ?1
               AND published = 0;"
        ))?;
        let mut rows = stmt.query([author_id])?;
        let mut drafts = Vec::new();
        while let Some(row) = rows.next()? {
            drafts.push(parse_post_row(row)?);
        }
        Ok(Some(drafts))
    }
}

fn parse_author_row(row: &Row<'_>) -> RepoResult<Author> {
    Ok(Author {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
    })
}
