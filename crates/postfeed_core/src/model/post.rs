//! Post domain model and post creation request validation.
//!
//! # Invariants
//! - `view_count` never decreases.
//! - `created_at`/`updated_at` are epoch milliseconds maintained by the store.

use super::author::{Author, AuthorId, NewNestedPost};
use super::ValidationError;
use serde::{Deserialize, Serialize};

/// Store-assigned post identifier.
pub type PostId = i64;

/// Stored post record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: Option<String>,
    pub image: Option<String>,
    pub published: bool,
    pub view_count: i64,
    pub author_id: AuthorId,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Feed item: a post with its owning author embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostWithAuthor {
    #[serde(flatten)]
    pub post: Post,
    pub author: Author,
}

/// Raw nested post inside a signup body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NestedPostRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl NestedPostRequest {
    pub(crate) fn validate(self, index: usize) -> Result<NewNestedPost, ValidationError> {
        let title = self.title.ok_or(ValidationError::MissingNestedField {
            index,
            field: "title",
        })?;
        Ok(NewNestedPost {
            title,
            content: self.content.filter(|value| !value.is_empty()),
            image: self.image.filter(|value| !value.is_empty()),
        })
    }
}

/// Raw body of the post creation endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub author_email: Option<String>,
}

/// Validated post write model; the author is referenced by email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub content: Option<String>,
    pub image: Option<String>,
    pub author_email: String,
}

impl CreatePostRequest {
    /// Validates the request into a write model.
    ///
    /// Whether the author email matches anyone is decided by the store.
    pub fn validate(self) -> Result<NewPost, ValidationError> {
        let title = self.title.ok_or(ValidationError::MissingField("title"))?;
        let author_email = self
            .author_email
            .filter(|value| !value.trim().is_empty())
            .ok_or(ValidationError::MissingField("authorEmail"))?;
        Ok(NewPost {
            title,
            content: self.content,
            image: self.image,
            author_email,
        })
    }
}
