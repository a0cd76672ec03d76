//! Author domain model and signup request validation.

use super::post::NestedPostRequest;
use super::ValidationError;
use serde::{Deserialize, Serialize};

/// Store-assigned author identifier.
pub type AuthorId = i64;

/// Registered author record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: AuthorId,
    pub name: Option<String>,
    /// Globally unique across all authors.
    pub email: String,
}

/// Raw signup body. Every field is optional so that missing values surface
/// as [`ValidationError`] instead of a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub posts: Option<Vec<NestedPostRequest>>,
}

/// Validated author write model, created together with its nested posts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuthor {
    pub name: Option<String>,
    pub email: String,
    pub posts: Vec<NewNestedPost>,
}

/// Validated nested post created in the same unit as its author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNestedPost {
    pub title: String,
    pub content: Option<String>,
    pub image: Option<String>,
}

impl SignupRequest {
    /// Validates the request into a write model.
    ///
    /// # Contract
    /// - `email` must be present and not blank.
    /// - Every nested post needs a `title`; one bad post rejects the signup.
    /// - Empty nested `content`/`image` text is normalized to `None`.
    pub fn validate(self) -> Result<NewAuthor, ValidationError> {
        let email = self
            .email
            .filter(|value| !value.trim().is_empty())
            .ok_or(ValidationError::MissingField("email"))?;

        let posts = self
            .posts
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, post)| post.validate(index))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(NewAuthor {
            name: self.name,
            email,
            posts,
        })
    }
}
