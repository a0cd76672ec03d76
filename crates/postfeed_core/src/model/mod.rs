//! Domain model for authors and their posts.
//!
//! # Responsibility
//! - Define the stored record shapes returned to callers.
//! - Define boundary request shapes and their validation into write models.
//!
//! # Invariants
//! - Every post belongs to exactly one author.
//! - Identifiers are store-assigned and never reused.

pub mod author;
pub mod post;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Boundary validation failure for loosely-typed request bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was absent (or blank where blank is meaningless).
    MissingField(&'static str),
    /// A required field inside the nested post at `index` was absent.
    MissingNestedField { index: usize, field: &'static str },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing required field `{field}`"),
            Self::MissingNestedField { index, field } => {
                write!(f, "missing required field `posts[{index}].{field}`")
            }
        }
    }
}

impl Error for ValidationError {}
