//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the endpoint-level operations.
//! - Translate repository errors into the client-facing taxonomy.
//! - Coerce textual identifiers from request paths.
//!
//! # Invariants
//! - Services never bypass repository validation/persistence contracts.
//! - Not-found outcomes carry the identifier text the caller supplied.

pub mod author_service;
pub mod post_service;

use crate::model::ValidationError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service-level error taxonomy.
#[derive(Debug)]
pub enum ServiceError {
    /// Malformed or missing required field.
    Validation(ValidationError),
    /// Referenced record is absent; `id` is the requested text.
    NotFound { id: String },
    /// Unique-email collision or missing author on post creation.
    ConstraintViolation(String),
    /// Any storage failure that is not the caller's fault.
    StoreUnavailable(RepoError),
}

impl ServiceError {
    /// Stable metadata-only code for log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::NotFound { .. } => "not_found",
            Self::ConstraintViolation(_) => "constraint_violation",
            Self::StoreUnavailable(_) => "store_unavailable",
        }
    }

    /// Maps a repository error raised while acting on `requested_id`.
    pub(crate) fn for_record(err: RepoError, requested_id: &str) -> Self {
        match err {
            RepoError::NotFound(_) => Self::NotFound {
                id: requested_id.to_string(),
            },
            other => Self::from(other),
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { id } => write!(f, "Post with ID {id} does not exist in the database"),
            Self::ConstraintViolation(message) => write!(f, "{message}"),
            Self::StoreUnavailable(err) => write!(f, "store unavailable: {err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::StoreUnavailable(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound(id) => Self::NotFound { id: id.to_string() },
            RepoError::MissingAuthor(_) => {
                Self::ConstraintViolation("no author matches the given email".to_string())
            }
            RepoError::Constraint(_) => {
                Self::ConstraintViolation("record violates a uniqueness or reference constraint".to_string())
            }
            other => Self::StoreUnavailable(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Status token for the `status=` field of a service event.
pub(crate) fn outcome_status<T>(result: &ServiceResult<T>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(ServiceError::NotFound { .. }) => "not_found",
        Err(_) => "error",
    }
}

/// Parses a record identifier taken from a request path.
///
/// Only positive ASCII-decimal integers are identifiers; everything else
/// yields `None`, which callers report as "not found".
pub fn parse_record_id(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<i64>().ok().filter(|id| *id > 0)
}

#[cfg(test)]
mod tests {
    use super::{outcome_status, parse_record_id, ServiceError, ServiceResult};
    use crate::repo::RepoError;

    #[test]
    fn parse_record_id_accepts_positive_integers_only() {
        assert_eq!(parse_record_id("42"), Some(42));
        assert_eq!(parse_record_id(" 7 "), Some(7));
        assert_eq!(parse_record_id("0"), None);
        assert_eq!(parse_record_id("-1"), None);
        assert_eq!(parse_record_id("abc"), None);
        assert_eq!(parse_record_id("1.5"), None);
        assert_eq!(parse_record_id(""), None);
    }

    #[test]
    fn not_found_keeps_requested_text() {
        let err = ServiceError::for_record(RepoError::NotFound(9), "009");
        assert_eq!(
            err.to_string(),
            "Post with ID 009 does not exist in the database"
        );
    }

    #[test]
    fn constraint_messages_do_not_leak_sqlite_details() {
        let err = ServiceError::from(RepoError::Constraint(
            "UNIQUE constraint failed: authors.email".to_string(),
        ));
        assert!(matches!(err, ServiceError::ConstraintViolation(_)));
        assert!(!err.to_string().contains("authors.email"));
    }

    #[test]
    fn outcome_status_separates_not_found_from_failures() {
        let ok: ServiceResult<()> = Ok(());
        let missing: ServiceResult<()> = Err(ServiceError::NotFound { id: "5".to_string() });
        let failed: ServiceResult<()> = Err(ServiceError::from(RepoError::Constraint(
            "FOREIGN KEY constraint failed".to_string(),
        )));
        assert_eq!(outcome_status(&ok), "ok");
        assert_eq!(outcome_status(&missing), "not_found");
        assert_eq!(outcome_status(&failed), "error");
    }
}
