//! Author use-case service.

use super::{parse_record_id, ServiceError, ServiceResult};
use crate::model::author::{Author, SignupRequest};
use crate::model::post::Post;
use crate::repo::author_repo::AuthorRepository;
use log::{info, warn};

/// Author service facade over repository implementations.
pub struct AuthorService<R: AuthorRepository> {
    repo: R,
}

impl<R: AuthorRepository> AuthorService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers an author together with any nested posts.
    ///
    /// # Contract
    /// - A malformed nested post rejects the whole signup before any write.
    /// - An already registered email is a constraint violation.
    pub fn signup(&self, request: SignupRequest) -> ServiceResult<Author> {
        let new_author = request.validate()?;
        match self.repo.create_author_with_posts(&new_author) {
            Ok(author) => {
                info!(
                    "event=author_signup module=service status=ok author_id={} post_count={}",
                    author.id,
                    new_author.posts.len()
                );
                Ok(author)
            }
            Err(err) => {
                let err = ServiceError::from(err);
                warn!(
                    "event=author_signup module=service status=error error_code={}",
                    err.code()
                );
                Err(err)
            }
        }
    }

    pub fn list_authors(&self) -> ServiceResult<Vec<Author>> {
        let result = self.repo.list_authors().map_err(ServiceError::from);
        match &result {
            Ok(authors) => info!(
                "event=author_list module=service status=ok count={}",
                authors.len()
            ),
            Err(err) => warn!(
                "event=author_list module=service status=error error_code={}",
                err.code()
            ),
        }
        result
    }

    /// Lists one author's unpublished posts.
    ///
    /// Returns `None` for an unknown or unparseable author id.
    pub fn list_drafts(&self, raw_author_id: &str) -> ServiceResult<Option<Vec<Post>>> {
        let Some(author_id) = parse_record_id(raw_author_id) else {
            info!("event=author_drafts module=service status=ok id_valid=false found=false");
            return Ok(None);
        };
        let result = self.repo.list_drafts(author_id).map_err(ServiceError::from);
        match &result {
            Ok(Some(drafts)) => info!(
                "event=author_drafts module=service status=ok author_id={author_id} found=true count={}",
                drafts.len()
            ),
            Ok(None) => info!(
                "event=author_drafts module=service status=ok author_id={author_id} found=false"
            ),
            Err(err) => warn!(
                "event=author_drafts module=service status=error author_id={author_id} error_code={}",
                err.code()
            ),
        }
        result
    }
}
