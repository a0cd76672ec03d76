//! Post use-case service.
//!
//! # Responsibility
//! - Expose post create/list/get/delete and the feed search.
//! - Drive the view-increment and publish-toggle transitions.
//!
//! # Invariants
//! - An unparseable or unknown id on a transition is `NotFound` carrying
//!   the caller's text, never a store error.
//! - Transitions are single-shot; nothing is retried.

use super::{outcome_status, parse_record_id, ServiceError, ServiceResult};
use crate::model::post::{CreatePostRequest, Post, PostId, PostWithAuthor};
use crate::query::feed::{build_feed_query, FeedParams};
use crate::repo::post_repo::PostRepository;
use crate::repo::RepoResult;
use log::{info, warn};

/// Single-record transitions supported on posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostTransition {
    IncrementView,
    TogglePublish,
}

impl PostTransition {
    fn event_name(self) -> &'static str {
        match self {
            Self::IncrementView => "post_increment_view",
            Self::TogglePublish => "post_toggle_publish",
        }
    }
}

/// Post service facade over repository implementations.
pub struct PostService<R: PostRepository> {
    repo: R,
}

impl<R: PostRepository> PostService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one post for the author registered under `authorEmail`.
    pub fn create_post(&self, request: CreatePostRequest) -> ServiceResult<Post> {
        let new_post = request.validate()?;
        match self.repo.create_post(&new_post) {
            Ok(post) => {
                info!(
                    "event=post_create module=service status=ok post_id={} author_id={}",
                    post.id, post.author_id
                );
                Ok(post)
            }
            Err(err) => {
                let err = ServiceError::from(err);
                warn!(
                    "event=post_create module=service status=error error_code={}",
                    err.code()
                );
                Err(err)
            }
        }
    }

    pub fn list_posts(&self) -> ServiceResult<Vec<Post>> {
        let result = self.repo.list_posts().map_err(ServiceError::from);
        match &result {
            Ok(posts) => info!(
                "event=post_list module=service status=ok count={}",
                posts.len()
            ),
            Err(err) => warn!(
                "event=post_list module=service status=error error_code={}",
                err.code()
            ),
        }
        result
    }

    /// Fetches one post; an unparseable id behaves as a missing post.
    pub fn get_post(&self, raw_id: &str) -> ServiceResult<Option<Post>> {
        let Some(id) = parse_record_id(raw_id) else {
            info!("event=post_get module=service status=ok id_valid=false found=false");
            return Ok(None);
        };
        let result = self.repo.get_post(id).map_err(ServiceError::from);
        match &result {
            Ok(post) => info!(
                "event=post_get module=service status=ok post_id={id} found={}",
                post.is_some()
            ),
            Err(err) => warn!(
                "event=post_get module=service status=error post_id={id} error_code={}",
                err.code()
            ),
        }
        result
    }

    /// Deletes one post and returns the removed record.
    pub fn delete_post(&self, raw_id: &str) -> ServiceResult<Post> {
        let result = require_id(raw_id).and_then(|id| {
            self.repo
                .delete_post(id)
                .map_err(|err| ServiceError::for_record(err, raw_id))
        });

        let status = outcome_status(&result);
        match &result {
            Ok(post) => info!(
                "event=post_delete module=service status={status} post_id={}",
                post.id
            ),
            Err(ServiceError::NotFound { .. }) => {
                info!("event=post_delete module=service status={status}")
            }
            Err(err) => warn!(
                "event=post_delete module=service status={status} error_code={}",
                err.code()
            ),
        }
        result
    }

    /// Lists published posts filtered, sorted and paginated per `params`.
    pub fn feed(&self, params: &FeedParams) -> ServiceResult<Vec<PostWithAuthor>> {
        let query = build_feed_query(params);
        let items = self.repo.feed(&query)?;
        info!(
            "event=post_feed module=service status=ok search={} skip={:?} take={:?} ordered={} count={}",
            params
                .search_string
                .as_deref()
                .is_some_and(|value| !value.is_empty()),
            query.skip,
            query.take,
            query.order.is_some(),
            items.len()
        );
        Ok(items)
    }

    /// Adds one view to the post identified by `raw_id`.
    pub fn increment_view(&self, raw_id: &str) -> ServiceResult<Post> {
        self.apply(PostTransition::IncrementView, raw_id)
    }

    /// Flips the published flag of the post identified by `raw_id`.
    pub fn toggle_publish(&self, raw_id: &str) -> ServiceResult<Post> {
        self.apply(PostTransition::TogglePublish, raw_id)
    }

    /// Applies one transition to one post.
    ///
    /// Returns the fully updated record, or `NotFound { id: raw_id }`.
    pub fn apply(&self, transition: PostTransition, raw_id: &str) -> ServiceResult<Post> {
        let event = transition.event_name();
        let result = require_id(raw_id).and_then(|id| {
            self.run_transition(transition, id)
                .map_err(|err| ServiceError::for_record(err, raw_id))
        });

        let status = outcome_status(&result);
        match &result {
            Ok(post) => info!(
                "event={event} module=service status={status} post_id={} view_count={} published={}",
                post.id, post.view_count, post.published
            ),
            Err(ServiceError::NotFound { .. }) => {
                info!("event={event} module=service status={status}")
            }
            Err(err) => warn!(
                "event={event} module=service status={status} error_code={}",
                err.code()
            ),
        }
        result
    }

    fn run_transition(&self, transition: PostTransition, id: PostId) -> RepoResult<Post> {
        match transition {
            PostTransition::IncrementView => self.repo.increment_views(id),
            PostTransition::TogglePublish => self.repo.toggle_published(id),
        }
    }
}

fn require_id(raw_id: &str) -> ServiceResult<PostId> {
    parse_record_id(raw_id).ok_or_else(|| ServiceError::NotFound {
        id: raw_id.to_string(),
    })
}
