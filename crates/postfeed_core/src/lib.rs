//! Core logic for the postfeed author/post service.
//! This crate owns query construction and single-record transitions.

pub mod api;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;

pub use api::{handle, ApiRequest, ApiResponse, Method};
pub use config::{ConfigError, ServiceConfig};
pub use logging::{
    default_log_level, init_logging, init_stderr_logging, logging_status, LogTarget,
};
pub use model::author::{Author, AuthorId, NewAuthor, NewNestedPost, SignupRequest};
pub use model::post::{CreatePostRequest, NestedPostRequest, NewPost, Post, PostId, PostWithAuthor};
pub use model::ValidationError;
pub use query::feed::{
    build_feed_query, parse_bound, Bound, FeedParams, FeedQuery, OrderBy, PostField, Predicate,
    SortOrder,
};
pub use repo::author_repo::{AuthorRepository, SqliteAuthorRepository};
pub use repo::post_repo::{PostRepository, SqlitePostRepository};
pub use repo::{RepoError, RepoResult};
pub use service::author_service::AuthorService;
pub use service::post_service::{PostService, PostTransition};
pub use service::{parse_record_id, ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
