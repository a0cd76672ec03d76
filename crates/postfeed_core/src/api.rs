//! Request dispatch for the author/post endpoints.
//!
//! # Responsibility
//! - Route method + path pairs to service operations.
//! - Deserialize request bodies and query parameters at the boundary.
//! - Map service errors to status codes and JSON error payloads.
//!
//! # Invariants
//! - Storage diagnostics never reach a response body.
//! - Dispatch never panics; every outcome is an [`ApiResponse`].
//! - Services are built per request over the caller's connection; nothing is
//!   cached between requests.

use crate::model::author::SignupRequest;
use crate::model::post::CreatePostRequest;
use crate::query::feed::FeedParams;
use crate::repo::author_repo::SqliteAuthorRepository;
use crate::repo::post_repo::SqlitePostRepository;
use crate::repo::RepoError;
use crate::service::author_service::AuthorService;
use crate::service::post_service::PostService;
use crate::service::ServiceError;
use log::{error, info};
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

const STORE_FAILURE_MESSAGE: &str = "internal storage error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Parses a method name, ignoring case.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// One already-parsed request handed over by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: BTreeMap::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Status code plus JSON payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route<'a> {
    Signup,
    CreatePost,
    IncrementViews(&'a str),
    Publish(&'a str),
    Post(&'a str),
    Users,
    Posts,
    Drafts(&'a str),
    Feed,
}

impl<'a> Route<'a> {
    /// Matches a bare path. Query parameters travel in [`ApiRequest::query`],
    /// so a path carrying `?` matches no route.
    fn resolve(path: &'a str) -> Option<Self> {
        if path.contains('?') {
            return None;
        }
        let segments = path.trim_matches('/').split('/').collect::<Vec<_>>();
        match segments.as_slice() {
            ["signup"] => Some(Self::Signup),
            ["post"] => Some(Self::CreatePost),
            ["post", id, "views"] => Some(Self::IncrementViews(*id)),
            ["publish", id] => Some(Self::Publish(*id)),
            ["post", id] => Some(Self::Post(*id)),
            ["users"] => Some(Self::Users),
            ["posts"] => Some(Self::Posts),
            ["user", id, "drafts"] => Some(Self::Drafts(*id)),
            ["feed"] => Some(Self::Feed),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Signup => "signup",
            Self::CreatePost => "create_post",
            Self::IncrementViews(_) => "increment_views",
            Self::Publish(_) => "publish",
            Self::Post(_) => "post",
            Self::Users => "users",
            Self::Posts => "posts",
            Self::Drafts(_) => "drafts",
            Self::Feed => "feed",
        }
    }

    fn allows(self, method: Method) -> bool {
        match self {
            Self::Signup | Self::CreatePost => method == Method::Post,
            Self::IncrementViews(_) | Self::Publish(_) => method == Method::Put,
            Self::Post(_) => matches!(method, Method::Get | Method::Delete),
            Self::Users | Self::Posts | Self::Drafts(_) | Self::Feed => method == Method::Get,
        }
    }
}

/// Dispatches one request against `conn`.
pub fn handle(conn: &Connection, request: &ApiRequest) -> ApiResponse {
    let Some(route) = Route::resolve(&request.path) else {
        info!(
            "event=api_request module=api status=404 method={} route=unknown",
            request.method
        );
        return ApiResponse::error(404, "route not found");
    };

    let response = if route.allows(request.method) {
        dispatch(conn, route, request)
    } else {
        ApiResponse::error(405, "method not allowed")
    };

    info!(
        "event=api_request module=api status={} method={} route={}",
        response.status,
        request.method,
        route.name()
    );
    response
}

fn dispatch(conn: &Connection, route: Route<'_>, request: &ApiRequest) -> ApiResponse {
    match route {
        Route::Signup => with_authors(conn, |service| {
            let body = parse_body::<SignupRequest>(request)?;
            service.signup(body).map_err(Rejection::from)
        }),
        Route::Users => with_authors(conn, |service| service.list_authors()),
        Route::Drafts(id) => with_authors(conn, |service| service.list_drafts(id)),
        Route::CreatePost => with_posts(conn, |service| {
            let body = parse_body::<CreatePostRequest>(request)?;
            service.create_post(body).map_err(Rejection::from)
        }),
        Route::IncrementViews(id) => with_posts(conn, |service| service.increment_view(id)),
        Route::Publish(id) => with_posts(conn, |service| service.toggle_publish(id)),
        Route::Post(id) if request.method == Method::Delete => {
            with_posts(conn, |service| service.delete_post(id))
        }
        Route::Post(id) => with_posts(conn, |service| service.get_post(id)),
        Route::Posts => with_posts(conn, |service| service.list_posts()),
        Route::Feed => with_posts(conn, |service| service.feed(&feed_params(&request.query))),
    }
}

/// Boundary failure raised before a service call.
enum Rejection {
    MalformedBody(String),
    Service(ServiceError),
}

impl From<ServiceError> for Rejection {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

fn with_authors<'c, T, E>(
    conn: &'c Connection,
    run: impl FnOnce(&AuthorService<SqliteAuthorRepository<'c>>) -> Result<T, E>,
) -> ApiResponse
where
    T: Serialize,
    E: Into<Rejection>,
{
    match SqliteAuthorRepository::try_new(conn) {
        Ok(repo) => respond(run(&AuthorService::new(repo)).map_err(Into::into)),
        Err(err) => store_failure(&err),
    }
}

fn with_posts<'c, T, E>(
    conn: &'c Connection,
    run: impl FnOnce(&PostService<SqlitePostRepository<'c>>) -> Result<T, E>,
) -> ApiResponse
where
    T: Serialize,
    E: Into<Rejection>,
{
    match SqlitePostRepository::try_new(conn) {
        Ok(repo) => respond(run(&PostService::new(repo)).map_err(Into::into)),
        Err(err) => store_failure(&err),
    }
}

fn parse_body<T: DeserializeOwned>(request: &ApiRequest) -> Result<T, Rejection> {
    let body = request
        .body
        .clone()
        .unwrap_or_else(|| Value::Object(Default::default()));
    serde_json::from_value(body).map_err(|err| Rejection::MalformedBody(err.to_string()))
}

fn feed_params(query: &BTreeMap<String, String>) -> FeedParams {
    FeedParams {
        search_string: query.get("searchString").cloned(),
        skip: query.get("skip").cloned(),
        take: query.get("take").cloned(),
        order_by: query.get("orderBy").cloned(),
    }
}

fn respond<T: Serialize>(result: Result<T, Rejection>) -> ApiResponse {
    match result {
        Ok(value) => match serde_json::to_value(&value) {
            Ok(body) => ApiResponse { status: 200, body },
            Err(err) => {
                error!("event=api_serialize module=api status=error error={err}");
                ApiResponse::error(500, STORE_FAILURE_MESSAGE)
            }
        },
        Err(Rejection::MalformedBody(message)) => {
            ApiResponse::error(400, format!("malformed request body: {message}"))
        }
        Err(Rejection::Service(err)) => service_failure(err),
    }
}

fn service_failure(err: ServiceError) -> ApiResponse {
    match &err {
        ServiceError::Validation(_) => ApiResponse::error(400, err.to_string()),
        ServiceError::NotFound { .. } => ApiResponse::error(404, err.to_string()),
        ServiceError::ConstraintViolation(_) => ApiResponse::error(409, err.to_string()),
        ServiceError::StoreUnavailable(inner) => store_failure(inner),
    }
}

fn store_failure(err: &RepoError) -> ApiResponse {
    error!("event=api_store module=api status=error error={err}");
    ApiResponse::error(500, STORE_FAILURE_MESSAGE)
}
