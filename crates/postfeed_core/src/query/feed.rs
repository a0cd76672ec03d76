//! Feed query builder for listing published posts.
//!
//! # Responsibility
//! - Coerce loosely-typed `searchString`/`skip`/`take`/`orderBy` texts.
//! - Produce a [`FeedQuery`] any conforming store can execute.
//!
//! # Invariants
//! - The filter always requires `published == true`.
//! - An absent, invalid, negative or zero bound is omitted, never clamped.
//! - An unknown sort token omits ordering.

use serde::Deserialize;

/// Raw feed parameters as extracted from the request query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedParams {
    #[serde(default)]
    pub search_string: Option<String>,
    #[serde(default)]
    pub skip: Option<String>,
    #[serde(default)]
    pub take: Option<String>,
    #[serde(default)]
    pub order_by: Option<String>,
}

/// Post fields a feed predicate or ordering can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostField {
    Title,
    Content,
    Published,
    UpdatedAt,
}

/// Filter predicate tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Boolean field equality.
    Equals(PostField, bool),
    /// Text containment; matching rules belong to the executing store.
    Contains(PostField, String),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Parses `asc`/`desc`, ignoring case and surrounding whitespace.
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub field: PostField,
    pub order: SortOrder,
}

/// Descriptor for the published-posts feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    pub filter: Predicate,
    pub order: Option<OrderBy>,
    pub skip: Option<u64>,
    pub take: Option<u64>,
}

/// Outcome of coercing one optional pagination text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bound {
    Absent,
    Valid(u64),
    Invalid(String),
}

impl Bound {
    /// Maps the parse outcome to an applied bound; zero means "no bound".
    pub fn applied(&self) -> Option<u64> {
        match self {
            Self::Valid(0) | Self::Absent | Self::Invalid(_) => None,
            Self::Valid(value) => Some(*value),
        }
    }
}

/// Total parser for pagination texts.
///
/// Accepts ASCII decimal digits only, after trimming whitespace. A leading
/// sign, a fraction or an overflowing value is `Invalid`.
pub fn parse_bound(raw: Option<&str>) -> Bound {
    let Some(raw) = raw else {
        return Bound::Absent;
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
        return Bound::Invalid(raw.to_string());
    }
    match trimmed.parse::<u64>() {
        Ok(value) => Bound::Valid(value),
        Err(_) => Bound::Invalid(raw.to_string()),
    }
}

/// Builds the feed descriptor from raw parameters.
pub fn build_feed_query(params: &FeedParams) -> FeedQuery {
    let published = Predicate::Equals(PostField::Published, true);
    let filter = match params
        .search_string
        .as_deref()
        .filter(|search| !search.is_empty())
    {
        Some(search) => Predicate::And(vec![
            published,
            Predicate::Or(vec![
                Predicate::Contains(PostField::Title, search.to_string()),
                Predicate::Contains(PostField::Content, search.to_string()),
            ]),
        ]),
        None => published,
    };

    let order = params
        .order_by
        .as_deref()
        .and_then(SortOrder::parse)
        .map(|order| OrderBy {
            field: PostField::UpdatedAt,
            order,
        });

    FeedQuery {
        filter,
        order,
        skip: parse_bound(params.skip.as_deref()).applied(),
        take: parse_bound(params.take.as_deref()).applied(),
    }
}
