//! Storage-agnostic query descriptors.
//!
//! # Responsibility
//! - Translate raw request parameters into filter/sort/pagination values.
//! - Stay pure: nothing here touches a connection.
//!
//! # Invariants
//! - Identical inputs always produce an identical descriptor.

pub mod feed;
