//! Pur Beurre Core - Shared domain library.
//!
//! This crate provides the pieces of Pur Beurre that have no I/O:
//! - `types` - Newtype wrappers for IDs, emails, usernames and nutrition grades
//! - `pagination` - Page-number resolution and page slicing
//! - `substitutes` - Ranking of healthier substitute products
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no database access,
//! no HTTP. The `purbeurre-web` crate fetches rows and hands them to these
//! functions, which keeps the ranking and paging rules testable in isolation.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod pagination;
pub mod substitutes;
pub mod types;

pub use pagination::{Page, PageRequest, PageWindow};
pub use substitutes::{MAX_SUBSTITUTES, Substitutable, contains_pattern, rank_substitutes};
pub use types::*;
