//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Registration, login and email change
//! - `substitutes` - Healthier substitute search
//! - `favorites` - Per-user product bookmarks

pub mod auth;
pub mod favorites;
pub mod substitutes;

pub use auth::AuthService;
pub use favorites::FavoriteService;
pub use substitutes::SubstituteFinder;
