//! Domain models for the web application.
//!
//! These are validated domain types, separate from the row types the
//! repositories decode from `PostgreSQL`.

pub mod product;
pub mod session;
pub mod user;

pub use product::Product;
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
