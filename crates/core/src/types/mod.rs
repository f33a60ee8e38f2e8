//! Core types for Pur Beurre.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod grade;
pub mod id;
pub mod username;

pub use email::{Email, EmailError};
pub use grade::{GradeError, NutritionGrade};
pub use id::*;
pub use username::{Username, UsernameError};
