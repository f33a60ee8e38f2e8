//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// CSS class for a nutrition grade badge, e.g. `grade-a`.
///
/// Usage in templates: `{{ product.nutrition_grade|grade_class }}`
#[askama::filter_fn]
pub fn grade_class(grade: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format!("grade-{}", grade.to_string().to_ascii_lowercase()))
}
