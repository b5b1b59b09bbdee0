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

/// Turns a slug or lowercase facet value into a heading.
///
/// Usage in templates: `{{ "sweat-shirts"|title_case }}` renders `Sweat Shirts`.
#[askama::filter_fn]
pub fn title_case(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(crate::catalog::title_case(&value.to_string()))
}

/// First letter of a name, upper-cased, for avatar bubbles.
///
/// Usage in templates: `{{ user.first_name()|initial }}`
#[askama::filter_fn]
pub fn initial(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(value
        .to_string()
        .chars()
        .find(|c| c.is_alphanumeric())
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use crate::catalog::title_case;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("sweat-shirts"), "Sweat Shirts");
        assert_eq!(title_case("men"), "Men");
        assert_eq!(title_case("t_shirts  polo"), "T Shirts Polo");
        assert_eq!(title_case(""), "");
    }
}
