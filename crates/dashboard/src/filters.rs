//! Askama filters for dashboard templates.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Year for the page footer: `{{ ""|current_year }}`.
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Table cell text, `-` when blank: `{{ category.description|or_dash }}`.
#[askama::filter_fn]
pub fn or_dash(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(dash_if_blank(&value.to_string()))
}

fn dash_if_blank(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        "-".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dash_if_blank() {
        assert_eq!(dash_if_blank(""), "-");
        assert_eq!(dash_if_blank("   "), "-");
        assert_eq!(dash_if_blank(" Phones "), "Phones");
    }
}
