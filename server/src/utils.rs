use std::str::FromStr;

use regex::Regex;

use crate::error::AppError;

/// Collapse whitespace runs and trim so the upstream text search sees a
/// single-spaced query.
pub fn sanitize_query(input: &str) -> String {
    let collapse = Regex::new(r"\s+").unwrap();

    collapse.replace_all(input.trim(), " ").into_owned()
}

pub fn parse_required<T: FromStr>(value: Option<String>) -> Result<T, AppError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse().ok())
        .ok_or(AppError::Validation("Missing required parameters"))
}

pub fn parse_or<T: FromStr>(value: Option<String>, default: T) -> Result<T, AppError> {
    match value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .parse()
            .map_err(|_| AppError::Validation("Malformed parameter")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_or, parse_required, sanitize_query};

    #[test]
    fn test_collapse_spaces() {
        assert_eq!(sanitize_query("deep  dish   pizza"), "deep dish pizza");
        assert_eq!(sanitize_query("  tacos  "), "tacos");
    }

    #[test]
    fn test_newlines_and_tabs() {
        assert_eq!(sanitize_query("pad\tthai\nnear me"), "pad thai near me");
    }

    #[test]
    fn test_empty_query() {
        assert_eq!(sanitize_query(""), "");
        assert_eq!(sanitize_query("   "), "");
    }

    #[test]
    fn test_parse_required() {
        assert_eq!(parse_required::<f64>(Some("40.42".into())).unwrap(), 40.42);
        assert!(parse_required::<f64>(Some("north".into())).is_err());
        assert!(parse_required::<f64>(Some("  ".into())).is_err());
        assert!(parse_required::<f64>(None).is_err());
    }

    #[test]
    fn test_parse_or() {
        assert_eq!(parse_or(Some("250".into()), 1000u32).unwrap(), 250);
        assert_eq!(parse_or(None, 1000u32).unwrap(), 1000);
        assert!(parse_or(Some("wide".into()), 1000u32).is_err());
    }
}
