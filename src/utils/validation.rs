//! Input validation primitives.
//!
//! Small helpers that turn a failed check into `Error::validation_invalid_argument`
//! so call sites stay one line.

use crate::error::{Error, Result};

/// Require an Option to contain a value.
///
/// ```ignore
/// let slug = validation::require(args.slug, "slug", "Pass a drink slug")?;
/// ```
pub fn require<T>(opt: Option<T>, field: &str, message: &str) -> Result<T> {
    opt.ok_or_else(|| Error::validation_invalid_argument(field, message, None, None))
}

/// Require a string to be non-empty after trimming.
///
/// Returns a reference to the trimmed string on success.
pub fn require_non_empty<'a>(value: &'a str, field: &str, message: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(Error::validation_invalid_argument(field, message, None, None))
    } else {
        Ok(trimmed)
    }
}

/// Require a finite number greater than zero.
pub fn require_positive(value: f64, field: &str) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(Error::validation_invalid_argument(
            field,
            format!("{} must be a number greater than zero (got {})", field, value),
            Some(value.to_string()),
            None,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_returns_value_when_some() {
        let result = require(Some("negroni"), "slug", "msg");
        assert_eq!(result.unwrap(), "negroni");
    }

    #[test]
    fn require_returns_error_when_none() {
        let result: Result<&str> = require(None, "slug", "Missing slug");
        let err = result.unwrap_err();
        assert_eq!(err.details["field"], "slug");
    }

    #[test]
    fn require_non_empty_trims_whitespace() {
        let result = require_non_empty("  ana  ", "user", "msg");
        assert_eq!(result.unwrap(), "ana");
    }

    #[test]
    fn require_non_empty_fails_for_whitespace_only() {
        let result = require_non_empty("   ", "user", "Cannot be empty");
        assert!(result.is_err());
    }

    #[test]
    fn require_positive_accepts_fractions() {
        assert_eq!(require_positive(0.25, "quantity").unwrap(), 0.25);
    }

    #[test]
    fn require_positive_rejects_zero_negative_and_non_finite() {
        for bad in [0.0, -0.5, f64::NAN, f64::NEG_INFINITY] {
            assert!(require_positive(bad, "quantity").is_err());
        }
    }
}
