//! Slug generation for drinks.
//!
//! A display name is normalized to a base (`"  My Drink!! "` -> `my_drink`) and
//! then numbered against the slugs already stored under that base. Numbering
//! fills the lowest free slot: with `negroni` and `negroni_3` stored, the next
//! "Negroni" becomes `negroni_2`, and once `negroni_3` is deleted a new one
//! takes `3` again.

use regex::Regex;

use crate::error::Error;
use crate::store::{DataStore, Filter, Query};
use crate::Result;

/// Longest display name accepted for drinks and ingredients (after trimming).
pub const MAX_NAME_LENGTH: usize = 50;

/// Normalize a display name into a slug base.
///
/// Trims, collapses whitespace runs into one underscore, drops anything outside
/// `[A-Za-z0-9_-]` and lowercases. Fails unless the result keeps at least one
/// ASCII letter or digit.
pub fn normalize_base(name: &str) -> Result<String> {
    let mut out = String::with_capacity(name.len());

    for (i, word) in name.split_whitespace().enumerate() {
        if i > 0 {
            out.push('_');
        }
        out.extend(
            word.chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
                .map(|c| c.to_ascii_lowercase()),
        );
    }

    if !out.chars().any(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::validation_invalid_name(
            name,
            "Name must contain at least one letter or number",
        ));
    }

    Ok(out)
}

/// Check a display name against the length rules shared by drinks and ingredients.
///
/// Returns the trimmed name.
pub fn validate_display_name(name: &str, max_len: usize) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::validation_invalid_name(name, "Name cannot be empty"));
    }

    let len = trimmed.chars().count();
    if len > max_len {
        return Err(Error::validation_invalid_name(
            name,
            format!("Name must be at most {} characters (got {})", max_len, len),
        ));
    }

    Ok(trimmed)
}

/// Compute a slug for `name` that collides with none of `existing`.
pub fn generate_slug<S: AsRef<str>>(name: &str, existing: &[S]) -> Result<String> {
    let base = normalize_base(name)?;
    let taken = suffix_numbers(&base, existing)?;
    let number = first_free_number(&taken);

    if number == 1 {
        Ok(base)
    } else {
        Ok(format!("{}_{}", base, number))
    }
}

/// Fetch the slugs sharing `name`'s base from `table` and number against them.
///
/// The name is rejected before the store is touched when it has no usable base.
pub fn next_slug(store: &dyn DataStore, table: &str, name: &str) -> Result<String> {
    let base = normalize_base(name)?;

    let query = Query::new()
        .select(&["slug"])
        .filter(Filter::like("slug", format!("{}%", base)));
    let existing: Vec<String> = store
        .query_rows(table, &query)?
        .rows
        .iter()
        .filter_map(|row| row.get("slug").and_then(|v| v.as_str()).map(str::to_string))
        .collect();

    generate_slug(name, &existing)
}

/// Extract the friendly number each existing slug occupies under `base`.
///
/// `base` counts as 1, `base_N` as N; anything else (or `base_0`) is ignored.
/// The result is sorted ascending.
fn suffix_numbers<S: AsRef<str>>(base: &str, existing: &[S]) -> Result<Vec<u64>> {
    let pattern = Regex::new(&format!(r"^{}(?:_(\d+))?$", regex::escape(base)))
        .map_err(|e| Error::internal_unexpected(format!("slug pattern: {}", e)))?;

    let mut numbers: Vec<u64> = existing
        .iter()
        .filter_map(|slug| {
            let caps = pattern.captures(slug.as_ref())?;
            match caps.get(1) {
                None => Some(1),
                Some(m) => m.as_str().parse::<u64>().ok(),
            }
        })
        .filter(|n| *n > 0)
        .collect();

    numbers.sort_unstable();
    Ok(numbers)
}

/// Lowest positive number not occupied in the sorted `taken` list.
///
/// `base` and `base_1` both occupy slot 1, so repeats are collapsed before
/// scanning; otherwise a repeat would shift every later slot by one.
fn first_free_number(taken: &[u64]) -> u64 {
    let mut slots = taken.to_vec();
    slots.dedup();

    for (i, n) in slots.iter().enumerate() {
        let expected = i as u64 + 1;
        if *n != expected {
            return expected;
        }
    }

    slots.len() as u64 + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{QueryResult, Row, SqliteStore};
    use crate::ErrorCode;
    use serde_json::json;

    #[test]
    fn normalize_trims_and_strips_punctuation() {
        assert_eq!(normalize_base("  My Drink!! ").unwrap(), "my_drink");
    }

    #[test]
    fn normalize_collapses_whitespace_runs() {
        assert_eq!(normalize_base("Old \t  Fashioned").unwrap(), "old_fashioned");
    }

    #[test]
    fn normalize_keeps_dash_and_underscore() {
        assert_eq!(normalize_base("Gin-Tonic_Classic").unwrap(), "gin-tonic_classic");
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize_base("Whiskey Sour #2").unwrap();
        assert_eq!(normalize_base(&once).unwrap(), once);
    }

    #[test]
    fn normalize_drops_non_ascii_letters() {
        assert_eq!(normalize_base("Piña Colada").unwrap(), "pia_colada");
    }

    #[test]
    fn normalize_only_special_fails() {
        let err = normalize_base("!@#$%").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationInvalidName);
    }

    #[test]
    fn normalize_whitespace_only_fails() {
        assert!(normalize_base("   ").is_err());
    }

    #[test]
    fn normalize_separators_only_fails() {
        assert!(normalize_base("! ? !").is_err());
    }

    #[test]
    fn normalize_dashes_and_underscores_alone_fail() {
        for name in ["-", "- -", "_", "_-_"] {
            let err = normalize_base(name).unwrap_err();
            assert_eq!(err.code, ErrorCode::ValidationInvalidName, "name {:?}", name);
        }
        assert_eq!(normalize_base("- 7 -").unwrap(), "-_7_-");
    }

    #[test]
    fn generate_without_existing_returns_base() {
        let none: [&str; 0] = [];
        assert_eq!(generate_slug("  My Drink!! ", &none).unwrap(), "my_drink");
    }

    #[test]
    fn generate_after_contiguous_run_appends() {
        let existing = ["base", "base_2", "base_3"];
        assert_eq!(generate_slug("base", &existing).unwrap(), "base_4");
    }

    #[test]
    fn generate_fills_first_gap() {
        let existing = ["base", "base_3"];
        assert_eq!(generate_slug("base", &existing).unwrap(), "base_2");
    }

    #[test]
    fn generate_reuses_base_when_unsuffixed_deleted() {
        let existing = ["mojito_2", "mojito_3"];
        assert_eq!(generate_slug("Mojito", &existing).unwrap(), "mojito");
    }

    #[test]
    fn generate_reuses_deleted_number() {
        let existing = ["drink", "drink_2", "drink_4"];
        assert_eq!(generate_slug("Drink", &existing).unwrap(), "drink_3");
    }

    #[test]
    fn generate_ignores_other_bases_sharing_prefix() {
        let existing = ["sour", "sour_mix", "sour_2x", "sours"];
        assert_eq!(generate_slug("Sour", &existing).unwrap(), "sour_2");
    }

    #[test]
    fn generate_ignores_zero_suffix() {
        let existing = ["fizz_0"];
        assert_eq!(generate_slug("Fizz", &existing).unwrap(), "fizz");
    }

    #[test]
    fn generate_treats_explicit_one_as_base_slot() {
        let existing = ["drink", "drink_1", "drink_2"];
        let slug = generate_slug("drink", &existing).unwrap();
        assert_eq!(slug, "drink_3");
        assert!(!existing.contains(&slug.as_str()));
    }

    #[test]
    fn generate_never_collides_with_existing() {
        let mut existing: Vec<String> = Vec::new();
        for _ in 0..12 {
            let slug = generate_slug("Spritz", &existing).unwrap();
            assert!(!existing.contains(&slug));
            existing.push(slug);
        }
        existing.retain(|s| s != "spritz_5" && s != "spritz_9");
        let slug = generate_slug("Spritz", &existing).unwrap();
        assert_eq!(slug, "spritz_5");
    }

    #[test]
    fn generate_rejects_unusable_name() {
        let none: [&str; 0] = [];
        assert!(generate_slug("***", &none).is_err());
    }

    #[test]
    fn validate_display_name_enforces_length() {
        assert_eq!(validate_display_name("  Gimlet ", 50).unwrap(), "Gimlet");
        assert!(validate_display_name("   ", 50).is_err());
        let long = "x".repeat(51);
        assert!(validate_display_name(&long, 50).is_err());
    }

    #[test]
    fn next_slug_queries_store_by_prefix() {
        let store = SqliteStore::open_in_memory().unwrap();
        for slug in ["daiquiri", "daiquiri_2", "daiquiri_frozen"] {
            let row = json!({
                "id": slug,
                "slug": slug,
                "name": slug,
                "owner": "tester",
                "created_at": "2026-01-01T00:00:00Z",
                "updated_at": "2026-01-01T00:00:00Z",
            });
            store.insert_row("drinks", row.as_object().cloned().unwrap()).unwrap();
        }

        assert_eq!(next_slug(&store, "drinks", "Daiquiri").unwrap(), "daiquiri_3");
    }

    struct UnreachableStore;

    impl DataStore for UnreachableStore {
        fn query_rows(&self, table: &str, _query: &Query) -> Result<QueryResult> {
            Err(Error::store_query_failed(table, "select", "store offline"))
        }
        fn insert_row(&self, table: &str, _row: Row) -> Result<Row> {
            Err(Error::store_query_failed(table, "insert", "store offline"))
        }
        fn update_rows(&self, table: &str, _filters: &[Filter], _patch: Row) -> Result<usize> {
            Err(Error::store_query_failed(table, "update", "store offline"))
        }
        fn delete_rows(&self, table: &str, _filters: &[Filter]) -> Result<usize> {
            Err(Error::store_query_failed(table, "delete", "store offline"))
        }
        fn count_rows(&self, table: &str) -> Result<u64> {
            Err(Error::store_query_failed(table, "count", "store offline"))
        }
    }

    #[test]
    fn next_slug_rejects_bad_name_before_querying() {
        let err = next_slug(&UnreachableStore, "drinks", "- -").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationInvalidName);

        let err = next_slug(&UnreachableStore, "drinks", "Daiquiri").unwrap_err();
        assert_eq!(err.code, ErrorCode::StoreQueryFailed);
    }
}
