//! Public output types for Drinkmaker operations.
//!
//! These are returned by the library and serialized as-is by the CLI.

use serde::{Deserialize, Serialize};

// ============================================================================
// Listing
// ============================================================================

/// One page of a sorted listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_count: u64,
    pub has_more: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: usize, page_size: usize, total_count: u64) -> Self {
        let seen = (page.saturating_sub(1) * page_size + items.len()) as u64;
        Self {
            has_more: seen < total_count,
            items,
            page,
            page_size,
            total_count,
        }
    }
}

// ============================================================================
// Delete Operations
// ============================================================================

/// Result of deleting a record and the rows that hung off it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub id: String,
    pub deleted: bool,
    pub related_deleted: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_has_more_until_total_seen() {
        let page = Page::new(vec![1, 2, 3], 1, 3, 7);
        assert!(page.has_more);
        let page = Page::new(vec![7], 3, 3, 7);
        assert!(!page.has_more);
    }

    #[test]
    fn page_serializes_camel_case() {
        let json = serde_json::to_value(Page::new(vec!["a"], 1, 10, 1)).unwrap();
        assert_eq!(json["pageSize"], 10);
        assert_eq!(json["totalCount"], 1);
        assert_eq!(json["hasMore"], false);
    }
}
