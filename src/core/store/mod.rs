//! Row-level data store abstraction.
//!
//! Rows are JSON objects keyed by column name. Every domain module talks to a
//! `&dyn DataStore`; `SqliteStore` backs it with a database file, or with an
//! in-memory database for tests and `--memory`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Error;
use crate::Result;

pub mod schema;
mod sqlite;

pub use schema::{Column, ColumnKind, TableSchema};
pub use sqlite::SqliteStore;

pub type Row = Map<String, Value>;

/// Trait for row operations
pub trait DataStore {
    fn query_rows(&self, table: &str, query: &Query) -> Result<QueryResult>;
    fn insert_row(&self, table: &str, row: Row) -> Result<Row>;
    fn update_rows(&self, table: &str, filters: &[Filter], patch: Row) -> Result<usize>;
    fn delete_rows(&self, table: &str, filters: &[Filter]) -> Result<usize>;
    fn count_rows(&self, table: &str) -> Result<u64>;
}

/// Row predicate. All filters in a query are ANDed.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    /// SQL LIKE semantics: `%` matches any run, `_` one character, ASCII case-insensitive.
    Like(String, String),
    In(String, Vec<Value>),
}

impl Filter {
    pub fn eq(column: &str, value: impl Into<Value>) -> Self {
        Filter::Eq(column.to_string(), value.into())
    }

    pub fn like(column: &str, pattern: impl Into<String>) -> Self {
        Filter::Like(column.to_string(), pattern.into())
    }

    pub fn is_in(column: &str, values: Vec<Value>) -> Self {
        Filter::In(column.to_string(), values)
    }

    pub fn column(&self) -> &str {
        match self {
            Filter::Eq(c, _) | Filter::Like(c, _) | Filter::In(c, _) => c,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub column: String,
    pub ascending: bool,
}

/// Zero-based window over the sorted result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub offset: usize,
    pub limit: usize,
}

impl Range {
    /// Window for a one-based page number.
    pub fn page(page: usize, page_size: usize) -> Self {
        Self {
            offset: page.saturating_sub(1) * page_size,
            limit: page_size,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub columns: Option<Vec<String>>,
    pub filters: Vec<Filter>,
    pub sort: Vec<Sort>,
    pub range: Option<Range>,
    /// Also report how many rows match the filters, ignoring `range`.
    pub count: bool,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, columns: &[&str]) -> Self {
        self.columns = Some(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
        self.sort.push(Sort {
            column: column.to_string(),
            ascending,
        });
        self
    }

    pub fn range(mut self, range: Range) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_count(mut self) -> Self {
        self.count = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub rows: Vec<Row>,
    pub total_count: Option<u64>,
}

/// Decode a stored row into a typed record.
pub fn decode<T: DeserializeOwned>(table: &str, row: Row) -> Result<T> {
    serde_json::from_value(Value::Object(row))
        .map_err(|e| Error::internal_json(e.to_string(), Some(format!("decode {} row", table))))
}

/// Encode a typed record into a row.
pub fn encode<T: Serialize>(table: &str, record: &T) -> Result<Row> {
    match serde_json::to_value(record) {
        Ok(Value::Object(row)) => Ok(row),
        Ok(other) => Err(Error::internal_json(
            format!("expected an object, got {}", other),
            Some(format!("encode {} row", table)),
        )),
        Err(e) => Err(Error::internal_json(
            e.to_string(),
            Some(format!("encode {} row", table)),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_page_is_one_based() {
        assert_eq!(Range::page(1, 10), Range { offset: 0, limit: 10 });
        assert_eq!(Range::page(3, 10), Range { offset: 20, limit: 10 });
        assert_eq!(Range::page(0, 10).offset, 0);
    }

    #[test]
    fn query_builder_collects_clauses() {
        let query = Query::new()
            .select(&["slug"])
            .filter(Filter::like("slug", "gin%"))
            .order_by("slug", true)
            .range(Range::page(2, 5))
            .with_count();

        assert_eq!(query.columns, Some(vec!["slug".to_string()]));
        assert_eq!(query.filters[0].column(), "slug");
        assert!(query.sort[0].ascending);
        assert_eq!(query.range, Some(Range { offset: 5, limit: 5 }));
        assert!(query.count);
    }
}
