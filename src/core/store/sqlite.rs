use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection};
use serde_json::Value;
use std::path::Path;

use super::schema::{self, Column, ColumnKind, TableSchema, TABLES};
use super::{DataStore, Filter, Query, QueryResult, Row};
use crate::error::Error;
use crate::Result;

/// SQLite-backed store. Identifiers come from the static schema; values are
/// always bound as parameters.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database file and make sure every table exists.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    Error::internal_io(e.to_string(), Some(format!("create {}", parent.display())))
                })?;
            }
        }

        let conn = Connection::open(path)
            .map_err(|e| Error::store_query_failed("*", "open", e.to_string()))?;
        log_status!("store", "Opened {}", path.display());
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::store_query_failed("*", "open", e.to_string()))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<()> {
        for table in TABLES {
            self.conn
                .execute(&schema::create_table_sql(table), [])
                .map_err(|e| map_sql_error(table.name, "migrate", e))?;
        }
        Ok(())
    }
}

fn map_sql_error(table: &str, operation: &str, err: rusqlite::Error) -> Error {
    match &err {
        rusqlite::Error::SqliteFailure(code, _)
            if code.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Error::store_constraint_violation(table, operation, err.to_string())
        }
        _ => Error::store_query_failed(table, operation, err.to_string()),
    }
}

fn to_sql(table: &str, column: &Column, value: &Value) -> Result<SqlValue> {
    let converted = match (column.kind, value) {
        (_, Value::Null) => SqlValue::Null,
        (ColumnKind::Json, v) => SqlValue::Text(v.to_string()),
        (ColumnKind::Text, Value::String(s)) => SqlValue::Text(s.clone()),
        (ColumnKind::Integer, Value::Number(n)) if n.is_i64() => {
            SqlValue::Integer(n.as_i64().unwrap_or_default())
        }
        (ColumnKind::Real, Value::Number(n)) => SqlValue::Real(n.as_f64().unwrap_or_default()),
        (kind, v) => {
            return Err(Error::store_query_failed(
                table,
                "bind",
                format!("column '{}' expects {:?}, got {}", column.name, kind, v),
            ))
        }
    };
    Ok(converted)
}

fn from_sql(table: &str, column: &Column, value: SqlValue) -> Result<Value> {
    let converted = match (column.kind, value) {
        (_, SqlValue::Null) => Value::Null,
        (ColumnKind::Json, SqlValue::Text(s)) => serde_json::from_str(&s).map_err(|e| {
            Error::internal_json(e.to_string(), Some(format!("decode {}.{}", table, column.name)))
        })?,
        (_, SqlValue::Text(s)) => Value::String(s),
        (_, SqlValue::Integer(i)) => Value::from(i),
        (_, SqlValue::Real(f)) => Value::from(f),
        (_, SqlValue::Blob(_)) => {
            return Err(Error::store_query_failed(
                table,
                "decode",
                format!("unexpected blob in column '{}'", column.name),
            ))
        }
    };
    Ok(converted)
}

/// Render filters into a WHERE clause, pushing bound values onto `params`.
fn where_clause(
    schema: &TableSchema,
    filters: &[Filter],
    params: &mut Vec<SqlValue>,
) -> Result<String> {
    if filters.is_empty() {
        return Ok(String::new());
    }

    let mut parts = Vec::with_capacity(filters.len());
    for filter in filters {
        let column = schema.column(filter.column())?;
        match filter {
            Filter::Eq(_, value) => {
                if value.is_null() {
                    parts.push(format!("\"{}\" IS NULL", column.name));
                } else {
                    params.push(to_sql(schema.name, column, value)?);
                    parts.push(format!("\"{}\" = ?", column.name));
                }
            }
            Filter::Like(_, pattern) => {
                params.push(SqlValue::Text(pattern.clone()));
                parts.push(format!("\"{}\" LIKE ?", column.name));
            }
            Filter::In(_, values) => {
                if values.is_empty() {
                    parts.push("0".to_string());
                    continue;
                }
                for value in values {
                    params.push(to_sql(schema.name, column, value)?);
                }
                let marks = vec!["?"; values.len()].join(", ");
                parts.push(format!("\"{}\" IN ({})", column.name, marks));
            }
        }
    }

    Ok(format!(" WHERE {}", parts.join(" AND ")))
}

impl DataStore for SqliteStore {
    fn query_rows(&self, table: &str, query: &Query) -> Result<QueryResult> {
        let schema = schema::table(table)?;

        let columns: Vec<&Column> = match &query.columns {
            Some(names) => names
                .iter()
                .map(|n| schema.column(n))
                .collect::<Result<_>>()?,
            None => schema.columns.iter().collect(),
        };
        let column_list = columns
            .iter()
            .map(|c| format!("\"{}\"", c.name))
            .collect::<Vec<_>>()
            .join(", ");

        let mut params = Vec::new();
        let where_sql = where_clause(schema, &query.filters, &mut params)?;

        let mut sql = format!("SELECT {} FROM \"{}\"{}", column_list, schema.name, where_sql);

        if !query.sort.is_empty() {
            let order = query
                .sort
                .iter()
                .map(|s| {
                    schema.column(&s.column).map(|c| {
                        format!("\"{}\" {}", c.name, if s.ascending { "ASC" } else { "DESC" })
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            sql.push_str(&format!(" ORDER BY {}", order.join(", ")));
        }

        if let Some(range) = query.range {
            sql.push_str(&format!(" LIMIT {} OFFSET {}", range.limit, range.offset));
        }

        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| map_sql_error(table, "select", e))?;
        let raw_rows = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                (0..columns.len())
                    .map(|i| row.get::<_, SqlValue>(i))
                    .collect::<rusqlite::Result<Vec<_>>>()
            })
            .map_err(|e| map_sql_error(table, "select", e))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| map_sql_error(table, "select", e))?;

        let mut rows = Vec::with_capacity(raw_rows.len());
        for raw in raw_rows {
            let mut row = Row::new();
            for (column, value) in columns.iter().zip(raw) {
                row.insert(column.name.to_string(), from_sql(table, column, value)?);
            }
            rows.push(row);
        }

        let total_count = if query.count {
            let mut count_params = Vec::new();
            let where_sql = where_clause(schema, &query.filters, &mut count_params)?;
            let count_sql = format!("SELECT COUNT(*) FROM \"{}\"{}", schema.name, where_sql);
            let total: i64 = self
                .conn
                .query_row(&count_sql, params_from_iter(count_params.iter()), |r| r.get(0))
                .map_err(|e| map_sql_error(table, "count", e))?;
            Some(total.max(0) as u64)
        } else {
            None
        };

        Ok(QueryResult { rows, total_count })
    }

    fn insert_row(&self, table: &str, row: Row) -> Result<Row> {
        let schema = schema::table(table)?;
        if row.is_empty() {
            return Err(Error::validation_invalid_argument(
                "row",
                "Cannot insert an empty row",
                None,
                None,
            ));
        }

        let mut names = Vec::with_capacity(row.len());
        let mut params = Vec::with_capacity(row.len());
        for (key, value) in &row {
            let column = schema.column(key)?;
            names.push(format!("\"{}\"", column.name));
            params.push(to_sql(table, column, value)?);
        }

        let sql = format!(
            "INSERT INTO \"{}\" ({}) VALUES ({})",
            schema.name,
            names.join(", "),
            vec!["?"; names.len()].join(", ")
        );
        self.conn
            .execute(&sql, params_from_iter(params.iter()))
            .map_err(|e| map_sql_error(table, "insert", e))?;

        Ok(row)
    }

    fn update_rows(&self, table: &str, filters: &[Filter], patch: Row) -> Result<usize> {
        let schema = schema::table(table)?;
        if patch.is_empty() {
            return Ok(0);
        }

        let mut assignments = Vec::with_capacity(patch.len());
        let mut params = Vec::new();
        for (key, value) in &patch {
            let column = schema.column(key)?;
            assignments.push(format!("\"{}\" = ?", column.name));
            params.push(to_sql(table, column, value)?);
        }
        let where_sql = where_clause(schema, filters, &mut params)?;

        let sql = format!(
            "UPDATE \"{}\" SET {}{}",
            schema.name,
            assignments.join(", "),
            where_sql
        );
        self.conn
            .execute(&sql, params_from_iter(params.iter()))
            .map_err(|e| map_sql_error(table, "update", e))
    }

    fn delete_rows(&self, table: &str, filters: &[Filter]) -> Result<usize> {
        let schema = schema::table(table)?;
        let mut params = Vec::new();
        let where_sql = where_clause(schema, filters, &mut params)?;

        let sql = format!("DELETE FROM \"{}\"{}", schema.name, where_sql);
        self.conn
            .execute(&sql, params_from_iter(params.iter()))
            .map_err(|e| map_sql_error(table, "delete", e))
    }

    fn count_rows(&self, table: &str) -> Result<u64> {
        let schema = schema::table(table)?;
        let sql = format!("SELECT COUNT(*) FROM \"{}\"", schema.name);
        let total: i64 = self
            .conn
            .query_row(&sql, [], |r| r.get(0))
            .map_err(|e| map_sql_error(table, "count", e))?;
        Ok(total.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::schema::{DRINKS, INGREDIENTS};
    use crate::store::Range;
    use crate::ErrorCode;
    use serde_json::json;

    fn drink(id: &str, slug: &str) -> Row {
        json!({
            "id": id,
            "slug": slug,
            "name": slug,
            "instructions": {"type": "doc", "content": []},
            "owner": "tester",
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z",
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn json_column_round_trips() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.insert_row(DRINKS, drink("1", "negroni")).unwrap();

        let result = store
            .query_rows(DRINKS, &Query::new().filter(Filter::eq("slug", "negroni")))
            .unwrap();
        assert_eq!(result.rows[0]["instructions"]["type"], "doc");
        assert_eq!(result.rows[0]["description"], Value::Null);
    }

    #[test]
    fn duplicate_slug_is_constraint_violation() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.insert_row(DRINKS, drink("1", "negroni")).unwrap();
        let err = store.insert_row(DRINKS, drink("2", "negroni")).unwrap_err();
        assert_eq!(err.code, ErrorCode::StoreConstraintViolation);
        assert_eq!(err.retryable, Some(false));
    }

    #[test]
    fn prefix_like_with_count_and_range() {
        let store = SqliteStore::open_in_memory().unwrap();
        for (i, slug) in ["sour", "sour_2", "sour_3", "spritz"].iter().enumerate() {
            store.insert_row(DRINKS, drink(&i.to_string(), slug)).unwrap();
        }

        let result = store
            .query_rows(
                DRINKS,
                &Query::new()
                    .select(&["slug"])
                    .filter(Filter::like("slug", "sour%"))
                    .order_by("slug", false)
                    .range(Range { offset: 0, limit: 2 })
                    .with_count(),
            )
            .unwrap();

        let slugs: Vec<&str> = result.rows.iter().map(|r| r["slug"].as_str().unwrap()).collect();
        assert_eq!(slugs, vec!["sour_3", "sour_2"]);
        assert_eq!(result.total_count, Some(3));
        assert_eq!(result.rows[0].len(), 1);
    }

    #[test]
    fn unknown_column_never_reaches_sql() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = store
            .query_rows(DRINKS, &Query::new().filter(Filter::eq("slug\" OR 1=1 --", "x")))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationInvalidArgument);
    }

    #[test]
    fn nocase_name_matches_eq() {
        let store = SqliteStore::open_in_memory().unwrap();
        let row = json!({"id": "1", "name": "Lime", "owner": "t", "created_at": "x"});
        store.insert_row(INGREDIENTS, row.as_object().cloned().unwrap()).unwrap();

        let result = store
            .query_rows(INGREDIENTS, &Query::new().filter(Filter::eq("name", "LIME")))
            .unwrap();
        assert_eq!(result.rows.len(), 1);
    }

    #[test]
    fn open_creates_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("drinks.db");
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.count_rows(DRINKS).unwrap(), 0);
        assert!(path.exists());
    }

    #[test]
    fn empty_in_filter_matches_nothing() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.insert_row(DRINKS, drink("1", "negroni")).unwrap();
        let result = store
            .query_rows(DRINKS, &Query::new().filter(Filter::is_in("id", vec![])))
            .unwrap();
        assert!(result.rows.is_empty());
    }

    #[test]
    fn like_is_case_insensitive_and_underscore_matches_one_char() {
        let store = SqliteStore::open_in_memory().unwrap();
        for (i, slug) in ["gin_2", "ginx2", "gin2", "Gin_fizz"].iter().enumerate() {
            store.insert_row(DRINKS, drink(&i.to_string(), slug)).unwrap();
        }

        let result = store
            .query_rows(
                DRINKS,
                &Query::new()
                    .filter(Filter::like("slug", "GIN_2%"))
                    .order_by("slug", true),
            )
            .unwrap();
        let slugs: Vec<&str> = result.rows.iter().map(|r| r["slug"].as_str().unwrap()).collect();
        assert_eq!(slugs, vec!["gin_2", "ginx2"]);
    }

    #[test]
    fn missing_required_column_is_constraint_violation() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut row = drink("1", "negroni");
        row.remove("owner");
        let err = store.insert_row(DRINKS, row).unwrap_err();
        assert_eq!(err.code, ErrorCode::StoreConstraintViolation);
    }
}
