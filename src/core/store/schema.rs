//! Table definitions shared by every store implementation.

use crate::error::Error;
use crate::Result;

pub const DRINKS: &str = "drinks";
pub const INGREDIENTS: &str = "ingredients";
pub const DRINK_INGREDIENTS: &str = "drink_ingredients";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Real,
    /// Arbitrary JSON stored as text.
    Json,
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub required: bool,
    /// Compare and order case-insensitively (SQLite COLLATE NOCASE).
    pub nocase: bool,
}

const fn col(name: &'static str, kind: ColumnKind, required: bool) -> Column {
    Column {
        name,
        kind,
        required,
        nocase: false,
    }
}

const fn nocase(name: &'static str) -> Column {
    Column {
        name,
        kind: ColumnKind::Text,
        required: true,
        nocase: true,
    }
}

#[derive(Debug)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [Column],
    /// Column groups that must be unique together.
    pub unique: &'static [&'static [&'static str]],
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| {
                Error::validation_invalid_argument(
                    "column",
                    format!("Table '{}' has no column '{}'", self.name, name),
                    Some(name.to_string()),
                    Some(self.columns.iter().map(|c| c.name.to_string()).collect()),
                )
            })
    }
}

pub static TABLES: &[TableSchema] = &[
    TableSchema {
        name: DRINKS,
        columns: &[
            col("id", ColumnKind::Text, true),
            col("slug", ColumnKind::Text, true),
            col("name", ColumnKind::Text, true),
            col("description", ColumnKind::Text, false),
            col("instructions", ColumnKind::Json, false),
            col("owner", ColumnKind::Text, true),
            col("created_at", ColumnKind::Text, true),
            col("updated_at", ColumnKind::Text, true),
        ],
        unique: &[&["id"], &["slug"]],
    },
    TableSchema {
        name: INGREDIENTS,
        columns: &[
            col("id", ColumnKind::Text, true),
            nocase("name"),
            col("owner", ColumnKind::Text, true),
            col("created_at", ColumnKind::Text, true),
        ],
        unique: &[&["id"], &["name"]],
    },
    TableSchema {
        name: DRINK_INGREDIENTS,
        columns: &[
            col("drink_id", ColumnKind::Text, true),
            col("ingredient_id", ColumnKind::Text, true),
            col("quantity", ColumnKind::Real, true),
            col("unit", ColumnKind::Text, false),
            col("position", ColumnKind::Integer, true),
        ],
        unique: &[&["drink_id", "ingredient_id"]],
    },
];

pub fn table(name: &str) -> Result<&'static TableSchema> {
    TABLES
        .iter()
        .find(|t| t.name == name)
        .ok_or_else(|| Error::store_unknown_table(name))
}

/// CREATE TABLE statement for SQLite.
pub(crate) fn create_table_sql(schema: &TableSchema) -> String {
    let mut parts: Vec<String> = schema
        .columns
        .iter()
        .map(|c| {
            let ty = match c.kind {
                ColumnKind::Text | ColumnKind::Json => "TEXT",
                ColumnKind::Integer => "INTEGER",
                ColumnKind::Real => "REAL",
            };
            let mut def = format!("\"{}\" {}", c.name, ty);
            if c.required {
                def.push_str(" NOT NULL");
            }
            if c.nocase {
                def.push_str(" COLLATE NOCASE");
            }
            def
        })
        .collect();

    for group in schema.unique {
        let cols: Vec<String> = group.iter().map(|c| format!("\"{}\"", c)).collect();
        parts.push(format!("UNIQUE ({})", cols.join(", ")));
    }

    format!(
        "CREATE TABLE IF NOT EXISTS \"{}\" ({})",
        schema.name,
        parts.join(", ")
    )
}
