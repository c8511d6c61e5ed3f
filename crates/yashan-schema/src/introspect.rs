//! Typed catalog inspection.
//!
//! Runs the platform's catalog templates and folds the raw rows into
//! structs. Multi-row results (one row per index or key column) are
//! grouped by object name in the order the catalog returns them.
//!
//! Table names are uppercased before they reach the catalog, so tables
//! created under quoted lower-case names (as [`crate::builder::SchemaBuilder`]
//! creates them) are not found by these lookups.

use serde::Serialize;
use tracing::debug;
use yashan_sql_core::{SqlType, YashanPlatform};

use crate::connection::{Connection, Row};
use crate::error::Result;

/// A column as reported by `all_tab_columns`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableColumnInfo {
    /// Column name.
    pub name: String,
    /// Catalog data type name.
    pub data_type: String,
    /// Abstract type, when the catalog type is known.
    pub sql_type: Option<SqlType>,
    /// Declared length in bytes.
    pub length: Option<i64>,
    /// Whether NULL is allowed.
    pub nullable: bool,
    /// Default expression text.
    pub default: Option<String>,
    /// Column comment.
    pub comment: Option<String>,
}

/// An index with its columns in position order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexInfo {
    /// Index name.
    pub name: String,
    /// Index type (e.g. `NORMAL`).
    pub index_type: Option<String>,
    /// Whether the index enforces uniqueness.
    pub unique: bool,
    /// Whether the index backs the primary key.
    pub primary: bool,
    /// Indexed columns.
    pub columns: Vec<String>,
}

/// A foreign key with its column mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKeyInfo {
    /// Constraint name.
    pub name: String,
    /// Referencing columns.
    pub local_columns: Vec<String>,
    /// Referenced table.
    pub foreign_table: Option<String>,
    /// Referenced columns.
    pub foreign_columns: Vec<String>,
    /// ON DELETE rule.
    pub on_delete: Option<String>,
}

/// A sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SequenceInfo {
    /// Sequence name.
    pub name: String,
    /// Minimum value.
    pub min_value: Option<i64>,
    /// Step.
    pub increment_by: Option<i64>,
}

/// A view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewInfo {
    /// View name.
    pub name: String,
    /// Defining query.
    pub sql: String,
}

/// A table constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstraintInfo {
    /// Constraint name.
    pub name: String,
    /// Constraint type code (`P`, `U`, `R`, `C`).
    pub constraint_type: String,
}

fn text(row: &Row, column: &str) -> Option<String> {
    row.get_str(column).map(str::to_string)
}

/// Reads schema metadata over a connection.
pub struct SchemaInspector<'a, C: Connection + ?Sized> {
    conn: &'a C,
    platform: YashanPlatform,
}

impl<'a, C: Connection + ?Sized> SchemaInspector<'a, C> {
    /// Creates an inspector using `conn`.
    pub const fn new(conn: &'a C) -> Self {
        Self {
            conn,
            platform: YashanPlatform::new(),
        }
    }

    /// Columns of `table`, ordered by name.
    ///
    /// # Errors
    ///
    /// Propagates the server's rejection.
    pub fn columns(&self, table: &str) -> Result<Vec<TableColumnInfo>> {
        let sql = self
            .platform
            .list_table_columns_sql(&self.conn.prefixed(table), self.conn.database_name());
        let rows = self.conn.select(&sql)?;
        debug!(table = %table, rows = rows.len(), "Read column metadata");

        Ok(rows
            .iter()
            .filter_map(|row| {
                let name = text(row, "COLUMN_NAME")?;
                let data_type = text(row, "DATA_TYPE").unwrap_or_default();
                Some(TableColumnInfo {
                    sql_type: self.platform.sql_type_for_catalog_type(&data_type),
                    name,
                    data_type,
                    length: row.get_i64("DATA_LENGTH"),
                    nullable: row.get_str("NULLABLE") != Some("N"),
                    default: text(row, "DATA_DEFAULT").map(|d| d.trim().to_string()),
                    comment: text(row, "COMMENTS"),
                })
            })
            .collect())
    }

    /// Indexes of `table`.
    ///
    /// # Errors
    ///
    /// Propagates the server's rejection.
    pub fn indexes(&self, table: &str) -> Result<Vec<IndexInfo>> {
        let sql = self.platform.list_table_indexes_sql(&self.conn.prefixed(table));
        let mut indexes: Vec<IndexInfo> = Vec::new();

        for row in self.conn.select(&sql)? {
            let (Some(name), Some(column)) = (text(&row, "name"), text(&row, "column_name")) else {
                continue;
            };
            match indexes.iter_mut().find(|i| i.name == name) {
                Some(index) => index.columns.push(column),
                None => indexes.push(IndexInfo {
                    name,
                    index_type: text(&row, "type"),
                    unique: row.get_i64("is_unique") == Some(1),
                    primary: row.get_str("is_primary") == Some("P"),
                    columns: vec![column],
                }),
            }
        }

        Ok(indexes)
    }

    /// Foreign keys of `table`.
    ///
    /// # Errors
    ///
    /// Propagates the server's rejection.
    pub fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKeyInfo>> {
        let sql = self
            .platform
            .list_table_foreign_keys_sql(&self.conn.prefixed(table));
        let mut rows = self.conn.select(&sql)?;
        rows.sort_by_key(|row| row.get_i64("position").unwrap_or(0));

        let mut keys: Vec<ForeignKeyInfo> = Vec::new();
        for row in &rows {
            let Some(name) = text(row, "constraint_name") else {
                continue;
            };
            let key = match keys.iter().position(|k| k.name == name) {
                Some(i) => &mut keys[i],
                None => {
                    keys.push(ForeignKeyInfo {
                        name,
                        local_columns: Vec::new(),
                        foreign_table: text(row, "references_table"),
                        foreign_columns: Vec::new(),
                        on_delete: text(row, "delete_rule"),
                    });
                    let last = keys.len() - 1;
                    &mut keys[last]
                }
            };
            if let Some(local) = text(row, "local_column") {
                key.local_columns.push(local);
            }
            if let Some(foreign) = text(row, "foreign_column") {
                key.foreign_columns.push(foreign);
            }
        }

        Ok(keys)
    }

    /// Constraints of `table`.
    ///
    /// # Errors
    ///
    /// Propagates the server's rejection.
    pub fn constraints(&self, table: &str) -> Result<Vec<ConstraintInfo>> {
        let sql = self
            .platform
            .list_table_constraints_sql(&self.conn.prefixed(table));
        Ok(self
            .conn
            .select(&sql)?
            .iter()
            .filter_map(|row| {
                Some(ConstraintInfo {
                    name: text(row, "CONSTRAINT_NAME")?,
                    constraint_type: text(row, "CONSTRAINT_TYPE").unwrap_or_default(),
                })
            })
            .collect())
    }

    /// Sequences owned by the connected database.
    ///
    /// # Errors
    ///
    /// Propagates the server's rejection.
    pub fn sequences(&self) -> Result<Vec<SequenceInfo>> {
        let sql = self.platform.list_sequences_sql(self.conn.database_name());
        Ok(self
            .conn
            .select(&sql)?
            .iter()
            .filter_map(|row| {
                Some(SequenceInfo {
                    name: text(row, "sequence_name")?,
                    min_value: row.get_i64("min_value"),
                    increment_by: row.get_i64("increment_by"),
                })
            })
            .collect())
    }

    /// Views owned by the connected user.
    ///
    /// # Errors
    ///
    /// Propagates the server's rejection.
    pub fn views(&self) -> Result<Vec<ViewInfo>> {
        Ok(self
            .conn
            .select(self.platform.list_views_sql())?
            .iter()
            .filter_map(|row| {
                Some(ViewInfo {
                    name: text(row, "view_name")?,
                    sql: text(row, "text").unwrap_or_default(),
                })
            })
            .collect())
    }

    /// Database (user) names.
    ///
    /// # Errors
    ///
    /// Propagates the server's rejection.
    pub fn databases(&self) -> Result<Vec<String>> {
        Ok(self
            .conn
            .select(self.platform.list_databases_sql())?
            .iter()
            .filter_map(|row| text(row, "username"))
            .collect())
    }

    /// Checks whether a database (user) exists.
    ///
    /// # Errors
    ///
    /// Propagates the server's rejection.
    pub fn database_exists(&self, database: &str) -> Result<bool> {
        let sql = self.platform.database_exists_sql(database);
        Ok(self.conn.select_one(&sql)?.is_some())
    }
}
