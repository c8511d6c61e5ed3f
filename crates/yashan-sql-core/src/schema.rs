//! Table and column descriptions.
//!
//! These types are what a schema builder hands to the platform: a
//! [`TableSpec`] for CREATE TABLE, a [`TableDiff`] for ALTER TABLE. They
//! live only for the duration of one DDL call and are never persisted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Abstract column types understood by the platform.
///
/// In JSON, unit types are plain strings (`"integer"`) and sized types
/// carry their length (`{"varchar": 255}`, `{"varchar": null}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlType {
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    BigInt,
    /// 16-bit integer.
    SmallInt,
    /// Boolean, stored as 0/1.
    Boolean,
    /// Variable-length string with optional max length.
    Varchar(Option<u32>),
    /// Fixed-length string with optional length.
    Char(Option<u32>),
    /// Character large object.
    Clob,
    /// Binary large object.
    Blob,
    /// Date.
    Date,
    /// Time of day. The dialect has no TIME type and stores it as a DATE.
    Time,
    /// Timestamp without time zone.
    Timestamp,
    /// Timestamp with time zone.
    TimestampTz,
}

/// Default value for a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultValue {
    /// NULL default.
    Null,
    /// Boolean default, rendered as 0/1.
    Bool(bool),
    /// Integer default.
    Integer(i64),
    /// Float default.
    Float(f64),
    /// String default, rendered as an escaped literal.
    String(String),
    /// SQL expression, rendered verbatim (e.g. `CURRENT_TIMESTAMP`).
    Expression(String),
}

impl DefaultValue {
    /// Returns the SQL representation of this default value.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Bool(b) => String::from(if *b { "1" } else { "0" }),
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::String(s) => format!("'{}'", s.replace('\'', "''")),
            Self::Expression(expr) => expr.clone(),
        }
    }
}

/// Definition of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column name.
    pub name: String,
    /// Abstract column type.
    pub sql_type: SqlType,
    /// Whether the column allows NULL values. Columns are NOT NULL unless
    /// marked otherwise.
    #[serde(default)]
    pub nullable: bool,
    /// Default value.
    #[serde(default)]
    pub default: Option<DefaultValue>,
    /// Whether the column carries a UNIQUE constraint.
    #[serde(default)]
    pub unique: bool,
    /// Check constraint expression, without the `CHECK` keyword.
    #[serde(default)]
    pub check: Option<String>,
    /// Column comment.
    #[serde(default)]
    pub comment: Option<String>,
    /// Whether values come from a backing sequence.
    #[serde(default)]
    pub auto_increment: bool,
    /// First value of the backing sequence (1 when unset).
    #[serde(default)]
    pub auto_increment_start: Option<i64>,
    /// Whether this column is part of the primary key.
    #[serde(default)]
    pub primary_key: bool,
    /// Character set for string columns.
    #[serde(default)]
    pub charset: Option<String>,
    /// Collation for string columns.
    #[serde(default)]
    pub collation: Option<String>,
    /// Full custom declaration, replacing everything after the name.
    #[serde(default)]
    pub definition: Option<String>,
}

impl ColumnSpec {
    /// Creates a NOT NULL column with no constraints.
    #[must_use]
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            nullable: false,
            default: None,
            unique: false,
            check: None,
            comment: None,
            auto_increment: false,
            auto_increment_start: None,
            primary_key: false,
            charset: None,
            collation: None,
            definition: None,
        }
    }

    /// Allows NULL values.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default(mut self, value: DefaultValue) -> Self {
        self.default = Some(value);
        self
    }

    /// Sets a UNIQUE constraint.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Sets a check constraint.
    #[must_use]
    pub fn check(mut self, expr: impl Into<String>) -> Self {
        self.check = Some(expr.into());
        self
    }

    /// Sets the column comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Marks the column as the primary key.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    /// Backs the column with a sequence.
    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Sets the first value handed out by the backing sequence.
    #[must_use]
    pub fn starting_from(mut self, start: i64) -> Self {
        self.auto_increment_start = Some(start);
        self
    }

    /// Auto-incrementing primary key.
    #[must_use]
    pub fn increments(self) -> Self {
        self.primary_key().auto_increment()
    }

    /// Sets the character set.
    #[must_use]
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    /// Sets the collation.
    #[must_use]
    pub fn collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }

    /// Uses a custom declaration instead of the generated one.
    #[must_use]
    pub fn definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = Some(definition.into());
        self
    }
}

/// A secondary index created alongside a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    /// Index name.
    pub name: String,
    /// Indexed columns, in order.
    pub columns: Vec<String>,
    /// Whether this is a unique index.
    #[serde(default)]
    pub unique: bool,
}

/// Definition of a table for CREATE TABLE.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableSpec {
    /// Table name, without the connection's table prefix.
    pub name: String,
    /// Columns, in declaration order.
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
    /// Table comment.
    #[serde(default)]
    pub comment: Option<String>,
    /// Column comments set apart from the column definitions. Applied
    /// after the per-column comments, so they win on conflict.
    #[serde(default)]
    pub column_comments: BTreeMap<String, String>,
    /// Secondary indexes.
    #[serde(default)]
    pub indexes: Vec<IndexSpec>,
}

impl TableSpec {
    /// Creates an empty table definition.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a column.
    #[must_use]
    pub fn column(mut self, column: ColumnSpec) -> Self {
        self.columns.push(column);
        self
    }

    /// Sets the table comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Adds an explicit column comment.
    #[must_use]
    pub fn comment_column(mut self, column: impl Into<String>, comment: impl Into<String>) -> Self {
        self.column_comments.insert(column.into(), comment.into());
        self
    }

    /// Adds a secondary index.
    #[must_use]
    pub fn index(mut self, index: IndexSpec) -> Self {
        self.indexes.push(index);
        self
    }

    /// Returns the auto-increment column.
    ///
    /// At most one column is honored: if several are marked, the first in
    /// declaration order wins and the others are treated as plain columns.
    #[must_use]
    pub fn auto_increment_column(&self) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.auto_increment)
    }

    /// Returns the names of the primary-key columns, in order.
    #[must_use]
    pub fn primary_key(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }
}

/// Old and new definition of one column in an ALTER TABLE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDiff {
    /// Definition before the change.
    pub old_column: ColumnSpec,
    /// Definition after the change.
    pub new_column: ColumnSpec,
}

impl ColumnDiff {
    /// Creates a column diff.
    #[must_use]
    pub fn new(old_column: ColumnSpec, new_column: ColumnSpec) -> Self {
        Self {
            old_column,
            new_column,
        }
    }

    /// Returns `true` if NULL/NOT NULL differs between old and new.
    #[must_use]
    pub fn changes_nullability(&self) -> bool {
        self.old_column.nullable != self.new_column.nullable
    }
}

/// Changes to an existing table.
///
/// Only `changed_columns` and `comment` are supported by the dialect. The
/// structural fields exist so a schema builder can describe what it wants
/// and get a clear rejection instead of silently dropped changes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableDiff {
    /// Table name.
    pub name: String,
    /// Columns modified in place.
    #[serde(default)]
    pub changed_columns: Vec<ColumnDiff>,
    /// Columns to add.
    #[serde(default)]
    pub added_columns: Vec<ColumnSpec>,
    /// Names of columns to drop.
    #[serde(default)]
    pub removed_columns: Vec<String>,
    /// Column renames as (old name, new name).
    #[serde(default)]
    pub renamed_columns: Vec<(String, String)>,
    /// New table name.
    #[serde(default)]
    pub new_name: Option<String>,
    /// New table comment.
    #[serde(default)]
    pub comment: Option<String>,
}

impl TableDiff {
    /// Creates an empty diff for `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a modified column.
    #[must_use]
    pub fn change(mut self, old_column: ColumnSpec, new_column: ColumnSpec) -> Self {
        self.changed_columns
            .push(ColumnDiff::new(old_column, new_column));
        self
    }

    /// Adds a column to create.
    #[must_use]
    pub fn add(mut self, column: ColumnSpec) -> Self {
        self.added_columns.push(column);
        self
    }

    /// Adds a column to drop.
    #[must_use]
    pub fn remove(mut self, column: impl Into<String>) -> Self {
        self.removed_columns.push(column.into());
        self
    }

    /// Adds a column rename.
    #[must_use]
    pub fn rename(mut self, old_name: impl Into<String>, new_name: impl Into<String>) -> Self {
        self.renamed_columns.push((old_name.into(), new_name.into()));
        self
    }

    /// Sets the table comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_defaults() {
        let col = ColumnSpec::new("name", SqlType::Varchar(Some(100)));
        assert!(!col.nullable);
        assert!(!col.unique);
        assert!(!col.auto_increment);
        assert!(col.default.is_none());
    }

    #[test]
    fn test_increments() {
        let col = ColumnSpec::new("id", SqlType::BigInt)
            .increments()
            .starting_from(100);
        assert!(col.primary_key);
        assert!(col.auto_increment);
        assert_eq!(col.auto_increment_start, Some(100));
    }

    #[test]
    fn test_first_auto_increment_column_wins() {
        let table = TableSpec::new("t")
            .column(ColumnSpec::new("name", SqlType::Varchar(None)))
            .column(ColumnSpec::new("a", SqlType::Integer).auto_increment())
            .column(ColumnSpec::new("b", SqlType::Integer).auto_increment());
        assert_eq!(table.auto_increment_column().map(|c| c.name.as_str()), Some("a"));
    }

    #[test]
    fn test_no_auto_increment_column() {
        let table = TableSpec::new("t").column(ColumnSpec::new("a", SqlType::Integer));
        assert!(table.auto_increment_column().is_none());
    }

    #[test]
    fn test_default_value_sql() {
        assert_eq!(DefaultValue::Null.to_sql(), "NULL");
        assert_eq!(DefaultValue::Bool(true).to_sql(), "1");
        assert_eq!(DefaultValue::Integer(-3).to_sql(), "-3");
        assert_eq!(DefaultValue::String("O'Brien".into()).to_sql(), "'O''Brien'");
        assert_eq!(
            DefaultValue::Expression("CURRENT_TIMESTAMP".into()).to_sql(),
            "CURRENT_TIMESTAMP"
        );
    }

    #[test]
    fn test_changes_nullability() {
        let old = ColumnSpec::new("a", SqlType::Integer);
        let same = ColumnDiff::new(old.clone(), old.clone().comment("x"));
        assert!(!same.changes_nullability());
        let loosened = ColumnDiff::new(old.clone(), old.nullable());
        assert!(loosened.changes_nullability());
    }

    #[test]
    fn test_table_spec_from_json() {
        let json = r#"{
            "name": "users",
            "comment": "Registered users",
            "columns": [
                {"name": "id", "sql_type": "big_int", "primary_key": true,
                 "auto_increment": true, "auto_increment_start": 100},
                {"name": "email", "sql_type": {"varchar": 255}, "unique": true},
                {"name": "bio", "sql_type": {"varchar": null}, "nullable": true}
            ],
            "column_comments": {"email": "Login address"}
        }"#;
        let table: TableSpec = serde_json::from_str(json).unwrap();
        assert_eq!(table.columns.len(), 3);
        assert_eq!(table.columns[1].sql_type, SqlType::Varchar(Some(255)));
        assert_eq!(table.columns[2].sql_type, SqlType::Varchar(None));
        assert!(table.columns[2].nullable);
        assert_eq!(table.primary_key(), vec!["id"]);
        assert_eq!(table.column_comments["email"], "Login address");
    }
}
