//! Dialect platform.
//!
//! A platform turns the abstract descriptions in [`crate::schema`] into
//! literal SQL text. The [`Platform`] trait carries the parts that are
//! shaped the same for any Oracle-family dialect (quoting, column
//! declaration assembly, CREATE TABLE); [`YashanPlatform`] fills in the
//! YashanDB specifics and adds the function translations, sequence DDL and
//! catalog templates as inherent methods.

mod catalog;
mod yashan;

pub use yashan::YashanPlatform;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::naming::{fix_schema_element_name, MAX_IDENTIFIER_LENGTH};
use crate::schema::{ColumnSpec, SqlType, TableDiff, TableSpec};

/// Whether a column declaration carries its NULL/NOT NULL fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullClause {
    /// Emit `NULL` or `NOT NULL`.
    Include,
    /// Emit neither. Used by ALTER when nullability did not change, since
    /// restating it makes the dialect reject the MODIFY.
    Omit,
}

/// Transaction isolation levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsolationLevel {
    /// Dirty reads allowed.
    ReadUncommitted,
    /// Only committed rows are visible.
    ReadCommitted,
    /// Repeatable reads.
    RepeatableRead,
    /// Full serializability.
    Serializable,
}

/// Which sequence pseudo-column to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceValue {
    /// `NEXTVAL`: advances the sequence.
    NextVal,
    /// `CURRVAL`: the value last handed out in this session.
    CurrVal,
}

impl SequenceValue {
    /// Returns the pseudo-column name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NextVal => "NEXTVAL",
            Self::CurrVal => "CURRVAL",
        }
    }
}

/// SQL generation for one database dialect.
pub trait Platform: Send + Sync {
    /// Returns the dialect name.
    fn name(&self) -> &'static str;

    /// Returns the SQL type declaration for an abstract type.
    fn type_declaration(&self, sql_type: SqlType) -> String;

    /// Generates the statements for an ALTER TABLE.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PlatformError::UnsupportedOperation`] when the diff
    /// asks for a change the dialect cannot express. No SQL is produced in
    /// that case.
    fn alter_table_sql(&self, diff: &TableDiff) -> Result<Vec<String>>;

    /// Character used to quote identifiers.
    fn quote_char(&self) -> char {
        '"'
    }

    /// Quotes an identifier (table name, column name, etc.).
    ///
    /// Every identifier is quoted, reserved or not. An embedded quote
    /// character is doubled.
    fn quote_identifier(&self, name: &str) -> String {
        let q = self.quote_char();
        let escaped = name.replace(q, &format!("{q}{q}"));
        format!("{q}{escaped}{q}")
    }

    /// Quotes each identifier, preserving order.
    fn wrap_many(&self, names: &[&str]) -> Vec<String> {
        names.iter().map(|n| self.quote_identifier(n)).collect()
    }

    /// Renders a string literal.
    fn quote_string(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    /// Maximum length of a schema object name.
    fn max_identifier_length(&self) -> usize {
        MAX_IDENTIFIER_LENGTH
    }

    /// Truncates a generated name to the identifier limit.
    fn fix_schema_element_name(&self, name: &str) -> String {
        fix_schema_element_name(name)
    }

    /// Rewrites a SELECT to return a window of rows.
    fn modify_limit_query(&self, query: &str, limit: Option<u64>, offset: Option<u64>) -> String {
        crate::limit::modify_limit_query(query, limit, offset)
    }

    /// Whether column comments can be declared inline in CREATE TABLE.
    fn supports_inline_column_comments(&self) -> bool {
        false
    }

    /// Whether `COMMENT ON` statements are available.
    fn supports_comment_on_statement(&self) -> bool {
        true
    }

    /// Whether the dialect has sequence objects.
    fn supports_sequences(&self) -> bool {
        true
    }

    /// Whether sequences are the preferred id generation strategy.
    fn prefers_sequences(&self) -> bool {
        true
    }

    /// Whether foreign keys accept an ON UPDATE action.
    fn supports_foreign_key_on_update(&self) -> bool {
        false
    }

    /// Whether RELEASE SAVEPOINT is available.
    fn supports_release_savepoints(&self) -> bool {
        false
    }

    /// Returns the `CHARACTER SET` clause.
    fn charset_clause(&self, charset: &str) -> String {
        format!("CHARACTER SET {charset}")
    }

    /// Returns the `COLLATE` clause.
    fn collation_clause(&self, collation: &str) -> String {
        format!("COLLATE {}", self.quote_identifier(collation))
    }

    /// Returns the inline comment clause.
    fn inline_column_comment(&self, comment: &str) -> String {
        format!("COMMENT {}", self.quote_string(comment))
    }

    /// Generates a column declaration.
    ///
    /// Fragments appear in a fixed order: name, type, charset, default,
    /// NULL/NOT NULL, UNIQUE, CHECK, collation, inline comment. A custom
    /// definition replaces everything after the name.
    fn column_declaration(&self, column: &ColumnSpec, null_clause: NullClause) -> String {
        let name = self.quote_identifier(&column.name);

        if let Some(ref definition) = column.definition {
            return format!("{name} {definition}");
        }

        let mut decl = format!("{name} {}", self.type_declaration(column.sql_type));

        if let Some(ref charset) = column.charset {
            decl.push(' ');
            decl.push_str(&self.charset_clause(charset));
        }

        if let Some(ref default) = column.default {
            decl.push_str(" DEFAULT ");
            decl.push_str(&default.to_sql());
        }

        if null_clause == NullClause::Include {
            decl.push_str(if column.nullable { " NULL" } else { " NOT NULL" });
        }

        if column.unique {
            decl.push_str(" UNIQUE");
        }

        if let Some(ref check) = column.check {
            decl.push_str(&format!(" CHECK ({check})"));
        }

        if let Some(ref collation) = column.collation {
            decl.push(' ');
            decl.push_str(&self.collation_clause(collation));
        }

        if self.supports_inline_column_comments() {
            if let Some(comment) = column.comment.as_deref().filter(|c| !c.is_empty()) {
                decl.push(' ');
                decl.push_str(&self.inline_column_comment(comment));
            }
        }

        decl
    }

    /// Generates CREATE TABLE followed by its index statements.
    ///
    /// Auto-increment columns are declared as plain columns; the backing
    /// sequence and default are added separately once the table exists.
    fn create_table_sql(&self, table: &TableSpec) -> Vec<String> {
        let table_name = self.quote_identifier(&table.name);

        let mut parts: Vec<String> = table
            .columns
            .iter()
            .map(|c| self.column_declaration(c, NullClause::Include))
            .collect();

        let pk = table.primary_key();
        if !pk.is_empty() {
            parts.push(format!("PRIMARY KEY ({})", self.wrap_many(&pk).join(", ")));
        }

        let mut sql = vec![format!("CREATE TABLE {table_name} ({})", parts.join(", "))];

        for index in &table.indexes {
            let columns: Vec<&str> = index.columns.iter().map(String::as_str).collect();
            sql.push(format!(
                "CREATE {}INDEX {} ON {table_name} ({})",
                if index.unique { "UNIQUE " } else { "" },
                self.quote_identifier(&index.name),
                self.wrap_many(&columns).join(", ")
            ));
        }

        sql
    }

    /// Generates `COMMENT ON TABLE`.
    fn comment_on_table_sql(&self, table: &str, comment: &str) -> String {
        format!(
            "COMMENT ON TABLE {} IS {}",
            self.quote_identifier(table),
            self.quote_string(comment)
        )
    }

    /// Generates `COMMENT ON COLUMN`.
    fn comment_on_column_sql(&self, table: &str, column: &str, comment: &str) -> String {
        format!(
            "COMMENT ON COLUMN {}.{} IS {}",
            self.quote_identifier(table),
            self.quote_identifier(column),
            self.quote_string(comment)
        )
    }

    /// Generates `DROP TABLE`.
    fn drop_table_sql(&self, table: &str) -> String {
        format!("DROP TABLE {}", self.quote_identifier(table))
    }
}
