//! Schema builder.
//!
//! Runs table DDL end to end: the platform's CREATE/ALTER/DROP statements,
//! comments, and the auto-increment sequence that goes with a table.

use tracing::{debug, info, warn};
use yashan_sql_core::{Platform, TableDiff, TableSpec, YashanPlatform};

use crate::auto_increment::AutoIncrementCoordinator;
use crate::comment::CommentApplier;
use crate::connection::Connection;
use crate::error::{Result, SchemaError};
use crate::processor::process_column_listing;

/// Creates, alters and drops tables over a connection.
///
/// Table names are given without the connection's prefix; the builder
/// applies it.
pub struct SchemaBuilder<'a, C: Connection + ?Sized> {
    conn: &'a C,
    platform: YashanPlatform,
    auto_increment: AutoIncrementCoordinator<'a, C>,
    comments: CommentApplier<'a, C>,
}

impl<'a, C: Connection + ?Sized> SchemaBuilder<'a, C> {
    /// Creates a builder using `conn`.
    pub const fn new(conn: &'a C) -> Self {
        Self {
            conn,
            platform: YashanPlatform::new(),
            auto_increment: AutoIncrementCoordinator::new(conn),
            comments: CommentApplier::new(conn),
        }
    }

    /// Returns the auto-increment coordinator.
    pub const fn auto_increment(&self) -> &AutoIncrementCoordinator<'a, C> {
        &self.auto_increment
    }

    /// Returns the comment applier.
    pub const fn comments(&self) -> &CommentApplier<'a, C> {
        &self.comments
    }

    /// Creates a table with its comments and auto-increment sequence.
    ///
    /// # Errors
    ///
    /// Stops at the first statement the server rejects.
    pub fn create(&self, table: &TableSpec) -> Result<()> {
        let mut qualified = table.clone();
        qualified.name = self.conn.prefixed(&table.name);

        info!(table = %qualified.name, columns = table.columns.len(), "Creating table");
        self.run_all(&self.platform.create_table_sql(&qualified))?;
        self.comments.apply(table)?;
        self.auto_increment.create(table)?;
        Ok(())
    }

    /// Alters a table.
    ///
    /// Column modifications and their comments run first, then the table
    /// comment if the diff sets one.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Platform`] before anything runs when the diff
    /// contains a structural change. Otherwise stops at the first statement
    /// the server rejects.
    pub fn alter(&self, diff: &TableDiff) -> Result<()> {
        let mut qualified = diff.clone();
        qualified.name = self.conn.prefixed(&diff.name);

        let statements = self.platform.alter_table_sql(&qualified)?;
        info!(table = %qualified.name, statements = statements.len(), "Altering table");
        self.run_all(&statements)?;

        if let Some(ref comment) = diff.comment {
            self.comments.comment_table(&diff.name, comment)?;
        }
        Ok(())
    }

    /// Drops a table and the sequence behind its primary key.
    ///
    /// # Errors
    ///
    /// Propagates the server's rejection.
    pub fn drop(&self, table: &str) -> Result<()> {
        self.drop_qualified(&self.conn.prefixed(table))
    }

    /// Drops a table if it exists. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Propagates the server's rejection.
    pub fn drop_if_exists(&self, table: &str) -> Result<bool> {
        if !self.has_table(table)? {
            debug!(table = %table, "Table absent, nothing to drop");
            return Ok(false);
        }
        self.drop(table)?;
        Ok(true)
    }

    /// Drops every table the connected user owns.
    ///
    /// Keeps going past failures and reports them together. Returns the
    /// names of the dropped tables.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Multiple`] listing every table that failed.
    pub fn drop_all_tables(&self) -> Result<Vec<String>> {
        let mut dropped = Vec::new();
        let mut errors = Vec::new();

        for table in self.all_tables()? {
            match self.drop_qualified(&table) {
                Ok(()) => dropped.push(table),
                Err(e) => {
                    warn!(table = %table, error = %e, "Failed to drop table");
                    errors.push(e);
                }
            }
        }

        if errors.is_empty() {
            Ok(dropped)
        } else {
            Err(SchemaError::Multiple(errors))
        }
    }

    /// Lists the tables the connected user owns, as stored (prefix included).
    ///
    /// # Errors
    ///
    /// Propagates the server's rejection.
    pub fn all_tables(&self) -> Result<Vec<String>> {
        let sql = self.platform.list_tables_sql();
        Ok(self
            .conn
            .select(sql)?
            .iter()
            .filter_map(|row| row.get_str("TABLE_NAME").map(str::to_string))
            .collect())
    }

    /// Checks whether `table` exists, ignoring case.
    ///
    /// # Errors
    ///
    /// Propagates the server's rejection.
    pub fn has_table(&self, table: &str) -> Result<bool> {
        let sql = self
            .platform
            .table_exists_sql(self.conn.database_name(), &self.conn.prefixed(table));
        Ok(!self.conn.select(&sql)?.is_empty())
    }

    /// Lists the lower-cased column names of `table`.
    ///
    /// # Errors
    ///
    /// Propagates the server's rejection.
    pub fn column_listing(&self, table: &str) -> Result<Vec<String>> {
        let sql = self
            .platform
            .column_listing_sql(self.conn.database_name(), &self.conn.prefixed(table));
        Ok(process_column_listing(&self.conn.select(&sql)?))
    }

    /// Empties `table`.
    ///
    /// # Errors
    ///
    /// Propagates the server's rejection.
    pub fn truncate(&self, table: &str) -> Result<()> {
        let sql = self.platform.truncate_table_sql(&self.conn.prefixed(table));
        self.conn.statement(&sql)
    }

    fn drop_qualified(&self, qualified: &str) -> Result<()> {
        self.auto_increment.drop_for_qualified_table(qualified)?;
        info!(table = %qualified, "Dropping table");
        self.conn.statement(&self.platform.drop_table_sql(qualified))
    }

    fn run_all(&self, statements: &[String]) -> Result<()> {
        for sql in statements {
            self.conn.statement(sql)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{DryRunConnection, Row};
    use yashan_sql_core::{ColumnSpec, PlatformError, SqlType};

    #[test]
    fn test_create_runs_table_then_comments_then_sequence() {
        let conn = DryRunConnection::new("app").with_prefix("p_");
        let table = TableSpec::new("posts")
            .comment("Blog posts")
            .column(ColumnSpec::new("id", SqlType::BigInt).increments())
            .column(ColumnSpec::new("title", SqlType::Varchar(Some(200))));

        SchemaBuilder::new(&conn).create(&table).unwrap();

        assert_eq!(
            conn.executed(),
            vec![
                "CREATE TABLE \"p_posts\" (\"id\" BIGINT NOT NULL, \"title\" VARCHAR2(200) NOT NULL, PRIMARY KEY (\"id\"))",
                "COMMENT ON TABLE \"p_posts\" IS 'Blog posts'",
                "CREATE SEQUENCE \"p_posts_id_seq\" START WITH 1 INCREMENT BY 1",
                "ALTER TABLE \"p_posts\" MODIFY \"id\" DEFAULT \"p_posts_id_seq\".NEXTVAL",
            ]
        );
    }

    #[test]
    fn test_alter_rejects_before_running() {
        let conn = DryRunConnection::new("app");
        let col = ColumnSpec::new("a", SqlType::Integer);
        let diff = TableDiff::new("t")
            .change(col.clone(), col.nullable())
            .remove("b");

        let err = SchemaBuilder::new(&conn).alter(&diff).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::Platform(PlatformError::UnsupportedOperation { .. })
        ));
        assert!(conn.executed().is_empty());
    }

    #[test]
    fn test_alter_with_table_comment() {
        let conn = DryRunConnection::new("app");
        let col = ColumnSpec::new("a", SqlType::Integer);
        let diff = TableDiff::new("t").change(col.clone(), col.nullable()).comment("T");
        SchemaBuilder::new(&conn).alter(&diff).unwrap();
        assert_eq!(
            conn.executed(),
            vec![
                "ALTER TABLE \"t\" MODIFY \"a\" INT NULL",
                "COMMENT ON TABLE \"t\" IS 'T'",
            ]
        );
    }

    #[test]
    fn test_drop_if_exists_missing() {
        let conn = DryRunConnection::new("app");
        assert!(!SchemaBuilder::new(&conn).drop_if_exists("ghost").unwrap());
        assert!(conn.executed().is_empty());
    }

    #[test]
    fn test_drop_all_tables_collects_failures() {
        let conn = DryRunConnection::new("app")
            .respond_to(
                "sys.user_tables",
                vec![
                    Row::new().with("TABLE_NAME", "a"),
                    Row::new().with("TABLE_NAME", "b"),
                ],
            )
            .fail_on("DROP TABLE \"a\"", "locked");

        let err = SchemaBuilder::new(&conn).drop_all_tables().unwrap_err();
        match err {
            SchemaError::Multiple(errors) => assert_eq!(errors.len(), 1),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(conn.executed(), vec!["DROP TABLE \"b\""]);
    }

    #[test]
    fn test_column_listing_lowercases() {
        let conn = DryRunConnection::new("app").respond_to(
            "all_tab_cols",
            vec![
                Row::new().with("COLUMN_NAME", "ID"),
                Row::new().with("COLUMN_NAME", "EMAIL"),
            ],
        );
        assert_eq!(
            SchemaBuilder::new(&conn).column_listing("users").unwrap(),
            vec!["id", "email"]
        );
    }
}
