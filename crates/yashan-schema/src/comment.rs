//! Table and column comments.

use tracing::debug;
use yashan_sql_core::{Platform, TableSpec, YashanPlatform};

use crate::connection::Connection;
use crate::error::Result;

/// Emits `COMMENT ON` statements for a table definition.
pub struct CommentApplier<'a, C: Connection + ?Sized> {
    conn: &'a C,
    platform: YashanPlatform,
}

impl<'a, C: Connection + ?Sized> CommentApplier<'a, C> {
    /// Creates an applier using `conn`.
    pub const fn new(conn: &'a C) -> Self {
        Self {
            conn,
            platform: YashanPlatform::new(),
        }
    }

    /// Builds the comment statements for `table`.
    ///
    /// Order: table comment, then comments declared on columns, then the
    /// table's explicit column-comment map. A column commented twice keeps
    /// the later text, since the server overwrites rather than appends.
    #[must_use]
    pub fn comment_statements(&self, table: &TableSpec) -> Vec<String> {
        let qualified = self.conn.prefixed(&table.name);
        let mut sql = Vec::new();

        if let Some(ref comment) = table.comment {
            sql.push(self.platform.comment_on_table_sql(&qualified, comment));
        }

        for column in &table.columns {
            if let Some(ref comment) = column.comment {
                sql.push(
                    self.platform
                        .comment_on_column_sql(&qualified, &column.name, comment),
                );
            }
        }

        for (column, comment) in &table.column_comments {
            sql.push(self.platform.comment_on_column_sql(&qualified, column, comment));
        }

        sql
    }

    /// Runs the comment statements for `table`. Returns how many ran.
    ///
    /// # Errors
    ///
    /// Stops at the first statement the server rejects.
    pub fn apply(&self, table: &TableSpec) -> Result<usize> {
        let statements = self.comment_statements(table);
        for sql in &statements {
            debug!(table = %table.name, sql = %sql, "Applying comment");
            self.conn.statement(sql)?;
        }
        Ok(statements.len())
    }

    /// Sets only the table comment.
    ///
    /// # Errors
    ///
    /// Propagates the server's rejection.
    pub fn comment_table(&self, table: &str, comment: &str) -> Result<()> {
        let qualified = self.conn.prefixed(table);
        self.conn
            .statement(&self.platform.comment_on_table_sql(&qualified, comment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::DryRunConnection;
    use yashan_sql_core::{ColumnSpec, SqlType};

    #[test]
    fn test_order_and_overwrite() {
        let conn = DryRunConnection::new("app").with_prefix("p_");
        let table = TableSpec::new("users")
            .comment("People")
            .column(ColumnSpec::new("name", SqlType::Varchar(None)).comment("Display name"))
            .column(ColumnSpec::new("age", SqlType::Integer))
            .comment_column("name", "Full name");

        let applied = CommentApplier::new(&conn).apply(&table).unwrap();
        assert_eq!(applied, 3);
        assert_eq!(
            conn.executed(),
            vec![
                "COMMENT ON TABLE \"p_users\" IS 'People'",
                "COMMENT ON COLUMN \"p_users\".\"name\" IS 'Display name'",
                "COMMENT ON COLUMN \"p_users\".\"name\" IS 'Full name'",
            ]
        );
    }

    #[test]
    fn test_no_comments() {
        let conn = DryRunConnection::new("app");
        let table = TableSpec::new("t").column(ColumnSpec::new("a", SqlType::Integer));
        assert_eq!(CommentApplier::new(&conn).apply(&table).unwrap(), 0);
        assert!(conn.executed().is_empty());
    }

    #[test]
    fn test_quotes_in_comment() {
        let conn = DryRunConnection::new("app");
        CommentApplier::new(&conn)
            .comment_table("t", "it's")
            .unwrap();
        assert_eq!(conn.executed(), vec!["COMMENT ON TABLE \"t\" IS 'it''s'"]);
    }
}
