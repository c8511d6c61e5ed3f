//! Auto-increment emulation.
//!
//! The dialect has no auto-increment columns. A table gets one by pairing
//! a sequence named `{prefix}{table}_{column}_seq` with a column default of
//! `"seq".NEXTVAL`. Dropping the table reverses this by finding the live
//! primary-key column and dropping the sequence derived from it.

use tracing::{debug, info};
use yashan_sql_core::{sequence_name, TableSpec, YashanPlatform};

use crate::connection::Connection;
use crate::error::Result;
use crate::sequence::SequenceManager;

/// Creates and removes the objects backing auto-increment columns.
pub struct AutoIncrementCoordinator<'a, C: Connection + ?Sized> {
    conn: &'a C,
    platform: YashanPlatform,
    sequences: SequenceManager<'a, C>,
}

impl<'a, C: Connection + ?Sized> AutoIncrementCoordinator<'a, C> {
    /// Creates a coordinator using `conn`.
    pub const fn new(conn: &'a C) -> Self {
        Self {
            conn,
            platform: YashanPlatform::new(),
            sequences: SequenceManager::new(conn),
        }
    }

    /// Returns the sequence manager.
    pub const fn sequences(&self) -> &SequenceManager<'a, C> {
        &self.sequences
    }

    /// Creates the sequence and column default for the table's
    /// auto-increment column.
    ///
    /// Returns the sequence name, or `None` when no column is marked.
    ///
    /// # Errors
    ///
    /// Propagates the server's rejection.
    pub fn create(&self, table: &TableSpec) -> Result<Option<String>> {
        let Some(column) = table.auto_increment_column() else {
            debug!(table = %table.name, "No auto-increment column");
            return Ok(None);
        };

        let qualified = self.conn.prefixed(&table.name);
        let sequence = sequence_name(&qualified, &column.name);
        let start = column.auto_increment_start.unwrap_or(1);

        info!(
            table = %qualified,
            column = %column.name,
            sequence = %sequence,
            start,
            "Creating auto-increment objects"
        );

        self.sequences.create(&sequence, start, 1)?;
        self.conn.statement(&self.platform.sequence_default_sql(
            &qualified,
            &column.name,
            &sequence,
        ))?;

        Ok(Some(sequence))
    }

    /// Drops the sequence backing `table`'s primary key, if any.
    ///
    /// `table` is given without the connection's prefix. Returns the
    /// dropped sequence name. A table without a primary key, or whose
    /// sequence does not exist, is left alone.
    ///
    /// # Errors
    ///
    /// Propagates the server's rejection.
    pub fn drop(&self, table: &str) -> Result<Option<String>> {
        self.drop_for_qualified_table(&self.conn.prefixed(table))
    }

    /// Like [`Self::drop`] for a name that already carries the prefix.
    ///
    /// # Errors
    ///
    /// Propagates the server's rejection.
    pub fn drop_for_qualified_table(&self, qualified: &str) -> Result<Option<String>> {
        let Some(column) = self.primary_key(qualified)? else {
            debug!(table = %qualified, "No primary key, nothing to drop");
            return Ok(None);
        };

        let sequence = sequence_name(qualified, &column);
        if self.sequences.drop(&sequence)? {
            info!(table = %qualified, sequence = %sequence, "Dropped auto-increment sequence");
            Ok(Some(sequence))
        } else {
            Ok(None)
        }
    }

    /// Looks up the primary-key column of a prefixed table name.
    ///
    /// Returns the first column the catalog reports, or `None` when the
    /// table has no primary key.
    ///
    /// # Errors
    ///
    /// Propagates the server's rejection.
    pub fn primary_key(&self, qualified: &str) -> Result<Option<String>> {
        if qualified.is_empty() {
            return Ok(None);
        }

        let sql = self
            .platform
            .primary_key_column_sql(self.conn.database_name(), qualified);

        Ok(self.conn.select_one(&sql)?.and_then(|row| {
            row.get_str("COLUMN_NAME")
                .or_else(|| row.first().and_then(|v| v.as_str()))
                .filter(|name| !name.is_empty())
                .map(str::to_string)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{DryRunConnection, Row};
    use yashan_sql_core::{ColumnSpec, SqlType};

    #[test]
    fn test_create_with_start() {
        let conn = DryRunConnection::new("app");
        let table = TableSpec::new("invoices")
            .column(ColumnSpec::new("id", SqlType::BigInt).increments().starting_from(100));
        let seq = AutoIncrementCoordinator::new(&conn).create(&table).unwrap();
        assert_eq!(seq.as_deref(), Some("invoices_id_seq"));
        assert_eq!(
            conn.executed(),
            vec![
                "CREATE SEQUENCE \"invoices_id_seq\" START WITH 100 INCREMENT BY 1",
                "ALTER TABLE \"invoices\" MODIFY \"id\" DEFAULT \"invoices_id_seq\".NEXTVAL",
            ]
        );
    }

    #[test]
    fn test_create_applies_prefix() {
        let conn = DryRunConnection::new("app").with_prefix("shop_");
        let table = TableSpec::new("orders")
            .column(ColumnSpec::new("id", SqlType::Integer).increments());
        AutoIncrementCoordinator::new(&conn).create(&table).unwrap();
        assert_eq!(
            conn.executed()[1],
            "ALTER TABLE \"shop_orders\" MODIFY \"id\" DEFAULT \"shop_orders_id_seq\".NEXTVAL"
        );
    }

    #[test]
    fn test_create_uses_truncated_sequence_name() {
        let conn = DryRunConnection::new("app").with_prefix("crm_");
        let table = TableSpec::new("customer_shipping_addresses")
            .column(ColumnSpec::new("id", SqlType::BigInt).increments().starting_from(100));
        let seq = AutoIncrementCoordinator::new(&conn).create(&table).unwrap();
        assert_eq!(seq.as_deref(), Some("crm_customer_shipping_addresse"));
        assert_eq!(
            conn.executed(),
            vec![
                "CREATE SEQUENCE \"crm_customer_shipping_addresse\" START WITH 100 INCREMENT BY 1",
                "ALTER TABLE \"crm_customer_shipping_addresses\" MODIFY \"id\" DEFAULT \"crm_customer_shipping_addresse\".NEXTVAL",
            ]
        );
    }

    #[test]
    fn test_create_without_auto_increment() {
        let conn = DryRunConnection::new("app");
        let table = TableSpec::new("tags").column(ColumnSpec::new("name", SqlType::Varchar(None)));
        assert!(AutoIncrementCoordinator::new(&conn).create(&table).unwrap().is_none());
        assert!(conn.executed().is_empty());
    }

    #[test]
    fn test_drop_without_primary_key_is_noop() {
        let conn = DryRunConnection::new("app");
        assert!(AutoIncrementCoordinator::new(&conn).drop("logs").unwrap().is_none());
        assert!(conn.executed().is_empty());
        assert_eq!(conn.queries().len(), 1);
    }

    #[test]
    fn test_drop_with_primary_key() {
        let conn = DryRunConnection::new("app")
            .respond_to("CONSTRAINT_TYPE = 'P'", vec![Row::new().with("COLUMN_NAME", "id")])
            .respond_to(
                "SEQUENCE_NAME = 'users_id_seq'",
                vec![Row::new().with("SEQUENCE_NAME", "users_id_seq")],
            );
        let dropped = AutoIncrementCoordinator::new(&conn).drop("users").unwrap();
        assert_eq!(dropped.as_deref(), Some("users_id_seq"));
        assert_eq!(conn.executed(), vec!["DROP SEQUENCE \"users_id_seq\""]);
    }

    #[test]
    fn test_drop_when_sequence_missing() {
        let conn = DryRunConnection::new("app")
            .respond_to("CONSTRAINT_TYPE = 'P'", vec![Row::new().with("COLUMN_NAME", "code")]);
        assert!(AutoIncrementCoordinator::new(&conn).drop("countries").unwrap().is_none());
        assert!(conn.executed().is_empty());
    }
}
