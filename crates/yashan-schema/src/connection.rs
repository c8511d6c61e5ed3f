//! Connection collaborator.
//!
//! Everything in this crate talks to the database through the
//! [`Connection`] trait. Calls are synchronous: each one blocks until the
//! server answers. Timeouts, pooling and cancellation belong to the
//! implementation behind the trait.

use std::cell::RefCell;
use std::fmt::Write as _;

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;
use yashan_sql_core::SqlValue;

use crate::error::{Result, SchemaError};

/// One row of a query result.
///
/// Column lookups ignore case, since catalog views report names in
/// uppercase while callers usually ask in lowercase.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, SqlValue)>,
}

impl Row {
    /// Creates an empty row.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    /// Adds a column value.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Sets a column value, replacing any existing value for that column.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<SqlValue>) {
        let name = name.into();
        let value = value.into();
        match self
            .columns
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(&name))
        {
            Some(slot) => slot.1 = value,
            None => self.columns.push((name, value)),
        }
    }

    /// Returns the value of a column.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    /// Returns a column as text.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(SqlValue::as_str)
    }

    /// Returns a column as an integer.
    #[must_use]
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(SqlValue::as_i64)
    }

    /// Iterates over columns in result order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.columns.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Returns the first column's value.
    #[must_use]
    pub fn first(&self) -> Option<&SqlValue> {
        self.columns.first().map(|(_, v)| v)
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// A connection to a YashanDB server.
pub trait Connection {
    /// Executes a statement with positional parameters.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Execution`] when the server rejects it.
    fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<()>;

    /// Runs a query and returns every row.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Execution`] when the server rejects it.
    fn select(&self, sql: &str) -> Result<Vec<Row>>;

    /// Prefix prepended to every table name.
    fn table_prefix(&self) -> &str;

    /// Name of the connected database (the owning user).
    fn database_name(&self) -> &str;

    /// Executes a statement without parameters.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Execution`] when the server rejects it.
    fn statement(&self, sql: &str) -> Result<()> {
        self.execute(sql, &[])
    }

    /// Runs a query and returns the first row, if any.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Execution`] when the server rejects it.
    fn select_one(&self, sql: &str) -> Result<Option<Row>> {
        Ok(self.select(sql)?.into_iter().next())
    }

    /// Applies the table prefix.
    fn prefixed(&self, table: &str) -> String {
        format!("{}{table}", self.table_prefix())
    }
}

/// A connection that records statements instead of running them.
///
/// Queries are answered from scripted responses: the first registered
/// needle contained in the SQL text wins, and unmatched queries return no
/// rows. Used by the CLI's dry-run mode and as the test fake.
#[derive(Debug, Default)]
pub struct DryRunConnection {
    prefix: String,
    database: String,
    echo: bool,
    responses: Vec<(String, Vec<Row>)>,
    failures: Vec<(String, String)>,
    executed: RefCell<Vec<String>>,
    queries: RefCell<Vec<String>>,
}

impl DryRunConnection {
    /// Creates a dry-run connection for `database`.
    #[must_use]
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Self::default()
        }
    }

    /// Sets the table prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Prints every executed statement to stdout.
    #[must_use]
    pub const fn echo(mut self, enabled: bool) -> Self {
        self.echo = enabled;
        self
    }

    /// Answers queries containing `needle` with `rows`.
    #[must_use]
    pub fn respond_to(mut self, needle: impl Into<String>, rows: Vec<Row>) -> Self {
        self.responses.push((needle.into(), rows));
        self
    }

    /// Fails statements and queries containing `needle` with `message`.
    #[must_use]
    pub fn fail_on(mut self, needle: impl Into<String>, message: impl Into<String>) -> Self {
        self.failures.push((needle.into(), message.into()));
        self
    }

    /// Statements passed to [`Connection::execute`], in order.
    #[must_use]
    pub fn executed(&self) -> Vec<String> {
        self.executed.borrow().clone()
    }

    /// Queries passed to [`Connection::select`], in order.
    #[must_use]
    pub fn queries(&self) -> Vec<String> {
        self.queries.borrow().clone()
    }

    fn check_failure(&self, sql: &str) -> Result<()> {
        match self.failures.iter().find(|(needle, _)| sql.contains(needle.as_str())) {
            Some((_, message)) => Err(SchemaError::execution(sql, message.clone())),
            None => Ok(()),
        }
    }
}

impl Connection for DryRunConnection {
    fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<()> {
        debug!(sql = %sql, params = params.len(), "Executing SQL (dry run)");
        self.check_failure(sql)?;

        if self.echo {
            let mut line = sql.to_string();
            if !params.is_empty() {
                let rendered: Vec<String> = params.iter().map(SqlValue::to_sql_inline).collect();
                let _ = write!(line, " -- params: {}", rendered.join(", "));
            }
            println!("{line};");
        }

        self.executed.borrow_mut().push(sql.to_string());
        Ok(())
    }

    fn select(&self, sql: &str) -> Result<Vec<Row>> {
        debug!(sql = %sql, "Querying (dry run)");
        self.check_failure(sql)?;
        self.queries.borrow_mut().push(sql.to_string());

        Ok(self
            .responses
            .iter()
            .find(|(needle, _)| sql.contains(needle.as_str()))
            .map(|(_, rows)| rows.clone())
            .unwrap_or_default())
    }

    fn table_prefix(&self) -> &str {
        &self.prefix
    }

    fn database_name(&self) -> &str {
        &self.database
    }
}
