//! Sequence manager.
//!
//! Creates, drops and reads the sequences that back auto-increment
//! columns. Nothing is cached: every call round-trips to the server.

use tracing::{debug, info};
use yashan_sql_core::{SequenceValue, YashanPlatform};

use crate::connection::Connection;
use crate::error::{Result, SchemaError};

/// Manages sequence objects over a connection.
pub struct SequenceManager<'a, C: Connection + ?Sized> {
    conn: &'a C,
    platform: YashanPlatform,
}

impl<'a, C: Connection + ?Sized> SequenceManager<'a, C> {
    /// Creates a manager using `conn`.
    pub const fn new(conn: &'a C) -> Self {
        Self {
            conn,
            platform: YashanPlatform::new(),
        }
    }

    /// Creates a sequence.
    ///
    /// Returns `Ok(false)` without touching the server when `name` is empty.
    ///
    /// # Errors
    ///
    /// Propagates the server's rejection.
    pub fn create(&self, name: &str, start: i64, increment: i64) -> Result<bool> {
        if name.is_empty() {
            debug!("Empty sequence name, nothing to create");
            return Ok(false);
        }

        let sql = self.platform.create_sequence_sql(name, start, increment)?;
        info!(sequence = %name, start, increment, "Creating sequence");
        self.conn.statement(&sql)?;
        Ok(true)
    }

    /// Drops a sequence if it exists.
    ///
    /// Returns `Ok(false)` when `name` is empty or no such sequence exists.
    ///
    /// # Errors
    ///
    /// Propagates the server's rejection.
    pub fn drop(&self, name: &str) -> Result<bool> {
        if name.is_empty() || !self.exists(name)? {
            debug!(sequence = %name, "Sequence absent, nothing to drop");
            return Ok(false);
        }

        let sql = self.platform.drop_sequence_sql(name)?;
        info!(sequence = %name, "Dropping sequence");
        self.conn.statement(&sql)?;
        Ok(true)
    }

    /// Checks whether the connected database owns a sequence named `name`.
    ///
    /// # Errors
    ///
    /// Propagates the server's rejection.
    pub fn exists(&self, name: &str) -> Result<bool> {
        let sql = self
            .platform
            .sequence_exists_sql(self.conn.database_name(), name);
        Ok(self.conn.select_one(&sql)?.is_some())
    }

    /// Advances the sequence and returns the new value.
    ///
    /// Returns 0 for an empty name.
    ///
    /// # Errors
    ///
    /// Propagates the server's rejection, or [`SchemaError::UnexpectedRow`]
    /// if the server answers without an `id`.
    pub fn next_value(&self, name: &str) -> Result<i64> {
        if name.is_empty() {
            return Ok(0);
        }
        self.fetch(name, SequenceValue::NextVal)
    }

    /// Returns the value most recently handed out by the sequence in this
    /// session.
    ///
    /// Returns 0 when `name` is empty or the sequence does not exist.
    ///
    /// # Errors
    ///
    /// Propagates the server's rejection, or [`SchemaError::UnexpectedRow`]
    /// if the server answers without an `id`.
    pub fn last_insert_id(&self, name: &str) -> Result<i64> {
        if name.is_empty() || !self.exists(name)? {
            return Ok(0);
        }
        self.fetch(name, SequenceValue::CurrVal)
    }

    /// Same as [`Self::last_insert_id`].
    ///
    /// # Errors
    ///
    /// See [`Self::last_insert_id`].
    pub fn current_value(&self, name: &str) -> Result<i64> {
        self.last_insert_id(name)
    }

    fn fetch(&self, name: &str, which: SequenceValue) -> Result<i64> {
        let sql = self.platform.sequence_value_sql(name, which)?;
        self.conn
            .select_one(&sql)?
            .and_then(|row| row.get_i64("id"))
            .ok_or_else(|| SchemaError::UnexpectedRow {
                sql,
                column: "id".to_string(),
            })
    }
}
