//! Insert-id resolution and result post-processing.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use yashan_sql_core::{sequence_name, SqlValue, YashanPlatform};

use crate::connection::{Connection, Row};
use crate::error::Result;
use crate::sequence::SequenceManager;

static INSERT_COLUMNS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*INSERT\s+INTO\s+[^(]+?\s*\(([^)]*)\)\s*VALUES")
        .expect("valid INSERT pattern")
});

/// Columns reformatted by [`InsertIdProcessor::process_select`].
pub const TIMESTAMP_COLUMNS: [&str; 3] = ["created_at", "updated_at", "deleted_at"];

/// How [`InsertIdProcessor::insert_get_id`] finds the new row's id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertIdStrategy {
    /// Always read the sequence's current value.
    SequenceOnly,
    /// Use the id from the INSERT's own value list when the statement
    /// supplies one, falling back to the sequence.
    #[default]
    ValuesThenSequence,
}

/// Runs inserts and resolves generated ids.
pub struct InsertIdProcessor<'a, C: Connection + ?Sized> {
    conn: &'a C,
    strategy: InsertIdStrategy,
    platform: YashanPlatform,
}

impl<'a, C: Connection + ?Sized> InsertIdProcessor<'a, C> {
    /// Creates a processor with the default strategy.
    pub const fn new(conn: &'a C) -> Self {
        Self {
            conn,
            strategy: InsertIdStrategy::ValuesThenSequence,
            platform: YashanPlatform::new(),
        }
    }

    /// Sets the id resolution strategy.
    #[must_use]
    pub const fn strategy(mut self, strategy: InsertIdStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Runs `sql` with `values` and returns the id of the inserted row.
    ///
    /// `table` is given without the connection's prefix. Returns 0 when no
    /// `sequence_column` is named, or when the backing sequence does not
    /// exist.
    ///
    /// # Errors
    ///
    /// Propagates the server's rejection of the insert or the sequence
    /// lookup.
    pub fn insert_get_id(
        &self,
        table: &str,
        sql: &str,
        values: &[SqlValue],
        sequence_column: Option<&str>,
    ) -> Result<i64> {
        self.conn.execute(sql, values)?;

        let Some(column) = sequence_column else {
            return Ok(0);
        };

        if self.strategy == InsertIdStrategy::ValuesThenSequence {
            if let Some(id) = explicit_id(sql, values, column) {
                debug!(table = %table, column = %column, id, "Id supplied by the insert");
                return Ok(id);
            }
        }

        let sequence = sequence_name(&self.conn.prefixed(table), column);
        SequenceManager::new(self.conn).last_insert_id(&sequence)
    }

    /// Reformats the timestamp columns of a result set with the platform's
    /// datetime format.
    #[must_use]
    pub fn process_select(&self, mut rows: Vec<Row>) -> Vec<Row> {
        normalize_timestamps(&mut rows, self.platform.datetime_format_string());
        rows
    }
}

/// Finds the value the INSERT supplies for `column`, matching the column
/// list positionally against `values`.
fn explicit_id(sql: &str, values: &[SqlValue], column: &str) -> Option<i64> {
    let captures = INSERT_COLUMNS.captures(sql)?;
    let position = captures[1]
        .split(',')
        .map(|c| c.trim().trim_matches('"'))
        .position(|c| c.eq_ignore_ascii_case(column))?;
    values.get(position)?.as_i64()
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Rewrites `created_at`, `updated_at` and `deleted_at` text values in
/// `format`. Values that do not parse as a timestamp are left as they are.
pub fn normalize_timestamps(rows: &mut [Row], format: &str) {
    for row in rows {
        for column in TIMESTAMP_COLUMNS {
            let formatted = row
                .get_str(column)
                .and_then(parse_timestamp)
                .map(|dt| dt.format(format).to_string());
            if let Some(value) = formatted {
                row.set(column, value);
            }
        }
    }
}

/// Extracts lower-cased `COLUMN_NAME` values from a column listing.
#[must_use]
pub fn process_column_listing(rows: &[Row]) -> Vec<String> {
    rows.iter()
        .filter_map(|row| row.get_str("COLUMN_NAME"))
        .map(str::to_lowercase)
        .collect()
}
