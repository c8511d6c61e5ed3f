//! ODBC connection to a live server.
//!
//! Requires the YashanDB ODBC driver to be installed and registered as
//! `YashanDB`. All connections share one process-wide ODBC environment.
//! Values are fetched as text.

use std::sync::OnceLock;

use odbc_api::buffers::TextRowSet;
use odbc_api::parameter::InputParameter;
use odbc_api::{ConnectionOptions, Cursor, Environment, IntoParameter, ResultSetMetadata};
use tracing::{debug, info};
use yashan_sql_core::{SqlValue, YashanPlatform};

use crate::config::ConnectionConfig;
use crate::connection::{Connection, Row};
use crate::error::{Result, SchemaError};

const BATCH_SIZE: usize = 1000;
const MAX_TEXT_LENGTH: usize = 4096;

static ENVIRONMENT: OnceLock<Environment> = OnceLock::new();

/// Returns the process-wide ODBC environment, creating it on first use.
fn environment() -> Result<&'static Environment> {
    if let Some(env) = ENVIRONMENT.get() {
        return Ok(env);
    }
    let env = Environment::new().map_err(|e| {
        SchemaError::Connection(format!(
            "Failed to create ODBC environment: {e}. Make sure the YashanDB ODBC driver is installed."
        ))
    })?;
    Ok(ENVIRONMENT.get_or_init(|| env))
}

/// A [`Connection`] backed by `odbc-api`.
///
/// Holds a single server session for its whole lifetime. Session state
/// such as a sequence's `CURRVAL` after an insert is therefore visible to
/// later calls on the same value, so one `OdbcConnection` must not be
/// shared between units of work that expect separate sessions.
pub struct OdbcConnection {
    session: odbc_api::Connection<'static>,
    prefix: String,
    database: String,
}

impl OdbcConnection {
    /// Connects using `config` and checks the server answers.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Connection`] if the ODBC environment cannot
    /// be created or the server refuses the connection.
    pub fn connect(config: &ConnectionConfig) -> Result<Self> {
        let session = environment()?
            .connect_with_connection_string(
                &config.connection_string(),
                ConnectionOptions::default(),
            )
            .map_err(|e| SchemaError::Connection(format!("ODBC connection failed: {e}")))?;

        session
            .execute(YashanPlatform::new().dummy_select_sql(), ())
            .map_err(|e| SchemaError::Connection(e.to_string()))?;

        info!(dsn = %config.dsn(), "Connected to YashanDB via ODBC");
        Ok(Self {
            session,
            prefix: config.prefix.clone(),
            database: config.database.clone(),
        })
    }
}

fn to_parameter(value: &SqlValue) -> Box<dyn InputParameter> {
    match value {
        SqlValue::Null => Box::new(None::<String>.into_parameter()),
        SqlValue::Bool(b) => Box::new(i64::from(*b)),
        SqlValue::Int(n) => Box::new(*n),
        SqlValue::Float(f) => Box::new(*f),
        SqlValue::Text(s) => Box::new(s.clone().into_parameter()),
        SqlValue::Blob(bytes) => Box::new(bytes.clone().into_parameter()),
    }
}

impl Connection for OdbcConnection {
    fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<()> {
        debug!(sql = %sql, params = params.len(), "Executing SQL");
        let params: Vec<Box<dyn InputParameter>> = params.iter().map(to_parameter).collect();
        self.session
            .execute(sql, params.as_slice())
            .map_err(|e| SchemaError::execution(sql, e.to_string()))?;
        Ok(())
    }

    fn select(&self, sql: &str) -> Result<Vec<Row>> {
        debug!(sql = %sql, "Querying");
        let fail = |e: odbc_api::Error| SchemaError::execution(sql, e.to_string());

        let mut rows = Vec::new();
        if let Some(mut cursor) = self.session.execute(sql, ()).map_err(fail)? {
            let names = cursor
                .column_names()
                .map_err(fail)?
                .collect::<std::result::Result<Vec<String>, _>>()
                .map_err(fail)?;

            let mut buffers =
                TextRowSet::for_cursor(BATCH_SIZE, &mut cursor, Some(MAX_TEXT_LENGTH)).map_err(fail)?;
            let mut row_cursor = cursor.bind_buffer(&mut buffers).map_err(fail)?;

            while let Some(batch) = row_cursor.fetch().map_err(fail)? {
                for row_idx in 0..batch.num_rows() {
                    let mut row = Row::new();
                    for (col_idx, name) in names.iter().enumerate() {
                        let value = batch
                            .at(col_idx, row_idx)
                            .map(|bytes| String::from_utf8_lossy(bytes).into_owned());
                        row.set(name.as_str(), value);
                    }
                    rows.push(row);
                }
            }
        }

        Ok(rows)
    }

    fn table_prefix(&self) -> &str {
        &self.prefix
    }

    fn database_name(&self) -> &str {
        &self.database
    }
}
