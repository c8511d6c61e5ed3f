//! # yashan-schema
//!
//! Schema management for YashanDB on top of [`yashan_sql_core`].
//!
//! The dialect has no auto-increment columns, no native LIMIT and keeps
//! its metadata in Oracle-style catalog views. This crate drives the SQL
//! generated by the core crate against a [`Connection`](connection::Connection):
//!
//! - **Sequence manager** - create, drop and read sequences
//! - **Auto-increment coordinator** - pair a sequence with a column default
//!   on create, find and drop it again on drop
//! - **Comment applier** - `COMMENT ON TABLE/COLUMN` from a table definition
//! - **Schema builder** - create/alter/drop orchestration
//! - **Schema inspector** - typed catalog queries
//! - **Insert-id processor** - resolve the id of a freshly inserted row
//!
//! # Example
//!
//! ```rust
//! use yashan_schema::prelude::*;
//!
//! let conn = DryRunConnection::new("app");
//! let schema = SchemaBuilder::new(&conn);
//!
//! schema
//!     .create(
//!         &TableSpec::new("users")
//!             .comment("Registered users")
//!             .column(ColumnSpec::new("id", SqlType::BigInt).increments())
//!             .column(ColumnSpec::new("email", SqlType::Varchar(Some(255))).unique()),
//!     )
//!     .unwrap();
//!
//! let executed = conn.executed();
//! assert_eq!(executed.len(), 4);
//! assert_eq!(
//!     executed[3],
//!     "ALTER TABLE \"users\" MODIFY \"id\" DEFAULT \"users_id_seq\".NEXTVAL"
//! );
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Print the DDL for a table definition
//! yashan-ddl create --file users.json
//!
//! # Rewrite a query for pagination
//! yashan-ddl paginate "SELECT * FROM users ORDER BY id" --limit 10 --offset 20
//!
//! # Run against a server (built with --features odbc)
//! yashan-ddl --execute drop --table users
//! ```

pub mod auto_increment;
pub mod builder;
pub mod comment;
pub mod config;
pub mod connection;
pub mod error;
pub mod introspect;
#[cfg(feature = "odbc")]
pub mod odbc;
pub mod processor;
pub mod sequence;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::auto_increment::AutoIncrementCoordinator;
    pub use crate::builder::SchemaBuilder;
    pub use crate::comment::CommentApplier;
    pub use crate::config::ConnectionConfig;
    pub use crate::connection::{Connection, DryRunConnection, Row};
    pub use crate::error::{Result, SchemaError};
    pub use crate::introspect::{
        ConstraintInfo, ForeignKeyInfo, IndexInfo, SchemaInspector, SequenceInfo,
        TableColumnInfo, ViewInfo,
    };
    #[cfg(feature = "odbc")]
    pub use crate::odbc::OdbcConnection;
    pub use crate::processor::{InsertIdProcessor, InsertIdStrategy};
    pub use crate::sequence::SequenceManager;
    pub use yashan_sql_core::{
        ColumnDiff, ColumnSpec, DefaultValue, IndexSpec, Platform, PlatformError, SqlType,
        SqlValue, TableDiff, TableSpec, YashanPlatform,
    };
}
