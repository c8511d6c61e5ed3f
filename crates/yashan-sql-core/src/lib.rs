//! # yashan-sql-core
//!
//! SQL dialect translation for YashanDB, an Oracle-family database.
//!
//! This crate is pure: every function takes a typed description of a
//! schema or query operation and returns literal SQL text. Nothing here
//! talks to a database. The `yashan-schema` crate drives these functions
//! against a live connection.
//!
//! It provides:
//! - The reserved-word registry ([`keywords`])
//! - Table and column descriptions ([`schema`])
//! - The dialect platform: type declarations, scalar functions, column
//!   declarations, ALTER TABLE, sequence DDL ([`platform`])
//! - Catalog-view query templates ([`YashanPlatform::list_tables_sql`] and friends)
//! - ROWNUM pagination rewriting ([`limit`])
//!
//! ## Example
//!
//! ```rust
//! use yashan_sql_core::{ColumnSpec, Platform, SqlType, TableSpec, YashanPlatform};
//!
//! let platform = YashanPlatform::new();
//!
//! let table = TableSpec::new("users")
//!     .column(ColumnSpec::new("id", SqlType::BigInt).increments())
//!     .column(ColumnSpec::new("email", SqlType::Varchar(None)).unique());
//!
//! let sql = platform.create_table_sql(&table);
//! assert_eq!(
//!     sql[0],
//!     "CREATE TABLE \"users\" (\"id\" BIGINT NOT NULL, \"email\" VARCHAR2(4000) NOT NULL UNIQUE, PRIMARY KEY (\"id\"))"
//! );
//!
//! let page = platform.modify_limit_query("SELECT * FROM users", Some(10), Some(20));
//! assert!(page.ends_with("WHERE doctrine_rownum >= 21"));
//! ```

pub mod error;
pub mod keywords;
pub mod limit;
pub mod naming;
pub mod platform;
pub mod schema;
pub mod value;

pub use error::{PlatformError, Result};
pub use keywords::{all_keywords, is_reserved};
pub use limit::LimitQuery;
pub use naming::{fix_schema_element_name, sequence_name, MAX_IDENTIFIER_LENGTH};
pub use platform::{IsolationLevel, NullClause, Platform, SequenceValue, YashanPlatform};
pub use schema::{ColumnDiff, ColumnSpec, DefaultValue, IndexSpec, SqlType, TableDiff, TableSpec};
pub use value::SqlValue;
