//! YashanDB platform.

use super::{IsolationLevel, NullClause, Platform, SequenceValue};
use crate::error::{PlatformError, Result};
use crate::schema::{SqlType, TableDiff};

/// Default length of a VARCHAR2 declared without one.
pub const DEFAULT_VARCHAR_LENGTH: u32 = 4000;

/// Default length of a CHAR declared without one.
pub const DEFAULT_CHAR_LENGTH: u32 = 2000;

/// The YashanDB dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct YashanPlatform;

impl YashanPlatform {
    /// Creates the platform.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// `SUBSTR(value, pos[, len])`.
    #[must_use]
    pub fn substring_expression(&self, value: &str, position: &str, length: Option<&str>) -> String {
        match length {
            Some(len) => format!("SUBSTR({value}, {position}, {len})"),
            None => format!("SUBSTR({value}, {position})"),
        }
    }

    /// `INSTR(str, substr[, start])`.
    #[must_use]
    pub fn locate_expression(&self, haystack: &str, needle: &str, start: Option<&str>) -> String {
        match start {
            Some(pos) => format!("INSTR({haystack}, {needle}, {pos})"),
            None => format!("INSTR({haystack}, {needle})"),
        }
    }

    /// Current timestamp as a formatted string.
    #[must_use]
    pub const fn now_expression(&self) -> &'static str {
        "TO_CHAR(CURRENT_TIMESTAMP, 'YYYY-MM-DD HH24:MI:SS')"
    }

    /// Globally unique identifier.
    #[must_use]
    pub const fn guid_expression(&self) -> &'static str {
        "SYS_GUID()"
    }

    /// Difference between two dates in whole days.
    #[must_use]
    pub fn date_diff_expression(&self, date1: &str, date2: &str) -> String {
        format!("TRUNC(TO_NUMBER(SUBSTR(({date1}-{date2}), 1, INSTR({date1}-{date2}, ' '))))")
    }

    /// Adds days to a date.
    #[must_use]
    pub fn date_add_days_expression(&self, date: &str, days: &str) -> String {
        format!("({date}+{days})")
    }

    /// Subtracts days from a date.
    #[must_use]
    pub fn date_sub_days_expression(&self, date: &str, days: &str) -> String {
        format!("({date}-{days})")
    }

    /// Adds months to a date.
    #[must_use]
    pub fn date_add_months_expression(&self, date: &str, months: &str) -> String {
        format!("ADD_MONTHS({date}, {months})")
    }

    /// Subtracts months from a date.
    #[must_use]
    pub fn date_sub_months_expression(&self, date: &str, months: &str) -> String {
        format!("ADD_MONTHS({date}, -{months})")
    }

    /// Bitwise AND.
    #[must_use]
    pub fn bit_and_expression(&self, a: &str, b: &str) -> String {
        format!("BITAND({a}, {b})")
    }

    /// Bitwise OR, built from BITAND since the dialect has no BITOR.
    #[must_use]
    pub fn bit_or_expression(&self, a: &str, b: &str) -> String {
        format!("({a}-{}+{b})", self.bit_and_expression(a, b))
    }

    /// `CREATE SEQUENCE "name" START WITH s INCREMENT BY i`.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::InvalidIdentifier`] for an empty name.
    pub fn create_sequence_sql(&self, name: &str, start: i64, increment: i64) -> Result<String> {
        let name = self.sequence_identifier(name)?;
        Ok(format!("CREATE SEQUENCE {name} START WITH {start} INCREMENT BY {increment}"))
    }

    /// Like [`Self::create_sequence_sql`] but pins `MINVALUE` to the start.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::InvalidIdentifier`] for an empty name.
    pub fn create_sequence_with_min_sql(
        &self,
        name: &str,
        start: i64,
        allocation: i64,
    ) -> Result<String> {
        let name = self.sequence_identifier(name)?;
        Ok(format!(
            "CREATE SEQUENCE {name} START WITH {start} MINVALUE {start} INCREMENT BY {allocation}"
        ))
    }

    /// `ALTER SEQUENCE "name" INCREMENT BY a`.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::InvalidIdentifier`] for an empty name.
    pub fn alter_sequence_sql(&self, name: &str, allocation: i64) -> Result<String> {
        let name = self.sequence_identifier(name)?;
        Ok(format!("ALTER SEQUENCE {name} INCREMENT BY {allocation}"))
    }

    /// `DROP SEQUENCE "name"`.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::InvalidIdentifier`] for an empty name.
    pub fn drop_sequence_sql(&self, name: &str) -> Result<String> {
        let name = self.sequence_identifier(name)?;
        Ok(format!("DROP SEQUENCE {name}"))
    }

    /// Unquoted `SELECT name.nextval FROM DUAL`.
    #[must_use]
    pub fn sequence_next_val_sql(&self, name: &str) -> String {
        format!("SELECT {name}.nextval FROM DUAL")
    }

    /// `SELECT "name".NEXTVAL AS "id" FROM DUAL` (or `CURRVAL`).
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::InvalidIdentifier`] for an empty name.
    pub fn sequence_value_sql(&self, name: &str, which: SequenceValue) -> Result<String> {
        let name = self.sequence_identifier(name)?;
        Ok(format!("SELECT {name}.{} AS \"id\" FROM DUAL", which.as_str()))
    }

    /// Binds a column's default to a sequence.
    #[must_use]
    pub fn sequence_default_sql(&self, table: &str, column: &str, sequence: &str) -> String {
        format!(
            "ALTER TABLE {} MODIFY {} DEFAULT {}.NEXTVAL",
            self.quote_identifier(table),
            self.quote_identifier(column),
            self.quote_identifier(sequence)
        )
    }

    fn sequence_identifier(&self, name: &str) -> Result<String> {
        if name.is_empty() {
            return Err(PlatformError::InvalidIdentifier(
                "sequence name must not be empty".to_string(),
            ));
        }
        Ok(self.quote_identifier(name))
    }

    /// Isolation level keyword.
    #[must_use]
    pub const fn isolation_level_sql(&self, level: IsolationLevel) -> &'static str {
        match level {
            IsolationLevel::ReadUncommitted => "READ UNCOMMITTED",
            IsolationLevel::ReadCommitted => "READ COMMITTED",
            IsolationLevel::RepeatableRead | IsolationLevel::Serializable => "SERIALIZABLE",
        }
    }

    /// `SET TRANSACTION ISOLATION LEVEL ..`.
    #[must_use]
    pub fn set_transaction_isolation_sql(&self, level: IsolationLevel) -> String {
        format!(
            "SET TRANSACTION ISOLATION LEVEL {}",
            self.isolation_level_sql(level)
        )
    }

    /// `CREATE VIEW name AS sql`.
    #[must_use]
    pub fn create_view_sql(&self, name: &str, sql: &str) -> String {
        format!("CREATE VIEW {name} AS {sql}")
    }

    /// `DROP VIEW name`.
    #[must_use]
    pub fn drop_view_sql(&self, name: &str) -> String {
        format!("DROP VIEW {name}")
    }

    /// `ALTER TABLE table DROP CONSTRAINT fk`.
    #[must_use]
    pub fn drop_foreign_key_sql(&self, foreign_key: &str, table: &str) -> String {
        format!("ALTER TABLE {table} DROP CONSTRAINT {foreign_key}")
    }

    /// Leading keywords for a temporary table.
    #[must_use]
    pub const fn create_temporary_table_snippet(&self) -> &'static str {
        "CREATE GLOBAL TEMPORARY TABLE"
    }

    /// Savepoints cannot be released; always empty.
    #[must_use]
    pub fn release_savepoint_sql(&self, _savepoint: &str) -> String {
        String::new()
    }

    /// Casing of column names in result sets.
    #[must_use]
    pub fn sql_result_casing(&self, column: &str) -> String {
        column.to_uppercase()
    }

    /// `chrono` format for DATE values.
    #[must_use]
    pub const fn date_format_string(&self) -> &'static str {
        "%Y-%m-%d 00:00:00"
    }

    /// `chrono` format for TIME values, stored on a fixed date.
    #[must_use]
    pub const fn time_format_string(&self) -> &'static str {
        "1900-01-01 %H:%M:%S"
    }

    /// `chrono` format for TIMESTAMP values.
    #[must_use]
    pub const fn datetime_format_string(&self) -> &'static str {
        "%Y-%m-%d %H:%M:%S"
    }

    /// `chrono` format for TIMESTAMP WITH TIME ZONE values.
    #[must_use]
    pub const fn datetime_tz_format_string(&self) -> &'static str {
        "%Y-%m-%d %H:%M:%S%:z"
    }

    /// Maps a catalog data type name to an abstract type.
    ///
    /// Matching ignores case. Unknown names yield `None`.
    #[must_use]
    pub fn sql_type_for_catalog_type(&self, type_name: &str) -> Option<SqlType> {
        let ty = match type_name.trim().to_ascii_lowercase().as_str() {
            "integer" | "int" | "number" | "smallint" | "tinyint" => SqlType::Integer,
            "bigint" => SqlType::BigInt,
            "pls_integer" | "binary_integer" => SqlType::Boolean,
            "varchar" | "varchar2" | "nvarchar2" | "long" | "rowid" | "urowid" => {
                SqlType::Varchar(None)
            }
            "char" | "nchar" => SqlType::Char(None),
            "date" | "timestamp" => SqlType::Timestamp,
            "timestamptz" | "timestamp with time zone" => SqlType::TimestampTz,
            "clob" | "nclob" | "raw" | "long raw" => SqlType::Clob,
            "blob" => SqlType::Blob,
            _ => return None,
        };
        Some(ty)
    }
}

impl Platform for YashanPlatform {
    fn name(&self) -> &'static str {
        "yashan"
    }

    fn type_declaration(&self, sql_type: SqlType) -> String {
        match sql_type {
            SqlType::Integer => "INT".to_string(),
            SqlType::BigInt => "BIGINT".to_string(),
            SqlType::SmallInt => "SMALLINT".to_string(),
            SqlType::Boolean => "TINYINT".to_string(),
            SqlType::Varchar(len) => {
                format!("VARCHAR2({})", len.unwrap_or(DEFAULT_VARCHAR_LENGTH))
            }
            SqlType::Char(len) => format!("CHAR({})", len.unwrap_or(DEFAULT_CHAR_LENGTH)),
            SqlType::Clob => "CLOB".to_string(),
            SqlType::Blob => "BLOB".to_string(),
            SqlType::Date | SqlType::Time => "DATE".to_string(),
            SqlType::Timestamp => "TIMESTAMP".to_string(),
            SqlType::TimestampTz => "TIMESTAMP WITH TIME ZONE".to_string(),
        }
    }

    fn alter_table_sql(&self, diff: &TableDiff) -> Result<Vec<String>> {
        let table = &diff.name;

        if let Some(column) = diff.added_columns.first() {
            return Err(PlatformError::unsupported(
                table,
                format!("add column '{}'", column.name),
            ));
        }
        if let Some(column) = diff.removed_columns.first() {
            return Err(PlatformError::unsupported(
                table,
                format!("drop column '{column}'"),
            ));
        }
        if let Some((from, to)) = diff.renamed_columns.first() {
            return Err(PlatformError::unsupported(
                table,
                format!("rename column '{from}' to '{to}'"),
            ));
        }
        if let Some(ref new_name) = diff.new_name {
            return Err(PlatformError::unsupported(
                table,
                format!("rename table to '{new_name}'"),
            ));
        }
        if let Some(cd) = diff
            .changed_columns
            .iter()
            .find(|cd| cd.old_column.name != cd.new_column.name)
        {
            return Err(PlatformError::unsupported(
                table,
                format!(
                    "rename column '{}' to '{}'",
                    cd.old_column.name, cd.new_column.name
                ),
            ));
        }

        let quoted_table = self.quote_identifier(table);
        let mut modify = Vec::with_capacity(diff.changed_columns.len());
        let mut comments = Vec::new();

        for cd in &diff.changed_columns {
            let null_clause = if cd.changes_nullability() {
                NullClause::Include
            } else {
                NullClause::Omit
            };
            modify.push(format!(
                "ALTER TABLE {quoted_table} MODIFY {}",
                self.column_declaration(&cd.new_column, null_clause)
            ));

            if let Some(comment) = cd.new_column.comment.as_deref().filter(|c| !c.is_empty()) {
                comments.push(self.comment_on_column_sql(table, &cd.new_column.name, comment));
            }
        }

        modify.extend(comments);
        Ok(modify)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnSpec;

    #[test]
    fn test_type_declarations() {
        let p = YashanPlatform::new();
        assert_eq!(p.type_declaration(SqlType::Integer), "INT");
        assert_eq!(p.type_declaration(SqlType::Boolean), "TINYINT");
        assert_eq!(p.type_declaration(SqlType::Varchar(None)), "VARCHAR2(4000)");
        assert_eq!(p.type_declaration(SqlType::Varchar(Some(20))), "VARCHAR2(20)");
        assert_eq!(p.type_declaration(SqlType::Char(None)), "CHAR(2000)");
        assert_eq!(p.type_declaration(SqlType::Time), "DATE");
        assert_eq!(
            p.type_declaration(SqlType::TimestampTz),
            "TIMESTAMP WITH TIME ZONE"
        );
    }

    #[test]
    fn test_functions() {
        let p = YashanPlatform::new();
        assert_eq!(p.substring_expression("name", "1", None), "SUBSTR(name, 1)");
        assert_eq!(
            p.substring_expression("name", "1", Some("3")),
            "SUBSTR(name, 1, 3)"
        );
        assert_eq!(p.locate_expression("s", "'x'", Some("2")), "INSTR(s, 'x', 2)");
        assert_eq!(p.date_add_days_expression("d", "3"), "(d+3)");
        assert_eq!(p.date_sub_months_expression("d", "2"), "ADD_MONTHS(d, -2)");
        assert_eq!(p.bit_or_expression("a", "b"), "(a-BITAND(a, b)+b)");
        assert_eq!(
            p.date_diff_expression("d1", "d2"),
            "TRUNC(TO_NUMBER(SUBSTR((d1-d2), 1, INSTR(d1-d2, ' '))))"
        );
    }

    #[test]
    fn test_sequence_sql() {
        let p = YashanPlatform::new();
        assert_eq!(
            p.create_sequence_sql("users_id_seq", 100, 1).unwrap(),
            "CREATE SEQUENCE \"users_id_seq\" START WITH 100 INCREMENT BY 1"
        );
        assert_eq!(
            p.create_sequence_with_min_sql("s", 5, 10).unwrap(),
            "CREATE SEQUENCE \"s\" START WITH 5 MINVALUE 5 INCREMENT BY 10"
        );
        assert_eq!(
            p.sequence_value_sql("s", SequenceValue::CurrVal).unwrap(),
            "SELECT \"s\".CURRVAL AS \"id\" FROM DUAL"
        );
        assert_eq!(p.sequence_next_val_sql("s"), "SELECT s.nextval FROM DUAL");
        assert!(p.drop_sequence_sql("").is_err());
    }

    #[test]
    fn test_isolation() {
        let p = YashanPlatform::new();
        assert_eq!(
            p.set_transaction_isolation_sql(IsolationLevel::RepeatableRead),
            "SET TRANSACTION ISOLATION LEVEL SERIALIZABLE"
        );
        assert_eq!(
            p.isolation_level_sql(IsolationLevel::ReadCommitted),
            "READ COMMITTED"
        );
    }

    #[test]
    fn test_catalog_type_mapping() {
        let p = YashanPlatform::new();
        assert_eq!(p.sql_type_for_catalog_type("VARCHAR2"), Some(SqlType::Varchar(None)));
        assert_eq!(p.sql_type_for_catalog_type("bigint"), Some(SqlType::BigInt));
        assert_eq!(p.sql_type_for_catalog_type("geometry"), None);
    }

    #[test]
    fn test_alter_comment_only() {
        let p = YashanPlatform::new();
        let old = ColumnSpec::new("title", SqlType::Varchar(Some(100)));
        let diff = TableDiff::new("posts").change(old.clone(), old.comment("Headline"));
        let sql = p.alter_table_sql(&diff).unwrap();
        assert_eq!(
            sql,
            vec![
                "ALTER TABLE \"posts\" MODIFY \"title\" VARCHAR2(100)".to_string(),
                "COMMENT ON COLUMN \"posts\".\"title\" IS 'Headline'".to_string(),
            ]
        );
    }

    #[test]
    fn test_alter_nullability_change() {
        let p = YashanPlatform::new();
        let old = ColumnSpec::new("n", SqlType::Integer);
        let diff = TableDiff::new("t").change(old.clone(), old.nullable());
        assert_eq!(
            p.alter_table_sql(&diff).unwrap(),
            vec!["ALTER TABLE \"t\" MODIFY \"n\" INT NULL".to_string()]
        );
    }

    #[test]
    fn test_alter_modifies_before_comments() {
        let p = YashanPlatform::new();
        let a = ColumnSpec::new("a", SqlType::Integer);
        let b = ColumnSpec::new("b", SqlType::Integer);
        let diff = TableDiff::new("t")
            .change(a.clone(), a.comment("first"))
            .change(b.clone(), b.comment("second"));
        let sql = p.alter_table_sql(&diff).unwrap();
        assert!(sql[0].contains("MODIFY \"a\""));
        assert!(sql[1].contains("MODIFY \"b\""));
        assert!(sql[2].starts_with("COMMENT ON COLUMN \"t\".\"a\""));
        assert!(sql[3].starts_with("COMMENT ON COLUMN \"t\".\"b\""));
    }

    #[test]
    fn test_alter_structural_is_unsupported() {
        let p = YashanPlatform::new();
        let add = TableDiff::new("t").add(ColumnSpec::new("x", SqlType::Integer));
        assert!(matches!(
            p.alter_table_sql(&add),
            Err(PlatformError::UnsupportedOperation { .. })
        ));
        let drop = TableDiff::new("t").remove("x");
        assert!(p.alter_table_sql(&drop).is_err());
        let rename = TableDiff::new("t").change(
            ColumnSpec::new("a", SqlType::Integer),
            ColumnSpec::new("b", SqlType::Integer),
        );
        assert!(p.alter_table_sql(&rename).is_err());
    }

    #[test]
    fn test_flags() {
        let p = YashanPlatform::new();
        assert!(p.prefers_sequences());
        assert!(p.supports_comment_on_statement());
        assert!(!p.supports_foreign_key_on_update());
        assert!(!p.supports_release_savepoints());
        assert_eq!(p.release_savepoint_sql("sp1"), "");
        assert_eq!(p.sql_result_casing("id"), "ID");
    }
}
