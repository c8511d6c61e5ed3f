//! Catalog-view query templates.
//!
//! Catalog views store unquoted names in uppercase, so table and owner
//! names are uppercased before substitution. The primary-key and
//! sequence-existence lookups are the exception: they compare the object
//! name as given and only uppercase the owner. Every substituted value is
//! escaped as a string literal.

use super::{Platform, YashanPlatform};

fn literal(value: &str) -> String {
    value.replace('\'', "''")
}

fn upper_literal(value: &str) -> String {
    literal(&value.to_uppercase())
}

impl YashanPlatform {
    /// Lists the current user's tables.
    #[must_use]
    pub const fn list_tables_sql(&self) -> &'static str {
        "SELECT * FROM sys.user_tables"
    }

    /// Lists the current user's views with their text.
    #[must_use]
    pub const fn list_views_sql(&self) -> &'static str {
        "SELECT view_name, text FROM sys.user_views"
    }

    /// Lists sequences owned by `database`.
    #[must_use]
    pub fn list_sequences_sql(&self, database: &str) -> String {
        format!(
            "SELECT sequence_name, min_value, increment_by FROM sys.all_sequences WHERE SEQUENCE_OWNER = '{}'",
            upper_literal(database)
        )
    }

    /// Lists the columns of `table` with their comments.
    #[must_use]
    pub fn list_table_columns_sql(&self, table: &str, database: &str) -> String {
        format!(
            "SELECT c.*, d.comments FROM all_tab_columns c LEFT JOIN user_col_comments d ON d.TABLE_NAME = c.TABLE_NAME AND d.COLUMN_NAME = c.COLUMN_NAME WHERE c.owner = '{}' AND c.TABLE_NAME = '{}' ORDER BY c.column_name",
            upper_literal(database),
            upper_literal(table)
        )
    }

    /// Lists index columns of `table` in position order, flagging primary
    /// key indexes through `is_primary`.
    #[must_use]
    pub fn list_table_indexes_sql(&self, table: &str) -> String {
        format!(
            "SELECT uind.index_name AS name, uind.index_type AS type, decode( uind.uniqueness, 'NONUNIQUE', 0, 'UNIQUE', 1 ) AS is_unique, uind_col.column_name AS column_name, uind_col.column_position AS column_pos, (SELECT ucon.constraint_type FROM user_constraints ucon WHERE ucon.constraint_name = uind.index_name) AS is_primary FROM user_indexes uind, user_ind_columns uind_col WHERE uind.index_name = uind_col.index_name AND uind_col.table_name = '{}' ORDER BY uind_col.column_position ASC",
            upper_literal(table)
        )
    }

    /// Lists foreign-key columns of `table` with the columns they reference.
    #[must_use]
    pub fn list_table_foreign_keys_sql(&self, table: &str) -> String {
        format!(
            "SELECT alc.constraint_name, alc.DELETE_RULE, alc.search_condition, cols.column_name \"local_column\", cols.position, r_alc.table_name \"references_table\", r_cols.column_name \"foreign_column\" FROM user_cons_columns cols LEFT JOIN user_constraints alc ON alc.constraint_name = cols.constraint_name LEFT JOIN user_constraints r_alc ON alc.r_constraint_name = r_alc.constraint_name LEFT JOIN user_cons_columns r_cols ON r_alc.constraint_name = r_cols.constraint_name AND cols.position = r_cols.position WHERE alc.constraint_name = cols.constraint_name AND alc.constraint_type = 'R' AND alc.table_name = '{}'",
            upper_literal(table)
        )
    }

    /// Lists constraints of `table`.
    #[must_use]
    pub fn list_table_constraints_sql(&self, table: &str) -> String {
        format!(
            "SELECT * FROM user_constraints WHERE table_name = '{}'",
            upper_literal(table)
        )
    }

    /// Lists databases (users).
    #[must_use]
    pub const fn list_databases_sql(&self) -> &'static str {
        "SELECT username FROM all_users"
    }

    /// Returns a row when `database` exists.
    #[must_use]
    pub fn database_exists_sql(&self, database: &str) -> String {
        format!(
            "SELECT 1 FROM all_users WHERE username = '{}'",
            upper_literal(database)
        )
    }

    /// Returns a row when `owner` has a table named `table`, ignoring case.
    #[must_use]
    pub fn table_exists_sql(&self, owner: &str, table: &str) -> String {
        format!(
            "SELECT * FROM all_tables WHERE upper(owner) = upper('{}') AND upper(table_name) = upper('{}')",
            literal(owner),
            literal(table)
        )
    }

    /// Lists the column names of `table`, ignoring case.
    #[must_use]
    pub fn column_listing_sql(&self, owner: &str, table: &str) -> String {
        format!(
            "SELECT column_name FROM all_tab_cols WHERE upper(owner) = upper('{}') AND upper(table_name) = upper('{}')",
            literal(owner),
            literal(table)
        )
    }

    /// Returns the primary-key column(s) of `table`.
    #[must_use]
    pub fn primary_key_column_sql(&self, owner: &str, table: &str) -> String {
        format!(
            "SELECT cols.COLUMN_NAME FROM all_constraints cons, all_cons_columns cols WHERE cons.OWNER = cols.OWNER AND cons.CONSTRAINT_NAME = cols.CONSTRAINT_NAME AND cons.TABLE_NAME = cols.TABLE_NAME AND cons.CONSTRAINT_TYPE = 'P' AND cons.OWNER = '{}' AND cols.TABLE_NAME = '{}'",
            upper_literal(owner),
            literal(table)
        )
    }

    /// Returns a row when `owner` has a sequence named `name`.
    #[must_use]
    pub fn sequence_exists_sql(&self, owner: &str, name: &str) -> String {
        format!(
            "SELECT * FROM ALL_SEQUENCES WHERE SEQUENCE_OWNER = '{}' AND SEQUENCE_NAME = '{}'",
            upper_literal(owner),
            literal(name)
        )
    }

    /// Drops a database (user) and everything it owns.
    #[must_use]
    pub fn drop_database_sql(&self, database: &str) -> String {
        format!("DROP USER {database} CASCADE")
    }

    /// Empties a table.
    #[must_use]
    pub fn truncate_table_sql(&self, table: &str) -> String {
        format!("TRUNCATE TABLE {}", self.quote_identifier(table))
    }

    /// Cheapest query the server will answer.
    #[must_use]
    pub const fn dummy_select_sql(&self) -> &'static str {
        "SELECT 1 FROM DUAL"
    }
}
