//! Identifier naming rules.
//!
//! YashanDB limits schema object names to 30 characters. Generated names
//! (sequences backing auto-increment columns) are truncated to fit; the
//! truncation is lossy, so two long table names sharing a 30-character
//! prefix map to the same sequence. Callers must keep names unique.

/// Maximum length of any identifier (table, column, sequence, ...).
pub const MAX_IDENTIFIER_LENGTH: usize = 30;

/// Truncates `name` to at most [`MAX_IDENTIFIER_LENGTH`] characters.
///
/// Counts characters rather than bytes, so multi-byte names are never
/// split inside a code point.
///
/// ```
/// use yashan_sql_core::fix_schema_element_name;
///
/// assert_eq!(fix_schema_element_name("users"), "users");
/// assert_eq!(fix_schema_element_name(&"x".repeat(35)).len(), 30);
/// ```
#[must_use]
pub fn fix_schema_element_name(name: &str) -> String {
    match name.char_indices().nth(MAX_IDENTIFIER_LENGTH) {
        Some((cut, _)) => name[..cut].to_string(),
        None => name.to_string(),
    }
}

/// Derives the name of the sequence backing an auto-increment column.
///
/// `table` must already carry the connection's table prefix. The result is
/// `{table}_{column}_seq`, truncated to the identifier limit.
///
/// ```
/// use yashan_sql_core::sequence_name;
///
/// assert_eq!(sequence_name("users", "id"), "users_id_seq");
/// ```
#[must_use]
pub fn sequence_name(table: &str, column: &str) -> String {
    fix_schema_element_name(&format!("{table}_{column}_seq"))
}
