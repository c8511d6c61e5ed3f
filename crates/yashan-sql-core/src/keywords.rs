//! Reserved words of the YashanDB dialect.
//!
//! The list is process-wide constant data. Identifier quoting elsewhere in
//! this crate is unconditional, so the registry is consulted by callers
//! that want to warn about or avoid reserved names rather than by the
//! quoting path itself.

use std::collections::BTreeSet;

/// Reserved words, upper case and sorted so lookups can binary search.
pub static RESERVED_KEYWORDS: &[&str] = &[
    "ACCESS", "ADD", "ALL", "ALTER", "AND", "ANY", "AS", "ASC",
    "AUDIT", "BEGIN", "BETWEEN", "BY", "CASE", "CHAR", "CHECK", "CLUSTER",
    "COLUMN", "COMMENT", "COMMIT", "COMPRESS", "CONNECT", "CONSTRAINT", "CREATE", "CROSS",
    "CURRENT", "DATE", "DECIMAL", "DEFAULT", "DELETE", "DESC", "DISTINCT", "DROP",
    "ELSE", "END", "EXCLUSIVE", "EXISTS", "FILE", "FLOAT", "FOR", "FOREIGN",
    "FROM", "FULL", "GRANT", "GROUP", "HAVING", "IDENTIFIED", "IMMEDIATE", "IN",
    "INCREMENT", "INDEX", "INITIAL", "INNER", "INSERT", "INTEGER", "INTERSECT", "INTO",
    "IS", "JOIN", "KEY", "LEFT", "LEVEL", "LIKE", "LIMIT", "LOCK",
    "LONG", "MAXEXTENTS", "MINUS", "MLSLABEL", "MODE", "MODIFY", "NATURAL", "NOAUDIT",
    "NOCOMPRESS", "NOT", "NOWAIT", "NULL", "NUMBER", "OF", "OFFLINE", "OFFSET",
    "ON", "ONLINE", "OPTION", "OR", "ORDER", "OUTER", "PCTFREE", "PRIMARY",
    "PRIOR", "PRIVILEGES", "PUBLIC", "RAW", "REFERENCES", "RENAME", "RESOURCE", "REVOKE",
    "RIGHT", "ROLLBACK", "ROW", "ROWID", "ROWNUM", "ROWS", "SAVEPOINT", "SELECT",
    "SEQUENCE", "SESSION", "SET", "SHARE", "SIZE", "SMALLINT", "START", "SUCCESSFUL",
    "SYNONYM", "SYSDATE", "TABLE", "THEN", "TO", "TRIGGER", "TRUNCATE", "UID",
    "UNION", "UNIQUE", "UPDATE", "USER", "USING", "VALIDATE", "VALUES", "VARCHAR",
    "VARCHAR2", "VIEW", "WHEN", "WHENEVER", "WHERE", "WITH",
];

/// Returns `true` if `identifier` is a reserved word.
///
/// The comparison is case-insensitive; surrounding double quotes are
/// not stripped.
///
/// ```
/// use yashan_sql_core::is_reserved;
///
/// assert!(is_reserved("rownum"));
/// assert!(!is_reserved("users"));
/// ```
#[must_use]
pub fn is_reserved(identifier: &str) -> bool {
    let upper = identifier.to_ascii_uppercase();
    RESERVED_KEYWORDS.binary_search(&upper.as_str()).is_ok()
}

/// Returns every reserved word.
#[must_use]
pub fn all_keywords() -> BTreeSet<&'static str> {
    RESERVED_KEYWORDS.iter().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_are_sorted_and_unique() {
        assert!(RESERVED_KEYWORDS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_is_reserved_case_insensitive() {
        assert!(is_reserved("SELECT"));
        assert!(is_reserved("select"));
        assert!(is_reserved("Comment"));
        assert!(is_reserved("varchar2"));
    }

    #[test]
    fn test_not_reserved() {
        assert!(!is_reserved("users"));
        assert!(!is_reserved(""));
        assert!(!is_reserved("\"select\""));
    }

    #[test]
    fn test_all_keywords() {
        let all = all_keywords();
        assert_eq!(all.len(), RESERVED_KEYWORDS.len());
        assert!(all.contains("ROWNUM"));
        assert!(all.contains("SYSDATE"));
    }
}
