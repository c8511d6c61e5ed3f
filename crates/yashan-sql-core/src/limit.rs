//! ROWNUM pagination.
//!
//! The dialect has no LIMIT/OFFSET clause. A SELECT is paginated by
//! wrapping it in subqueries that filter on `ROWNUM`:
//!
//! ```text
//! limit only:       SELECT a.* FROM (<query>) a WHERE ROWNUM <= <limit>
//! limit and offset: SELECT * FROM (SELECT a.*, rownum AS doctrine_rownum
//!                     FROM (<query>) a WHERE rownum <= <offset + limit>)
//!                   WHERE doctrine_rownum >= <offset + 1>
//! ```
//!
//! Rows keep the order the inner query returns them in. Pages are only
//! stable across executions when the inner query has a deterministic
//! ORDER BY; that is the caller's responsibility.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static SELECT_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*SELECT").expect("valid SELECT pattern"));

static FROM_CLAUSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\sFROM\s").expect("valid FROM pattern"));

/// A query with an optional row window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitQuery {
    /// The query to paginate.
    pub query: String,
    /// Maximum number of rows.
    pub limit: Option<u64>,
    /// Rows to skip.
    pub offset: Option<u64>,
}

impl LimitQuery {
    /// Creates an unwindowed query.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: None,
            offset: None,
        }
    }

    /// Sets the row limit.
    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the row offset.
    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Renders the windowed query.
    #[must_use]
    pub fn to_sql(&self) -> String {
        modify_limit_query(&self.query, self.limit, self.offset)
    }
}

/// Rewrites `query` to return at most `limit` rows after skipping `offset`.
///
/// Returns the query unchanged when it is not a SELECT or when no
/// positive limit is given. A SELECT without a FROM clause gets
/// `FROM dual` appended before it is wrapped.
#[must_use]
pub fn modify_limit_query(query: &str, limit: Option<u64>, offset: Option<u64>) -> String {
    let limit = limit.unwrap_or(0);
    let offset = offset.unwrap_or(0);

    if limit == 0 || !SELECT_PREFIX.is_match(query) {
        return query.to_string();
    }

    let mut inner = query.to_string();
    if !FROM_CLAUSE.is_match(&inner) {
        inner.push_str(" FROM dual");
    }

    let max = offset.saturating_add(limit);
    if offset > 0 {
        let min = offset.saturating_add(1);
        format!(
            "SELECT * FROM (SELECT a.*, rownum AS doctrine_rownum FROM ({inner}) a WHERE rownum <= {max}) WHERE doctrine_rownum >= {min}"
        )
    } else {
        format!("SELECT a.* FROM ({inner}) a WHERE ROWNUM <= {max}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_limit_is_untouched() {
        let sql = "SELECT * FROM users";
        assert_eq!(modify_limit_query(sql, None, None), sql);
        assert_eq!(modify_limit_query(sql, None, Some(10)), sql);
        assert_eq!(modify_limit_query(sql, Some(0), Some(10)), sql);
    }

    #[test]
    fn test_limit_without_offset() {
        assert_eq!(
            modify_limit_query("SELECT id FROM users ORDER BY id", Some(10), None),
            "SELECT a.* FROM (SELECT id FROM users ORDER BY id) a WHERE ROWNUM <= 10"
        );
    }

    #[test]
    fn test_zero_offset_is_single_wrap() {
        assert_eq!(
            modify_limit_query("SELECT * FROM t", Some(5), Some(0)),
            "SELECT a.* FROM (SELECT * FROM t) a WHERE ROWNUM <= 5"
        );
    }

    #[test]
    fn test_limit_with_offset() {
        assert_eq!(
            modify_limit_query("SELECT * FROM users", Some(10), Some(20)),
            "SELECT * FROM (SELECT a.*, rownum AS doctrine_rownum FROM (SELECT * FROM users) a WHERE rownum <= 30) WHERE doctrine_rownum >= 21"
        );
    }

    #[test]
    fn test_select_without_from_gets_dual() {
        assert_eq!(
            modify_limit_query("SELECT SYSDATE", Some(1), None),
            "SELECT a.* FROM (SELECT SYSDATE FROM dual) a WHERE ROWNUM <= 1"
        );
    }

    #[test]
    fn test_case_insensitive_keywords() {
        assert_eq!(
            modify_limit_query("  select * from t", Some(2), None),
            "SELECT a.* FROM (  select * from t) a WHERE ROWNUM <= 2"
        );
    }

    #[test]
    fn test_non_select_untouched() {
        let sql = "DELETE FROM users";
        assert_eq!(modify_limit_query(sql, Some(10), Some(5)), sql);
    }

    #[test]
    fn test_offset_bounds_saturate() {
        assert_eq!(
            modify_limit_query("SELECT * FROM t", Some(10), Some(u64::MAX)),
            format!(
                "SELECT * FROM (SELECT a.*, rownum AS doctrine_rownum FROM (SELECT * FROM t) a WHERE rownum <= {max}) WHERE doctrine_rownum >= {max}",
                max = u64::MAX
            )
        );
    }

    #[test]
    fn test_builder() {
        let q = LimitQuery::new("SELECT * FROM t").limit(3).offset(6);
        assert!(q.to_sql().ends_with("WHERE rownum <= 9) WHERE doctrine_rownum >= 7"));
    }
}
