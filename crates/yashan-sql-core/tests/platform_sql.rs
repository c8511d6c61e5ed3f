//! End-to-end SQL generation through the public API.

use yashan_sql_core::{
    fix_schema_element_name, is_reserved, sequence_name, ColumnSpec, DefaultValue, LimitQuery,
    NullClause, Platform, PlatformError, SequenceValue, SqlType, TableDiff, TableSpec,
    YashanPlatform,
};

#[test]
fn test_pagination_bounds_for_limit_and_offset() {
    let p = YashanPlatform::new();
    let sql = p.modify_limit_query("SELECT * FROM orders ORDER BY id", Some(10), Some(20));
    assert_eq!(
        sql,
        "SELECT * FROM (SELECT a.*, rownum AS doctrine_rownum FROM (SELECT * FROM orders ORDER BY id) a WHERE rownum <= 30) WHERE doctrine_rownum >= 21"
    );
}

#[test]
fn test_pagination_limit_only_keeps_inner_query() {
    let inner = "SELECT id, name FROM users WHERE active = 1 ORDER BY name";
    let sql = LimitQuery::new(inner).limit(25).to_sql();
    assert_eq!(sql, format!("SELECT a.* FROM ({inner}) a WHERE ROWNUM <= 25"));
}

#[test]
fn test_sequence_names_follow_prefix_and_limit() {
    assert_eq!(sequence_name("users", "id"), "users_id_seq");
    assert_eq!(sequence_name("app_users", "id"), "app_users_id_seq");

    let long = format!("{}_id_seq", "a".repeat(28));
    assert_eq!(long.len(), 35);
    let fixed = fix_schema_element_name(&long);
    assert_eq!(fixed.len(), 30);
    assert_eq!(fixed, fix_schema_element_name(&long));
    assert_eq!(fixed, YashanPlatform::new().fix_schema_element_name(&long));
}

#[test]
fn test_default_string_lengths() {
    let p = YashanPlatform::new();
    let table = TableSpec::new("t")
        .column(ColumnSpec::new("v", SqlType::Varchar(None)))
        .column(ColumnSpec::new("c", SqlType::Char(None)).nullable());
    assert_eq!(
        p.create_table_sql(&table),
        vec!["CREATE TABLE \"t\" (\"v\" VARCHAR2(4000) NOT NULL, \"c\" CHAR(2000) NULL)".to_string()]
    );
}

#[test]
fn test_alter_comment_only_omits_null_clause() {
    let p = YashanPlatform::new();
    let old = ColumnSpec::new("status", SqlType::SmallInt).default(DefaultValue::Integer(0));
    let new = old.clone().comment("Order status");
    let sql = p
        .alter_table_sql(&TableDiff::new("orders").change(old, new))
        .unwrap();
    assert_eq!(sql.len(), 2);
    assert_eq!(sql[0], "ALTER TABLE \"orders\" MODIFY \"status\" SMALLINT DEFAULT 0");
    assert!(!sql[0].contains("NULL"));
    assert_eq!(
        sql[1],
        "COMMENT ON COLUMN \"orders\".\"status\" IS 'Order status'"
    );
}

#[test]
fn test_alter_add_or_drop_column_fails_without_sql() {
    let p = YashanPlatform::new();
    let keep = ColumnSpec::new("a", SqlType::Integer);

    let diff = TableDiff::new("orders")
        .change(keep.clone(), keep.comment("x"))
        .add(ColumnSpec::new("note", SqlType::Clob));
    let err = p.alter_table_sql(&diff).unwrap_err();
    assert_eq!(
        err,
        PlatformError::unsupported("orders", "add column 'note'")
    );

    let diff = TableDiff::new("orders").remove("note");
    assert!(matches!(
        p.alter_table_sql(&diff),
        Err(PlatformError::UnsupportedOperation { .. })
    ));
}

#[test]
fn test_sequence_statements_reference_quoted_name() {
    let p = YashanPlatform::new();
    let seq = sequence_name("invoices", "id");
    assert_eq!(
        p.create_sequence_sql(&seq, 100, 1).unwrap(),
        "CREATE SEQUENCE \"invoices_id_seq\" START WITH 100 INCREMENT BY 1"
    );
    assert_eq!(
        p.sequence_default_sql("invoices", "id", &seq),
        "ALTER TABLE \"invoices\" MODIFY \"id\" DEFAULT \"invoices_id_seq\".NEXTVAL"
    );
    assert_eq!(
        p.sequence_value_sql(&seq, SequenceValue::NextVal).unwrap(),
        "SELECT \"invoices_id_seq\".NEXTVAL AS \"id\" FROM DUAL"
    );
    assert_eq!(
        p.drop_sequence_sql(&seq).unwrap(),
        "DROP SEQUENCE \"invoices_id_seq\""
    );
}

#[test]
fn test_reserved_words_still_quoted_uniformly() {
    let p = YashanPlatform::new();
    assert!(is_reserved("select"));
    assert!(!is_reserved("email"));
    let user = ColumnSpec::new("user", SqlType::Integer);
    let email = ColumnSpec::new("email", SqlType::Integer);
    assert!(p
        .column_declaration(&user, NullClause::Include)
        .starts_with("\"user\" "));
    assert!(p
        .column_declaration(&email, NullClause::Include)
        .starts_with("\"email\" "));
}
