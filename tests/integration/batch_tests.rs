//! Integration tests for batch analysis over directories and file lists

use pretty_assertions::assert_eq;

use sql_risk_gate::model::RiskTier;
use sql_risk_gate::CheckOptions;

use crate::common::{kind_labels, TestContext};

// ============================================================================
// Fixture Tests
// ============================================================================

#[test]
fn test_safe_fixture_is_approved() {
    let ctx = TestContext::with_fixture("safe_migration");
    let batch = ctx.check().unwrap();

    assert_eq!(batch.files.len(), 2);
    assert!(!batch.requires_review(), "Unexpected risky results: {:?}", kind_labels(&batch));
    assert_eq!(
        kind_labels(&batch),
        vec![
            "USE_DATABASE",
            "USE_SCHEMA",
            "CREATE_TABLE",
            "CREATE_VIEW",
            "UNDROP_TABLE"
        ]
    );
}

#[test]
fn test_risky_fixture_requires_review() {
    let ctx = TestContext::with_fixture("risky_migration");
    let batch = ctx.check().unwrap();

    assert!(batch.requires_review());
    assert_eq!(batch.risky_files().count(), 2);

    let cleanup = &batch.files[0];
    let drop = cleanup
        .results
        .iter()
        .find(|r| r.kind.label() == "DROP_TABLE")
        .expect("DROP TABLE result");
    assert_eq!(drop.risk, RiskTier::High);
    assert_eq!(
        drop.object_ref.as_ref().and_then(|r| r.qualified_name()).as_deref(),
        Some("PRO.SALES.ORDERS_OLD")
    );

    let add = cleanup
        .results
        .iter()
        .find(|r| r.kind.label() == "ALTER_TABLE_ADD_COLUMN")
        .expect("ADD COLUMN result");
    assert_eq!(add.column.as_deref(), Some("REGION"));
    assert_eq!(add.risk, RiskTier::Medium);
}

#[test]
fn test_lineage_override_lowers_risk() {
    let ctx = TestContext::with_fixture("risky_migration");
    let batch = ctx
        .check_with(CheckOptions {
            assume_lineage: Some(false),
            ..CheckOptions::default()
        })
        .unwrap();

    let drop = batch.files[0]
        .results
        .iter()
        .find(|r| r.kind.label() == "DROP_TABLE")
        .unwrap();
    assert_eq!(drop.risk, RiskTier::Medium);
}

#[test]
fn test_procedure_fixture() {
    let ctx = TestContext::with_fixture("procedure_migration");
    let batch = ctx.check().unwrap();
    let results = &batch.files[0].results;

    let truncate = results
        .iter()
        .find(|r| r.kind.label() == "TRUNCATE_TABLE")
        .expect("TRUNCATE from variable");
    assert!(truncate.from_variable);
    assert_eq!(truncate.inside_procedure.as_deref(), Some("SALES.REBUILD_ORDERS"));
    assert_eq!(truncate.context.database.as_deref(), Some("PRO"));

    let create = results
        .iter()
        .find(|r| r.kind.label() == "CREATE_TABLE")
        .expect("CREATE TABLE in body");
    assert!(!create.from_variable);
    assert_eq!(create.inside_procedure.as_deref(), Some("SALES.REBUILD_ORDERS"));

    let last = results.last().unwrap();
    assert_eq!(last.kind.label(), "CREATE_OR_REPLACE_PROCEDURE");
    assert_eq!(last.inside_procedure, None);
}

// ============================================================================
// Discovery Tests
// ============================================================================

#[test]
fn test_only_first_ten_files_are_analyzed() {
    let ctx = TestContext::new();
    for i in 1..=10 {
        ctx.write_sql(&format!("{:02}.sql", i), "CREATE TABLE T1 (ID INT);");
    }
    ctx.write_sql("11.sql", "DROP TABLE D.S.T1;");
    ctx.write_sql("12.sql", "DROP DATABASE D;");

    let batch = ctx.check().unwrap();
    assert_eq!(batch.files.len(), 10);
    assert!(!batch.requires_review());

    let names: Vec<String> = batch
        .files
        .iter()
        .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    let expected: Vec<String> = (1..=10).map(|i| format!("{:02}.sql", i)).collect();
    assert_eq!(names, expected);
}

#[test]
fn test_raised_limit_includes_later_files() {
    let ctx = TestContext::new();
    for i in 1..=10 {
        ctx.write_sql(&format!("{:02}.sql", i), "CREATE TABLE T1 (ID INT);");
    }
    ctx.write_sql("11.sql", "DROP TABLE D.S.T1;");

    let batch = ctx
        .check_with(CheckOptions {
            limit: Some(20),
            ..CheckOptions::default()
        })
        .unwrap();
    assert_eq!(batch.files.len(), 11);
    assert!(batch.requires_review());
    assert!(batch.files[10].path.ends_with("11.sql"));
}

#[test]
fn test_zero_limit_is_rejected() {
    let ctx = TestContext::new();
    ctx.write_sql("a.sql", "CREATE TABLE T1 (ID INT);");
    let result = ctx.check_with(CheckOptions {
        limit: Some(0),
        ..CheckOptions::default()
    });
    assert!(result.is_err());
}

#[test]
fn test_explicit_file_list() {
    let ctx = TestContext::new();
    let risky = ctx.write_sql("b.sql", "TRUNCATE TABLE T1;");
    let safe = ctx.write_sql("a.sql", "CREATE TABLE T1 (ID INT);");
    let notes = ctx.write_sql("notes.txt", "DROP TABLE T1;");

    let batch = ctx
        .check_with(CheckOptions {
            paths: vec![risky.clone(), safe.clone(), notes],
            ..CheckOptions::default()
        })
        .unwrap();

    assert_eq!(batch.files.len(), 2);
    assert_eq!(batch.files[0].path, risky);
    assert_eq!(batch.files[1].path, safe);
    assert!(batch.requires_review());
    assert!(batch.file(&risky).unwrap().requires_review());
    assert!(!batch.file(&safe).unwrap().requires_review());
}

#[test]
fn test_empty_directory() {
    let ctx = TestContext::new();
    let batch = ctx.check().unwrap();
    assert!(batch.is_empty());
    assert!(!batch.requires_review());
}

#[test]
fn test_unsplittable_file_aborts_batch() {
    let ctx = TestContext::new();
    ctx.write_sql("a.sql", "CREATE TABLE T1 (ID INT);");
    ctx.write_sql("b.sql", "INSERT INTO T1 VALUES ('unterminated);");

    let err = ctx.check().unwrap_err();
    assert!(
        format!("{:#}", err).contains("b.sql"),
        "Error should name the file: {:#}",
        err
    );
}

#[test]
fn test_windows_1252_file_is_read() {
    let ctx = TestContext::new();
    let path = ctx.root.join("latin.sql");
    // 0xE9 is 'é' in Windows-1252 and invalid as UTF-8
    std::fs::write(&path, b"-- caf\xe9\nDROP TABLE S.T1;").unwrap();

    let batch = ctx.check().unwrap();
    assert_eq!(kind_labels(&batch), vec!["DROP_TABLE"]);
}

#[test]
fn test_large_batch_keeps_file_order() {
    let ctx = TestContext::new();
    for i in 0..12 {
        ctx.write_sql(&format!("{:02}.sql", i), &format!("DROP TABLE S.T{};", i));
    }
    let batch = ctx
        .check_with(CheckOptions {
            limit: Some(12),
            ..CheckOptions::default()
        })
        .unwrap();

    let objects: Vec<String> = batch
        .files
        .iter()
        .map(|f| f.results[0].object.clone().unwrap())
        .collect();
    let expected: Vec<String> = (0..12).map(|i| format!("S.T{}", i)).collect();
    assert_eq!(objects, expected);
}
