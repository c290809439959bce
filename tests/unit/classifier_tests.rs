//! Statement classification and risk resolution tests

use std::path::Path;

use pretty_assertions::assert_eq;

use sql_risk_gate::model::{ObjectType, OperationKind, QualificationLevel, RiskTier};
use sql_risk_gate::parser::template::TemplateVariables;
use sql_risk_gate::{Analyzer, FileAnalysis, FixedLineage, RiskPolicy};

fn analyze_with(sql: &str, lineage: bool) -> FileAnalysis {
    let policy = RiskPolicy::builtin();
    let oracle = FixedLineage(lineage);
    let vars = TemplateVariables::defaults();
    Analyzer::new(&policy, &oracle, &vars)
        .analyze_sql(sql, Path::new("test.sql"))
        .unwrap()
}

fn kinds(analysis: &FileAnalysis) -> Vec<OperationKind> {
    analysis.results.iter().map(|r| r.kind).collect()
}

// ============================================================================
// Lineage-dependent Risk Tests
// ============================================================================

#[test]
fn test_drop_table_with_downstream_consumers() {
    let analysis = analyze_with("DROP TABLE D.S.T1;", true);
    assert_eq!(analysis.results.len(), 1);

    let result = &analysis.results[0];
    assert_eq!(result.kind, OperationKind::Drop(ObjectType::Table));
    assert_eq!(result.risk, RiskTier::High);
    assert!(result.needs_lineage_check);

    let reference = result.object_ref.as_ref().expect("object reference");
    assert_eq!(reference.qualification_level, QualificationLevel::Full);
    assert_eq!(reference.database.as_deref(), Some("D"));
    assert_eq!(reference.schema.as_deref(), Some("S"));
    assert_eq!(reference.object.as_deref(), Some("T1"));
}

#[test]
fn test_drop_table_without_downstream_consumers() {
    let analysis = analyze_with("DROP TABLE D.S.T1;", false);
    assert_eq!(analysis.results.len(), 1);
    assert_eq!(analysis.results[0].risk, RiskTier::Medium);
}

#[test]
fn test_grant_is_independent_of_lineage() {
    for lineage in [true, false] {
        let analysis = analyze_with("GRANT SELECT ON TABLE T1 TO ROLE R1;", lineage);
        assert_eq!(analysis.results.len(), 1);
        let result = &analysis.results[0];
        assert_eq!(result.kind, OperationKind::GrantPrivilege);
        assert_eq!(result.risk, RiskTier::High);
        assert_eq!(result.object.as_deref(), Some("T1"));
    }
}

#[test]
fn test_insert_is_low_without_consumers() {
    let analysis = analyze_with("INSERT INTO S.T1 VALUES (1);", false);
    assert_eq!(analysis.results[0].risk, RiskTier::Low);
    assert!(!analysis.requires_review());
}

// ============================================================================
// Procedure Tests
// ============================================================================

#[test]
fn test_procedure_body_statements_are_tagged() {
    let analysis = analyze_with(
        "CREATE OR REPLACE PROCEDURE P1() RETURNS VARCHAR LANGUAGE SQL AS $$ CREATE TABLE T1 (ID INT); $$;",
        true,
    );
    assert!(analysis.results.len() >= 2);

    let inner = analysis
        .results
        .iter()
        .find(|r| r.kind == OperationKind::Create(ObjectType::Table))
        .expect("inner CREATE TABLE");
    assert_eq!(inner.inside_procedure.as_deref(), Some("P1"));

    let outer = analysis
        .results
        .iter()
        .find(|r| r.kind == OperationKind::CreateOrReplace(ObjectType::Procedure))
        .expect("procedure definition");
    assert_eq!(outer.inside_procedure, None);
    assert_eq!(outer.object.as_deref(), Some("P1"));
}

#[test]
fn test_procedure_variable_sql_is_classified() {
    let sql = r#"CREATE PROCEDURE S.CLEAN()
RETURNS VARCHAR
LANGUAGE SQL
AS
$$
DECLARE
    stmt VARCHAR := 'DROP TABLE S.OLD_ORDERS';
BEGIN
    EXECUTE IMMEDIATE :stmt;
    RETURN 'ok';
END;
$$;"#;
    let analysis = analyze_with(sql, true);

    let dropped = analysis
        .results
        .iter()
        .find(|r| r.kind == OperationKind::Drop(ObjectType::Table))
        .expect("DROP TABLE from variable");
    assert!(dropped.from_variable);
    assert_eq!(dropped.inside_procedure.as_deref(), Some("S.CLEAN"));
    assert_eq!(dropped.object.as_deref(), Some("S.OLD_ORDERS"));
    assert_eq!(
        analysis.results.last().map(|r| r.kind),
        Some(OperationKind::Create(ObjectType::Procedure))
    );
}

#[test]
fn test_quoted_body_with_doubled_quotes_keeps_later_statements() {
    let analysis = analyze_with(
        "CREATE OR REPLACE PROCEDURE P1() RETURNS VARCHAR AS 'BEGIN DELETE FROM T WHERE X = ''A''; DROP TABLE D.S.T2; END';",
        true,
    );
    assert_eq!(
        kinds(&analysis),
        vec![
            OperationKind::DeleteValues,
            OperationKind::Drop(ObjectType::Table),
            OperationKind::CreateOrReplace(ObjectType::Procedure),
        ]
    );
    let dropped = &analysis.results[1];
    assert_eq!(dropped.object.as_deref(), Some("D.S.T2"));
    assert_eq!(dropped.inside_procedure.as_deref(), Some("P1"));
}

#[test]
fn test_execute_immediate_literal_with_doubled_quotes() {
    let analysis = analyze_with(
        "EXECUTE IMMEDIATE 'UPDATE T SET X = ''A''; DROP TABLE D.S.T2';",
        true,
    );
    assert_eq!(
        kinds(&analysis),
        vec![
            OperationKind::Drop(ObjectType::Table),
            OperationKind::ExecuteImmediate,
        ]
    );
    assert_eq!(analysis.results[0].object.as_deref(), Some("D.S.T2"));
}

// ============================================================================
// Statement Shape Tests
// ============================================================================

#[test]
fn test_mixed_script() {
    let sql = r#"
USE DATABASE PRO;
USE SCHEMA SALES;
-- comment-only lines are skipped
CREATE TABLE ORDERS (ID INT);
ALTER TABLE ORDERS ADD COLUMN REGION VARCHAR;
ALTER TABLE ORDERS DROP COLUMN LEGACY_FLAG;
ALTER TABLE ORDERS RENAME TO ORDERS_V2;
TRUNCATE TABLE ORDERS_STAGE;
DELETE FROM ORDERS WHERE ID < 0;
MERGE INTO ORDERS USING ORDERS_STAGE ON ORDERS.ID = ORDERS_STAGE.ID WHEN MATCHED THEN DELETE;
SELECT * FROM ORDERS;
CALL REFRESH_ORDERS();
EXECUTE TASK LOAD_ORDERS;
"#;
    let analysis = analyze_with(sql, true);
    assert_eq!(
        kinds(&analysis),
        vec![
            OperationKind::UseDatabase,
            OperationKind::UseSchema,
            OperationKind::Create(ObjectType::Table),
            OperationKind::AlterTableAddColumn,
            OperationKind::AlterTableDropColumn,
            OperationKind::AlterTableNotColumns,
            OperationKind::TruncateTable,
            OperationKind::DeleteValues,
            OperationKind::MergeValues,
            OperationKind::CallProcedure,
            OperationKind::ExecuteTask,
        ]
    );

    let add = &analysis.results[3];
    assert_eq!(add.column.as_deref(), Some("REGION"));
    assert_eq!(add.risk, RiskTier::Medium);
}

#[test]
fn test_or_replace_and_or_alter_variants() {
    let analysis = analyze_with(
        "CREATE OR REPLACE VIEW V1 AS SELECT 1;\nCREATE OR ALTER TABLE T1 (ID INT);\nCREATE WAREHOUSE WH1;",
        true,
    );
    assert_eq!(
        kinds(&analysis),
        vec![
            OperationKind::CreateOrReplace(ObjectType::View),
            OperationKind::CreateOrAlter(ObjectType::Table),
            OperationKind::Create(ObjectType::Warehouse),
        ]
    );
}

#[test]
fn test_unknown_object_type_is_not_classified() {
    let analysis = analyze_with("DROP STAGE MY_STAGE;", true);
    assert!(analysis.results.is_empty());
}

#[test]
fn test_missing_name_keeps_the_result() {
    let analysis = analyze_with("DROP TABLE;", true);
    assert_eq!(kinds(&analysis), vec![OperationKind::Drop(ObjectType::Table)]);
    assert_eq!(analysis.results[0].object, None);
    assert_eq!(analysis.results[0].object_ref, None);
}

#[test]
fn test_semicolons_inside_literals_do_not_split() {
    let analysis = analyze_with(
        "INSERT INTO T1 VALUES ('a;b');\nCREATE VIEW V1 AS SELECT ';' AS X;",
        true,
    );
    assert_eq!(
        kinds(&analysis),
        vec![
            OperationKind::InsertValues,
            OperationKind::Create(ObjectType::View)
        ]
    );
}

#[test]
fn test_template_variables_are_reported() {
    let analysis = analyze_with("DROP TABLE {{ environment }}.S.T1;", true);
    assert_eq!(analysis.template_variables, vec!["environment".to_string()]);
    assert_eq!(analysis.results[0].object.as_deref(), Some("PRO.S.T1"));
}
