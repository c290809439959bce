//! Risk policy consistency tests

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use pretty_assertions::assert_eq;

use sql_risk_gate::model::{ObjectType, OperationKind, RiskTier};
use sql_risk_gate::parser::template::TemplateVariables;
use sql_risk_gate::{Analyzer, FixedLineage, GateError, RiskPolicy, RiskRule};

/// One statement per operation kind the classifier can produce
fn statements_for_every_kind() -> Vec<String> {
    let mut sql = vec![
        "USE DATABASE D1;".to_string(),
        "USE SCHEMA S1;".to_string(),
        "ALTER TABLE T1 ADD COLUMN C1 INT;".to_string(),
        "ALTER TABLE T1 DROP COLUMN C1;".to_string(),
        "ALTER TABLE T1 ALTER COLUMN C1 SET DATA TYPE NUMBER(10, 2);".to_string(),
        "ALTER TABLE T1 RENAME TO T2;".to_string(),
        "TRUNCATE TABLE T1;".to_string(),
        "INSERT INTO T1 VALUES (1);".to_string(),
        "MERGE INTO T1 USING T2 ON T1.ID = T2.ID WHEN MATCHED THEN DELETE;".to_string(),
        "DELETE FROM T1;".to_string(),
        "GRANT SELECT ON TABLE T1 TO ROLE R1;".to_string(),
        "REVOKE SELECT ON TABLE T1 FROM ROLE R1;".to_string(),
        "EXECUTE IMMEDIATE :stmt;".to_string(),
        "EXECUTE TASK LOAD_T1;".to_string(),
        "CALL REFRESH_T1();".to_string(),
    ];

    for object_type in ObjectType::ALL {
        let keyword = object_type.as_str().replace('_', " ");
        let body = if object_type == ObjectType::Procedure {
            "() RETURNS INT AS $$ RETURN 1; $$"
        } else {
            ""
        };
        sql.push(format!("CREATE {} X1{};", keyword, body));
        sql.push(format!("CREATE OR REPLACE {} X1{};", keyword, body));
        sql.push(format!("CREATE OR ALTER {} X1{};", keyword, body));
        if object_type != ObjectType::Table {
            sql.push(format!("ALTER {} X1 SET COMMENT = 'x';", keyword));
        }
        sql.push(format!("DROP {} X1;", keyword));
        sql.push(format!("UNDROP {} X1;", keyword));
    }
    sql
}

#[test]
fn test_builtin_policy_covers_every_kind() {
    let policy = RiskPolicy::builtin();
    for kind in OperationKind::all() {
        assert!(policy.rule(kind).is_some(), "no rule for {}", kind);
    }
}

#[test]
fn test_classifier_only_emits_kinds_with_rules() {
    let policy = RiskPolicy::builtin();
    let vars = TemplateVariables::defaults();

    for lineage in [true, false] {
        let oracle = FixedLineage(lineage);
        let analyzer = Analyzer::new(&policy, &oracle, &vars);
        let analysis = analyzer
            .analyze_sql(&statements_for_every_kind().join("\n"), Path::new("all.sql"))
            .unwrap();

        let emitted: BTreeSet<OperationKind> = analysis.results.iter().map(|r| r.kind).collect();
        let expected: BTreeSet<OperationKind> = OperationKind::all().into_iter().collect();
        assert_eq!(emitted, expected);
    }
}

#[test]
fn test_labels_round_trip_for_configuration() {
    for kind in OperationKind::all() {
        let parsed: OperationKind = kind.label().parse().unwrap();
        assert_eq!(parsed, kind);
    }
    assert!("DROP_EVERYTHING".parse::<OperationKind>().is_err());
}

#[test]
fn test_incomplete_policy_is_rejected() {
    let mut rules = HashMap::new();
    rules.insert(OperationKind::GrantPrivilege, RiskRule::Fixed(RiskTier::High));
    assert!(matches!(
        RiskPolicy::new(rules),
        Err(GateError::MissingRiskPolicy { .. })
    ));
}

#[test]
fn test_override_replaces_single_rule() {
    let mut overrides = HashMap::new();
    overrides.insert(
        OperationKind::Drop(ObjectType::Table),
        RiskRule::Fixed(RiskTier::Low),
    );
    let policy = RiskPolicy::with_overrides(&overrides).unwrap();
    assert_eq!(
        policy.rule(OperationKind::Drop(ObjectType::Table)),
        Some(RiskRule::Fixed(RiskTier::Low))
    );
    assert_eq!(
        policy.rule(OperationKind::Drop(ObjectType::View)),
        RiskPolicy::builtin().rule(OperationKind::Drop(ObjectType::View))
    );
}

#[test]
fn test_unchecked_pair_uses_higher_impact_tier() {
    let policy = RiskPolicy::builtin();
    let tier = policy
        .resolve(OperationKind::TruncateTable, false, None, &FixedLineage(false))
        .unwrap();
    assert_eq!(tier, RiskTier::High);
}

#[test]
fn test_drop_column_is_high_regardless_of_lineage() {
    let policy = RiskPolicy::builtin();
    assert_eq!(
        policy.rule(OperationKind::AlterTableDropColumn),
        Some(RiskRule::Fixed(RiskTier::High))
    );

    let vars = TemplateVariables::defaults();
    for lineage in [true, false] {
        let oracle = FixedLineage(lineage);
        let analysis = Analyzer::new(&policy, &oracle, &vars)
            .analyze_sql("ALTER TABLE D.S.T1 DROP COLUMN C1;", Path::new("test.sql"))
            .unwrap();
        assert_eq!(analysis.results[0].risk, RiskTier::High);
    }
}
