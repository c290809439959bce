//! Per-shape statement handlers

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{Context, ObjectType, OperationKind};
use crate::parser::identifier_utils::split_name_parts;
use crate::util::unescape_single_quotes;

use super::keywords::{capture, object_name, resolve_object_type, COLUMN, NAME};
use super::{Classification, Finding, Statement};

static USE_IGNORED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^USE\s+(?:ROLE|WAREHOUSE|SECONDARY)\b").expect("Invalid USE regex")
});

static USE_DATABASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^USE\s+DATABASE\s+({NAME})")).expect("Invalid USE DATABASE regex")
});

static USE_SCHEMA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^USE\s+SCHEMA\s+({NAME})")).expect("Invalid USE SCHEMA regex")
});

static USE_KEYWORD_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^USE\s+(?:DATABASE|SCHEMA)\b").expect("Invalid USE regex"));

static USE_BARE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^USE\s+({NAME})")).expect("Invalid USE regex"));

static OR_REPLACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^CREATE\s+OR\s+REPLACE\b").expect("Invalid OR REPLACE regex"));

static OR_ALTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^CREATE\s+OR\s+ALTER\b").expect("Invalid OR ALTER regex"));

static ADD_COLUMN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\bADD\s+COLUMN\b(?:\s+(?:IF\s+NOT\s+EXISTS\s+)?({COLUMN}))?"
    ))
    .expect("Invalid ADD COLUMN regex")
});

static DROP_COLUMN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\bDROP\s+COLUMN\b(?:\s+(?:IF\s+EXISTS\s+)?({COLUMN}))?"
    ))
    .expect("Invalid DROP COLUMN regex")
});

static MODIFY_COLUMN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\b(?:ALTER|MODIFY)\s+COLUMN\b(?:\s+({COLUMN}))?"))
        .expect("Invalid MODIFY COLUMN regex")
});

static TYPE_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bTYPE\b").expect("Invalid TYPE regex"));

static TRUNCATE_TARGET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^TRUNCATE\s+TABLE\s+(?:IF\s+EXISTS\s+)?({NAME})"
    ))
    .expect("Invalid TRUNCATE regex")
});

static INSERT_TARGET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^INSERT\s+(?:OVERWRITE\s+)?INTO\s+({NAME})"))
        .expect("Invalid INSERT regex")
});

static MERGE_TARGET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^MERGE\s+INTO\s+({NAME})")).expect("Invalid MERGE regex")
});

static DELETE_TARGET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^DELETE\s+FROM\s+({NAME})")).expect("Invalid DELETE regex")
});

/// `GRANT <privileges> ON <type> <object> TO ROLE|USER <principal>`
static GRANT_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^GRANT\s+[A-Z_,\s]+?\s+ON\s+[A-Z_]+\s+({NAME})\s+TO\s+(?:ROLE|USER)\s+{COLUMN}"
    ))
    .expect("Invalid GRANT regex")
});

/// `REVOKE <privileges> ON <type> <object> FROM ROLE|USER <principal>`
static REVOKE_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^REVOKE\s+[A-Z_,\s]+?\s+ON\s+[A-Z_]+\s+({NAME})\s+FROM\s+(?:ROLE|USER)\s+{COLUMN}"
    ))
    .expect("Invalid REVOKE regex")
});

static EXECUTE_IMMEDIATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^EXECUTE\s+IMMEDIATE\b").expect("Invalid EXECUTE IMMEDIATE regex")
});

static EXECUTE_IMMEDIATE_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^EXECUTE\s+IMMEDIATE\s+(?:'((?:[^']|'')*)'|\$\$(.*?)\$\$)")
        .expect("Invalid EXECUTE IMMEDIATE regex")
});

static EXECUTE_TASK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^EXECUTE\s+TASK\b(?:\s+({NAME}))?"))
        .expect("Invalid EXECUTE TASK regex")
});

static CALL_TARGET: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^CALL\s+({NAME})")).expect("Invalid CALL regex"));

/// `USE …`: switch context and report the switch.
///
/// `USE ROLE`, `USE WAREHOUSE` and `USE SECONDARY ROLES` are not context
/// switches and produce nothing. The result carries the context after the
/// switch.
pub(super) fn use_context(stmt: &Statement<'_>) -> Classification {
    let unchanged = || Classification {
        findings: Vec::new(),
        context: stmt.context.clone(),
    };

    if USE_IGNORED.is_match(stmt.sql) {
        return unchanged();
    }

    let (kind, name, context) = if let Some(name) = capture(&USE_DATABASE, stmt.sql, 1) {
        let parts = split_name_parts(&name);
        let database = parts.join(".");
        (
            OperationKind::UseDatabase,
            name,
            stmt.context.with_database(database),
        )
    } else if let Some(name) = capture(&USE_SCHEMA, stmt.sql, 1) {
        let context = schema_switch(stmt.context, &name);
        (OperationKind::UseSchema, name, context)
    } else if USE_KEYWORD_ONLY.is_match(stmt.sql) {
        return unchanged();
    } else if let Some(name) = capture(&USE_BARE, stmt.sql, 1) {
        let parts = split_name_parts(&name);
        if parts.len() >= 2 {
            let context = schema_switch(stmt.context, &name);
            (OperationKind::UseSchema, name, context)
        } else {
            let context = stmt.context.with_database(parts.join("."));
            (OperationKind::UseDatabase, name, context)
        }
    } else {
        return unchanged();
    };

    let finding = stmt.finding_in(kind, Some(name), false, &context);
    Classification {
        findings: vec![finding],
        context,
    }
}

/// `[database.]schema` → new context; a one-part name keeps the database.
fn schema_switch(context: &Context, name: &str) -> Context {
    let mut parts = split_name_parts(name);
    let schema = parts.pop().unwrap_or_default();
    let database = if parts.is_empty() {
        None
    } else {
        Some(parts.join("."))
    };
    context.with_schema(schema, database)
}

/// Kind for a CREATE of `object_type`, honoring `OR REPLACE` / `OR ALTER`,
/// and whether it needs a lineage check.
pub(super) fn create_kind(sql: &str, object_type: ObjectType) -> (OperationKind, bool) {
    if OR_REPLACE.is_match(sql) {
        (OperationKind::CreateOrReplace(object_type), true)
    } else if OR_ALTER.is_match(sql) {
        (OperationKind::CreateOrAlter(object_type), true)
    } else {
        (OperationKind::Create(object_type), false)
    }
}

pub(super) fn create(stmt: &Statement<'_>) -> Option<Finding> {
    let object_type = resolve_object_type(stmt.sql)?;
    let (kind, checked) = create_kind(stmt.sql, object_type);
    Some(stmt.finding(kind, object_name(stmt.sql, object_type), checked))
}

/// ALTER of a non-table object, or one of the ALTER TABLE sub-clauses.
pub(super) fn alter(stmt: &Statement<'_>) -> Option<Finding> {
    let object_type = resolve_object_type(stmt.sql)?;
    let name = object_name(stmt.sql, object_type);

    if object_type != ObjectType::Table {
        return Some(stmt.finding(OperationKind::Alter(object_type), name, true));
    }

    let column_of = |re: &Regex| capture(re, stmt.sql, 1);

    let finding = if ADD_COLUMN.is_match(stmt.sql) {
        stmt.finding(OperationKind::AlterTableAddColumn, name, false)
            .with_column(column_of(&ADD_COLUMN))
    } else if DROP_COLUMN.is_match(stmt.sql) {
        stmt.finding(OperationKind::AlterTableDropColumn, name, true)
            .with_column(column_of(&DROP_COLUMN))
    } else if MODIFY_COLUMN.is_match(stmt.sql) && TYPE_KEYWORD.is_match(stmt.sql) {
        stmt.finding(OperationKind::AlterTableModifyColumnType, name, true)
            .with_column(column_of(&MODIFY_COLUMN))
    } else {
        stmt.finding(OperationKind::AlterTableNotColumns, name, true)
    };
    Some(finding)
}

pub(super) fn drop(stmt: &Statement<'_>) -> Option<Finding> {
    let object_type = resolve_object_type(stmt.sql)?;
    Some(stmt.finding(
        OperationKind::Drop(object_type),
        object_name(stmt.sql, object_type),
        true,
    ))
}

pub(super) fn undrop(stmt: &Statement<'_>) -> Option<Finding> {
    let object_type = resolve_object_type(stmt.sql)?;
    Some(stmt.finding(
        OperationKind::Undrop(object_type),
        object_name(stmt.sql, object_type),
        false,
    ))
}

pub(super) fn truncate(stmt: &Statement<'_>) -> Option<Finding> {
    Some(stmt.finding(
        OperationKind::TruncateTable,
        capture(&TRUNCATE_TARGET, stmt.sql, 1),
        true,
    ))
}

pub(super) fn insert(stmt: &Statement<'_>) -> Option<Finding> {
    Some(stmt.finding(
        OperationKind::InsertValues,
        capture(&INSERT_TARGET, stmt.sql, 1),
        true,
    ))
}

pub(super) fn merge(stmt: &Statement<'_>) -> Option<Finding> {
    Some(stmt.finding(
        OperationKind::MergeValues,
        capture(&MERGE_TARGET, stmt.sql, 1),
        true,
    ))
}

pub(super) fn delete(stmt: &Statement<'_>) -> Option<Finding> {
    Some(stmt.finding(
        OperationKind::DeleteValues,
        capture(&DELETE_TARGET, stmt.sql, 1),
        true,
    ))
}

/// Only the full five-part shape counts; anything else is dropped.
pub(super) fn grant(stmt: &Statement<'_>) -> Option<Finding> {
    let object = capture(&GRANT_SHAPE, stmt.sql, 1)?;
    Some(stmt.finding(OperationKind::GrantPrivilege, Some(object), true))
}

pub(super) fn revoke(stmt: &Statement<'_>) -> Option<Finding> {
    let object = capture(&REVOKE_SHAPE, stmt.sql, 1)?;
    Some(stmt.finding(OperationKind::RevokePrivilege, Some(object), false))
}

/// SQL text of an `EXECUTE IMMEDIATE` literal, quotes removed.
pub(super) fn immediate_literal(sql: &str) -> Option<String> {
    let caps = EXECUTE_IMMEDIATE_LITERAL.captures(sql)?;
    if let Some(single) = caps.get(1) {
        return Some(unescape_single_quotes(single.as_str()));
    }
    caps.get(2).map(|m| m.as_str().to_string())
}

pub(super) fn execute(stmt: &Statement<'_>) -> Option<Finding> {
    if EXECUTE_IMMEDIATE.is_match(stmt.sql) {
        return Some(stmt.finding(OperationKind::ExecuteImmediate, None, false));
    }
    if EXECUTE_TASK.is_match(stmt.sql) {
        return Some(stmt.finding(
            OperationKind::ExecuteTask,
            capture(&EXECUTE_TASK, stmt.sql, 1),
            false,
        ));
    }
    None
}

pub(super) fn call(stmt: &Statement<'_>) -> Option<Finding> {
    Some(stmt.finding(
        OperationKind::CallProcedure,
        capture(&CALL_TARGET, stmt.sql, 1),
        false,
    ))
}
