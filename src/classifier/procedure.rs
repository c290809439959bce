//! Stored procedure bodies
//!
//! A procedure definition is classified from the inside out: SQL held in
//! string-literal variable assignments first, then the body's own
//! statements, then the definition itself.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::ObjectType;
use crate::parser::dynamic_sql::normalize_dynamic_sql;
use crate::parser::splitter::{split_statements_lenient, strip_comments};
use crate::parser::template::TemplateVariables;
use crate::util::unescape_single_quotes;

use super::handlers::create_kind;
use super::keywords::{capture, NAME};
use super::{Classification, Classifier, Finding, Statement};

/// Procedure definitions nested deeper than this are reported without
/// descending into their bodies.
pub const MAX_PROCEDURE_DEPTH: usize = 4;

const IDENT: &str = r"[A-Z_][A-Z0-9_$]*";
const DATA_TYPE: &str = r"[A-Z_][A-Z0-9_]*(?:\s*\([^)]*\))?";
const OPERAND: &str = r"(?:'(?:[^']|'')*'|\$\$.*?\$\$|:?[A-Z_][A-Z0-9_$]*(?:\.[A-Z_][A-Z0-9_$]*)*)";

static PROCEDURE_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^CREATE\s+(?:OR\s+(?:REPLACE|ALTER)\s+)?(?:SECURE\s+)?PROCEDURE\b")
        .expect("Invalid procedure header regex")
});

static PROCEDURE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\bPROCEDURE\s+(?:IF\s+NOT\s+EXISTS\s+)?({NAME})\s*\("
    ))
    .expect("Invalid procedure name regex")
});

static PROCEDURE_NAME_LOOSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\bPROCEDURE\s+(?:IF\s+NOT\s+EXISTS\s+)?({NAME})"))
        .expect("Invalid procedure name regex")
});

static DOLLAR_BODY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\bAS\s+\$\$(.*?)\$\$").expect("Invalid body regex"));

static QUOTED_BODY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\bAS\s+'((?:[^']|'')*)'").expect("Invalid body regex")
});

static SQL_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:SELECT|INSERT|UPDATE|DELETE|MERGE|CREATE|DROP|ALTER|TRUNCATE|GRANT|REVOKE|WITH)\b",
    )
    .expect("Invalid SQL keyword regex")
});

/// `LET v [TYPE] := expr`, `SET v = expr`, `v [TYPE] := expr`, `v TYPE DEFAULT expr`,
/// where `expr` is a `||` concatenation of literals and identifiers.
static ASSIGNMENTS: Lazy<Vec<Regex>> = Lazy::new(|| {
    let rhs = format!(r"(?P<rhs>{OPERAND}(?:\s*\|\|\s*{OPERAND})*)");
    [
        format!(r"(?s)\bLET\s+(?P<var>{IDENT})(?:\s+{DATA_TYPE})?\s*(?::=|\bDEFAULT\b)\s*{rhs}"),
        format!(r"(?s)\bSET\s+(?P<var>{IDENT})\s*=\s*{rhs}"),
        format!(r"(?s)\b(?P<var>{IDENT})\s+{DATA_TYPE}\s*:=\s*{rhs}"),
        format!(r"(?s)\b(?P<var>{IDENT})\s*:=\s*{rhs}"),
        format!(r"(?s)\b(?P<var>{IDENT})\s+{DATA_TYPE}\s+DEFAULT\s+{rhs}"),
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("Invalid assignment regex"))
    .collect()
});

/// Literal at the start of a collapsed assignment expression
static LEADING_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^(?:'((?:[^']|'')*)'|\$\$(.*?)\$\$)").expect("Invalid literal regex")
});

/// Leading text of a statement that assigns variable `var`.
static ASSIGNMENT_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^(?:LET\s+|SET\s+)?(?P<var>{IDENT})\s*(?::=|=|{DATA_TYPE}\s*(?::=|\bDEFAULT\b))"
    ))
    .expect("Invalid assignment regex")
});

static BLOCK_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:(?:DECLARE|BEGIN)\b\s*)+").expect("Invalid block regex"));

/// SQL text assigned to a procedure variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SqlAssignment {
    pub variable: String,
    pub sql: String,
    /// Template variables substituted while collapsing the expression
    pub substituted: Vec<String>,
    /// Byte offset of the expression in the body
    offset: usize,
}

pub(crate) fn is_procedure_definition(sql: &str) -> bool {
    PROCEDURE_HEADER.is_match(sql)
}

/// Name preceding the parameter list, or the first name after PROCEDURE.
pub(crate) fn procedure_name(sql: &str) -> Option<String> {
    capture(&PROCEDURE_NAME, sql, 1).or_else(|| capture(&PROCEDURE_NAME_LOOSE, sql, 1))
}

/// Body between `AS $$ … $$`, else inside `AS '…'` with doubled quotes undone.
pub(crate) fn procedure_body(sql: &str) -> Option<String> {
    if let Some(body) = capture(&DOLLAR_BODY, sql, 1) {
        return Some(body);
    }
    capture(&QUOTED_BODY, sql, 1).map(|body| unescape_single_quotes(&body))
}

/// Variable assignments whose value looks like SQL, in body order.
///
/// Each right-hand side is collapsed on its own, so every assignment gets
/// the full normalization pass budget.
pub(crate) fn find_sql_assignments(
    body: &str,
    variables: &TemplateVariables,
) -> Vec<SqlAssignment> {
    let mut found: Vec<SqlAssignment> = Vec::new();

    for re in ASSIGNMENTS.iter() {
        for caps in re.captures_iter(body) {
            let (Some(var), Some(rhs)) = (caps.name("var"), caps.name("rhs")) else {
                continue;
            };
            if found.iter().any(|a| a.offset == rhs.start()) {
                continue;
            }
            let normalized = normalize_dynamic_sql(rhs.as_str(), variables);
            let Some(literal) = leading_literal(&normalized.text) else {
                continue;
            };
            if !SQL_KEYWORD.is_match(&literal) {
                continue;
            }
            found.push(SqlAssignment {
                variable: var.as_str().to_string(),
                sql: literal,
                substituted: normalized
                    .substituted
                    .iter()
                    .map(|name| name.to_ascii_lowercase())
                    .collect(),
                offset: rhs.start(),
            });
        }
    }

    found.sort_by_key(|a| a.offset);
    found
}

fn leading_literal(expression: &str) -> Option<String> {
    let caps = LEADING_LITERAL.captures(expression)?;
    match (caps.get(1), caps.get(2)) {
        (Some(m), _) => Some(unescape_single_quotes(m.as_str())),
        (None, Some(m)) => Some(m.as_str().to_string()),
        (None, None) => None,
    }
}

fn starts_consumed_assignment(statement: &str, consumed: &HashSet<&str>) -> bool {
    ASSIGNMENT_START
        .captures(statement)
        .and_then(|caps| caps.name("var"))
        .is_some_and(|var| consumed.contains(var.as_str()))
}

impl Classifier<'_> {
    pub(super) fn classify_procedure(&self, stmt: &Statement<'_>) -> Classification {
        let name = procedure_name(stmt.sql);
        let mut findings = Vec::new();

        if stmt.scope.depth < MAX_PROCEDURE_DEPTH {
            if let Some(body) = procedure_body(stmt.sql) {
                findings.extend(self.classify_body(&body, name.clone(), stmt));
            }
        } else {
            tracing::debug!(
                procedure = name.as_deref().unwrap_or("-"),
                depth = stmt.scope.depth,
                "procedure nesting limit reached, body not analyzed"
            );
        }

        let (kind, checked) = create_kind(stmt.sql, ObjectType::Procedure);
        findings.push(stmt.finding(kind, name, checked));

        Classification {
            findings,
            context: stmt.context.clone(),
        }
    }

    /// Body context starts from the definition's context; `USE` inside the
    /// body does not leak out.
    fn classify_body(
        &self,
        body: &str,
        procedure: Option<String>,
        stmt: &Statement<'_>,
    ) -> Vec<Finding> {
        let mut findings = Vec::new();

        let assignments = find_sql_assignments(body, self.variables);
        let variable_scope = stmt.scope.nested(procedure.clone(), true);
        for assignment in &assignments {
            let classification = self.classify_all(&assignment.sql, stmt.context, &variable_scope);
            findings.extend(classification.findings.into_iter().map(|mut finding| {
                for name in &assignment.substituted {
                    if !finding.template_variables.contains(name) {
                        finding.template_variables.push(name.clone());
                    }
                }
                finding
            }));
        }

        let consumed: HashSet<&str> = assignments.iter().map(|a| a.variable.as_str()).collect();
        let body_scope = stmt.scope.nested(procedure, stmt.scope.from_variable);
        let mut context = stmt.context.clone();

        for statement in split_statements_lenient(body) {
            let cleaned = strip_comments(&statement).to_uppercase();
            let peeled = BLOCK_PREFIX.replace(cleaned.trim(), "");
            if peeled.trim().is_empty() || starts_consumed_assignment(&peeled, &consumed) {
                continue;
            }
            let classification = self.classify_in(&peeled, &context, &body_scope);
            findings.extend(classification.findings);
            context = classification.context;
        }

        findings
    }
}
