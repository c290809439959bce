//! Statement classification
//!
//! A raw statement goes through comment stripping, dynamic SQL
//! normalization and upper-casing, then the dispatch table picks the handler
//! that turns it into zero or more [`Finding`]s. Procedure definitions and
//! `EXECUTE IMMEDIATE` literals recurse back into the classifier.

mod dispatch;
mod handlers;
pub mod keywords;
mod procedure;

pub use dispatch::{match_shape, StatementShape};
pub use procedure::MAX_PROCEDURE_DEPTH;

use crate::model::{Context, ObjectReference, OperationKind};
use crate::parser::dynamic_sql::{normalize_dynamic_sql, NormalizedSql};
use crate::parser::identifier_utils::parse_object_name;
use crate::parser::splitter::{split_statements_lenient, strip_comments};
use crate::parser::template::TemplateVariables;

/// One recognized operation, before a risk tier is attached
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub kind: OperationKind,
    pub object: Option<String>,
    pub column: Option<String>,
    pub needs_lineage_check: bool,
    pub object_ref: Option<ObjectReference>,
    pub inside_procedure: Option<String>,
    pub from_variable: bool,
    pub template_variables: Vec<String>,
    pub context: Context,
    pub sql: String,
}

impl Finding {
    pub fn with_column(mut self, column: Option<String>) -> Self {
        self.column = column;
        self
    }
}

/// Findings of one statement and the context in effect after it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    pub findings: Vec<Finding>,
    pub context: Context,
}

impl Classification {
    fn unchanged(context: &Context) -> Self {
        Self {
            findings: Vec::new(),
            context: context.clone(),
        }
    }

    fn single(finding: Option<Finding>, context: &Context) -> Self {
        Self {
            findings: finding.into_iter().collect(),
            context: context.clone(),
        }
    }
}

/// Position of a statement relative to enclosing procedure bodies
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Scope {
    pub procedure: Option<String>,
    pub from_variable: bool,
    pub depth: usize,
}

impl Scope {
    fn nested(&self, procedure: Option<String>, from_variable: bool) -> Scope {
        Scope {
            procedure,
            from_variable,
            depth: self.depth + 1,
        }
    }
}

/// A cleaned, upper-cased statement handed to the handlers
pub(crate) struct Statement<'s> {
    pub sql: &'s str,
    pub context: &'s Context,
    pub scope: &'s Scope,
    pub substituted: &'s [String],
}

impl Statement<'_> {
    pub fn finding(
        &self,
        kind: OperationKind,
        object: Option<String>,
        needs_lineage_check: bool,
    ) -> Finding {
        self.finding_in(kind, object, needs_lineage_check, self.context)
    }

    /// Like [`Statement::finding`] but snapshotting `context` instead of the
    /// statement's incoming context.
    pub fn finding_in(
        &self,
        kind: OperationKind,
        object: Option<String>,
        needs_lineage_check: bool,
        context: &Context,
    ) -> Finding {
        let object_ref = object
            .as_deref()
            .map(|name| parse_object_name(name, context));
        Finding {
            kind,
            object,
            column: None,
            needs_lineage_check,
            object_ref,
            inside_procedure: self.scope.procedure.clone(),
            from_variable: self.scope.from_variable,
            template_variables: self.substituted.to_vec(),
            context: context.clone(),
            sql: self.sql.to_string(),
        }
    }
}

/// Turns statements into findings.
///
/// Holds the template variables used to collapse dynamic SQL; otherwise
/// stateless, so one classifier can serve every file of a batch.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    variables: &'a TemplateVariables,
}

impl<'a> Classifier<'a> {
    pub fn new(variables: &'a TemplateVariables) -> Self {
        Self { variables }
    }

    /// Classify one top-level statement under `context`.
    pub fn classify(&self, statement: &str, context: &Context) -> Classification {
        self.classify_in(statement, context, &Scope::default())
    }

    /// Split `sql` and classify every statement, threading context.
    pub(crate) fn classify_all(&self, sql: &str, context: &Context, scope: &Scope) -> Classification {
        let mut findings = Vec::new();
        let mut current = context.clone();
        for statement in split_statements_lenient(sql) {
            let classification = self.classify_in(&statement, &current, scope);
            findings.extend(classification.findings);
            current = classification.context;
        }
        Classification {
            findings,
            context: current,
        }
    }

    pub(crate) fn classify_in(&self, statement: &str, context: &Context, scope: &Scope) -> Classification {
        let cleaned = strip_comments(statement);
        if cleaned.is_empty() {
            return Classification::unchanged(context);
        }

        // Procedure bodies normalize per statement and per assignment.
        let normalized = if procedure::is_procedure_definition(&cleaned.to_uppercase()) {
            NormalizedSql {
                text: cleaned,
                substituted: Vec::new(),
                passes: 0,
                converged: true,
            }
        } else {
            normalize_dynamic_sql(&cleaned, self.variables)
        };
        let upper = normalized.text.to_uppercase();
        let stmt = Statement {
            sql: upper.trim(),
            context,
            scope,
            substituted: &normalized.substituted,
        };

        let classification = self.dispatch(&stmt);
        for finding in &classification.findings {
            tracing::debug!(
                kind = %finding.kind,
                object = finding.object.as_deref().unwrap_or("-"),
                procedure = finding.inside_procedure.as_deref().unwrap_or("-"),
                "classified statement"
            );
        }
        classification
    }

    fn dispatch(&self, stmt: &Statement<'_>) -> Classification {
        let Some(shape) = match_shape(stmt.sql) else {
            return Classification::unchanged(stmt.context);
        };

        let finding = match shape {
            StatementShape::Use => return handlers::use_context(stmt),
            StatementShape::Create if procedure::is_procedure_definition(stmt.sql) => {
                return self.classify_procedure(stmt);
            }
            StatementShape::Execute => return self.classify_execute(stmt),
            StatementShape::Create => handlers::create(stmt),
            StatementShape::Alter => handlers::alter(stmt),
            StatementShape::Drop => handlers::drop(stmt),
            StatementShape::Undrop => handlers::undrop(stmt),
            StatementShape::Truncate => handlers::truncate(stmt),
            StatementShape::Insert => handlers::insert(stmt),
            StatementShape::Merge => handlers::merge(stmt),
            StatementShape::Delete => handlers::delete(stmt),
            StatementShape::Grant => handlers::grant(stmt),
            StatementShape::Revoke => handlers::revoke(stmt),
            StatementShape::Call => handlers::call(stmt),
        };
        Classification::single(finding, stmt.context)
    }

    /// `EXECUTE IMMEDIATE '<sql>'` classifies the literal first, then the
    /// EXECUTE itself.
    fn classify_execute(&self, stmt: &Statement<'_>) -> Classification {
        let mut findings = Vec::new();
        if let Some(literal) = handlers::immediate_literal(stmt.sql) {
            if stmt.scope.depth < MAX_PROCEDURE_DEPTH {
                let scope = stmt
                    .scope
                    .nested(stmt.scope.procedure.clone(), stmt.scope.from_variable);
                findings.extend(self.classify_all(&literal, stmt.context, &scope).findings);
            }
        }
        findings.extend(handlers::execute(stmt));
        Classification {
            findings,
            context: stmt.context.clone(),
        }
    }
}
