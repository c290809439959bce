//! Human-readable gate report

use std::fmt::Write;

use crate::model::{BatchAnalysis, Context, FileAnalysis, StatementResult};

/// Render the report for a batch.
///
/// Only statements that require review are listed unless `show_all` is set,
/// in which case LOW statements and approved files are listed too.
pub fn render_report(batch: &BatchAnalysis, show_all: bool) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== SQL Risk Gate Report ===");
    let _ = writeln!(out);

    for file in &batch.files {
        if !show_all && !file.requires_review() {
            continue;
        }
        write_file(&mut out, file, show_all);
    }

    let risky = batch.risky_files().count();
    let _ = writeln!(
        out,
        "Summary: {} file(s) analyzed, {} require review",
        batch.files.len(),
        risky
    );
    if batch.requires_review() {
        let _ = writeln!(out, "Verdict: REVIEW REQUIRED");
    } else {
        let _ = writeln!(out, "Verdict: APPROVED");
    }

    out
}

fn write_file(out: &mut String, file: &FileAnalysis, show_all: bool) {
    let status = if file.requires_review() {
        "REVIEW REQUIRED"
    } else {
        "APPROVED"
    };
    let _ = writeln!(out, "--- {} ({}) ---", file.path.display(), status);

    if !file.template_variables.is_empty() {
        let _ = writeln!(
            out,
            "Template variables: {}",
            file.template_variables.join(", ")
        );
    }

    let listed: Vec<&StatementResult> = if show_all {
        file.results.iter().collect()
    } else {
        file.risky_results().collect()
    };

    if listed.is_empty() {
        let _ = writeln!(out, "  (no classified statements)");
    }
    for result in listed {
        write_result(out, result);
    }
    let _ = writeln!(out);
}

fn write_result(out: &mut String, result: &StatementResult) {
    let _ = writeln!(out, "  [{}] {}", result.risk, result.kind);
    if let Some(object) = &result.object {
        let _ = writeln!(out, "    Object: {}", object);
    }
    if let Some(column) = &result.column {
        let _ = writeln!(out, "    Column: {}", column);
    }
    if let Some(reference) = &result.object_ref {
        let _ = writeln!(out, "    Qualification: {}", reference.qualification_level);
        if let Some(database) = &reference.database {
            let _ = writeln!(out, "    Database: {}", database);
        }
        if let Some(schema) = &reference.schema {
            let _ = writeln!(out, "    Schema: {}", schema);
        }
    }
    if let Some(procedure) = &result.inside_procedure {
        let _ = writeln!(out, "    Inside procedure: {}", procedure);
    }
    if result.from_variable {
        let _ = writeln!(out, "    From variable: yes");
    }
    if !result.template_variables.is_empty() {
        let _ = writeln!(
            out,
            "    Variables substituted: {}",
            result.template_variables.join(", ")
        );
    }
    if !result.context.is_empty() {
        let _ = writeln!(out, "    Context: {}", describe_context(&result.context));
    }
}

fn describe_context(context: &Context) -> String {
    format!(
        "database={}, schema={}",
        context.database.as_deref().unwrap_or("-"),
        context.schema.as_deref().unwrap_or("-")
    )
}
