//! File and batch analysis: template resolution, splitting, classification
//! and risk resolution wired together.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::classifier::{Classifier, Finding};
use crate::error::GateError;
use crate::model::{BatchAnalysis, Context, FileAnalysis, StatementResult};
use crate::parser::splitter::split_statements;
use crate::parser::template::{resolve_template_variables, TemplateVariables};
use crate::project::read_sql_file;
use crate::risk::{LineageOracle, RiskPolicy};

/// Minimum number of files before analysis goes parallel.
pub const PARALLEL_THRESHOLD: usize = 8;

/// Read-only collaborators shared by every file of a batch
#[derive(Clone, Copy)]
pub struct Analyzer<'a> {
    policy: &'a RiskPolicy,
    oracle: &'a dyn LineageOracle,
    variables: &'a TemplateVariables,
}

impl<'a> Analyzer<'a> {
    pub fn new(
        policy: &'a RiskPolicy,
        oracle: &'a dyn LineageOracle,
        variables: &'a TemplateVariables,
    ) -> Self {
        Self {
            policy,
            oracle,
            variables,
        }
    }

    /// Analyze SQL source text. `path` only labels the result and errors.
    ///
    /// Context starts empty and is threaded through the file's statements
    /// in order.
    pub fn analyze_sql(&self, sql: &str, path: &Path) -> Result<FileAnalysis, GateError> {
        let resolved = resolve_template_variables(sql, self.variables);
        let statements =
            split_statements(&resolved.text).map_err(|e| GateError::SqlSplitError {
                path: path.to_path_buf(),
                message: e.message,
            })?;

        let classifier = Classifier::new(self.variables);
        let mut analysis = FileAnalysis::new(path);
        analysis.template_variables = resolved.variables;

        let mut context = Context::new();
        for statement in &statements {
            let classification = classifier.classify(statement, &context);
            for finding in classification.findings {
                analysis.results.push(self.resolve(finding)?);
            }
            context = classification.context;
        }

        tracing::debug!(
            path = %path.display(),
            statements = statements.len(),
            results = analysis.results.len(),
            "analyzed file"
        );
        Ok(analysis)
    }

    /// Read and analyze one file.
    pub fn analyze_file(&self, path: &Path) -> Result<FileAnalysis, GateError> {
        let content = read_sql_file(path)?;
        self.analyze_sql(&content, path)
    }

    /// Analyze files independently, using parallel processing for larger
    /// batches. Results keep input order; the first failure in input order
    /// aborts the batch.
    pub fn analyze_files(&self, files: &[PathBuf]) -> Result<BatchAnalysis, GateError> {
        let mut batch = BatchAnalysis::new();

        if files.len() >= PARALLEL_THRESHOLD {
            let results: Vec<Result<FileAnalysis, GateError>> =
                files.par_iter().map(|file| self.analyze_file(file)).collect();

            for result in results {
                batch.add_file(result?);
            }
        } else {
            for file in files {
                batch.add_file(self.analyze_file(file)?);
            }
        }

        tracing::info!(
            files = batch.files.len(),
            risky = batch.risky_files().count(),
            "batch analyzed"
        );
        Ok(batch)
    }

    fn resolve(&self, finding: Finding) -> Result<StatementResult, GateError> {
        let risk = self.policy.resolve(
            finding.kind,
            finding.needs_lineage_check,
            finding.object_ref.as_ref(),
            self.oracle,
        )?;

        Ok(StatementResult {
            kind: finding.kind,
            object: finding.object,
            column: finding.column,
            risk,
            needs_lineage_check: finding.needs_lineage_check,
            object_ref: finding.object_ref,
            inside_procedure: finding.inside_procedure,
            from_variable: finding.from_variable,
            template_variables: finding.template_variables,
            context: finding.context,
            sql: finding.sql,
        })
    }
}
