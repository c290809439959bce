//! File and batch level verdicts

use std::path::{Path, PathBuf};

use super::StatementResult;

/// Classified statements of one file, in source order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileAnalysis {
    /// Source file path (empty for in-memory analysis)
    pub path: PathBuf,
    pub results: Vec<StatementResult>,
    /// Template placeholders found in the file, in first-appearance order
    pub template_variables: Vec<String>,
}

impl FileAnalysis {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// True if any statement is MEDIUM or HIGH.
    pub fn requires_review(&self) -> bool {
        self.results.iter().any(StatementResult::requires_review)
    }

    /// Statements that block automatic promotion.
    pub fn risky_results(&self) -> impl Iterator<Item = &StatementResult> {
        self.results.iter().filter(|r| r.requires_review())
    }
}

/// Verdicts for a set of files, in analysis order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchAnalysis {
    pub files: Vec<FileAnalysis>,
}

impl BatchAnalysis {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, analysis: FileAnalysis) {
        self.files.push(analysis);
    }

    /// Logical OR over all files.
    pub fn requires_review(&self) -> bool {
        self.files.iter().any(FileAnalysis::requires_review)
    }

    pub fn risky_files(&self) -> impl Iterator<Item = &FileAnalysis> {
        self.files.iter().filter(|f| f.requires_review())
    }

    pub fn file(&self, path: &Path) -> Option<&FileAnalysis> {
        self.files.iter().find(|f| f.path == path)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
