//! Common test utilities for sql-risk-gate tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

use sql_risk_gate::{check_scripts, BatchAnalysis, CheckOptions};

/// Test context with temporary directory for isolated test execution
pub struct TestContext {
    /// Kept to prevent temp directory cleanup until TestContext is dropped
    _temp_dir: TempDir,
    pub root: PathBuf,
}

impl TestContext {
    /// Create an empty scripts directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().join("scripts");
        fs::create_dir_all(&root).expect("Failed to create scripts directory");
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    /// Create a new test context by copying a fixture to a temp directory
    pub fn with_fixture(fixture_name: &str) -> Self {
        let ctx = Self::new();
        copy_dir_recursive(&fixture_path(fixture_name), &ctx.root)
            .expect("Failed to copy fixture");
        ctx
    }

    /// Write a script relative to the scripts directory and return its path
    pub fn write_sql(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&path, content).expect("Failed to write script");
        path
    }

    /// Check the whole scripts directory with default settings
    pub fn check(&self) -> anyhow::Result<BatchAnalysis> {
        self.check_with(CheckOptions::default())
    }

    /// Check with custom options; an empty path list means the scripts directory
    pub fn check_with(&self, mut options: CheckOptions) -> anyhow::Result<BatchAnalysis> {
        if options.paths.is_empty() {
            options.paths = vec![self.root.clone()];
        }
        check_scripts(&options)
    }

    /// Run the compiled binary from the scripts directory
    pub fn run_cli(&self, args: &[&str]) -> CliResult {
        let output = Command::new(env!("CARGO_BIN_EXE_sql-risk-gate"))
            .args(args)
            .current_dir(&self.root)
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to run sql-risk-gate");
        CliResult::from(output)
    }
}

/// Captured output of one CLI run
pub struct CliResult {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CliResult {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<Output> for CliResult {
    fn from(output: Output) -> Self {
        Self {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Path to a fixture directory under tests/fixtures
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Recursively copy a directory
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), target)?;
        }
    }
    Ok(())
}

/// Labels of every result in a batch, in order
pub fn kind_labels(batch: &BatchAnalysis) -> Vec<String> {
    batch
        .files
        .iter()
        .flat_map(|f| f.results.iter().map(|r| r.kind.label()))
        .collect()
}
