//! sql-risk-gate: risk classification for database migration scripts
//!
//! This library reads Snowflake-flavoured SQL migration scripts, recognizes
//! the operation each statement performs, attaches a risk tier and decides
//! whether the batch can be promoted automatically or needs manual review.

pub mod analyzer;
pub mod classifier;
pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod project;
pub mod report;
pub mod risk;
mod util;

use std::path::PathBuf;

use anyhow::Result;

pub use analyzer::Analyzer;
pub use config::GateConfig;
pub use error::GateError;
pub use model::{BatchAnalysis, FileAnalysis, RiskTier, StatementResult};
pub use risk::{CatalogLineage, FixedLineage, LineageOracle, RiskPolicy, RiskRule};

/// Options for checking a set of migration scripts
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Files, or a single directory to search; empty means the current
    /// directory
    pub paths: Vec<PathBuf>,
    /// Optional TOML configuration file
    pub config_path: Option<PathBuf>,
    /// `NAME=VALUE` overrides for template variables
    pub variables: Vec<(String, String)>,
    /// Maximum number of files taken from a directory
    pub limit: Option<usize>,
    /// File name pattern used when searching a directory
    pub pattern: Option<String>,
    /// Additional exclude patterns, relative to the searched directory
    pub exclude: Vec<String>,
    /// Answer every lineage query with this value instead of the catalog
    pub assume_lineage: Option<bool>,
}

/// Resolve the script list and analyze it.
pub fn check_scripts(options: &CheckOptions) -> Result<BatchAnalysis> {
    // Step 1: Load configuration and apply command-line overrides
    let mut config = match &options.config_path {
        Some(path) => GateConfig::load(path)?,
        None => GateConfig::default(),
    };
    apply_overrides(&mut config, options)?;

    // Step 2: Resolve input files
    let files = resolve_inputs(&options.paths, &config)?;
    tracing::info!(files = files.len(), "resolved input files");
    if files.is_empty() {
        return Ok(BatchAnalysis::new());
    }

    // Step 3: Analyze
    let fixed;
    let oracle: &dyn LineageOracle = match options.assume_lineage {
        Some(answer) => {
            fixed = FixedLineage(answer);
            &fixed
        }
        None => &config.lineage,
    };
    let analyzer = Analyzer::new(&config.policy, oracle, &config.variables);
    Ok(analyzer.analyze_files(&files)?)
}

fn apply_overrides(config: &mut GateConfig, options: &CheckOptions) -> Result<()> {
    for (name, value) in &options.variables {
        config.variables.insert(name, value.clone());
    }
    if let Some(limit) = options.limit {
        config::validate_limit(limit)?;
        config.discovery.limit = limit;
    }
    if let Some(pattern) = &options.pattern {
        config.discovery.pattern = pattern.clone();
    }
    config.discovery.exclude.extend(options.exclude.iter().cloned());
    Ok(())
}

/// No path or a single directory → discovery; otherwise an explicit file
/// list filtered to existing `.sql` files.
fn resolve_inputs(paths: &[PathBuf], config: &GateConfig) -> Result<Vec<PathBuf>> {
    match paths {
        [] => Ok(project::discover_sql_files(
            std::path::Path::new("."),
            &config.discovery,
        )?),
        [single] if single.is_dir() => Ok(project::discover_sql_files(single, &config.discovery)?),
        _ => Ok(project::select_sql_files(paths)),
    }
}
