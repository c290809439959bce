//! Locating the SQL scripts of a batch

use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};
use walkdir::WalkDir;

use crate::error::GateError;
use crate::util::ends_with_ci;

/// Maximum number of files taken from a directory walk.
pub const DEFAULT_FILE_LIMIT: usize = 10;

/// File name pattern for SQL scripts.
pub const DEFAULT_SQL_PATTERN: &str = "*.sql";

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// How a directory is turned into a file list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// Glob matched against file names
    pub pattern: String,
    /// Globs matched against paths relative to the root
    pub exclude: Vec<String>,
    pub limit: usize,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_SQL_PATTERN.to_string(),
            exclude: Vec::new(),
            limit: DEFAULT_FILE_LIMIT,
        }
    }
}

fn compile(pattern: &str) -> Result<Pattern, GateError> {
    Pattern::new(pattern).map_err(|e| GateError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.msg.to_string(),
    })
}

fn is_hidden(relative: &Path) -> bool {
    relative.components().any(|c| match c {
        Component::Normal(part) => part.to_string_lossy().starts_with('.'),
        _ => false,
    })
}

/// Walk `root` in file-name order and collect up to `limit` matching files.
///
/// Anything under a dot-prefixed directory (or a dot-prefixed file) is
/// skipped, as are paths matching an exclude pattern.
pub fn discover_sql_files(root: &Path, options: &DiscoveryOptions) -> Result<Vec<PathBuf>, GateError> {
    let pattern = compile(&options.pattern)?;
    let excludes = options
        .exclude
        .iter()
        .map(|p| compile(p))
        .collect::<Result<Vec<_>, _>>()?;

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_name().to_string_lossy().starts_with('.')
        });

    for entry in walker.filter_map(|e| e.ok()) {
        if files.len() >= options.limit {
            break;
        }
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        if is_hidden(relative) {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if !pattern.matches_with(&name, MATCH_OPTIONS) {
            continue;
        }
        if excludes
            .iter()
            .any(|p| p.matches_path_with(relative, MATCH_OPTIONS))
        {
            tracing::debug!(path = %relative.display(), "excluded by pattern");
            continue;
        }

        files.push(path.to_path_buf());
    }

    tracing::info!(root = %root.display(), files = files.len(), "discovered SQL files");
    Ok(files)
}

/// Keep explicitly named paths that exist and carry the `.sql` extension.
pub fn select_sql_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    paths
        .iter()
        .filter(|path| {
            let keep = path.is_file() && ends_with_ci(&path.to_string_lossy(), ".sql");
            if !keep {
                tracing::warn!(path = %path.display(), "skipping path that is not an existing .sql file");
            }
            keep
        })
        .cloned()
        .collect()
}
