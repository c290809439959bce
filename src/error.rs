//! Error types for sql-risk-gate

use std::path::PathBuf;
use thiserror::Error;

use crate::model::OperationKind;

/// Errors that can occur while analyzing migration scripts
#[derive(Error, Debug)]
pub enum GateError {
    #[error("Failed to read SQL file: {path}")]
    SqlFileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to split SQL file {path} into statements: {message}")]
    SqlSplitError { path: PathBuf, message: String },

    #[error("Failed to read config file: {path}")]
    ConfigReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {path}")]
    ConfigParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("No risk policy entry for operation {kind}")]
    MissingRiskPolicy { kind: OperationKind },

    #[error("Invalid file pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}
