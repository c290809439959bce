//! Configuration file handling
//!
//! ```toml
//! [variables]
//! environment = "DEV"
//!
//! [risk]
//! DROP_TABLE = ["HIGH", "MEDIUM"]   # with / without downstream consumers
//! CREATE_TABLE = "LOW"
//!
//! [lineage]
//! default = true
//! consumed = ["PRO.SALES.ORDERS"]
//!
//! [discovery]
//! limit = 10
//! pattern = "*.sql"
//! exclude = ["legacy/*"]
//! ```
//!
//! Every table is optional. Values are layered over built-in defaults and
//! validated once, before any file is analyzed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::GateError;
use crate::model::{OperationKind, RiskTier};
use crate::parser::template::TemplateVariables;
use crate::project::DiscoveryOptions;
use crate::risk::{CatalogLineage, RiskPolicy, RiskRule};

/// Raw contents of a configuration file
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub variables: HashMap<String, String>,
    pub risk: HashMap<String, RiskSetting>,
    pub lineage: LineageSection,
    pub discovery: DiscoverySection,
}

/// A `[risk]` value: one tier, or a `[with_impact, without_impact]` pair
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RiskSetting {
    Fixed(String),
    Pair(Vec<String>),
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LineageSection {
    pub default: Option<bool>,
    pub consumed: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DiscoverySection {
    pub limit: Option<usize>,
    pub pattern: Option<String>,
    pub exclude: Vec<String>,
}

/// Validated settings for one run
#[derive(Debug, Clone)]
pub struct GateConfig {
    pub variables: TemplateVariables,
    pub policy: RiskPolicy,
    pub lineage: CatalogLineage,
    pub discovery: DiscoveryOptions,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            variables: TemplateVariables::defaults(),
            policy: RiskPolicy::builtin(),
            lineage: CatalogLineage::default(),
            discovery: DiscoveryOptions::default(),
        }
    }
}

impl GateConfig {
    /// Read, parse and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self, GateError> {
        Self::from_file(&load_config_file(path)?)
    }

    /// Validate raw settings and layer them over the defaults.
    pub fn from_file(file: &ConfigFile) -> Result<Self, GateError> {
        let variables = TemplateVariables::defaults()
            .merged_with(&file.variables.iter().collect::<TemplateVariables>());

        let mut overrides = HashMap::new();
        for (label, setting) in &file.risk {
            let kind: OperationKind = label.parse().map_err(|e| GateError::InvalidConfig {
                message: format!("[risk] {}", e),
            })?;
            overrides.insert(kind, parse_rule(label, setting)?);
        }
        let policy = RiskPolicy::with_overrides(&overrides)?;

        let lineage = CatalogLineage::new(&file.lineage.consumed, file.lineage.default.unwrap_or(true));

        let defaults = DiscoveryOptions::default();
        let discovery = DiscoveryOptions {
            pattern: file
                .discovery
                .pattern
                .clone()
                .unwrap_or(defaults.pattern),
            exclude: file.discovery.exclude.clone(),
            limit: file.discovery.limit.unwrap_or(defaults.limit),
        };
        validate_limit(discovery.limit)?;

        Ok(Self {
            variables,
            policy,
            lineage,
            discovery,
        })
    }
}

/// Read and parse a configuration file without validating it.
pub fn load_config_file(path: &Path) -> Result<ConfigFile, GateError> {
    let content = std::fs::read_to_string(path).map_err(|e| GateError::ConfigReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_config(&content, path)
}

fn parse_config(content: &str, path: &Path) -> Result<ConfigFile, GateError> {
    toml::from_str(content).map_err(|e| GateError::ConfigParseError {
        path: PathBuf::from(path),
        source: e,
    })
}

fn parse_tier(label: &str, value: &str) -> Result<RiskTier, GateError> {
    RiskTier::from_label(value).ok_or_else(|| GateError::InvalidConfig {
        message: format!("[risk] {}: unknown risk tier '{}'", label, value),
    })
}

fn parse_rule(label: &str, setting: &RiskSetting) -> Result<RiskRule, GateError> {
    match setting {
        RiskSetting::Fixed(tier) => Ok(RiskRule::Fixed(parse_tier(label, tier)?)),
        RiskSetting::Pair(tiers) => match tiers.as_slice() {
            [with_impact, without_impact] => Ok(RiskRule::lineage(
                parse_tier(label, with_impact)?,
                parse_tier(label, without_impact)?,
            )),
            _ => Err(GateError::InvalidConfig {
                message: format!(
                    "[risk] {}: expected a tier or a [with_impact, without_impact] pair, got {} values",
                    label,
                    tiers.len()
                ),
            }),
        },
    }
}

/// The batch cap must allow at least one file.
pub fn validate_limit(limit: usize) -> Result<(), GateError> {
    if limit == 0 {
        return Err(GateError::InvalidConfig {
            message: "file limit must be at least 1".to_string(),
        });
    }
    Ok(())
}
