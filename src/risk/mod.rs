//! Risk tiers for classified statements

pub mod lineage;
pub mod policy;

pub use lineage::{CatalogLineage, FixedLineage, LineageOracle};
pub use policy::{RiskPolicy, RiskRule};
