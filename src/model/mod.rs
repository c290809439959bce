//! Classification result model

mod analysis;
mod context;
mod elements;
mod kinds;

pub use analysis::{BatchAnalysis, FileAnalysis};
pub use context::Context;
pub use elements::*;
pub use kinds::{ObjectType, OperationKind, UnknownOperationKind};
