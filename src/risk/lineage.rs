//! Downstream-consumer lookups used to pick between lineage-gated tiers

use std::collections::HashSet;

use crate::model::ObjectReference;

/// Answers whether anything downstream reads from an object.
///
/// Queried at most once per lineage-checked statement. Implementations must
/// be deterministic and shareable across analysis threads.
pub trait LineageOracle: Sync {
    fn has_downstream_consumers(&self, object: Option<&ObjectReference>) -> bool;
}

/// Always gives the same answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedLineage(pub bool);

impl LineageOracle for FixedLineage {
    fn has_downstream_consumers(&self, _object: Option<&ObjectReference>) -> bool {
        self.0
    }
}

/// Lookup against a known set of consumed objects.
///
/// Names are qualified with the reference's context snapshot before the
/// lookup and compared case-insensitively. Objects that are not in the set
/// (or cannot be named at all) get `default`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogLineage {
    consumed: HashSet<String>,
    default: bool,
}

impl CatalogLineage {
    pub fn new<I, S>(consumed: I, default: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            consumed: consumed
                .into_iter()
                .map(|name| name.as_ref().trim().to_ascii_uppercase())
                .collect(),
            default,
        }
    }

    pub fn len(&self) -> usize {
        self.consumed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumed.is_empty()
    }
}

impl Default for CatalogLineage {
    /// No known consumers; unknown objects are assumed to have some.
    fn default() -> Self {
        Self::new(Vec::<String>::new(), true)
    }
}

impl LineageOracle for CatalogLineage {
    fn has_downstream_consumers(&self, object: Option<&ObjectReference>) -> bool {
        let Some(name) = object.and_then(ObjectReference::qualified_name) else {
            return self.default;
        };
        if self.consumed.contains(&name.to_ascii_uppercase()) {
            return true;
        }
        self.default
    }
}
