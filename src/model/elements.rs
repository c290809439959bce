//! Classified statement types

use std::fmt;

use super::{Context, OperationKind};

/// Risk tier attached to a classified statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "LOW",
            RiskTier::Medium => "MEDIUM",
            RiskTier::High => "HIGH",
        }
    }

    /// MEDIUM and HIGH statements block automatic promotion.
    pub fn requires_review(&self) -> bool {
        matches!(self, RiskTier::Medium | RiskTier::High)
    }

    /// Parse a tier label (case-insensitive)
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "LOW" => Some(RiskTier::Low),
            "MEDIUM" => Some(RiskTier::Medium),
            "HIGH" => Some(RiskTier::High),
            _ => None,
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How much of an object's container path is explicit in its name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QualificationLevel {
    /// `object`
    None,
    /// `schema.object`
    Partial,
    /// `database.schema.object`
    Full,
}

impl QualificationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualificationLevel::None => "NONE",
            QualificationLevel::Partial => "PARTIAL",
            QualificationLevel::Full => "FULL",
        }
    }
}

impl fmt::Display for QualificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed object name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectReference {
    /// Name as written in the statement
    pub raw: String,
    pub database: Option<String>,
    pub schema: Option<String>,
    pub object: Option<String>,
    pub qualification_level: QualificationLevel,
    /// Active context when the reference was recognized
    pub context: Context,
}

impl ObjectReference {
    pub fn is_qualified(&self) -> bool {
        self.qualification_level != QualificationLevel::None
    }

    /// Database in effect for this reference: explicit part first, then context.
    pub fn effective_database(&self) -> Option<&str> {
        self.database
            .as_deref()
            .or(self.context.database.as_deref())
    }

    /// Schema in effect for this reference: explicit part first, then context.
    pub fn effective_schema(&self) -> Option<&str> {
        self.schema.as_deref().or(self.context.schema.as_deref())
    }

    /// `database.schema.object` with whatever parts are known.
    pub fn qualified_name(&self) -> Option<String> {
        let object = self.object.as_deref()?;
        let parts: Vec<&str> = [self.effective_database(), self.effective_schema()]
            .into_iter()
            .flatten()
            .chain(std::iter::once(object))
            .collect();
        Some(parts.join("."))
    }
}

/// One classified statement
#[derive(Debug, Clone, PartialEq)]
pub struct StatementResult {
    pub kind: OperationKind,
    /// Target object name as written (upper-cased)
    pub object: Option<String>,
    /// Target column for ALTER TABLE column sub-clauses
    pub column: Option<String>,
    pub risk: RiskTier,
    /// Whether the risk was chosen by consulting lineage
    pub needs_lineage_check: bool,
    pub object_ref: Option<ObjectReference>,
    /// Name of the enclosing procedure for statements found in a body
    pub inside_procedure: Option<String>,
    /// Statement came from SQL text assigned to a procedure variable
    pub from_variable: bool,
    /// Variables substituted while normalizing dynamic SQL
    pub template_variables: Vec<String>,
    /// Context active when the statement was classified
    pub context: Context,
    /// Cleaned statement text
    pub sql: String,
}

impl StatementResult {
    pub fn requires_review(&self) -> bool {
        self.risk.requires_review()
    }
}
