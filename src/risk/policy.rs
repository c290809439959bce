//! Risk policy table: operation kind → fixed tier or lineage-gated pair

use std::collections::HashMap;

use crate::error::GateError;
use crate::model::{ObjectReference, ObjectType, OperationKind, RiskTier};

use super::lineage::LineageOracle;

use RiskTier::{High, Low, Medium};

/// How the tier of one operation kind is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskRule {
    /// Same tier whatever the lineage says
    Fixed(RiskTier),
    /// First tier when downstream consumers exist, second otherwise
    Lineage {
        with_impact: RiskTier,
        without_impact: RiskTier,
    },
}

impl RiskRule {
    pub fn lineage(with_impact: RiskTier, without_impact: RiskTier) -> Self {
        RiskRule::Lineage {
            with_impact,
            without_impact,
        }
    }
}

/// Total mapping from every [`OperationKind`] to a [`RiskRule`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskPolicy {
    rules: HashMap<OperationKind, RiskRule>,
}

impl RiskPolicy {
    /// Build a policy from explicit rules, rejecting any that leave a kind
    /// uncovered.
    pub fn new(rules: HashMap<OperationKind, RiskRule>) -> Result<Self, GateError> {
        let policy = Self { rules };
        policy.validate()?;
        Ok(policy)
    }

    /// Built-in tiers.
    pub fn builtin() -> Self {
        Self {
            rules: default_rules(),
        }
    }

    /// Built-in tiers with `overrides` layered on top.
    pub fn with_overrides(overrides: &HashMap<OperationKind, RiskRule>) -> Result<Self, GateError> {
        let mut rules = default_rules();
        for (kind, rule) in overrides {
            rules.insert(*kind, *rule);
        }
        Self::new(rules)
    }

    /// Every kind the classifier can emit must have a rule.
    pub fn validate(&self) -> Result<(), GateError> {
        match OperationKind::all()
            .into_iter()
            .find(|kind| !self.rules.contains_key(kind))
        {
            Some(kind) => Err(GateError::MissingRiskPolicy { kind }),
            None => Ok(()),
        }
    }

    pub fn rule(&self, kind: OperationKind) -> Option<RiskRule> {
        self.rules.get(&kind).copied()
    }

    /// Pick the tier for one classified statement.
    ///
    /// Fixed rules ignore the lineage flag. For a lineage pair the oracle is
    /// asked exactly once when `needs_lineage_check` is set; an unchecked
    /// statement gets the higher-impact tier.
    pub fn resolve(
        &self,
        kind: OperationKind,
        needs_lineage_check: bool,
        object: Option<&ObjectReference>,
        oracle: &dyn LineageOracle,
    ) -> Result<RiskTier, GateError> {
        let rule = self
            .rule(kind)
            .ok_or(GateError::MissingRiskPolicy { kind })?;

        let tier = match rule {
            RiskRule::Fixed(tier) => tier,
            RiskRule::Lineage {
                with_impact,
                without_impact,
            } => {
                if needs_lineage_check && !oracle.has_downstream_consumers(object) {
                    without_impact
                } else {
                    with_impact
                }
            }
        };
        Ok(tier)
    }
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self::builtin()
    }
}

fn default_rules() -> HashMap<OperationKind, RiskRule> {
    use ObjectType::*;
    use OperationKind::*;

    let fixed = RiskRule::Fixed;
    let pair = RiskRule::lineage;

    let mut rules = HashMap::new();

    // Tables
    rules.insert(Create(Table), fixed(Low));
    rules.insert(Drop(Table), pair(High, Medium));
    rules.insert(CreateOrReplace(Table), pair(High, Medium));
    rules.insert(CreateOrAlter(Table), pair(Medium, Medium));
    rules.insert(Undrop(Table), fixed(Low));
    rules.insert(TruncateTable, pair(High, Medium));
    rules.insert(AlterTableNotColumns, pair(High, Medium));
    rules.insert(AlterTableAddColumn, fixed(Medium));
    rules.insert(AlterTableDropColumn, fixed(High));
    rules.insert(AlterTableModifyColumnType, pair(High, Medium));

    // Data changes
    rules.insert(InsertValues, pair(Medium, Low));
    rules.insert(DeleteValues, pair(High, Medium));
    rules.insert(MergeValues, pair(Medium, Medium));

    for container in [Database, Schema] {
        rules.insert(Create(container), fixed(Low));
        rules.insert(CreateOrReplace(container), fixed(High));
        rules.insert(CreateOrAlter(container), fixed(Medium));
        rules.insert(Alter(container), fixed(Medium));
        rules.insert(Drop(container), fixed(High));
        rules.insert(Undrop(container), fixed(Low));
    }

    rules.insert(Create(Warehouse), fixed(Low));
    rules.insert(Alter(Warehouse), fixed(High));
    rules.insert(CreateOrAlter(Warehouse), fixed(High));
    rules.insert(Drop(Warehouse), fixed(High));
    rules.insert(CreateOrReplace(Warehouse), fixed(High));
    rules.insert(Undrop(Warehouse), fixed(Low));

    rules.insert(Create(Share), fixed(Low));
    rules.insert(Alter(Share), fixed(Medium));
    rules.insert(Drop(Share), fixed(High));
    rules.insert(CreateOrReplace(Share), fixed(High));
    rules.insert(CreateOrAlter(Share), fixed(Medium));
    rules.insert(Undrop(Share), fixed(Low));

    rules.insert(Create(View), fixed(Low));
    rules.insert(CreateOrAlter(View), pair(Medium, Medium));
    rules.insert(Alter(View), pair(Medium, Medium));
    rules.insert(CreateOrReplace(View), pair(High, Medium));
    rules.insert(Drop(View), pair(High, High));
    rules.insert(Undrop(View), fixed(Low));

    rules.insert(Create(Tag), fixed(Low));
    rules.insert(Drop(Tag), fixed(High));
    rules.insert(CreateOrReplace(Tag), fixed(High));
    rules.insert(CreateOrAlter(Tag), fixed(Medium));
    rules.insert(Undrop(Tag), fixed(Low));
    rules.insert(Alter(Tag), fixed(High));

    for kind in [
        Create(AccessPolicy),
        CreateOrReplace(AccessPolicy),
        CreateOrAlter(AccessPolicy),
        Alter(AccessPolicy),
        Drop(AccessPolicy),
        Undrop(AccessPolicy),
    ] {
        rules.insert(kind, fixed(High));
    }

    rules.insert(Create(Task), fixed(Medium));
    rules.insert(CreateOrReplace(Task), fixed(High));
    rules.insert(CreateOrAlter(Task), fixed(Medium));
    rules.insert(Alter(Task), fixed(Medium));
    rules.insert(Drop(Task), fixed(High));
    rules.insert(Undrop(Task), fixed(Low));

    rules.insert(Create(ResourceMonitor), fixed(Low));
    rules.insert(CreateOrReplace(ResourceMonitor), fixed(High));
    rules.insert(CreateOrAlter(ResourceMonitor), fixed(Medium));
    rules.insert(Alter(ResourceMonitor), fixed(Medium));
    rules.insert(Drop(ResourceMonitor), fixed(High));
    rules.insert(Undrop(ResourceMonitor), fixed(Low));

    rules.insert(Create(Procedure), fixed(Low));
    rules.insert(CreateOrReplace(Procedure), pair(High, Medium));
    rules.insert(CreateOrAlter(Procedure), pair(Medium, Medium));
    rules.insert(Alter(Procedure), fixed(Medium));
    rules.insert(Drop(Procedure), pair(High, Medium));
    rules.insert(Undrop(Procedure), fixed(Low));

    rules.insert(GrantPrivilege, fixed(High));
    rules.insert(RevokePrivilege, fixed(High));
    rules.insert(UseDatabase, fixed(Low));
    rules.insert(UseSchema, fixed(Low));
    rules.insert(ExecuteImmediate, fixed(Medium));
    rules.insert(ExecuteTask, fixed(Medium));
    rules.insert(CallProcedure, fixed(Medium));

    rules
}
