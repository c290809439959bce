//! Operation kinds and object types recognized by the classifier

use std::fmt;
use std::str::FromStr;

/// Object types a DDL statement can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectType {
    Table,
    View,
    Schema,
    Database,
    Task,
    Warehouse,
    Share,
    Tag,
    AccessPolicy,
    ResourceMonitor,
    Procedure,
}

impl ObjectType {
    pub const ALL: [ObjectType; 11] = [
        ObjectType::Table,
        ObjectType::View,
        ObjectType::Schema,
        ObjectType::Database,
        ObjectType::Task,
        ObjectType::Warehouse,
        ObjectType::Share,
        ObjectType::Tag,
        ObjectType::AccessPolicy,
        ObjectType::ResourceMonitor,
        ObjectType::Procedure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Table => "TABLE",
            ObjectType::View => "VIEW",
            ObjectType::Schema => "SCHEMA",
            ObjectType::Database => "DATABASE",
            ObjectType::Task => "TASK",
            ObjectType::Warehouse => "WAREHOUSE",
            ObjectType::Share => "SHARE",
            ObjectType::Tag => "TAG",
            ObjectType::AccessPolicy => "ACCESS_POLICY",
            ObjectType::ResourceMonitor => "RESOURCE_MONITOR",
            ObjectType::Procedure => "PROCEDURE",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The classified action + object type label of a statement.
///
/// Labels render in upper snake case (`DROP_TABLE`, `CREATE_OR_REPLACE_VIEW`,
/// `ALTER_TABLE_ADD_COLUMN`) and parse back from the same text, which is how
/// configuration files refer to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OperationKind {
    UseDatabase,
    UseSchema,
    Create(ObjectType),
    CreateOrReplace(ObjectType),
    CreateOrAlter(ObjectType),
    /// ALTER of any object type except TABLE, which has its own kinds
    Alter(ObjectType),
    AlterTableAddColumn,
    AlterTableDropColumn,
    AlterTableModifyColumnType,
    AlterTableNotColumns,
    Drop(ObjectType),
    Undrop(ObjectType),
    TruncateTable,
    InsertValues,
    MergeValues,
    DeleteValues,
    GrantPrivilege,
    RevokePrivilege,
    ExecuteImmediate,
    ExecuteTask,
    CallProcedure,
}

impl OperationKind {
    /// Every kind the classifier can emit.
    pub fn all() -> Vec<OperationKind> {
        let mut kinds = vec![OperationKind::UseDatabase, OperationKind::UseSchema];
        for object_type in ObjectType::ALL {
            kinds.push(OperationKind::Create(object_type));
            kinds.push(OperationKind::CreateOrReplace(object_type));
            kinds.push(OperationKind::CreateOrAlter(object_type));
            if object_type != ObjectType::Table {
                kinds.push(OperationKind::Alter(object_type));
            }
            kinds.push(OperationKind::Drop(object_type));
            kinds.push(OperationKind::Undrop(object_type));
        }
        kinds.extend([
            OperationKind::AlterTableAddColumn,
            OperationKind::AlterTableDropColumn,
            OperationKind::AlterTableModifyColumnType,
            OperationKind::AlterTableNotColumns,
            OperationKind::TruncateTable,
            OperationKind::InsertValues,
            OperationKind::MergeValues,
            OperationKind::DeleteValues,
            OperationKind::GrantPrivilege,
            OperationKind::RevokePrivilege,
            OperationKind::ExecuteImmediate,
            OperationKind::ExecuteTask,
            OperationKind::CallProcedure,
        ]);
        kinds
    }

    /// Upper snake case label, e.g. `CREATE_OR_REPLACE_TABLE`.
    pub fn label(&self) -> String {
        match self {
            OperationKind::UseDatabase => "USE_DATABASE".to_string(),
            OperationKind::UseSchema => "USE_SCHEMA".to_string(),
            OperationKind::Create(t) => format!("CREATE_{}", t),
            OperationKind::CreateOrReplace(t) => format!("CREATE_OR_REPLACE_{}", t),
            OperationKind::CreateOrAlter(t) => format!("CREATE_OR_ALTER_{}", t),
            OperationKind::Alter(t) => format!("ALTER_{}", t),
            OperationKind::AlterTableAddColumn => "ALTER_TABLE_ADD_COLUMN".to_string(),
            OperationKind::AlterTableDropColumn => "ALTER_TABLE_DROP_COLUMN".to_string(),
            OperationKind::AlterTableModifyColumnType => {
                "ALTER_TABLE_MODIFY_COLUMN_TYPE".to_string()
            }
            OperationKind::AlterTableNotColumns => "ALTER_TABLE_NOT_COLUMNS".to_string(),
            OperationKind::Drop(t) => format!("DROP_{}", t),
            OperationKind::Undrop(t) => format!("UNDROP_{}", t),
            OperationKind::TruncateTable => "TRUNCATE_TABLE".to_string(),
            OperationKind::InsertValues => "INSERT_VALUES".to_string(),
            OperationKind::MergeValues => "MERGE_VALUES".to_string(),
            OperationKind::DeleteValues => "DELETE_VALUES".to_string(),
            OperationKind::GrantPrivilege => "GRANT_PRIVILEGE".to_string(),
            OperationKind::RevokePrivilege => "REVOKE_PRIVILEGE".to_string(),
            OperationKind::ExecuteImmediate => "EXECUTE_IMMEDIATE".to_string(),
            OperationKind::ExecuteTask => "EXECUTE_TASK".to_string(),
            OperationKind::CallProcedure => "CALL_PROCEDURE".to_string(),
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Error returned when a label does not name any operation kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOperationKind(pub String);

impl fmt::Display for UnknownOperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown operation kind '{}'", self.0)
    }
}

impl std::error::Error for UnknownOperationKind {}

impl FromStr for OperationKind {
    type Err = UnknownOperationKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        OperationKind::all()
            .into_iter()
            .find(|kind| kind.label() == wanted)
            .ok_or_else(|| UnknownOperationKind(s.to_string()))
    }
}
