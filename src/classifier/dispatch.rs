//! Leading-keyword dispatch table

use once_cell::sync::Lazy;
use regex::Regex;

/// Statement family, decided by the statement's leading keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementShape {
    Use,
    Create,
    Alter,
    Drop,
    Undrop,
    Truncate,
    Insert,
    Merge,
    Delete,
    Grant,
    Revoke,
    Execute,
    Call,
}

/// Tested in order; the first matching entry owns the statement.
static DISPATCH_TABLE: Lazy<Vec<(StatementShape, Regex)>> = Lazy::new(|| {
    [
        (StatementShape::Use, r"^USE\b"),
        (StatementShape::Create, r"^CREATE\b"),
        (StatementShape::Alter, r"^ALTER\b"),
        (StatementShape::Drop, r"^DROP\b"),
        (StatementShape::Undrop, r"^UNDROP\b"),
        (StatementShape::Truncate, r"^TRUNCATE\s+TABLE\b"),
        (StatementShape::Insert, r"^INSERT\s+(?:OVERWRITE\s+)?INTO\b"),
        (StatementShape::Merge, r"^MERGE\s+INTO\b"),
        (StatementShape::Delete, r"^DELETE\s+FROM\b"),
        (StatementShape::Grant, r"^GRANT\b"),
        (StatementShape::Revoke, r"^REVOKE\b"),
        (StatementShape::Execute, r"^EXECUTE\b"),
        (StatementShape::Call, r"^CALL\b"),
    ]
    .into_iter()
    .map(|(shape, pattern)| (shape, Regex::new(pattern).expect("Invalid dispatch regex")))
    .collect()
});

/// Shape of an upper-cased statement, or `None` for statements the gate
/// does not classify (SELECT, SHOW, COMMENT, …).
pub fn match_shape(statement: &str) -> Option<StatementShape> {
    let statement = statement.trim_start();
    DISPATCH_TABLE
        .iter()
        .find(|(_, re)| re.is_match(statement))
        .map(|(shape, _)| *shape)
}
