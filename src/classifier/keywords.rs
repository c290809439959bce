//! Keyword tables and name-extraction patterns shared by the handlers
//!
//! All patterns run against cleaned, upper-cased statement text.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::ObjectType;

/// Dotted object name; each part is a bare word or a double-quoted segment.
pub const NAME: &str = r#"(?:"[^"]*"|[A-Z0-9_$]+)(?:\.(?:"[^"]*"|[A-Z0-9_$]+))*"#;

/// Single column name.
pub const COLUMN: &str = r#"(?:"[^"]*"|[A-Z0-9_$]+)"#;

/// Object-type resolution order used by CREATE, ALTER, DROP and UNDROP.
///
/// Each keyword is matched as a whole word anywhere in the statement and the
/// first one present wins. TASK sits ahead of WAREHOUSE because a task
/// definition names the warehouse it runs on.
pub const OBJECT_TYPE_PRECEDENCE: [ObjectType; 11] = [
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

/// Source-text spelling(s) of an object-type keyword.
fn keyword_pattern(object_type: ObjectType) -> &'static str {
    match object_type {
        ObjectType::Table => r"\bTABLE\b",
        ObjectType::View => r"\bVIEW\b",
        ObjectType::Schema => r"\bSCHEMA\b",
        ObjectType::Database => r"\bDATABASE\b",
        ObjectType::Task => r"\bTASK\b",
        ObjectType::Warehouse => r"\bWAREHOUSE\b",
        ObjectType::Share => r"\bSHARE\b",
        ObjectType::Tag => r"\bTAG\b",
        ObjectType::AccessPolicy => {
            r"\b(?:ROW\s+ACCESS\s+POLICY|ACCESS\s+POLICY|ACCESS_POLICY)\b"
        }
        ObjectType::ResourceMonitor => r"\bRESOURCE\s+MONITOR\b",
        ObjectType::Procedure => r"\bPROCEDURE\b",
    }
}

static OBJECT_TYPE_KEYWORDS: Lazy<Vec<(ObjectType, Regex)>> = Lazy::new(|| {
    OBJECT_TYPE_PRECEDENCE
        .iter()
        .map(|t| {
            (
                *t,
                Regex::new(keyword_pattern(*t)).expect("Invalid object type regex"),
            )
        })
        .collect()
});

static OBJECT_NAME_PATTERNS: Lazy<HashMap<ObjectType, Regex>> = Lazy::new(|| {
    OBJECT_TYPE_PRECEDENCE
        .iter()
        .map(|t| {
            let pattern = format!(
                r"{}\s+(?:IF\s+(?:NOT\s+)?EXISTS\s+)?({})",
                keyword_pattern(*t),
                NAME
            );
            (*t, Regex::new(&pattern).expect("Invalid object name regex"))
        })
        .collect()
});

/// First object type, in precedence order, whose keyword appears in the
/// statement.
pub fn resolve_object_type(statement: &str) -> Option<ObjectType> {
    OBJECT_TYPE_KEYWORDS
        .iter()
        .find(|(_, re)| re.is_match(statement))
        .map(|(t, _)| *t)
}

/// Name following the object-type keyword (after an optional
/// `IF [NOT] EXISTS`).
pub fn object_name(statement: &str, object_type: ObjectType) -> Option<String> {
    OBJECT_NAME_PATTERNS
        .get(&object_type)
        .and_then(|re| capture(re, statement, 1))
}

/// Text of capture group `group`, if the pattern matches.
pub fn capture(re: &Regex, text: &str, group: usize) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(group))
        .map(|m| m.as_str().to_string())
}
