//! Identifier handling: quote stripping and object name decomposition.
//!
//! # Examples
//!
//! ```ignore
//! use crate::parser::identifier_utils::*;
//!
//! assert_eq!(normalize_identifier("\"MyTable\""), "MyTable");
//!
//! let reference = parse_object_name("DB.S.T", &Context::new());
//! assert_eq!(reference.qualification_level, QualificationLevel::Full);
//! ```

use crate::model::{Context, ObjectReference, QualificationLevel};

/// Strips surrounding whitespace and double quotes from one identifier part.
///
/// ```ignore
/// assert_eq!(normalize_identifier("\"MyColumn\""), "MyColumn");
/// assert_eq!(normalize_identifier("  SALES  "), "SALES");
/// ```
pub fn normalize_identifier(ident: &str) -> String {
    ident.trim().trim_matches('"').to_string()
}

/// Removes a single layer of matching surrounding quotes (`"…"` or `'…'`).
pub fn strip_outer_quotes(name: &str) -> &str {
    let trimmed = name.trim();
    for quote in ['"', '\''] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            let inner = &trimmed[1..trimmed.len() - 1];
            // `"DB"."T"` is two quoted parts, not one quoted name
            if quote == '"' && inner.contains('"') {
                return trimmed;
            }
            return inner;
        }
    }
    trimmed
}

/// Splits a dotted name on dots outside double-quoted parts.
///
/// ```ignore
/// assert_eq!(split_name_parts("\"MY.DB\".S.T"), vec!["MY.DB", "S", "T"]);
/// ```
pub fn split_name_parts(name: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in name.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            '.' if !in_quotes => {
                parts.push(normalize_identifier(&current));
                current.clear();
            }
            _ => current.push(c),
        }
    }
    parts.push(normalize_identifier(&current));
    parts
}

/// Decompose a raw object name into database/schema/object parts.
///
/// The qualification level follows the number of separating dots:
/// 0 → NONE, 1 → PARTIAL, 2 or more → FULL. With more than two dots the last
/// part is the object, the one before it the schema, and everything in front
/// is kept together as the database.
///
/// Never fails: empty input yields a reference with every part unset.
pub fn parse_object_name(raw: &str, context: &Context) -> ObjectReference {
    let stripped = strip_outer_quotes(raw);
    if stripped.is_empty() {
        return ObjectReference {
            raw: raw.to_string(),
            database: None,
            schema: None,
            object: None,
            qualification_level: QualificationLevel::None,
            context: context.clone(),
        };
    }

    let mut parts = split_name_parts(stripped);
    let non_empty = |s: String| if s.is_empty() { None } else { Some(s) };

    let (database, schema, object, level) = match parts.len() {
        1 => (None, None, parts.pop(), QualificationLevel::None),
        2 => {
            let object = parts.pop();
            let schema = parts.pop();
            (None, schema, object, QualificationLevel::Partial)
        }
        _ => {
            let object = parts.pop();
            let schema = parts.pop();
            let database = Some(parts.join("."));
            (database, schema, object, QualificationLevel::Full)
        }
    };

    ObjectReference {
        raw: raw.to_string(),
        database: database.and_then(non_empty),
        schema: schema.and_then(non_empty),
        object: object.and_then(non_empty),
        qualification_level: level,
        context: context.clone(),
    }
}
