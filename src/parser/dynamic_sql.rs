//! Dynamic SQL normalization
//!
//! Procedures frequently build statements by concatenating literals with
//! variables (`'CREATE TABLE ' || :db || '.RAW.T1'`). Classification works on
//! literal text, so the concatenation idioms are collapsed first, using the
//! template variable values where known and a `VAR_<NAME>` stand-in otherwise.
//!
//! Each pass rewrites the first occurrence of the first shape that matches,
//! in this order:
//!
//! 1. `'a' || ident || 'b'`  → `'a<v>b'`
//! 2. `'a' || 'b'`           → `'ab'`
//! 3. `'a' || ident`         → `'a<v>'`
//! 4. `ident || 'b'`         → `'<v>b'`
//! 5. `tok. || ident`        → `tok.<v>`
//! 6. `ident || .tok`        → `<v>.tok`

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::template::TemplateVariables;

/// Upper bound on rewrite passes per statement.
pub const MAX_NORMALIZATION_PASSES: usize = 30;

const LIT: &str = r"'((?:[^']|'')*)'";
const IDENT: &str = r":?([A-Za-z_][A-Za-z0-9_$]*)";
const CONCAT: &str = r"\s*\|\|\s*";
const SEGMENT: &str = r"([A-Za-z0-9_$]+)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    LiteralIdentLiteral,
    LiteralLiteral,
    LiteralIdent,
    IdentLiteral,
    SegmentIdent,
    IdentSegment,
}

static SHAPES: Lazy<Vec<(Shape, Regex)>> = Lazy::new(|| {
    let build = |pattern: String| Regex::new(&pattern).expect("Invalid concatenation regex");
    vec![
        (
            Shape::LiteralIdentLiteral,
            build(format!("{LIT}{CONCAT}{IDENT}{CONCAT}{LIT}")),
        ),
        (Shape::LiteralLiteral, build(format!("{LIT}{CONCAT}{LIT}"))),
        (Shape::LiteralIdent, build(format!("{LIT}{CONCAT}{IDENT}"))),
        (Shape::IdentLiteral, build(format!("{IDENT}{CONCAT}{LIT}"))),
        (
            Shape::SegmentIdent,
            build(format!(r"{SEGMENT}\.{CONCAT}{IDENT}")),
        ),
        (
            Shape::IdentSegment,
            build(format!(r"{IDENT}{CONCAT}\.{SEGMENT}")),
        ),
    ]
});

/// Output of [`normalize_dynamic_sql`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSql {
    pub text: String,
    /// Identifiers replaced with a known value, in first-substitution order
    pub substituted: Vec<String>,
    /// Rewrite passes performed
    pub passes: usize,
    /// False when the pass cap stopped a still-rewritable text
    pub converged: bool,
}

/// Collapse string-concatenation idioms into literal text.
pub fn normalize_dynamic_sql(sql: &str, variables: &TemplateVariables) -> NormalizedSql {
    let mut text = sql.to_string();
    let mut substituted = Vec::new();
    let mut passes = 0;

    while passes < MAX_NORMALIZATION_PASSES {
        match rewrite_once(&text, variables, &mut substituted) {
            Some(next) => {
                text = next;
                passes += 1;
            }
            None => {
                return NormalizedSql {
                    text,
                    substituted,
                    passes,
                    converged: true,
                };
            }
        }
    }

    let converged = find_candidate(&text).is_none();
    if !converged {
        tracing::warn!(
            passes = MAX_NORMALIZATION_PASSES,
            "dynamic SQL normalization stopped before converging"
        );
    }

    NormalizedSql {
        text,
        substituted,
        passes,
        converged,
    }
}

/// First rewritable match: the earliest accepted occurrence of the first
/// shape that has one.
fn find_candidate(text: &str) -> Option<(Shape, Captures<'_>)> {
    SHAPES.iter().find_map(|(shape, re)| {
        re.captures_iter(text)
            .find(|caps| accepts(*shape, text, caps))
            .map(|caps| (*shape, caps))
    })
}

/// Reject identifiers that are really function calls (`UPPER(x)`) or
/// column references (`T.COL`).
fn accepts(shape: Shape, text: &str, caps: &Captures<'_>) -> bool {
    let Some(whole) = caps.get(0) else {
        return false;
    };
    let next_char = text[whole.end()..].trim_start().chars().next();
    let prev_char = text[..whole.start()].chars().next_back();

    match shape {
        Shape::LiteralIdent | Shape::SegmentIdent => next_char != Some('('),
        Shape::IdentLiteral | Shape::IdentSegment => {
            !matches!(prev_char, Some(c) if c == '.' || c.is_ascii_alphanumeric() || c == '_')
        }
        Shape::LiteralIdentLiteral | Shape::LiteralLiteral => true,
    }
}

fn rewrite_once(
    text: &str,
    variables: &TemplateVariables,
    substituted: &mut Vec<String>,
) -> Option<String> {
    let (shape, caps) = find_candidate(text)?;
    let whole = caps.get(0)?;
    let group = |i: usize| caps.get(i).map(|m| m.as_str()).unwrap_or("");

    let mut value_of = |name: &str| match variables.get(name) {
        Some(value) => {
            if !substituted.iter().any(|s| s.eq_ignore_ascii_case(name)) {
                substituted.push(name.to_string());
            }
            value.to_string()
        }
        None => format!("VAR_{}", name.to_ascii_uppercase()),
    };

    let replacement = match shape {
        Shape::LiteralIdentLiteral => {
            format!("'{}{}{}'", group(1), value_of(group(2)), group(3))
        }
        Shape::LiteralLiteral => format!("'{}{}'", group(1), group(2)),
        Shape::LiteralIdent => format!("'{}{}'", group(1), value_of(group(2))),
        Shape::IdentLiteral => format!("'{}{}'", value_of(group(1)), group(2)),
        Shape::SegmentIdent => format!("{}.{}", group(1), value_of(group(2))),
        Shape::IdentSegment => format!("{}.{}", value_of(group(1)), group(2)),
    };

    let mut next = String::with_capacity(text.len());
    next.push_str(&text[..whole.start()]);
    next.push_str(&replacement);
    next.push_str(&text[whole.end()..]);
    Some(next)
}
