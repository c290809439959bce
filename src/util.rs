//! Shared utility helpers.

/// Case-insensitive ends_with check without allocating.
#[inline]
pub fn ends_with_ci(haystack: &str, needle: &str) -> bool {
    haystack.len() >= needle.len()
        && haystack.as_bytes()[haystack.len() - needle.len()..]
            .eq_ignore_ascii_case(needle.as_bytes())
}

/// Undo SQL quote doubling inside a single-quoted literal body (`''` → `'`).
#[inline]
pub fn unescape_single_quotes(literal_body: &str) -> String {
    literal_body.replace("''", "'")
}
