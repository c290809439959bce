//! Template placeholder substitution
//!
//! Migration scripts are written once and promoted through environments, so
//! object names carry placeholders such as `{{ environment }}` or `{env}`
//! that are resolved against a variable set before the script is analyzed.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// `{{ name }}` or `{name}`, whitespace tolerant
static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*(\w+)\s*\}\}|\{\s*(\w+)\s*\}").expect("Invalid placeholder regex")
});

/// Case-insensitive mapping from placeholder name to substitution text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateVariables {
    values: HashMap<String, String>,
}

impl TemplateVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in process-wide defaults.
    pub fn defaults() -> Self {
        let mut vars = Self::new();
        vars.insert("environment", "PRO");
        vars
    }

    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.values
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Overlay `other` on top of `self`; entries in `other` win.
    pub fn merged_with(&self, other: &TemplateVariables) -> Self {
        let mut merged = self.clone();
        for (name, value) in &other.values {
            merged.values.insert(name.clone(), value.clone());
        }
        merged
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for TemplateVariables {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut vars = Self::new();
        for (name, value) in iter {
            vars.insert(name, value);
        }
        vars
    }
}

/// Result of resolving placeholders in a text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTemplate {
    pub text: String,
    /// Distinct placeholder names as written, in first-appearance order,
    /// resolved or not
    pub variables: Vec<String>,
}

/// Substitute `{var}` / `{{ var }}` placeholders.
///
/// Resolvable placeholders are replaced entirely by their value. Unresolved
/// ones are left untouched and reported with a warning.
pub fn resolve_template_variables(text: &str, variables: &TemplateVariables) -> ResolvedTemplate {
    let mut detected: Vec<String> = Vec::new();

    let resolved = PLACEHOLDER_RE.replace_all(text, |caps: &Captures| {
        let whole = caps.get(0).map(|m| m.as_str()).unwrap_or("");
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or("");

        if !detected.iter().any(|d| d == name) {
            detected.push(name.to_string());
        }

        match variables.get(name) {
            Some(value) => value.to_string(),
            None => {
                tracing::warn!(variable = name, "unresolved template variable");
                whole.to_string()
            }
        }
    });

    ResolvedTemplate {
        text: resolved.into_owned(),
        variables: detected,
    }
}
