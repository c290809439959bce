//! Session context (active database and schema)

/// The database/schema scope under which unqualified names are interpreted.
///
/// Context is a value: switching scope returns a new `Context`, so any
/// snapshot embedded in an earlier result can never change afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Context {
    pub database: Option<String>,
    pub schema: Option<String>,
}

impl Context {
    /// Empty context, as at the start of every file.
    pub fn new() -> Self {
        Self::default()
    }

    /// `USE DATABASE name`: schema is database-scoped, so it is cleared.
    pub fn with_database(&self, name: impl Into<String>) -> Self {
        Self {
            database: Some(name.into()),
            schema: None,
        }
    }

    /// `USE SCHEMA [database.]name`: a two-part name sets both parts, a
    /// one-part name keeps the current database.
    pub fn with_schema(&self, name: impl Into<String>, database: Option<String>) -> Self {
        Self {
            database: database.or_else(|| self.database.clone()),
            schema: Some(name.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.database.is_none() && self.schema.is_none()
    }
}
