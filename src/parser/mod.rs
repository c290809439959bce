//! SQL text handling: statement splitting, template placeholders, dynamic
//! SQL normalization and object names

pub mod dynamic_sql;
pub mod identifier_utils;
pub mod splitter;
pub mod template;

pub use dynamic_sql::{normalize_dynamic_sql, NormalizedSql, MAX_NORMALIZATION_PASSES};
pub use identifier_utils::parse_object_name;
pub use splitter::{split_statements, strip_comments, SplitError};
pub use template::{resolve_template_variables, ResolvedTemplate, TemplateVariables};
