//! Script discovery and reading

mod discovery;
mod reader;

pub use discovery::{
    discover_sql_files, select_sql_files, DiscoveryOptions, DEFAULT_FILE_LIMIT,
    DEFAULT_SQL_PATTERN,
};
pub use reader::read_sql_file;
