//! SQL source file reading

use std::path::Path;

use encoding_rs::WINDOWS_1252;

use crate::error::GateError;

/// Read a SQL file as text, stripping a UTF-8 BOM.
pub fn read_sql_file(path: &Path) -> Result<String, GateError> {
    let content =
        read_file_with_encoding_fallback(path).map_err(|e| GateError::SqlFileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(match content.strip_prefix('\u{FEFF}') {
        Some(stripped) => stripped.to_string(),
        None => content,
    })
}

/// Read a file trying UTF-8 first, falling back to Windows-1252
fn read_file_with_encoding_fallback(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            // Scripts saved by Windows editors are often Windows-1252
            let bytes = e.into_bytes();
            let (decoded, _, had_errors) = WINDOWS_1252.decode(&bytes);
            if had_errors {
                Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "File contains invalid characters",
                ))
            } else {
                Ok(decoded.into_owned())
            }
        }
    }
}
