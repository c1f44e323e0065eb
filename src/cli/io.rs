//! JSON I/O handling for CLI
//!
//! - Input: one JSON query description, from a file or stdin
//! - Output: pretty-printed JSON on stdout
//! - UTF-8 only

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Read a JSON query description from `path`, or stdin when absent
pub fn read_description(path: Option<&Path>) -> CliResult<Value> {
    let content = match path {
        Some(path) => fs::read_to_string(path).map_err(|e| {
            CliError::io_error(format!("Failed to read {}: {}", path.display(), e))
        })?,
        None => {
            let mut buffer = String::new();
            io::stdin().lock().read_to_string(&mut buffer)?;
            buffer
        }
    };

    parse_description(&content)
}

/// Parse a query description; it must be a single JSON object
pub fn parse_description(content: &str) -> CliResult<Value> {
    if content.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }

    let value: Value = serde_json::from_str(content)?;
    if !value.is_object() {
        return Err(CliError::invalid_query("query description must be a JSON object"));
    }
    Ok(value)
}

/// Write a pretty JSON document to stdout
pub fn write_json(value: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}
