use serde_json::Value;
use std::io::{self, Read};
use tracing::debug;

/// Read a JSON or YAML document from stdin when data is being piped.
/// Returns None if stdin is a TTY or empty.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_document(&buffer)
}

/// JSON first; anything that is not JSON is tried as YAML.
fn parse_document(text: &str) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => {
            debug!("read JSON from stdin");
            Ok(Some(value))
        }
        Err(json_err) => {
            let value: Value = serde_yaml::from_str(trimmed)
                .map_err(|_| format!("Failed to parse stdin as JSON: {json_err}"))?;
            debug!("read YAML from stdin");
            Ok(Some(value))
        }
    }
}
