use serde_json::Value;
use std::fs;

/// Pretty-print JSON to stdout.
pub fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("JSON serialization error: {}", e),
    }
}

/// Write the full JSON result to a snapshot file.
pub fn save_json(path: &str, value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    let body = serde_json::to_string_pretty(value)?;
    fs::write(path, body).map_err(|e| format!("Failed to write '{}': {}", path, e))?;
    tracing::debug!(path, "result saved");
    Ok(())
}
