use std::fs;
use std::path::Path;

use emi_core::config::EngineLimits;

use crate::commands::RunContext;

/// Build the run context from the global `--limits` / `--no-limits` flags.
pub fn load_context(
    path: Option<&str>,
    disabled: bool,
) -> Result<RunContext, Box<dyn std::error::Error>> {
    let limits = match path {
        Some(path) => load_limits(path)?,
        None => EngineLimits::default(),
    };
    tracing::debug!(?limits, enforced = !disabled, "limits loaded");

    Ok(RunContext {
        precision: limits.decimal_precision,
        limits: if disabled { None } else { Some(limits) },
    })
}

/// Read limits from a `.yaml`/`.yml` or JSON file. Missing fields keep their defaults.
fn load_limits(path: &str) -> Result<EngineLimits, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read limits '{}': {}", path, e))?;

    let is_yaml = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let limits: EngineLimits = if is_yaml {
        serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse limits '{}': {}", path, e))?
    } else {
        serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse limits '{}': {}", path, e))?
    };
    Ok(limits)
}
