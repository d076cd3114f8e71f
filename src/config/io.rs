use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Maximum size for a config or secrets file (10 MB).
pub const MAX_CONFIG_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// Read a YAML, JSON or TOML file, picking the format from the extension.
///
/// Files without a known extension are read as YAML, which also accepts
/// JSON.
pub fn read_structured_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Cannot stat '{}'", path.display()))?;

    if metadata.len() > MAX_CONFIG_FILE_BYTES {
        bail!(
            "'{}' is {} bytes, exceeds limit of {} bytes",
            path.display(),
            metadata.len(),
            MAX_CONFIG_FILE_BYTES,
        );
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;

    let value = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&content)
            .with_context(|| format!("Invalid TOML in '{}'", path.display()))?,
        Some("json") => serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in '{}'", path.display()))?,
        _ => serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid YAML in '{}'", path.display()))?,
    };

    Ok(value)
}

/// Write a value as YAML, JSON or TOML depending on the extension.
pub fn write_structured_file<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::to_string_pretty(value)?,
        Some("json") => serde_json::to_string_pretty(value)?,
        _ => serde_yaml::to_string(value)?,
    };
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write '{}'", path.display()))?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
