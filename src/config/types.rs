use super::defaults::{DEFAULT_ENV_PREFIX, DEFAULT_EXEC_TIMEOUT_SECS};
use crate::placeholder::{DEFAULT_CLOSE, DEFAULT_OPEN};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Placeholder Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceholderConfig {
    pub open: String,
    pub close: String,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            open: DEFAULT_OPEN.to_string(),
            close: DEFAULT_CLOSE.to_string(),
        }
    }
}

/// What a Secret `.data` leaf becomes when its placeholder cannot be
/// resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedData {
    /// Keep the original placeholder text.
    #[default]
    Keep,
    /// Emit an empty payload.
    Empty,
}

impl std::str::FromStr for UnresolvedData {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keep" => Ok(Self::Keep),
            "empty" => Ok(Self::Empty),
            _ => Err(format!("invalid unresolvedData mode: {s}")),
        }
    }
}

// ============================================================================
// Backend Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    /// Secrets kept in a local YAML or JSON file, keyed by path.
    File { path: PathBuf },
    /// Secrets taken from prefixed environment variables.
    Env {
        #[serde(default = "default_env_prefix")]
        prefix: String,
    },
    /// Secrets printed as a JSON or YAML map by an external command.
    #[serde(rename_all = "camelCase")]
    Exec {
        command: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default = "default_exec_timeout")]
        timeout_secs: u64,
    },
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Env {
            prefix: default_env_prefix(),
        }
    }
}

fn default_env_prefix() -> String {
    DEFAULT_ENV_PREFIX.to_string()
}

fn default_exec_timeout() -> u64 {
    DEFAULT_EXEC_TIMEOUT_SECS
}
