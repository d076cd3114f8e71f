//! Default configuration constants used across the system.

/// Prefix of the kind-derived secret path.
pub const DEFAULT_PATH_PREFIX: &str = "secret";

/// Default prefix for the environment backend.
pub const DEFAULT_ENV_PREFIX: &str = "SECRET_INJECT_VALUE_";

/// Default timeout for the exec backend.
pub const DEFAULT_EXEC_TIMEOUT_SECS: u64 = 30;

/// Config file written by `config init` when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "secret-inject.yaml";
