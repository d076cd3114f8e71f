mod defaults;
mod io;
mod types;
mod validation;

pub use defaults::*;
pub use io::*;
pub use types::*;
pub use validation::*;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Top-level secret-inject configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Prefix of the kind-derived secret path (`{pathPrefix}/{kind}`).
    #[serde(default = "default_path_prefix")]
    pub path_prefix: String,
    /// Secret version used when a document does not pin one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kv_version: Option<String>,
    #[serde(default)]
    pub unresolved_data: UnresolvedData,
    #[serde(default)]
    pub placeholder: PlaceholderConfig,
    #[serde(default)]
    pub backend: BackendConfig,
}

impl Config {
    /// Load configuration from file, environment, and defaults.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = path.map(PathBuf::from).or_else(find_config_file);

        let mut config = match config_path {
            Some(path) => {
                info!("Loading config from {}", path.display());
                read_structured_file(&path)?
            }
            None => {
                info!("No config file found, using defaults");
                Config::default()
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Write default configuration to a file.
    pub fn write_default(path: &Path) -> Result<()> {
        write_structured_file(path, &Config::default())
    }

    /// Apply environment variable overrides to the configuration.
    fn apply_env_overrides(&mut self) {
        if let Ok(prefix) = std::env::var("SECRET_INJECT_PATH_PREFIX") {
            self.path_prefix = prefix;
        }

        if let Ok(version) = std::env::var("SECRET_INJECT_KV_VERSION") {
            self.kv_version = Some(version).filter(|v| !v.is_empty());
        }

        if let Ok(mode) = std::env::var("SECRET_INJECT_UNRESOLVED_DATA") {
            if let Ok(mode) = mode.parse() {
                self.unresolved_data = mode;
            }
        }

        if let Ok(path) = std::env::var("SECRET_INJECT_SECRETS_FILE") {
            self.backend = BackendConfig::File {
                path: PathBuf::from(path),
            };
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path_prefix: default_path_prefix(),
            kv_version: None,
            unresolved_data: UnresolvedData::default(),
            placeholder: PlaceholderConfig::default(),
            backend: BackendConfig::default(),
        }
    }
}

fn default_path_prefix() -> String {
    DEFAULT_PATH_PREFIX.to_string()
}

/// Find the configuration file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    let candidates = [
        PathBuf::from("secret-inject.yaml"),
        PathBuf::from("secret-inject.yml"),
        PathBuf::from("secret-inject.json"),
        PathBuf::from("secret-inject.toml"),
    ];

    for path in &candidates {
        if path.exists() {
            return Some(path.clone());
        }
    }

    // Check home directory
    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(".secret-inject").join("config.yaml");
        if home_config.exists() {
            return Some(home_config);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_yaml_with_defaults() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("config.yaml");
        std::fs::write(
            &file,
            "pathPrefix: kv\nbackend:\n  type: file\n  path: /tmp/secrets.yaml\n",
        )
        .unwrap();

        let config: Config = read_structured_file(&file).unwrap();
        assert_eq!(config.path_prefix, "kv");
        assert_eq!(config.placeholder, PlaceholderConfig::default());
        assert_eq!(config.unresolved_data, UnresolvedData::Keep);
        assert_eq!(
            config.backend,
            BackendConfig::File {
                path: PathBuf::from("/tmp/secrets.yaml")
            }
        );
    }

    #[test]
    fn exec_backend_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"backend": {"type": "exec", "command": "vault-dump"}}"#)
                .unwrap();
        assert_eq!(
            config.backend,
            BackendConfig::Exec {
                command: "vault-dump".into(),
                args: vec![],
                timeout_secs: DEFAULT_EXEC_TIMEOUT_SECS,
            }
        );
    }

    #[test]
    fn write_default_round_trips() {
        let dir = TempDir::new().unwrap();
        for name in ["config.yaml", "config.json", "config.toml"] {
            let file = dir.path().join(name);
            Config::write_default(&file).unwrap();
            let back: Config = read_structured_file(&file).unwrap();
            assert_eq!(back, Config::default(), "{name}");
        }
    }
}
