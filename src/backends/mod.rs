//! Secret backends.
//!
//! A backend turns a secret path (and optional version) into the key/value
//! mapping a template substitutes from. Each template calls its backend at
//! most once, and only when it holds placeholders.

pub mod env;
pub mod exec;
pub mod file;

pub use env::EnvBackend;
pub use exec::ExecBackend;
pub use file::FileBackend;

use crate::config::BackendConfig;
use crate::error::Result;
use crate::placeholder::SecretMap;
use async_trait::async_trait;

/// Source of secret mappings.
#[async_trait]
pub trait SecretBackend: Send + Sync {
    /// Display name for logging.
    fn name(&self) -> &str;

    /// Fetch every secret stored at `path`.
    ///
    /// `version` pins a specific revision when the backend keeps history.
    async fn get_secrets(&self, path: &str, version: Option<&str>) -> Result<SecretMap>;
}

/// Build the backend described by the configuration.
pub fn build_backend(config: &BackendConfig) -> Result<Box<dyn SecretBackend>> {
    let backend: Box<dyn SecretBackend> = match config {
        BackendConfig::File { path } => Box::new(FileBackend::load(path)?),
        BackendConfig::Env { prefix } => Box::new(EnvBackend::new(prefix.clone())),
        BackendConfig::Exec {
            command,
            args,
            timeout_secs,
        } => Box::new(ExecBackend::new(
            command.clone(),
            args.clone(),
            std::time::Duration::from_secs(*timeout_secs),
        )),
    };
    Ok(backend)
}
