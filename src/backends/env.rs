//! Environment variable secret backend.
//!
//! Every variable starting with the configured prefix is a secret named by
//! the rest of the variable name: with the default prefix,
//! `SECRET_INJECT_VALUE_db_password` serves `<db_password>`. The path is
//! ignored.

use super::SecretBackend;
use crate::error::Result;
use crate::placeholder::SecretMap;
use async_trait::async_trait;
use tracing::debug;

/// Resolves secrets from prefixed environment variables.
pub struct EnvBackend {
    prefix: String,
}

impl EnvBackend {
    pub fn new(prefix: String) -> Self {
        Self { prefix }
    }

    fn collect(&self, vars: impl Iterator<Item = (String, String)>) -> SecretMap {
        vars.filter_map(|(name, value)| {
            let key = name.strip_prefix(&self.prefix)?;
            (!key.is_empty()).then(|| (key.to_string(), serde_json::Value::String(value)))
        })
        .collect()
    }
}

#[async_trait]
impl SecretBackend for EnvBackend {
    fn name(&self) -> &str {
        "env"
    }

    async fn get_secrets(&self, path: &str, _version: Option<&str>) -> Result<SecretMap> {
        let secrets = self.collect(std::env::vars());
        debug!(
            "Environment provides {} secret(s) with prefix '{}' (path '{path}' ignored)",
            secrets.len(),
            self.prefix
        );
        Ok(secrets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_prefix() {
        let backend = EnvBackend::new("APP_".into());
        let vars = vec![
            ("APP_token".to_string(), "abc".to_string()),
            ("APP_".to_string(), "ignored".to_string()),
            ("HOME".to_string(), "/root".to_string()),
        ];
        let secrets = backend.collect(vars.into_iter());
        assert_eq!(secrets.len(), 1);
        assert_eq!(secrets["token"], json!("abc"));
    }

    #[tokio::test]
    async fn reads_process_environment() {
        std::env::set_var("SECRET_INJECT_ENV_TEST_db_password", "hunter2");
        let backend = EnvBackend::new("SECRET_INJECT_ENV_TEST_".into());
        let secrets = backend.get_secrets("secret/secret", None).await.unwrap();
        assert_eq!(secrets["db_password"], json!("hunter2"));
    }
}
