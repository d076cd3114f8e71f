//! External command secret backend.
//!
//! Runs a command that prints the secrets for a path as a JSON or YAML map.
//! `{path}` and `{version}` in the arguments are replaced before execution;
//! the command is never passed through a shell.

use super::SecretBackend;
use crate::error::{Error, Result};
use crate::placeholder::SecretMap;
use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Maximum output size from a secret command (1 MB).
const MAX_OUTPUT_BYTES: usize = 1024 * 1024;

/// Fetches secrets by executing an external command.
pub struct ExecBackend {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl ExecBackend {
    pub fn new(command: String, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            command,
            args,
            timeout,
        }
    }

    fn render_args(&self, path: &str, version: Option<&str>) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{path}", path)
                    .replace("{version}", version.unwrap_or_default())
            })
            .collect()
    }
}

#[async_trait]
impl SecretBackend for ExecBackend {
    fn name(&self) -> &str {
        "exec"
    }

    async fn get_secrets(&self, path: &str, version: Option<&str>) -> Result<SecretMap> {
        let fail = |reason: String| Error::SecretFetch {
            path: path.to_string(),
            reason,
        };

        let args = self.render_args(path, version);
        debug!("Running '{}' for secret path '{path}'", self.command);

        let mut cmd = Command::new(&self.command);
        cmd.args(&args);

        // Don't inherit stdin; interactive commands would hang.
        cmd.stdin(std::process::Stdio::null());
        cmd.stdout(std::process::Stdio::piped());
        cmd.stderr(std::process::Stdio::piped());
        cmd.kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(fail(format!("failed to execute '{}': {e}", self.command)))
            }
            Err(_) => {
                return Err(fail(format!(
                    "command '{}' timed out after {}s",
                    self.command,
                    self.timeout.as_secs()
                )))
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(
                "Secret command '{}' failed with status {}: {}",
                self.command,
                output.status,
                stderr.trim()
            );
            return Err(fail(format!(
                "command exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        if output.stdout.len() > MAX_OUTPUT_BYTES {
            return Err(fail(format!(
                "command output exceeds {MAX_OUTPUT_BYTES} bytes"
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        serde_yaml::from_str::<SecretMap>(&stdout)
            .map_err(|e| fail(format!("command output is not a key/value map: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn backend(command: &str, args: &[&str]) -> ExecBackend {
        ExecBackend::new(
            command.to_string(),
            args.iter().map(|a| a.to_string()).collect(),
            Duration::from_secs(10),
        )
    }

    #[test]
    fn substitutes_path_and_version() {
        let b = backend("vault", &["kv", "get", "-version={version}", "{path}"]);
        assert_eq!(
            b.render_args("secret/app", Some("3")),
            vec!["kv", "get", "-version=3", "secret/app"]
        );
        assert_eq!(b.render_args("p", None)[2], "-version=");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn parses_command_output() {
        let b = backend("echo", &[r#"{"token": "abc", "path": "{path}"}"#]);
        let secrets = b.get_secrets("secret/app", None).await.unwrap();
        assert_eq!(secrets["token"], json!("abc"));
        assert_eq!(secrets["path"], json!("secret/app"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_command_is_fetch_failure() {
        let err = backend("false", &[]).get_secrets("p", None).await.unwrap_err();
        assert!(matches!(err, Error::SecretFetch { .. }));
        assert!(err.to_string().contains("exited with status"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_map_output_is_rejected() {
        let err = backend("echo", &["- just", "- a list"])
            .get_secrets("p", None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not a key/value map"));
    }

    #[tokio::test]
    async fn missing_binary_is_fetch_failure() {
        let err = backend("definitely-not-a-real-binary-xyz", &[])
            .get_secrets("p", None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to execute"));
    }
}
