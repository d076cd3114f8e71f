use super::{BackendConfig, Config};
use tracing::warn;

/// Validation errors for configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Validate a configuration object.
pub fn validate_config(config: &Config) -> Vec<ConfigValidationError> {
    let mut errors = Vec::new();

    let placeholder = &config.placeholder;
    if placeholder.open.is_empty() {
        errors.push(ConfigValidationError {
            path: "placeholder.open".to_string(),
            message: "Opening delimiter must not be empty".to_string(),
        });
    }
    if placeholder.close.is_empty() {
        errors.push(ConfigValidationError {
            path: "placeholder.close".to_string(),
            message: "Closing delimiter must not be empty".to_string(),
        });
    }
    if !placeholder.open.is_empty() && placeholder.open == placeholder.close {
        errors.push(ConfigValidationError {
            path: "placeholder".to_string(),
            message: "Opening and closing delimiters must differ".to_string(),
        });
    }

    if config.path_prefix.trim_matches('/').is_empty() {
        warn!("pathPrefix is empty; kind-derived secret paths will start with '/'");
    }

    match &config.backend {
        BackendConfig::File { path } => {
            if path.as_os_str().is_empty() {
                errors.push(ConfigValidationError {
                    path: "backend.path".to_string(),
                    message: "File backend requires a path".to_string(),
                });
            }
        }
        BackendConfig::Env { prefix } => {
            if prefix.is_empty() {
                warn!("Env backend has no prefix; every environment variable is a secret");
            }
        }
        BackendConfig::Exec {
            command,
            timeout_secs,
            ..
        } => {
            if command.trim().is_empty() {
                errors.push(ConfigValidationError {
                    path: "backend.command".to_string(),
                    message: "Exec backend requires a command".to_string(),
                });
            }
            if *timeout_secs == 0 {
                errors.push(ConfigValidationError {
                    path: "backend.timeoutSecs".to_string(),
                    message: "Timeout must be greater than 0".to_string(),
                });
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlaceholderConfig;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_empty());
    }

    #[test]
    fn same_delimiters_rejected() {
        let config = Config {
            placeholder: PlaceholderConfig {
                open: "%".into(),
                close: "%".into(),
            },
            ..Config::default()
        };
        let errors = validate_config(&config);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "placeholder");
    }

    #[test]
    fn exec_backend_checks() {
        let config = Config {
            backend: BackendConfig::Exec {
                command: " ".into(),
                args: vec![],
                timeout_secs: 0,
            },
            ..Config::default()
        };
        let paths: Vec<_> = validate_config(&config)
            .into_iter()
            .map(|e| e.path)
            .collect();
        assert_eq!(paths, vec!["backend.command", "backend.timeoutSecs"]);
    }
}
