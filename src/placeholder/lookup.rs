//! Key lookup against the fetched secret mapping.

use super::Token;
use crate::error::PlaceholderError;
use crate::template::value::Value;
use std::collections::HashMap;

/// Secret values fetched for one document, keyed by secret name.
pub type SecretMap = HashMap<String, serde_json::Value>;

/// Exact-match lookup. A missing key is not an error here; callers decide
/// how to report it.
pub fn resolve<'a>(key: &str, secrets: Option<&'a SecretMap>) -> Option<&'a serde_json::Value> {
    secrets?.get(key)
}

/// Look up a token and run its modifiers.
pub fn resolve_token(
    token: &Token,
    secrets: Option<&SecretMap>,
) -> Result<Value, PlaceholderError> {
    let raw = resolve(&token.key, secrets).ok_or_else(|| PlaceholderError::Unresolved {
        key: token.key.clone(),
    })?;

    token
        .modifiers
        .iter()
        .try_fold(Value::from(raw), |value, modifier| {
            modifier
                .apply(value)
                .map_err(|reason| PlaceholderError::Modifier {
                    key: token.key.clone(),
                    modifier: modifier.name().to_string(),
                    reason,
                })
        })
}
