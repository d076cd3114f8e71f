//! Recursive rebuild of a document tree.
//!
//! The walker knows nothing about placeholders or resource kinds: it hands
//! every string leaf to a policy and collects whatever errors come back.

use super::value::Value;
use crate::error::PlaceholderError;

/// A string leaf as seen by a policy.
#[derive(Debug, Clone, Copy)]
pub struct Leaf<'a> {
    /// Nearest enclosing map key. List elements inherit the key of the list.
    pub key: &'a str,
    /// Dotted location of the leaf, e.g. `spec.containers[0].image`.
    pub path: &'a str,
    pub value: &'a str,
}

/// What a policy produced for one leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct Replacement {
    pub value: Value,
    pub errors: Vec<PlaceholderError>,
}

impl Replacement {
    pub fn ok(value: Value) -> Self {
        Self {
            value,
            errors: Vec::new(),
        }
    }
}

/// A leaf error and where it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkError {
    pub path: String,
    pub error: PlaceholderError,
}

/// Result of a full traversal.
#[derive(Debug, Clone, PartialEq)]
pub struct Walked {
    pub value: Value,
    pub errors: Vec<WalkError>,
}

/// Rebuild `node`, replacing each string leaf with what `policy` returns.
///
/// `key` and `path` describe `node` itself; pass the section name for a
/// top-level section or empty strings for a whole document. The walk never
/// stops early: every leaf is visited and every error is returned.
pub fn walk<F>(node: Value, key: &str, path: &str, policy: &F) -> Walked
where
    F: Fn(&Leaf<'_>) -> Replacement,
{
    let mut errors = Vec::new();
    let value = walk_node(node, key, path, policy, &mut errors);
    Walked { value, errors }
}

fn walk_node<F>(
    node: Value,
    key: &str,
    path: &str,
    policy: &F,
    errors: &mut Vec<WalkError>,
) -> Value
where
    F: Fn(&Leaf<'_>) -> Replacement,
{
    match node {
        Value::String(s) => {
            let replacement = policy(&Leaf {
                key,
                path,
                value: &s,
            });
            errors.extend(replacement.errors.into_iter().map(|error| WalkError {
                path: path.to_string(),
                error,
            }));
            replacement.value
        }
        Value::Map(map) => Value::Map(
            map.into_iter()
                .map(|(child_key, child)| {
                    let child_path = join_path(path, &child_key);
                    let child = walk_node(child, &child_key, &child_path, policy, errors);
                    (child_key, child)
                })
                .collect(),
        ),
        Value::List(items) => Value::List(
            items
                .into_iter()
                .enumerate()
                .map(|(idx, item)| {
                    walk_node(item, key, &format!("{path}[{idx}]"), policy, errors)
                })
                .collect(),
        ),
        scalar => scalar,
    }
}

fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::cell::RefCell;

    fn upper(leaf: &Leaf<'_>) -> Replacement {
        Replacement::ok(Value::String(leaf.value.to_uppercase()))
    }

    #[test]
    fn rebuilds_every_string_leaf() {
        let doc = Value::from(json!({
            "a": "x",
            "b": {"c": ["y", 1, null, {"d": "z"}]},
            "e": true
        }));
        let walked = walk(doc, "", "", &upper);
        assert_eq!(
            walked.value.to_json(),
            json!({
                "a": "X",
                "b": {"c": ["Y", 1, null, {"d": "Z"}]},
                "e": true
            })
        );
        assert!(walked.errors.is_empty());
    }

    #[test]
    fn threads_key_and_path() {
        let seen = RefCell::new(Vec::new());
        let record = |leaf: &Leaf<'_>| {
            seen.borrow_mut()
                .push((leaf.key.to_string(), leaf.path.to_string()));
            Replacement::ok(Value::from(leaf.value))
        };
        let doc = Value::from(json!({"meta": {"tags": ["a", "b"]}, "name": "n"}));
        walk(doc, "spec", "spec", &record);

        assert_eq!(
            seen.into_inner(),
            vec![
                ("tags".to_string(), "spec.meta.tags[0]".to_string()),
                ("tags".to_string(), "spec.meta.tags[1]".to_string()),
                ("name".to_string(), "spec.name".to_string()),
            ]
        );
    }

    #[test]
    fn collects_errors_without_stopping() {
        let failing = |leaf: &Leaf<'_>| Replacement {
            value: Value::from(leaf.value),
            errors: vec![PlaceholderError::Unresolved {
                key: leaf.value.to_string(),
            }],
        };
        let doc = Value::from(json!({"a": "one", "b": ["two", "three"]}));
        let walked = walk(doc.clone(), "", "", &failing);

        assert_eq!(walked.value, doc);
        let paths: Vec<_> = walked.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["a", "b[0]", "b[1]"]);
    }

    #[test]
    fn keeps_empty_and_null_entries() {
        let doc = Value::from(json!({"empty": {}, "none": null, "list": []}));
        let walked = walk(doc.clone(), "", "", &upper);
        assert_eq!(walked.value, doc);
    }

    #[test]
    fn bytes_pass_through() {
        let doc = Value::List(vec![Value::Bytes(b"raw".to_vec())]);
        let walked = walk(doc.clone(), "", "", &upper);
        assert_eq!(walked.value, doc);
    }
}
