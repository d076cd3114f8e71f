//! Encoding policies and the per-kind dispatch table.

use super::value::Value;
use super::walker::{Leaf, Replacement};
use crate::config::UnresolvedData;
use crate::error::Section;
use crate::placeholder::{resolve_token, Matcher, SecretMap};
use std::fmt;

/// How a resolved leaf is represented in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingPolicy {
    /// Substitute verbatim; a lone placeholder keeps the secret's type.
    Generic,
    /// Substitute, then coerce the result to a string.
    Stringify,
    /// Substitute, then emit bytes when the source held a placeholder.
    BinarySafe,
}

/// Read-only state a policy needs to resolve a leaf.
#[derive(Debug, Clone, Copy)]
pub struct PolicyContext<'a> {
    pub matcher: &'a Matcher,
    pub secrets: Option<&'a SecretMap>,
    pub unresolved_data: UnresolvedData,
}

impl EncodingPolicy {
    pub fn apply(&self, leaf: &Leaf<'_>, ctx: &PolicyContext<'_>) -> Replacement {
        let replacement = substitute(leaf.value, ctx);
        match self {
            EncodingPolicy::Generic => replacement,
            EncodingPolicy::Stringify => Replacement {
                value: Value::String(replacement.value.stringify()),
                errors: replacement.errors,
            },
            EncodingPolicy::BinarySafe => {
                // Hard-coded values are expected to be base64 already.
                if !ctx.matcher.contains(leaf.value) {
                    return replacement;
                }
                let value = if replacement.errors.is_empty() {
                    Value::Bytes(replacement.value.stringify().into_bytes())
                } else {
                    match ctx.unresolved_data {
                        UnresolvedData::Keep => Value::String(leaf.value.to_string()),
                        UnresolvedData::Empty => Value::Bytes(Vec::new()),
                    }
                };
                Replacement {
                    value,
                    errors: replacement.errors,
                }
            }
        }
    }
}

/// Resolve every placeholder in `text`.
///
/// A string that is exactly one placeholder becomes the secret value with
/// its own type. Otherwise resolved values are rendered as text between the
/// literal segments, and tokens that fail are left in place.
pub fn substitute(text: &str, ctx: &PolicyContext<'_>) -> Replacement {
    let mut errors: Vec<_> = ctx.matcher.unterminated(text).into_iter().collect();
    let matches = ctx.matcher.scan(text);
    if matches.is_empty() {
        return Replacement {
            value: Value::String(text.to_string()),
            errors,
        };
    }

    let resolved: Vec<_> = matches
        .iter()
        .map(|m| {
            m.token
                .clone()
                .and_then(|token| resolve_token(&token, ctx.secrets))
        })
        .collect();

    if let [only] = matches.as_slice() {
        if only.span == (0..text.len()) {
            return match resolved.into_iter().next() {
                Some(Ok(value)) => Replacement { value, errors },
                Some(Err(e)) => {
                    errors.push(e);
                    Replacement {
                        value: Value::String(text.to_string()),
                        errors,
                    }
                }
                None => Replacement {
                    value: Value::String(text.to_string()),
                    errors,
                },
            };
        }
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (m, result) in matches.iter().zip(resolved) {
        out.push_str(&text[last..m.span.start]);
        match result {
            Ok(value) => out.push_str(&value.stringify()),
            Err(e) => {
                errors.push(e);
                out.push_str(m.raw);
            }
        }
        last = m.span.end;
    }
    out.push_str(&text[last..]);

    Replacement {
        value: Value::String(out),
        errors,
    }
}

/// A manifest's resource kind, as far as substitution cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceKind {
    Secret,
    ConfigMap,
    Other(String),
}

/// Which part of a document a rule covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// One top-level field, walked only when it is a map.
    Field(&'static str),
    /// Every top-level field not claimed by a `Field` rule of the same kind.
    Remainder,
    /// The entire document.
    Whole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionRule {
    pub section: Section,
    pub scope: Scope,
    pub policy: EncodingPolicy,
}

const SECRET_RULES: &[SectionRule] = &[
    SectionRule {
        section: Section::Metadata,
        scope: Scope::Field("metadata"),
        policy: EncodingPolicy::Generic,
    },
    SectionRule {
        section: Section::StringData,
        scope: Scope::Field("stringData"),
        policy: EncodingPolicy::Generic,
    },
    SectionRule {
        section: Section::Data,
        scope: Scope::Field("data"),
        policy: EncodingPolicy::BinarySafe,
    },
];

const CONFIG_MAP_RULES: &[SectionRule] = &[
    SectionRule {
        section: Section::Metadata,
        scope: Scope::Field("metadata"),
        policy: EncodingPolicy::Stringify,
    },
    SectionRule {
        section: Section::Data,
        scope: Scope::Remainder,
        policy: EncodingPolicy::Stringify,
    },
];

const GENERIC_RULES: &[SectionRule] = &[SectionRule {
    section: Section::Resource,
    scope: Scope::Whole,
    policy: EncodingPolicy::Generic,
}];

impl ResourceKind {
    pub fn parse(kind: &str) -> Self {
        match kind {
            "Secret" => ResourceKind::Secret,
            "ConfigMap" => ResourceKind::ConfigMap,
            other => ResourceKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ResourceKind::Secret => "Secret",
            ResourceKind::ConfigMap => "ConfigMap",
            ResourceKind::Other(kind) => kind,
        }
    }

    /// Sections to walk, in order, and the policy for each.
    pub fn rules(&self) -> &'static [SectionRule] {
        match self {
            ResourceKind::Secret => SECRET_RULES,
            ResourceKind::ConfigMap => CONFIG_MAP_RULES,
            ResourceKind::Other(_) => GENERIC_RULES,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
