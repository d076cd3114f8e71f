//! Placeholder detection.
//!
//! A placeholder is a key wrapped in a delimiter pair, `<key>` by default,
//! optionally followed by modifiers: `<key | base64encode | trim>`. A string
//! can hold any number of placeholders mixed with literal text.

pub mod lookup;
pub mod modifier;

pub use lookup::{resolve, resolve_token, SecretMap};
pub use modifier::Modifier;

use crate::error::{Error, PlaceholderError, Result};
use crate::template::value::Value;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

/// Opening delimiter used when none is configured.
pub const DEFAULT_OPEN: &str = "<";
/// Closing delimiter used when none is configured.
pub const DEFAULT_CLOSE: &str = ">";

static DEFAULT_MATCHER: Lazy<Matcher> = Lazy::new(|| {
    Matcher::new(DEFAULT_OPEN, DEFAULT_CLOSE).expect("default delimiters compile")
});

/// A parsed placeholder: the key to look up and the modifiers to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub key: String,
    pub modifiers: Vec<Modifier>,
}

/// One placeholder occurrence inside a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match<'a> {
    /// Byte range of the whole token, delimiters included.
    pub span: Range<usize>,
    pub raw: &'a str,
    pub token: std::result::Result<Token, PlaceholderError>,
}

/// Finds placeholders for one delimiter pair.
///
/// Immutable once built; clones share the compiled pattern.
#[derive(Debug, Clone)]
pub struct Matcher {
    open: String,
    close: String,
    pattern: Regex,
}

impl Matcher {
    pub fn new(open: &str, close: &str) -> Result<Self> {
        if open.is_empty() || close.is_empty() {
            return Err(Error::Config(
                "placeholder delimiters must not be empty".to_string(),
            ));
        }
        let pattern = format!("{}(.*?){}", regex::escape(open), regex::escape(close));
        let pattern = Regex::new(&pattern)
            .map_err(|e| Error::Config(format!("invalid placeholder delimiters: {e}")))?;

        Ok(Self {
            open: open.to_string(),
            close: close.to_string(),
            pattern,
        })
    }

    pub fn delimiters(&self) -> (&str, &str) {
        (&self.open, &self.close)
    }

    /// Whether `text` holds at least one placeholder, counting an
    /// unterminated one.
    pub fn contains(&self, text: &str) -> bool {
        self.pattern.is_match(text) || self.unterminated(text).is_some()
    }

    /// Whether any string anywhere in `value` holds a placeholder.
    pub fn contains_in(&self, value: &Value) -> bool {
        match value {
            Value::String(s) => self.contains(s),
            Value::List(items) => items.iter().any(|v| self.contains_in(v)),
            Value::Map(map) => map.values().any(|v| self.contains_in(v)),
            _ => false,
        }
    }

    /// Every placeholder in `text`, in order of appearance.
    ///
    /// A token starts at the last opening delimiter before its closer, so a
    /// stray opener earlier in the text (`cat < in.txt && echo <pass>`) stays
    /// literal.
    pub fn scan<'a>(&self, text: &'a str) -> Vec<Match<'a>> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let inner = caps.get(1)?;
                let (start, key_text) = match inner.as_str().rfind(self.open.as_str()) {
                    Some(at) => (
                        inner.start() + at,
                        &inner.as_str()[at + self.open.len()..],
                    ),
                    None => (whole.start(), inner.as_str()),
                };
                let raw = &text[start..whole.end()];
                Some(Match {
                    span: start..whole.end(),
                    raw,
                    token: self.parse_token(raw, key_text),
                })
            })
            .collect()
    }

    /// Report an opening delimiter that runs to the end of `text` unclosed.
    ///
    /// Only a delimiter directly followed by non-whitespace text counts, so
    /// comparisons like `a < b` stay literal.
    pub fn unterminated(&self, text: &str) -> Option<PlaceholderError> {
        let tail_start = self.pattern.find_iter(text).last().map_or(0, |m| m.end());
        let tail = &text[tail_start..];
        let open_at = tail.rfind(self.open.as_str())?;
        let rest = &tail[open_at + self.open.len()..];

        if rest.is_empty() || rest.chars().any(char::is_whitespace) || rest.contains(&self.close)
        {
            return None;
        }
        Some(PlaceholderError::Malformed {
            token: tail[open_at..].to_string(),
            reason: "missing closing delimiter".to_string(),
        })
    }

    fn parse_token(
        &self,
        raw: &str,
        inner: &str,
    ) -> std::result::Result<Token, PlaceholderError> {
        let malformed = |reason: String| PlaceholderError::Malformed {
            token: raw.to_string(),
            reason,
        };

        let mut parts = inner.split('|').map(str::trim);
        let key = parts.next().unwrap_or_default();
        if key.is_empty() {
            return Err(malformed("empty key".to_string()));
        }

        let modifiers = parts
            .map(|name| {
                name.parse::<Modifier>()
                    .map_err(|_| malformed(format!("unknown modifier '{name}'")))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Token {
            key: key.to_string(),
            modifiers,
        })
    }
}

impl Default for Matcher {
    fn default() -> Self {
        DEFAULT_MATCHER.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(text: &str) -> Vec<String> {
        Matcher::default()
            .scan(text)
            .into_iter()
            .filter_map(|m| m.token.ok().map(|t| t.key))
            .collect()
    }

    #[test]
    fn finds_single_placeholder() {
        let matcher = Matcher::default();
        let found = matcher.scan("<password>");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].span, 0..10);
        assert_eq!(found[0].raw, "<password>");
        assert_eq!(found[0].token.as_ref().unwrap().key, "password");
    }

    #[test]
    fn finds_placeholders_between_literals() {
        assert_eq!(
            keys("postgres://<user>:<pass>@db:5432"),
            vec!["user".to_string(), "pass".to_string()]
        );
    }

    #[test]
    fn literal_has_no_placeholders() {
        let matcher = Matcher::default();
        assert!(!matcher.contains("plain value"));
        assert!(matcher.scan("plain value").is_empty());
    }

    #[test]
    fn parses_modifiers() {
        let found = Matcher::default().scan("< key | base64encode | trim >");
        let token = found[0].token.as_ref().unwrap();
        assert_eq!(token.key, "key");
        assert_eq!(token.modifiers, vec![Modifier::Base64Encode, Modifier::Trim]);
    }

    #[test]
    fn empty_key_is_malformed() {
        let found = Matcher::default().scan("a<>b");
        assert!(matches!(
            &found[0].token,
            Err(PlaceholderError::Malformed { token, .. }) if token == "<>"
        ));
    }

    #[test]
    fn unknown_modifier_is_malformed() {
        let found = Matcher::default().scan("<key|rot13>");
        let err = found[0].token.as_ref().unwrap_err();
        assert!(err.to_string().contains("unknown modifier 'rot13'"));
    }

    #[test]
    fn detects_unterminated_token() {
        let matcher = Matcher::default();
        assert!(matcher.unterminated("prefix-<password").is_some());
        assert!(matcher.unterminated("<ok> then <broken").is_some());
        assert!(matcher.unterminated("a < b").is_none());
        assert!(matcher.unterminated("<closed>").is_none());
        assert!(matcher.unterminated("trailing <").is_none());
    }

    #[test]
    fn stray_opener_stays_literal() {
        let matcher = Matcher::default();
        let found = matcher.scan("cat < in.txt && echo <pass>");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].raw, "<pass>");
        assert_eq!(found[0].span, 21..27);
        assert_eq!(found[0].token.as_ref().unwrap().key, "pass");

        assert_eq!(keys("x <broken then <pass>"), vec!["pass".to_string()]);
        assert_eq!(keys("<a<b>"), vec!["b".to_string()]);
    }

    #[test]
    fn unterminated_counts_as_placeholder() {
        let matcher = Matcher::default();
        assert!(matcher.contains("prefix-<password"));
        assert!(!matcher.contains("a < b"));
    }

    #[test]
    fn custom_delimiters() {
        let matcher = Matcher::new("{{", "}}").unwrap();
        let found = matcher.scan("user={{ name }} <kept>");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].token.as_ref().unwrap().key, "name");
        assert_eq!(matcher.delimiters(), ("{{", "}}"));
    }

    #[test]
    fn rejects_empty_delimiters() {
        assert!(matches!(Matcher::new("", ">"), Err(Error::Config(_))));
    }

    #[test]
    fn contains_in_searches_whole_tree() {
        let matcher = Matcher::default();
        let nested = Value::from(json!({"a": {"b": [1, {"c": "x-<deep>"}]}}));
        let flat = Value::from(json!({"a": {"b": [1, {"c": "x"}]}, "n": 3}));
        assert!(matcher.contains_in(&nested));
        assert!(!matcher.contains_in(&flat));
    }
}
