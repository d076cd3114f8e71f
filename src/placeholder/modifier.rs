//! Transformations applied to a looked-up value before it is spliced in.

use crate::template::value::Value;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    /// Encode the textual form of the value as standard base64.
    Base64Encode,
    /// Decode a base64 value into UTF-8 text.
    Base64Decode,
    /// Strip surrounding whitespace.
    Trim,
}

impl Modifier {
    pub fn name(&self) -> &'static str {
        match self {
            Modifier::Base64Encode => "base64encode",
            Modifier::Base64Decode => "base64decode",
            Modifier::Trim => "trim",
        }
    }

    /// Apply to `value`. The error is a human-readable reason.
    pub fn apply(&self, value: Value) -> Result<Value, String> {
        match self {
            Modifier::Base64Encode => Ok(Value::String(STANDARD.encode(value.stringify()))),
            Modifier::Base64Decode => {
                let decoded = STANDARD
                    .decode(value.stringify().trim())
                    .map_err(|e| format!("invalid base64: {e}"))?;
                String::from_utf8(decoded)
                    .map(Value::String)
                    .map_err(|_| "decoded value is not valid UTF-8".to_string())
            }
            Modifier::Trim => Ok(Value::String(value.stringify().trim().to_string())),
        }
    }
}

impl FromStr for Modifier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "base64encode" => Ok(Modifier::Base64Encode),
            "base64decode" => Ok(Modifier::Base64Decode),
            "trim" => Ok(Modifier::Trim),
            other => Err(format!("unknown modifier '{other}'")),
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
