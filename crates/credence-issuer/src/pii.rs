//! PII-safe claim parsing.
//!
//! When structured claims fail to deserialize, the error must describe the
//! input without quoting it: sensitive values are replaced by fixed markers
//! before the error is built. The serde error text is dropped entirely
//! because it can embed fragments of the input.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Marker substituted for sensitive string values in redacted echoes.
const REDACTED: &str = "******";

/// A claim parse failure carrying a redacted echo of the offending input.
#[derive(Debug, thiserror::Error)]
#[error("Failed to parse claims; redacted input: {redacted}")]
pub struct PiiParseError {
    /// Redacted copy of the input, safe to log and to embed in messages.
    pub redacted: Value,
}

/// Deserializes `raw` into `T`, redacting the input in the error path.
///
/// `sensitive` lists the top-level field names to redact. An empty list
/// redacts every field, so a misconfigured deployment fails safe.
pub fn parse_redacted<T: DeserializeOwned>(
    raw: &Value,
    sensitive: &[String],
) -> Result<T, PiiParseError> {
    serde_json::from_value(raw.clone()).map_err(|_| PiiParseError {
        redacted: redact(raw, sensitive),
    })
}

/// Produces a redacted copy of `raw`.
///
/// Sensitive strings become `"******"`, sensitive numbers and booleans
/// become `null`, and sensitive objects and arrays are replaced wholesale
/// by `{}`. Non-object inputs have no fields to preserve and redact to `{}`.
#[must_use]
pub fn redact(raw: &Value, sensitive: &[String]) -> Value {
    let Value::Object(fields) = raw else {
        return Value::Object(Map::new());
    };

    let all_sensitive = sensitive.is_empty();
    let mut redacted = Map::with_capacity(fields.len());
    for (key, value) in fields {
        let is_sensitive = all_sensitive || sensitive.iter().any(|s| s == key);
        let echoed = if is_sensitive {
            match value {
                Value::String(_) => Value::String(REDACTED.to_string()),
                Value::Number(_) | Value::Bool(_) => Value::Null,
                Value::Object(_) | Value::Array(_) => Value::Object(Map::new()),
                Value::Null => Value::Null,
            }
        } else {
            value.clone()
        };
        redacted.insert(key.clone(), echoed);
    }
    Value::Object(redacted)
}
