//! Store credentials and where they come from.
//!
//! A persistence entry only names its secret (`secretKey`). The payload is a
//! JSON object, either verbatim or base64-encoded, looked up through a
//! [`SecretSource`].

use std::collections::BTreeMap;
use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

use super::StoreError;
use crate::consts::SECRET_ENV_PREFIX;

/// Decoded credentials for an object store.
///
/// `Debug` prints the field names only.
#[derive(Clone, Default, PartialEq)]
pub struct StoreCredentials(BTreeMap<String, Value>);

impl StoreCredentials {
  pub fn from_json(value: Value) -> Result<Self, String> {
    match value {
      Value::Object(map) => Ok(Self(map.into_iter().collect())),
      other => Err(format!("expected a JSON object, found {}", json_type(&other))),
    }
  }

  /// Decode a raw payload: a JSON object, or the same base64-encoded.
  pub fn decode(key: &str, raw: &str) -> Result<Self, StoreError> {
    let undecodable = |reason: String| StoreError::UndecodableSecret {
      key: key.to_string(),
      reason,
    };

    let trimmed = raw.trim();
    let json = if trimmed.starts_with('{') {
      trimmed.to_string()
    } else {
      let bytes = STANDARD
        .decode(trimmed)
        .map_err(|e| undecodable(format!("not JSON and not base64: {e}")))?;
      String::from_utf8(bytes).map_err(|e| undecodable(e.to_string()))?
    };

    let value: Value = serde_json::from_str(&json).map_err(|e| undecodable(e.to_string()))?;
    Self::from_json(value).map_err(undecodable)
  }

  pub fn get(&self, field: &str) -> Option<&Value> {
    self.0.get(field)
  }

  pub fn get_str(&self, field: &str) -> Option<&str> {
    self.0.get(field).and_then(Value::as_str)
  }

  pub fn fields(&self) -> impl Iterator<Item = &str> {
    self.0.keys().map(String::as_str)
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl fmt::Debug for StoreCredentials {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("StoreCredentials")
      .field("fields", &self.0.keys().collect::<Vec<_>>())
      .finish()
  }
}

fn json_type(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

/// Raw secret payloads by key.
pub trait SecretSource: Send + Sync {
  fn get_secret(&self, key: &str) -> Option<String>;
}

/// Secrets from `RUNSTORE_SECRET_<KEY>` environment variables.
///
/// The key is upper-cased and every character outside `[A-Z0-9]` becomes `_`,
/// so `aws-creds` is read from `RUNSTORE_SECRET_AWS_CREDS`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecretSource;

impl EnvSecretSource {
  pub fn var_name(key: &str) -> String {
    let suffix: String = key
      .chars()
      .map(|c| {
        if c.is_ascii_alphanumeric() {
          c.to_ascii_uppercase()
        } else {
          '_'
        }
      })
      .collect();
    format!("{SECRET_ENV_PREFIX}{suffix}")
  }
}

impl SecretSource for EnvSecretSource {
  fn get_secret(&self, key: &str) -> Option<String> {
    std::env::var(Self::var_name(key)).ok()
  }
}

/// Secrets held in memory, typically the `secrets:` block of the settings file.
#[derive(Debug, Clone, Default)]
pub struct MapSecretSource {
  entries: BTreeMap<String, String>,
}

impl MapSecretSource {
  /// String values are kept as-is (they may be base64); structured values are
  /// re-serialized as JSON.
  pub fn from_values(values: &BTreeMap<String, Value>) -> Self {
    let entries = values
      .iter()
      .map(|(key, value)| {
        let raw = match value {
          Value::String(s) => s.clone(),
          other => other.to_string(),
        };
        (key.clone(), raw)
      })
      .collect();
    Self { entries }
  }

  pub fn insert(&mut self, key: impl Into<String>, raw: impl Into<String>) {
    self.entries.insert(key.into(), raw.into());
  }
}

impl SecretSource for MapSecretSource {
  fn get_secret(&self, key: &str) -> Option<String> {
    self.entries.get(key).cloned()
  }
}

/// Tries each source in order.
#[derive(Default)]
pub struct ChainedSecretSource {
  sources: Vec<Box<dyn SecretSource>>,
}

impl ChainedSecretSource {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with(mut self, source: impl SecretSource + 'static) -> Self {
    self.sources.push(Box::new(source));
    self
  }
}

impl SecretSource for ChainedSecretSource {
  fn get_secret(&self, key: &str) -> Option<String> {
    self.sources.iter().find_map(|source| source.get_secret(key))
  }
}
