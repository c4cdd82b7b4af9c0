use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::store::StoreKind;

/// One named persistence entry.
///
/// Two shapes are accepted: a mounted volume (`mountPath`, optionally with
/// `hostPath`, `existingClaim` and `readOnly`) or an object-store bucket
/// (`bucket`, optionally with `store`, `secret` and `secretKey`). Which one an
/// entry is gets decided by [`crate::persistence::classify`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PersistenceConfig {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub mount_path: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub host_path: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub existing_claim: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub read_only: Option<bool>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub bucket: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub store: Option<StoreKind>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub secret: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub secret_key: Option<String>,
}

impl PersistenceConfig {
  pub fn mount(path: impl Into<String>) -> Self {
    Self {
      mount_path: Some(path.into()),
      ..Self::default()
    }
  }

  pub fn bucket(uri: impl Into<String>) -> Self {
    Self {
      bucket: Some(uri.into()),
      ..Self::default()
    }
  }

  pub fn with_secret(mut self, secret: impl Into<String>, secret_key: impl Into<String>) -> Self {
    self.secret = Some(secret.into());
    self.secret_key = Some(secret_key.into());
    self
  }
}

/// The full stores settings: three persistence catalogs plus the archive root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoresConfig {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub archive_root: Option<PathBuf>,
  /// The single logs persistence, implicitly named `default`.
  #[serde(default)]
  pub logs: PersistenceConfig,
  #[serde(default)]
  pub outputs: BTreeMap<String, PersistenceConfig>,
  #[serde(default)]
  pub data: BTreeMap<String, PersistenceConfig>,
  /// Secret payloads by key, consulted before `RUNSTORE_SECRET_*` variables.
  #[serde(default, skip_serializing)]
  pub secrets: BTreeMap<String, serde_json::Value>,
}
