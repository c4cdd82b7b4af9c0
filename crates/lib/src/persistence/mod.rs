//! Persistence catalogs: resolution and shape validation.
//!
//! A persistence is a named storage target backed either by a mounted volume
//! or by an object-store bucket. The registry owns the three catalogs (data,
//! outputs, logs) and refuses to exist unless every entry has a valid shape.

mod secret;

pub use secret::{StoreSecret, store_secret_for_persistence, store_secret_from_definition};

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::config::{PersistenceConfig, StoresConfig};
use crate::consts::DEFAULT_PERSISTENCE;
use crate::store::{BucketUri, StoreKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceKind {
  Data,
  Outputs,
  Logs,
}

impl fmt::Display for PersistenceKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      PersistenceKind::Data => "data",
      PersistenceKind::Outputs => "outputs",
      PersistenceKind::Logs => "logs",
    };
    f.write_str(name)
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PersistenceError {
  #[error("{kind} persistence `{name}` was referenced but is not configured")]
  NotFound { kind: PersistenceKind, name: String },

  #[error("no {0} persistence is configured")]
  Empty(PersistenceKind),

  #[error("{kind} persistence `{name}` is not valid: {reason}")]
  Invalid {
    kind: PersistenceKind,
    name: String,
    reason: String,
  },
}

/// Outcome of checking a persistence entry against the two accepted shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidShape {
  Mount,
  Bucket(StoreKind),
  Invalid(String),
}

fn check_mount(config: &PersistenceConfig) -> Option<Result<(), String>> {
  let mount_path = config.mount_path.as_deref()?;
  if mount_path.is_empty() {
    return Some(Err("mountPath is empty".to_string()));
  }
  if !Path::new(mount_path).is_absolute() {
    return Some(Err(format!("mountPath `{mount_path}` is not absolute")));
  }
  if config.store.is_some() || config.secret_key.is_some() {
    return Some(Err("store credentials are only valid for buckets".to_string()));
  }
  Some(Ok(()))
}

fn check_bucket(config: &PersistenceConfig) -> Option<Result<StoreKind, String>> {
  let bucket = config.bucket.as_deref()?;
  if bucket.is_empty() {
    return Some(Err("bucket is empty".to_string()));
  }
  if config.host_path.is_some() || config.existing_claim.is_some() || config.read_only.is_some() {
    return Some(Err("volume options are only valid for mounts".to_string()));
  }
  let inferred = if bucket.contains("://") {
    match BucketUri::parse(bucket) {
      Ok(uri) => Some(uri.kind),
      Err(e) => return Some(Err(e.to_string())),
    }
  } else {
    None
  };
  match (config.store, inferred) {
    (Some(declared), Some(inferred)) if declared != inferred => Some(Err(format!(
      "store `{declared}` does not match bucket scheme of `{bucket}`"
    ))),
    (Some(StoreKind::Local), None) => Some(Err("a bucket cannot use the local store".to_string())),
    (Some(kind), _) | (None, Some(kind)) => Some(Ok(kind)),
    (None, None) => Some(Err(format!(
      "bucket `{bucket}` has no URI scheme and no `store` was declared"
    ))),
  }
}

/// Classify a persistence entry.
///
/// The mount shape is tried first and the bucket shape second; an entry
/// carrying both fields, or neither, is invalid.
pub fn classify(config: &PersistenceConfig) -> ValidShape {
  if config.mount_path.is_some() && config.bucket.is_some() {
    return ValidShape::Invalid("mountPath and bucket are mutually exclusive".to_string());
  }
  if let Some(result) = check_mount(config) {
    return match result {
      Ok(()) => ValidShape::Mount,
      Err(reason) => ValidShape::Invalid(reason),
    };
  }
  match check_bucket(config) {
    Some(Ok(kind)) => ValidShape::Bucket(kind),
    Some(Err(reason)) => ValidShape::Invalid(reason),
    None => ValidShape::Invalid("defines neither a mountPath nor a bucket".to_string()),
  }
}

pub fn validate(kind: PersistenceKind, name: &str, config: &PersistenceConfig) -> Result<(), PersistenceError> {
  match classify(config) {
    ValidShape::Mount | ValidShape::Bucket(_) => Ok(()),
    ValidShape::Invalid(reason) => Err(PersistenceError::Invalid {
      kind,
      name: name.to_string(),
      reason,
    }),
  }
}

/// Where a resolved persistence physically lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
  Mount(PathBuf),
  Bucket { kind: StoreKind, uri: String },
}

impl Location {
  pub fn root(&self) -> PathBuf {
    match self {
      Location::Mount(path) => path.clone(),
      Location::Bucket { uri, .. } => PathBuf::from(uri),
    }
  }

  pub fn is_mount(&self) -> bool {
    matches!(self, Location::Mount(_))
  }
}

/// A persistence entry picked out of a catalog.
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
  pub kind: PersistenceKind,
  pub name: &'a str,
  pub config: &'a PersistenceConfig,
}

impl Resolved<'_> {
  pub fn location(&self) -> Result<Location, PersistenceError> {
    match classify(self.config) {
      ValidShape::Mount => Ok(Location::Mount(PathBuf::from(
        self.config.mount_path.as_deref().unwrap_or_default(),
      ))),
      ValidShape::Bucket(kind) => Ok(Location::Bucket {
        kind,
        uri: self.config.bucket.clone().unwrap_or_default(),
      }),
      ValidShape::Invalid(reason) => Err(PersistenceError::Invalid {
        kind: self.kind,
        name: self.name.to_string(),
        reason,
      }),
    }
  }
}

/// Look a name up in a catalog.
///
/// Without a name the entry called `default` is used when the catalog has
/// one, otherwise the lexicographically smallest entry.
pub fn resolve<'a>(
  kind: PersistenceKind,
  catalog: &'a BTreeMap<String, PersistenceConfig>,
  name: Option<&str>,
) -> Result<Resolved<'a>, PersistenceError> {
  let (name, config) = match name {
    Some(name) => catalog
      .get_key_value(name)
      .ok_or_else(|| PersistenceError::NotFound {
        kind,
        name: name.to_string(),
      })?,
    None => match catalog.get_key_value(DEFAULT_PERSISTENCE) {
      Some(entry) => entry,
      None => {
        let first = catalog.iter().next().ok_or(PersistenceError::Empty(kind))?;
        if catalog.len() > 1 {
          debug!(%kind, name = %first.0, "no persistence named and no default entry, using the first by name");
        }
        first
      }
    },
  };
  Ok(Resolved { kind, name, config })
}

/// Validated persistence catalogs.
#[derive(Debug, Clone)]
pub struct PersistenceRegistry {
  logs: BTreeMap<String, PersistenceConfig>,
  outputs: BTreeMap<String, PersistenceConfig>,
  data: BTreeMap<String, PersistenceConfig>,
}

impl PersistenceRegistry {
  /// Build the registry and validate every entry up front.
  pub fn new(config: &StoresConfig) -> Result<Self, PersistenceError> {
    let registry = Self {
      logs: BTreeMap::from([(DEFAULT_PERSISTENCE.to_string(), config.logs.clone())]),
      outputs: config.outputs.clone(),
      data: config.data.clone(),
    };
    registry.validate()?;
    Ok(registry)
  }

  /// Validate logs, outputs and data, stopping at the first invalid entry.
  pub fn validate(&self) -> Result<(), PersistenceError> {
    for kind in [PersistenceKind::Logs, PersistenceKind::Outputs, PersistenceKind::Data] {
      for (name, config) in self.catalog(kind) {
        validate(kind, name, config)?;
      }
    }
    debug!(
      outputs = self.outputs.len(),
      data = self.data.len(),
      "validated persistence catalogs"
    );
    Ok(())
  }

  pub fn catalog(&self, kind: PersistenceKind) -> &BTreeMap<String, PersistenceConfig> {
    match kind {
      PersistenceKind::Data => &self.data,
      PersistenceKind::Outputs => &self.outputs,
      PersistenceKind::Logs => &self.logs,
    }
  }

  pub fn resolve(&self, kind: PersistenceKind, name: Option<&str>) -> Result<Resolved<'_>, PersistenceError> {
    resolve(kind, self.catalog(kind), name)
  }

  pub fn logs(&self) -> Resolved<'_> {
    Resolved {
      kind: PersistenceKind::Logs,
      name: DEFAULT_PERSISTENCE,
      config: &self.logs[DEFAULT_PERSISTENCE],
    }
  }
}
