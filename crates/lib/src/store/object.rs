//! Object-store backend.
//!
//! Buckets are addressed as `scheme://bucket/key`. The actual wire client is
//! an external capability behind [`ObjectClient`]; this module only maps the
//! [`Store`] operations onto flat keys.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::debug;

use super::secret::StoreCredentials;
use super::{Store, StoreError, StoreKind};

/// A parsed `scheme://bucket/key` location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketUri {
  pub kind: StoreKind,
  pub scheme: String,
  pub bucket: String,
  pub key: String,
}

impl BucketUri {
  pub fn parse(location: &str) -> Result<Self, StoreError> {
    let invalid = |reason: &str| StoreError::InvalidLocation {
      location: location.to_string(),
      reason: reason.to_string(),
    };

    let normalized = location.replace('\\', "/");
    let (scheme, rest) = normalized.split_once("://").ok_or_else(|| invalid("missing URI scheme"))?;
    let kind = match scheme {
      "s3" => StoreKind::S3,
      "gs" | "gcs" => StoreKind::Gcs,
      "wasb" | "wasbs" | "az" => StoreKind::Azure,
      _ => return Err(invalid("unsupported URI scheme")),
    };
    let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
    if bucket.is_empty() {
      return Err(invalid("bucket name is empty"));
    }

    Ok(Self {
      kind,
      scheme: scheme.to_string(),
      bucket: bucket.to_string(),
      key: key.trim_matches('/').to_string(),
    })
  }

  /// Prefix shared by every object below this location.
  pub fn child_prefix(&self) -> String {
    if self.key.is_empty() {
      String::new()
    } else {
      format!("{}/", self.key)
    }
  }
}

/// Flat key/value access to one object-storage service.
pub trait ObjectClient: Send + Sync {
  fn get(&self, bucket: &str, key: &str) -> io::Result<Option<Vec<u8>>>;

  fn put(&self, bucket: &str, key: &str, data: &[u8]) -> io::Result<()>;

  fn delete(&self, bucket: &str, key: &str) -> io::Result<()>;

  /// Keys starting with `prefix`, sorted.
  fn list(&self, bucket: &str, prefix: &str) -> io::Result<Vec<String>>;
}

/// Builds authenticated clients for one store kind.
pub trait ObjectClientFactory: Send + Sync {
  fn connect(&self, kind: StoreKind, credentials: &StoreCredentials) -> Result<Arc<dyn ObjectClient>, StoreError>;
}

/// An in-process object client, used where no real service is reachable.
#[derive(Debug, Default)]
pub struct MemoryObjectClient {
  objects: Mutex<BTreeMap<(String, String), Vec<u8>>>,
}

impl MemoryObjectClient {
  pub fn new() -> Self {
    Self::default()
  }

  fn objects(&self) -> io::Result<std::sync::MutexGuard<'_, BTreeMap<(String, String), Vec<u8>>>> {
    self
      .objects
      .lock()
      .map_err(|_| io::Error::other("object client lock poisoned"))
  }
}

impl ObjectClient for MemoryObjectClient {
  fn get(&self, bucket: &str, key: &str) -> io::Result<Option<Vec<u8>>> {
    Ok(self.objects()?.get(&(bucket.to_string(), key.to_string())).cloned())
  }

  fn put(&self, bucket: &str, key: &str, data: &[u8]) -> io::Result<()> {
    self
      .objects()?
      .insert((bucket.to_string(), key.to_string()), data.to_vec());
    Ok(())
  }

  fn delete(&self, bucket: &str, key: &str) -> io::Result<()> {
    self.objects()?.remove(&(bucket.to_string(), key.to_string()));
    Ok(())
  }

  fn list(&self, bucket: &str, prefix: &str) -> io::Result<Vec<String>> {
    Ok(
      self
        .objects()?
        .keys()
        .filter(|(b, k)| b == bucket && k.starts_with(prefix))
        .map(|(_, k)| k.clone())
        .collect(),
    )
  }
}

impl ObjectClientFactory for Arc<MemoryObjectClient> {
  fn connect(&self, _kind: StoreKind, _credentials: &StoreCredentials) -> Result<Arc<dyn ObjectClient>, StoreError> {
    Ok(self.clone())
  }
}

/// A bucket-backed store holding the credentials it was built with.
pub struct ObjectStore {
  kind: StoreKind,
  credentials: StoreCredentials,
  client: Arc<dyn ObjectClient>,
}

impl fmt::Debug for ObjectStore {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ObjectStore")
      .field("kind", &self.kind)
      .field("credentials", &self.credentials)
      .finish_non_exhaustive()
  }
}

impl ObjectStore {
  pub fn new(kind: StoreKind, credentials: StoreCredentials, client: Arc<dyn ObjectClient>) -> Self {
    Self {
      kind,
      credentials,
      client,
    }
  }

  pub fn credentials(&self) -> &StoreCredentials {
    &self.credentials
  }

  fn locate(&self, path: &Path) -> Result<BucketUri, StoreError> {
    let uri = BucketUri::parse(&path.to_string_lossy())?;
    if uri.kind != self.kind {
      return Err(StoreError::InvalidLocation {
        location: path.display().to_string(),
        reason: format!("expected a {} location", self.kind),
      });
    }
    Ok(uri)
  }
}

impl Store for ObjectStore {
  fn kind(&self) -> StoreKind {
    self.kind
  }

  fn exists(&self, path: &Path) -> Result<bool, StoreError> {
    let uri = self.locate(path)?;
    if uri.key.is_empty() {
      return Ok(true);
    }
    let object = self
      .client
      .get(&uri.bucket, &uri.key)
      .map_err(StoreError::io("stat", path))?;
    if object.is_some() {
      return Ok(true);
    }
    let children = self
      .client
      .list(&uri.bucket, &uri.child_prefix())
      .map_err(StoreError::io("list", path))?;
    Ok(!children.is_empty())
  }

  fn read(&self, path: &Path) -> Result<Vec<u8>, StoreError> {
    let uri = self.locate(path)?;
    self
      .client
      .get(&uri.bucket, &uri.key)
      .map_err(StoreError::io("read", path))?
      .ok_or_else(|| StoreError::NotFound(path.to_path_buf()))
  }

  fn write(&self, path: &Path, data: &[u8]) -> Result<(), StoreError> {
    let uri = self.locate(path)?;
    if uri.key.is_empty() {
      return Err(StoreError::InvalidLocation {
        location: path.display().to_string(),
        reason: "cannot write to a bucket root".to_string(),
      });
    }
    self
      .client
      .put(&uri.bucket, &uri.key, data)
      .map_err(StoreError::io("write", path))
  }

  fn list(&self, path: &Path) -> Result<Vec<PathBuf>, StoreError> {
    let uri = self.locate(path)?;
    let prefix = uri.child_prefix();
    let keys = self
      .client
      .list(&uri.bucket, &prefix)
      .map_err(StoreError::io("list", path))?;

    if keys.is_empty() {
      let object = self
        .client
        .get(&uri.bucket, &uri.key)
        .map_err(StoreError::io("stat", path))?;
      return match object {
        Some(_) => Ok(vec![PathBuf::new()]),
        None => Err(StoreError::NotFound(path.to_path_buf())),
      };
    }

    Ok(
      keys
        .iter()
        .map(|key| PathBuf::from(&key[prefix.len()..]))
        .collect(),
    )
  }

  /// Object stores have no directories; keys spring into existence on write.
  fn create_dir(&self, path: &Path) -> Result<(), StoreError> {
    self.locate(path).map(|_| ())
  }

  fn delete(&self, path: &Path) -> Result<(), StoreError> {
    let uri = self.locate(path)?;
    if uri.key.is_empty() {
      return Err(StoreError::InvalidLocation {
        location: path.display().to_string(),
        reason: "refusing to delete a whole bucket".to_string(),
      });
    }

    let mut keys = self
      .client
      .list(&uri.bucket, &uri.child_prefix())
      .map_err(StoreError::io("list", path))?;
    keys.push(uri.key.clone());

    for key in &keys {
      self
        .client
        .delete(&uri.bucket, key)
        .map_err(StoreError::io("delete", path))?;
    }
    debug!(path = %path.display(), objects = keys.len(), "deleted objects");
    Ok(())
  }
}
