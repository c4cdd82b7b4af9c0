//! Turning a store kind and secret reference into a usable handle.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use super::local::LocalStore;
use super::object::{ObjectClientFactory, ObjectStore};
use super::secret::{SecretSource, StoreCredentials};
use super::{Store, StoreError, StoreKind};

/// A connection to one backend, scoped to a single operation.
#[derive(Debug)]
pub enum StoreHandle {
  Local(LocalStore),
  Object(ObjectStore),
}

impl StoreHandle {
  pub fn credentials(&self) -> Option<&StoreCredentials> {
    match self {
      StoreHandle::Local(_) => None,
      StoreHandle::Object(store) => Some(store.credentials()),
    }
  }

  pub fn is_local(&self) -> bool {
    matches!(self, StoreHandle::Local(_))
  }

  fn backend(&self) -> &dyn Store {
    match self {
      StoreHandle::Local(store) => store,
      StoreHandle::Object(store) => store,
    }
  }
}

impl Store for StoreHandle {
  fn kind(&self) -> StoreKind {
    self.backend().kind()
  }

  fn exists(&self, path: &Path) -> Result<bool, StoreError> {
    self.backend().exists(path)
  }

  fn read(&self, path: &Path) -> Result<Vec<u8>, StoreError> {
    self.backend().read(path)
  }

  fn write(&self, path: &Path, data: &[u8]) -> Result<(), StoreError> {
    self.backend().write(path, data)
  }

  fn list(&self, path: &Path) -> Result<Vec<PathBuf>, StoreError> {
    self.backend().list(path)
  }

  fn create_dir(&self, path: &Path) -> Result<(), StoreError> {
    self.backend().create_dir(path)
  }

  fn delete(&self, path: &Path) -> Result<(), StoreError> {
    self.backend().delete(path)
  }

  fn copy_tree(&self, from: &Path, to: &Path) -> Result<(), StoreError> {
    self.backend().copy_tree(from, to)
  }
}

/// Builds [`StoreHandle`]s so that callers never branch on the backend.
pub struct StoreFactory {
  secrets: Arc<dyn SecretSource>,
  clients: HashMap<StoreKind, Arc<dyn ObjectClientFactory>>,
}

impl fmt::Debug for StoreFactory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut kinds: Vec<_> = self.clients.keys().collect();
    kinds.sort();
    f.debug_struct("StoreFactory").field("clients", &kinds).finish_non_exhaustive()
  }
}

impl StoreFactory {
  pub fn new(secrets: impl SecretSource + 'static) -> Self {
    Self {
      secrets: Arc::new(secrets),
      clients: HashMap::new(),
    }
  }

  /// Register the client used for buckets of `kind`.
  pub fn with_client(mut self, kind: StoreKind, client: impl ObjectClientFactory + 'static) -> Self {
    self.register(kind, client);
    self
  }

  pub fn register(&mut self, kind: StoreKind, client: impl ObjectClientFactory + 'static) {
    self.clients.insert(kind, Arc::new(client));
  }

  /// Resolve a handle.
  ///
  /// Without a store kind or a secret key the local filesystem is returned.
  /// Otherwise the secret must exist and decode, and a client must be
  /// registered for the kind.
  pub fn get_store(&self, kind: Option<StoreKind>, secret_key: Option<&str>) -> Result<StoreHandle, StoreError> {
    let (kind, secret_key) = match (kind, secret_key) {
      (Some(kind), Some(secret_key)) if kind != StoreKind::Local => (kind, secret_key),
      _ => return Ok(StoreHandle::Local(LocalStore::new())),
    };

    let raw = self
      .secrets
      .get_secret(secret_key)
      .ok_or_else(|| StoreError::MissingSecret(secret_key.to_string()))?;
    let credentials = StoreCredentials::decode(secret_key, &raw)?;

    let client_factory = self.clients.get(&kind).ok_or(StoreError::UnsupportedKind(kind))?;
    let client = client_factory.connect(kind, &credentials)?;

    debug!(%kind, secret_key, "connected object store");
    Ok(StoreHandle::Object(ObjectStore::new(kind, credentials, client)))
  }
}
