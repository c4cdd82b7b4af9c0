//! Storage backends.
//!
//! Everything above this module is backend-agnostic: it asks the
//! [`StoreFactory`] for a [`StoreHandle`] and talks to it through the
//! [`Store`] trait. Two backends exist:
//!
//! - [`LocalStore`]: mounted volumes, plain filesystem calls.
//! - [`ObjectStore`]: buckets (`s3://`, `gs://`, `wasbs://`), backed by an
//!   [`ObjectClient`] built from decoded credentials.

pub mod factory;
pub mod local;
pub mod object;
pub mod secret;

pub use factory::{StoreFactory, StoreHandle};
pub use local::LocalStore;
pub use object::{BucketUri, MemoryObjectClient, ObjectClient, ObjectClientFactory, ObjectStore};
pub use secret::{ChainedSecretSource, EnvSecretSource, MapSecretSource, SecretSource, StoreCredentials};

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
  Local,
  S3,
  Gcs,
  Azure,
}

impl fmt::Display for StoreKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      StoreKind::Local => "local",
      StoreKind::S3 => "s3",
      StoreKind::Gcs => "gcs",
      StoreKind::Azure => "azure",
    };
    f.write_str(name)
  }
}

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("failed to {op} '{path}': {source}")]
  Io {
    op: &'static str,
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("path does not exist: {0}")]
  NotFound(PathBuf),

  #[error("destination already exists: {0}")]
  AlreadyExists(PathBuf),

  #[error("'{location}' is not a valid object store location: {reason}")]
  InvalidLocation { location: String, reason: String },

  #[error("secret `{0}` was not found")]
  MissingSecret(String),

  #[error("secret `{key}` could not be decoded: {reason}")]
  UndecodableSecret { key: String, reason: String },

  #[error("no object store client is registered for {0}")]
  UnsupportedKind(StoreKind),
}

impl StoreError {
  pub(crate) fn io<'a>(op: &'static str, path: &'a Path) -> impl FnOnce(io::Error) -> StoreError + 'a {
    move |source| StoreError::Io {
      op,
      path: path.to_path_buf(),
      source,
    }
  }
}

/// Blocking I/O against one backend.
///
/// Paths are absolute locations as produced by the stores service: a
/// filesystem path for local stores, a `scheme://bucket/key` URI for object
/// stores. None of the operations retry.
pub trait Store: Send + Sync {
  fn kind(&self) -> StoreKind;

  fn exists(&self, path: &Path) -> Result<bool, StoreError>;

  fn read(&self, path: &Path) -> Result<Vec<u8>, StoreError>;

  /// Write a file, creating missing parents.
  fn write(&self, path: &Path, data: &[u8]) -> Result<(), StoreError>;

  /// Files under `path`, relative to it, in sorted order.
  fn list(&self, path: &Path) -> Result<Vec<PathBuf>, StoreError>;

  /// Create a directory and its parents. Idempotent.
  fn create_dir(&self, path: &Path) -> Result<(), StoreError>;

  /// Remove a file or a whole tree. A missing path is not an error.
  fn delete(&self, path: &Path) -> Result<(), StoreError>;

  /// Copy a tree within this store.
  ///
  /// Fails when `from` is missing or `to` already exists; on failure no
  /// partial destination is left behind.
  fn copy_tree(&self, from: &Path, to: &Path) -> Result<(), StoreError> {
    transfer(self, from, self, to).map(|_| ())
  }
}

/// `list` reports a single file as one empty relative path.
fn join_relative(base: &Path, relative: &Path) -> PathBuf {
  if relative.as_os_str().is_empty() {
    base.to_path_buf()
  } else {
    base.join(relative)
  }
}

/// Copy a tree between two stores, file by file.
///
/// Returns the number of files copied. The destination is removed again if
/// any file fails to copy.
pub fn transfer<S, D>(source: &S, from: &Path, destination: &D, to: &Path) -> Result<usize, StoreError>
where
  S: Store + ?Sized,
  D: Store + ?Sized,
{
  if !source.exists(from)? {
    return Err(StoreError::NotFound(from.to_path_buf()));
  }
  if destination.exists(to)? {
    return Err(StoreError::AlreadyExists(to.to_path_buf()));
  }

  let files = source.list(from)?;
  let result = files.iter().try_for_each(|relative| {
    let data = source.read(&join_relative(from, relative))?;
    destination.write(&join_relative(to, relative), &data)
  });

  match result {
    Ok(()) => {
      debug!(
        from = %from.display(),
        to = %to.display(),
        files = files.len(),
        "copied tree"
      );
      Ok(files.len())
    }
    Err(e) => {
      if let Err(cleanup) = destination.delete(to) {
        warn!(path = %to.display(), error = %cleanup, "failed to remove partial copy");
      }
      Err(e)
    }
  }
}
