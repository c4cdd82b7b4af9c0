use thiserror::Error;

use crate::naming::NameError;
use crate::persistence::{PersistenceError, PersistenceKind};
use crate::store::StoreError;

/// Broad classes of stores failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// A persistence name, or a path on disk, does not exist.
  NotFound,
  /// A persistence entry or its secret is unusable.
  InvalidConfig,
  /// A resource name or subpath is malformed.
  InvalidName,
  /// The backend failed while creating, deleting or copying.
  Io,
}

#[derive(Debug, Error)]
pub enum StoresError {
  #[error(transparent)]
  Persistence(#[from] PersistenceError),

  #[error(transparent)]
  Name(#[from] NameError),

  #[error(transparent)]
  Store(#[from] StoreError),

  #[error("unsafe subpath `{subpath}`: {reason}")]
  UnsafeSubpath { subpath: String, reason: &'static str },

  #[error("{kind} persistence `{name}` is a bucket without a secretKey")]
  MissingCredentials { kind: PersistenceKind, name: String },
}

impl StoresError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      StoresError::Persistence(PersistenceError::NotFound { .. } | PersistenceError::Empty(_)) => ErrorKind::NotFound,
      StoresError::Persistence(PersistenceError::Invalid { .. }) => ErrorKind::InvalidConfig,
      StoresError::Name(_) | StoresError::UnsafeSubpath { .. } => ErrorKind::InvalidName,
      StoresError::Store(StoreError::NotFound(_)) => ErrorKind::NotFound,
      StoresError::Store(StoreError::Io { .. } | StoreError::AlreadyExists(_)) => ErrorKind::Io,
      StoresError::Store(
        StoreError::InvalidLocation { .. }
        | StoreError::MissingSecret(_)
        | StoreError::UndecodableSecret { .. }
        | StoreError::UnsupportedKind(_),
      )
      | StoresError::MissingCredentials { .. } => ErrorKind::InvalidConfig,
    }
  }
}
