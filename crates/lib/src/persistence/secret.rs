//! Credential references declared on persistence entries.

use std::collections::BTreeMap;

use crate::config::PersistenceConfig;
use crate::store::StoreKind;

use super::{PersistenceError, PersistenceKind, ValidShape, classify};

/// Store kind and secret reference of a persistence definition.
///
/// `store` and `secret_key` are both `None` for mounted volumes, which tells
/// the store factory to hand out the local filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreSecret<'a> {
  pub store: Option<StoreKind>,
  pub secret: Option<&'a str>,
  pub secret_key: Option<&'a str>,
}

pub fn store_secret_from_definition(config: &PersistenceConfig) -> StoreSecret<'_> {
  let store = match classify(config) {
    ValidShape::Bucket(kind) => Some(kind),
    ValidShape::Mount | ValidShape::Invalid(_) => None,
  };
  StoreSecret {
    store,
    secret: config.secret.as_deref(),
    secret_key: config.secret_key.as_deref(),
  }
}

pub fn store_secret_for_persistence<'a>(
  kind: PersistenceKind,
  name: &str,
  catalog: &'a BTreeMap<String, PersistenceConfig>,
) -> Result<StoreSecret<'a>, PersistenceError> {
  let config = catalog.get(name).ok_or_else(|| PersistenceError::NotFound {
    kind,
    name: name.to_string(),
  })?;
  Ok(store_secret_from_definition(config))
}
