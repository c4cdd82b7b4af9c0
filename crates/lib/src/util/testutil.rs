//! Fixtures for unit tests that need a working [`Stores`].

use std::collections::BTreeMap;
use std::path::Path;

use tempfile::TempDir;

use crate::config::{PersistenceConfig, StoresConfig};
use crate::stores::Stores;

/// Settings with every persistence mounted below `root`.
///
/// Outputs has `default` and `archive`, data has `default` and `shared`.
pub fn local_config(root: &Path) -> StoresConfig {
  let mount = |dir: &str| PersistenceConfig::mount(root.join(dir).to_string_lossy().into_owned());
  StoresConfig {
    archive_root: Some(root.join("archive")),
    logs: mount("logs"),
    outputs: BTreeMap::from([
      ("default".to_string(), mount("outputs")),
      ("archive".to_string(), mount("outputs-archive")),
    ]),
    data: BTreeMap::from([
      ("default".to_string(), mount("data")),
      ("shared".to_string(), mount("data-shared")),
    ]),
    secrets: BTreeMap::new(),
  }
}

pub fn stores_in(temp: &TempDir) -> Stores {
  Stores::new(&local_config(temp.path())).expect("local config is valid")
}
