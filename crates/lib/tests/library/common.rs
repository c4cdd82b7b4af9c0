//! Shared fixtures for library integration tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use runstore_lib::config::StoresConfig;
use runstore_lib::store::{MemoryObjectClient, StoreKind};
use runstore_lib::stores::Stores;
use tempfile::TempDir;

/// Settings mixing mounted volumes with an `s3` outputs bucket.
pub fn settings(root: &Path) -> String {
  format!(
    r#"
archive_root: {root}/archive
logs:
  mountPath: {root}/logs
outputs:
  default:
    mountPath: {root}/outputs
  s3:
    bucket: s3://outputs
    secret: aws
    secretKey: aws-creds
  s3-anonymous:
    bucket: s3://public
data:
  default:
    mountPath: {root}/data
secrets:
  aws-creds:
    access_key: AKIAEXAMPLE
    secret_key: hunter2
"#,
    root = root.display()
  )
}

pub struct Fixture {
  pub temp: TempDir,
  pub stores: Stores,
  pub bucket: Arc<MemoryObjectClient>,
}

impl Fixture {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let config = StoresConfig::from_yaml_str(&settings(temp.path())).unwrap();
    let bucket = Arc::new(MemoryObjectClient::new());
    let mut stores = Stores::new(&config).unwrap();
    stores.register_client(StoreKind::S3, bucket.clone());
    Self { temp, stores, bucket }
  }

  pub fn path(&self, relative: &str) -> PathBuf {
    self.temp.path().join(relative)
  }

  pub fn write(&self, relative: &str, content: &str) {
    let path = self.path(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
  }
}
