use std::collections::BTreeMap;

use runstore_lib::config::{PersistenceConfig, StoresConfig};
use runstore_lib::store::StoreKind;
use runstore_lib::stores::{ErrorKind, Stores};
use serial_test::serial;
use tempfile::TempDir;

use super::common::settings;

#[test]
fn settings_round_trip_through_file() {
  let temp = TempDir::new().unwrap();
  let path = temp.path().join("stores.yaml");
  std::fs::write(&path, settings(temp.path())).unwrap();

  let config = StoresConfig::from_path(&path).unwrap();
  assert_eq!(config.outputs.len(), 3);
  assert_eq!(config.outputs["s3"].secret_key.as_deref(), Some("aws-creds"));
  assert!(config.secrets.contains_key("aws-creds"));
}

#[test]
#[serial]
fn secrets_fall_back_to_environment() {
  let temp = TempDir::new().unwrap();
  let config = StoresConfig {
    logs: PersistenceConfig::mount(temp.path().join("logs").to_string_lossy().into_owned()),
    outputs: BTreeMap::from([(
      "gcs".to_string(),
      PersistenceConfig::bucket("gs://outputs").with_secret("gcp", "gcp-creds"),
    )]),
    ..StoresConfig::default()
  };

  temp_env::with_var("RUNSTORE_SECRET_GCP_CREDS", Some(r#"{"project": "ml"}"#), || {
    let mut stores = Stores::new(&config).unwrap();
    stores.register_client(StoreKind::Gcs, std::sync::Arc::new(runstore_lib::store::MemoryObjectClient::new()));
    let store = stores.get_outputs_store(Some("gcs")).unwrap();
    assert_eq!(store.credentials().unwrap().get_str("project"), Some("ml"));
  });

  temp_env::with_var_unset("RUNSTORE_SECRET_GCP_CREDS", || {
    let stores = Stores::new(&config).unwrap();
    let err = stores.get_outputs_store(Some("gcs")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidConfig);
  });
}

#[test]
fn invalid_entries_fail_construction() {
  let config = StoresConfig::from_yaml_str(
    r#"
logs:
  mountPath: /plx/logs
data:
  both:
    mountPath: /plx/data
    bucket: s3://data
"#,
  )
  .unwrap();

  let err = Stores::new(&config).unwrap_err();
  assert_eq!(err.kind(), ErrorKind::InvalidConfig);
  assert!(err.to_string().contains("both"));
}

#[test]
fn relative_mounts_are_rejected() {
  let config = StoresConfig {
    logs: PersistenceConfig::mount("relative/logs"),
    ..StoresConfig::default()
  };
  assert_eq!(Stores::new(&config).unwrap_err().kind(), ErrorKind::InvalidConfig);
}
