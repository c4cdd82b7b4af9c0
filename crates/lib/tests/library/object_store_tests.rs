use std::path::Path;

use runstore_lib::store::{ObjectClient, Store, StoreKind};
use runstore_lib::stores::ErrorKind;

use super::common::Fixture;

#[test]
fn bucket_outputs_resolve_to_uris() {
  let fx = Fixture::new();
  let path = fx
    .stores
    .get_experiment_outputs_path(Some("s3"), "user.project.7", None, None)
    .unwrap();
  assert_eq!(path, Path::new("s3://outputs/user/project/experiments/7"));
}

#[test]
fn bucket_creation_skips_directories() {
  let fx = Fixture::new();
  let path = fx.stores.create_experiment_outputs_path(Some("s3"), "user.project.7").unwrap();
  assert_eq!(path, Path::new("s3://outputs/user/project/experiments/7/7"));
  assert!(fx.bucket.list("outputs", "").unwrap().is_empty());
}

#[test]
fn outputs_store_carries_decoded_credentials() {
  let fx = Fixture::new();

  let store = fx.stores.get_outputs_store(Some("s3")).unwrap();
  assert_eq!(store.kind(), StoreKind::S3);
  let credentials = store.credentials().unwrap();
  assert_eq!(credentials.get_str("access_key"), Some("AKIAEXAMPLE"));

  assert!(fx.stores.get_outputs_store(Some("default")).unwrap().is_local());
}

#[test]
fn copy_from_mount_to_bucket_and_delete() {
  let fx = Fixture::new();
  fx.write("outputs/user/project/experiments/1/model.bin", "weights");
  fx.write("outputs/user/project/experiments/1/logs/train.txt", "loss=0.1");

  fx.stores
    .copy_experiment_outputs(None, Some("s3"), "user.project.1", "user.project.2")
    .unwrap();

  let keys = fx.bucket.list("outputs", "user/project/experiments/2/").unwrap();
  assert_eq!(
    keys,
    vec![
      "user/project/experiments/2/logs/train.txt".to_string(),
      "user/project/experiments/2/model.bin".to_string(),
    ]
  );

  fx.stores
    .delete_outputs_path("user/project/experiments/2", Some("s3"))
    .unwrap();
  assert!(fx.bucket.list("outputs", "").unwrap().is_empty());
  assert!(fx.path("outputs/user/project/experiments/1/model.bin").exists());
}

#[test]
fn copy_from_bucket_to_mount() {
  let fx = Fixture::new();
  fx.bucket
    .put("outputs", "user/project/experiments/1/model.bin", b"weights")
    .unwrap();

  fx.stores
    .copy_experiment_outputs(Some("s3"), Some("default"), "user.project.1", "user.project.1")
    .unwrap();

  assert_eq!(
    std::fs::read(fx.path("outputs/user/project/experiments/1/model.bin")).unwrap(),
    b"weights"
  );
}

#[test]
fn bucket_without_secret_key_cannot_be_modified() {
  let fx = Fixture::new();

  let err = fx
    .stores
    .delete_outputs_path("user/project", Some("s3-anonymous"))
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::InvalidConfig);
  assert!(err.to_string().contains("s3-anonymous"));
}
