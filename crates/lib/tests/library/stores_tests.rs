use std::fs;

use runstore_lib::naming::CloningStrategy;
use runstore_lib::stores::ErrorKind;

use super::common::Fixture;

#[test]
fn lookups_and_creations_agree() {
  let fx = Fixture::new();
  let stores = &fx.stores;

  let created = stores.create_experiment_logs_path("user.project.7", false, None).unwrap();
  let looked_up = stores.get_experiment_logs_path("user.project.7", false, None).unwrap();
  assert_eq!(created, looked_up);
  assert_eq!(created, fx.path("logs/user/project/experiments/7"));

  let created = stores.create_experiment_job_logs_path("user.project.7.master.0", false, None).unwrap();
  let looked_up = stores.get_experiment_job_logs_path("user.project.7.master.0", false, None).unwrap();
  assert_eq!(created, looked_up);
  assert!(created.parent().unwrap().is_dir());
}

#[test]
fn outputs_paths_per_resource() {
  let fx = Fixture::new();
  let stores = &fx.stores;

  assert_eq!(
    stores.get_experiment_group_outputs_path(Some("default"), "user.project.3").unwrap(),
    fx.path("outputs/user/project/groups/3")
  );
  assert_eq!(
    stores.get_notebook_job_outputs_path(None, "user.project.notebooks.2").unwrap(),
    fx.path("outputs/user/project/notebooks/2")
  );
  assert_eq!(
    stores.get_project_outputs_path(None, "user.project").unwrap(),
    fx.path("outputs/user/project")
  );
  assert_eq!(
    stores.get_job_outputs_path(None, "user.project.jobs.4").unwrap(),
    fx.path("outputs/user/project/jobs/4")
  );
}

#[test]
fn logs_paths_per_resource() {
  let fx = Fixture::new();
  let stores = &fx.stores;

  assert_eq!(
    stores.get_experiment_group_logs_path("user.project.3", None).unwrap(),
    fx.path("logs/user/project/groups/3")
  );
  assert_eq!(
    stores.get_project_logs_path("user.project", Some("default")).unwrap(),
    fx.path("logs/user/project")
  );
  assert_eq!(
    stores.get_experiment_job_logs_path("user.project.2.3.worker.1", true, None).unwrap(),
    fx.path("archive/user/project/groups/2/3/worker.1")
  );
}

#[test]
fn resumed_experiment_writes_to_original() {
  let fx = Fixture::new();
  let path = fx
    .stores
    .get_experiment_outputs_path(None, "user.project.9", Some("user.project.1"), Some(CloningStrategy::Resume))
    .unwrap();
  assert_eq!(path, fx.path("outputs/user/project/experiments/1"));
}

#[test]
fn create_job_outputs_creates_ordinal_directory() {
  let fx = Fixture::new();
  let path = fx.stores.create_job_outputs_path(None, "user.project.jobs.4").unwrap();
  assert_eq!(path, fx.path("outputs/user/project/jobs/4/4"));
  assert!(path.is_dir());
}

#[test]
fn create_job_logs_in_archive() {
  let fx = Fixture::new();
  let path = fx.stores.create_job_logs_path("myproj.job1", true, None).unwrap();
  assert_eq!(path, fx.path("archive/myproj/job1"));
  assert!(fx.path("archive/myproj").is_dir());
}

#[test]
fn copy_then_delete_leaves_source() {
  let fx = Fixture::new();
  fx.write("outputs/user/project/experiments/1/model/weights.bin", "w");
  fx.write("outputs/user/project/experiments/1/metrics.json", "{}");

  fx.stores
    .copy_experiment_outputs(None, None, "user.project.1", "user.project.2")
    .unwrap();
  assert_eq!(
    fs::read_to_string(fx.path("outputs/user/project/experiments/2/model/weights.bin")).unwrap(),
    "w"
  );

  fx.stores
    .delete_outputs_path("user/project/experiments/2", None)
    .unwrap();
  assert!(!fx.path("outputs/user/project/experiments/2").exists());
  assert!(fx.path("outputs/user/project/experiments/1/metrics.json").exists());
}

#[test]
fn copy_errors_are_classified() {
  let fx = Fixture::new();

  let err = fx
    .stores
    .copy_experiment_outputs(None, None, "user.project.1", "user.project.2")
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);

  fx.write("outputs/user/project/experiments/1/a", "a");
  fx.write("outputs/user/project/experiments/2/b", "b");
  let err = fx
    .stores
    .copy_experiment_outputs(None, None, "user.project.1", "user.project.2")
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn unknown_persistences_are_not_found() {
  let fx = Fixture::new();
  let stores = &fx.stores;

  let errors = [
    stores.get_data_path(Some("nope")).unwrap_err(),
    stores.get_outputs_path(Some("nope")).unwrap_err(),
    stores.get_logs_path(Some("nope")).unwrap_err(),
    stores.delete_data_path("x", Some("nope")).unwrap_err(),
    stores.get_job_outputs_path(Some("nope"), "a.b").unwrap_err(),
  ];
  for err in errors {
    assert_eq!(err.kind(), ErrorKind::NotFound, "{err}");
  }
}

#[test]
fn data_paths_by_name() {
  let fx = Fixture::new();

  let default = fx.stores.get_data_paths(&[]).unwrap();
  assert_eq!(default.len(), 1);
  assert_eq!(default["default"], fx.path("data"));

  let named = fx.stores.get_data_paths(&["default"]).unwrap();
  assert_eq!(named, default);

  assert_eq!(
    fx.stores.get_data_paths(&["default", "nope"]).unwrap_err().kind(),
    ErrorKind::NotFound
  );
}

#[test]
fn malformed_names_are_invalid() {
  let fx = Fixture::new();
  let stores = &fx.stores;

  for err in [
    stores.get_experiment_logs_path("user", false, None).unwrap_err(),
    stores.get_experiment_group_outputs_path(None, "user.project.3.4").unwrap_err(),
    stores.create_job_logs_path("user..job", false, None).unwrap_err(),
    stores.delete_logs_path("/etc", None).unwrap_err(),
    stores.get_experiment_outputs_path(None, "user.pro/ject.7", None, None).unwrap_err(),
  ] {
    assert_eq!(err.kind(), ErrorKind::InvalidName, "{err}");
  }
}

#[test]
fn absolute_names_stay_inside_the_persistence() {
  let fx = Fixture::new();
  let elsewhere = tempfile::TempDir::new().unwrap();
  let name = format!("{}.4", elsewhere.path().join("escaped").display());

  let err = fx.stores.create_job_outputs_path(None, &name).unwrap_err();
  assert_eq!(err.kind(), ErrorKind::InvalidName, "{err}");
  assert!(!elsewhere.path().join("escaped").exists());

  let err = fx.stores.copy_experiment_outputs(None, None, "user.project.1", "user.pro/ject.2").unwrap_err();
  assert_eq!(err.kind(), ErrorKind::InvalidName, "{err}");
}
