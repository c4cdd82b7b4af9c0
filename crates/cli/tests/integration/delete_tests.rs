use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn delete_outputs_subpaths() {
  let env = TestEnv::new();
  env.write_file("outputs/user/a/file.txt", "a");
  env.write_file("outputs/user/b/file.txt", "b");

  env
    .runstore_cmd()
    .args(["delete", "outputs", "user/a"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Deleted 1 path(s)"));

  assert!(!env.path("outputs/user/a").exists());
  assert!(env.path("outputs/user/b/file.txt").exists());
}

#[test]
fn delete_missing_path_succeeds() {
  let env = TestEnv::new();

  env
    .runstore_cmd()
    .args(["delete", "data", "never/there"])
    .assert()
    .success();
}

#[test]
fn delete_refuses_escaping_subpath() {
  let env = TestEnv::new();
  env.write_file("outside.txt", "keep");

  env
    .runstore_cmd()
    .args(["delete", "outputs", "../outside.txt"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("1 deletion(s) failed"));

  assert!(env.path("outside.txt").exists());
}

#[test]
fn delete_json_reports_counts() {
  let env = TestEnv::new();
  env.write_file("logs/user/project/jobs/1", "log");

  env
    .runstore_cmd()
    .args(["delete", "logs", "user/project/jobs/1", "-o", "json"])
    .assert()
    .success()
    .stdout(predicate::str::contains("\"completed\": 1"));
}

#[test]
fn delete_from_unknown_persistence_fails() {
  let env = TestEnv::new();

  env
    .runstore_cmd()
    .args(["delete", "data", "x", "-p", "nope"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("nope"));
}
