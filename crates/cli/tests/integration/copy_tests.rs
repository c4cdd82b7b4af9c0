use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn copy_between_persistences_keeps_source() {
  let env = TestEnv::new();
  env.write_file("outputs/user/project/experiments/1/model.bin", "weights");

  env
    .runstore_cmd()
    .args(["copy", "user.project.1", "user.project.2", "--to-persistence", "archive"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Copied"))
    .stdout(predicate::str::contains("experiments/1 → "))
    .stdout(predicate::str::ends_with("outputs-archive/user/project/experiments/2\n"));

  let copied = env.path("outputs-archive/user/project/experiments/2/model.bin");
  assert_eq!(std::fs::read_to_string(copied).unwrap(), "weights");

  env
    .runstore_cmd()
    .args(["delete", "outputs", "user/project/experiments/2", "-p", "archive"])
    .assert()
    .success();
  assert!(env.path("outputs/user/project/experiments/1/model.bin").exists());
}

#[test]
fn copy_missing_source_fails() {
  let env = TestEnv::new();

  env
    .runstore_cmd()
    .args(["copy", "user.project.1", "user.project.2"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("does not exist"));

  assert!(!env.path("outputs/user/project/experiments/2").exists());
}

#[test]
fn copy_onto_existing_destination_fails() {
  let env = TestEnv::new();
  env.write_file("outputs/user/project/experiments/1/a.txt", "a");
  env.write_file("outputs/user/project/experiments/2/b.txt", "b");

  env
    .runstore_cmd()
    .args(["copy", "user.project.1", "user.project.2"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("already exists"));

  assert!(!env.path("outputs/user/project/experiments/2/a.txt").exists());
}
