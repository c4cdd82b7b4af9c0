use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn validate_accepts_mounts() {
  let env = TestEnv::new();

  env
    .runstore_cmd()
    .arg("validate")
    .assert()
    .success()
    .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn validate_rejects_entry_without_location() {
  let env = TestEnv::new();
  env.write_settings(
    r#"
logs:
  mountPath: /plx/logs
outputs:
  broken:
    secret: aws
"#,
  );

  env
    .runstore_cmd()
    .arg("validate")
    .assert()
    .failure()
    .stderr(predicate::str::contains("broken"));
}

#[test]
fn validate_rejects_unknown_fields() {
  let env = TestEnv::new();
  env.write_settings("logs:\n  mountPath: /plx/logs\n  mountpath: /typo\n");

  env
    .runstore_cmd()
    .arg("validate")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to load settings"));
}

#[test]
fn missing_settings_file_fails() {
  let env = TestEnv::empty();

  env
    .runstore_cmd()
    .arg("info")
    .assert()
    .failure()
    .stderr(predicate::str::contains("stores.yaml"));
}

#[test]
fn info_lists_persistences() {
  let env = TestEnv::new();

  env
    .runstore_cmd()
    .arg("info")
    .assert()
    .success()
    .stdout(predicate::str::contains("Archive root"))
    .stdout(predicate::str::contains("archive"))
    .stdout(predicate::str::contains("mount"));
}

#[test]
fn info_json_includes_bucket_kind() {
  let env = TestEnv::new();
  env.write_settings(&format!(
    r#"
logs:
  mountPath: {root}/logs
outputs:
  s3:
    bucket: s3://outputs
    secret: aws
    secretKey: aws-creds
"#,
    root = env.root().display()
  ));

  let output = env.runstore_cmd().args(["info", "-o", "json"]).output().unwrap();
  assert!(output.status.success());

  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  let persistences = json["persistences"].as_array().unwrap();
  let s3 = persistences.iter().find(|p| p["name"] == "s3").unwrap();
  assert_eq!(s3["backend"], "s3");
  assert_eq!(s3["root"], "s3://outputs");
}

#[test]
fn explicit_config_flag_wins() {
  let env = TestEnv::new();
  let other = TestEnv::empty();
  other.write_settings("logs:\n  mountPath: /elsewhere/logs\n");

  env
    .runstore_cmd()
    .args(["path", "logs", "project", "user.project", "--config"])
    .arg(&other.config_path)
    .assert()
    .success()
    .stdout(predicate::str::contains("/elsewhere/logs/user/project"));
}
