//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Isolated test environment.
///
/// Each test gets its own temporary directory holding a settings file whose
/// persistences are all mounted below it.
pub struct TestEnv {
  pub temp: TempDir,
  pub config_path: PathBuf,
}

impl TestEnv {
  /// Two outputs persistences (`default`, `archive`), one data and one logs mount.
  pub fn new() -> Self {
    let env = Self::empty();
    let root = env.root();
    let settings = format!(
      r#"
logs:
  mountPath: {root}/logs
outputs:
  default:
    mountPath: {root}/outputs
  archive:
    mountPath: {root}/outputs-archive
data:
  default:
    mountPath: {root}/data
"#,
      root = root.display()
    );
    std::fs::write(&env.config_path, settings).unwrap();
    env
  }

  /// A directory with no settings file yet.
  pub fn empty() -> Self {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("stores.yaml");
    Self { temp, config_path }
  }

  pub fn write_settings(&self, content: &str) {
    std::fs::write(&self.config_path, content).unwrap();
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  /// Canonical temp root, so printed paths compare equal on every platform.
  pub fn root(&self) -> PathBuf {
    let p = self.temp.path().to_path_buf();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  pub fn path(&self, relative_path: &str) -> PathBuf {
    self.root().join(relative_path)
  }

  pub fn archive_root(&self) -> PathBuf {
    self.root().join("archive")
  }

  /// Get a pre-configured Command for the runstore binary.
  ///
  /// - `RUNSTORE_CONFIG`: the test's settings file
  /// - `RUNSTORE_ARCHIVE_ROOT`: isolated logs archive
  /// - `RUST_LOG`: unset, so stderr only carries errors
  pub fn runstore_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("runstore");
    cmd.env("RUNSTORE_CONFIG", &self.config_path);
    cmd.env("RUNSTORE_ARCHIVE_ROOT", self.archive_root());
    cmd.env_remove("RUST_LOG");
    cmd
  }
}
