//! Default file locations.
//!
//! XDG base directories on Unix, `%APPDATA%` on Windows. Unset or empty
//! variables fall through to the next candidate; when nothing is set the
//! system temp directory is used rather than failing.

use std::path::PathBuf;

use crate::consts::{APP_NAME, ARCHIVE_DIR, ARCHIVE_ROOT_ENV, CONFIG_ENV, CONFIG_FILENAME};

fn env_path(var: &str) -> Option<PathBuf> {
  std::env::var_os(var).filter(|v| !v.is_empty()).map(PathBuf::from)
}

#[cfg(not(windows))]
fn base_dir(xdg_var: &str, below_home: &[&str]) -> PathBuf {
  env_path(xdg_var).unwrap_or_else(|| {
    let home = env_path("HOME").unwrap_or_else(std::env::temp_dir);
    below_home.iter().fold(home, |dir, part| dir.join(part))
  })
}

#[cfg(windows)]
fn base_dir(_xdg_var: &str, _below_home: &[&str]) -> PathBuf {
  env_path("APPDATA").unwrap_or_else(std::env::temp_dir)
}

pub fn config_dir() -> PathBuf {
  base_dir("XDG_CONFIG_HOME", &[".config"]).join(APP_NAME)
}

pub fn data_dir() -> PathBuf {
  base_dir("XDG_DATA_HOME", &[".local", "share"]).join(APP_NAME)
}

/// `RUNSTORE_CONFIG`, else `<config_dir>/stores.yaml`.
pub fn config_file() -> PathBuf {
  env_path(CONFIG_ENV).unwrap_or_else(|| config_dir().join(CONFIG_FILENAME))
}

/// Archive root forced through `RUNSTORE_ARCHIVE_ROOT`, if any.
pub fn archive_root_override() -> Option<PathBuf> {
  env_path(ARCHIVE_ROOT_ENV)
}

/// Where temporary logs go when the settings do not say.
pub fn default_archive_root() -> PathBuf {
  data_dir().join(ARCHIVE_DIR)
}
