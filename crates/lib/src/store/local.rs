//! Mounted-volume backend.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use super::{Store, StoreError, StoreKind};

/// Prefix of the staging directory a copy is assembled in.
const STAGING_PREFIX: &str = ".runstore-copy-";

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore;

impl LocalStore {
  pub fn new() -> Self {
    Self
  }
}

fn is_symlink(path: &Path) -> bool {
  path
    .symlink_metadata()
    .map(|m| m.file_type().is_symlink())
    .unwrap_or(false)
}

fn copy_dir_all(src: &Path, dst: &Path) -> io::Result<()> {
  fs::create_dir_all(dst)?;
  for entry in WalkDir::new(src).min_depth(1).follow_links(true) {
    let entry = entry.map_err(io::Error::other)?;
    let relative = entry.path().strip_prefix(src).map_err(io::Error::other)?;
    let target = dst.join(relative);
    if entry.file_type().is_dir() {
      fs::create_dir_all(&target)?;
    } else {
      fs::copy(entry.path(), &target)?;
    }
  }
  Ok(())
}

impl Store for LocalStore {
  fn kind(&self) -> StoreKind {
    StoreKind::Local
  }

  fn exists(&self, path: &Path) -> Result<bool, StoreError> {
    Ok(path.exists() || is_symlink(path))
  }

  fn read(&self, path: &Path) -> Result<Vec<u8>, StoreError> {
    fs::read(path).map_err(|e| {
      if e.kind() == io::ErrorKind::NotFound {
        StoreError::NotFound(path.to_path_buf())
      } else {
        StoreError::Io {
          op: "read",
          path: path.to_path_buf(),
          source: e,
        }
      }
    })
  }

  fn write(&self, path: &Path, data: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).map_err(StoreError::io("create directory", parent))?;
    }
    fs::write(path, data).map_err(StoreError::io("write", path))
  }

  fn list(&self, path: &Path) -> Result<Vec<PathBuf>, StoreError> {
    if !path.exists() {
      return Err(StoreError::NotFound(path.to_path_buf()));
    }
    if path.is_file() {
      return Ok(vec![PathBuf::new()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).min_depth(1).follow_links(true).sort_by_file_name() {
      let entry = entry.map_err(|e| StoreError::Io {
        op: "list",
        path: path.to_path_buf(),
        source: io::Error::other(e),
      })?;
      if entry.file_type().is_file()
        && let Ok(relative) = entry.path().strip_prefix(path)
      {
        files.push(relative.to_path_buf());
      }
    }
    Ok(files)
  }

  fn create_dir(&self, path: &Path) -> Result<(), StoreError> {
    if path.is_dir() {
      return Ok(());
    }
    fs::create_dir_all(path).map_err(StoreError::io("create directory", path))?;
    debug!(path = %path.display(), "created directory");
    Ok(())
  }

  fn delete(&self, path: &Path) -> Result<(), StoreError> {
    if !self.exists(path)? {
      debug!(path = %path.display(), "nothing to delete");
      return Ok(());
    }

    let removed = if path.is_dir() && !is_symlink(path) {
      fs::remove_dir_all(path)
    } else {
      fs::remove_file(path)
    };
    removed.map_err(StoreError::io("remove", path))?;

    debug!(path = %path.display(), "deleted path");
    Ok(())
  }

  /// Copies into a hidden sibling of `to` and renames it into place, so the
  /// destination only appears once the whole tree is there.
  fn copy_tree(&self, from: &Path, to: &Path) -> Result<(), StoreError> {
    if !from.exists() {
      return Err(StoreError::NotFound(from.to_path_buf()));
    }
    if self.exists(to)? {
      return Err(StoreError::AlreadyExists(to.to_path_buf()));
    }

    let parent = to.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(StoreError::io("create directory", parent))?;

    let staging = tempfile::Builder::new()
      .prefix(STAGING_PREFIX)
      .tempdir_in(parent)
      .map_err(StoreError::io("create staging directory", parent))?;
    let staged = staging.path().join("tree");

    if from.is_dir() {
      copy_dir_all(from, &staged).map_err(StoreError::io("copy", from))?;
    } else {
      fs::copy(from, &staged).map_err(StoreError::io("copy", from))?;
    }
    fs::rename(&staged, to).map_err(StoreError::io("move copy into", to))?;

    debug!(from = %from.display(), to = %to.display(), "copied tree");
    Ok(())
  }
}
