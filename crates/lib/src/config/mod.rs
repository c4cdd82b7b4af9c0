//! Stores settings.
//!
//! Settings are read once from a YAML file and handed to the service
//! constructors; nothing consults the environment after that.
//!
//! ```yaml
//! archive_root: /var/lib/runstore/logs-archive
//! logs:
//!   mountPath: /plx/logs
//! outputs:
//!   default:
//!     mountPath: /plx/outputs
//!   s3:
//!     bucket: s3://outputs
//!     secret: aws
//!     secretKey: aws-creds
//! data:
//!   default:
//!     mountPath: /plx/data
//! secrets:
//!   aws-creds:
//!     access_key: AKIA...
//!     secret_key: ...
//! ```

mod types;

pub use types::{PersistenceConfig, StoresConfig};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::platform::paths::{archive_root_override, config_file};

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read settings file '{path}': {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse settings file '{path}': {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_yaml::Error,
  },
}

impl StoresConfig {
  /// Load settings from the default location.
  ///
  /// `RUNSTORE_CONFIG` selects the file and `RUNSTORE_ARCHIVE_ROOT`
  /// overrides its `archive_root`.
  pub fn load() -> Result<Self, ConfigError> {
    Self::load_from(&config_file())
  }

  /// Load settings from an explicit file, still honouring the archive root override.
  pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
    let mut config = Self::from_path(path)?;
    if let Some(root) = archive_root_override() {
      debug!(archive_root = %root.display(), "archive root overridden from environment");
      config.archive_root = Some(root);
    }
    Ok(config)
  }

  /// Parse a settings file without environment overrides.
  pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let config = Self::from_yaml_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })?;
    debug!(
      path = %path.display(),
      outputs = config.outputs.len(),
      data = config.data.len(),
      "loaded stores settings"
    );
    Ok(config)
  }

  pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
    serde_yaml::from_str(content)
  }
}
