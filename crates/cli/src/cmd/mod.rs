//! Subcommand implementations.

mod copy;
mod create;
mod delete;
mod info;
mod path;
mod validate;

pub use copy::cmd_copy;
pub use create::cmd_create;
pub use delete::cmd_delete;
pub use info::cmd_info;
pub use path::{PathRequest, cmd_path};
pub use validate::cmd_validate;

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use tracing::debug;

use runstore_lib::config::StoresConfig;
use runstore_lib::persistence::PersistenceKind;
use runstore_lib::stores::Stores;

/// Load settings (explicit file, or the default location) and build the service.
pub fn load_stores(config: Option<&Path>) -> Result<Stores> {
  debug!(config = ?config, "loading settings");
  let settings = match config {
    Some(path) => StoresConfig::load_from(path),
    None => StoresConfig::load(),
  }
  .context("Failed to load settings")?;
  Stores::new(&settings).context("Invalid persistence configuration")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TargetArg {
  Outputs,
  Logs,
}

impl fmt::Display for TargetArg {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      TargetArg::Outputs => "outputs",
      TargetArg::Logs => "logs",
    })
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResourceArg {
  Experiment,
  ExperimentGroup,
  ExperimentJob,
  Job,
  Notebook,
  Project,
}

impl fmt::Display for ResourceArg {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      ResourceArg::Experiment => "experiment",
      ResourceArg::ExperimentGroup => "experiment-group",
      ResourceArg::ExperimentJob => "experiment-job",
      ResourceArg::Job => "job",
      ResourceArg::Notebook => "notebook",
      ResourceArg::Project => "project",
    })
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PersistenceArg {
  Data,
  Outputs,
  Logs,
}

impl From<PersistenceArg> for PersistenceKind {
  fn from(arg: PersistenceArg) -> Self {
    match arg {
      PersistenceArg::Data => PersistenceKind::Data,
      PersistenceArg::Outputs => PersistenceKind::Outputs,
      PersistenceArg::Logs => PersistenceKind::Logs,
    }
  }
}
