use std::path::Path;

use anyhow::{Result, bail};

use super::{ResourceArg, TargetArg, load_stores};
use crate::output::{OutputFormat, display_path, print_json, print_path};

pub fn cmd_create(
  config: Option<&Path>,
  target: TargetArg,
  resource: ResourceArg,
  name: &str,
  persistence: Option<&str>,
  temp: bool,
  output: OutputFormat,
) -> Result<()> {
  if temp && target == TargetArg::Outputs {
    bail!("--temp only applies to logs");
  }

  let stores = load_stores(config)?;
  let path = match (target, resource) {
    (TargetArg::Outputs, ResourceArg::Experiment) => stores.create_experiment_outputs_path(persistence, name)?,
    (TargetArg::Outputs, ResourceArg::Job) => stores.create_job_outputs_path(persistence, name)?,
    (TargetArg::Logs, ResourceArg::Experiment) => stores.create_experiment_logs_path(name, temp, persistence)?,
    (TargetArg::Logs, ResourceArg::ExperimentJob) => stores.create_experiment_job_logs_path(name, temp, persistence)?,
    (TargetArg::Logs, ResourceArg::Job) => stores.create_job_logs_path(name, temp, persistence)?,
    (target, resource) => bail!("cannot create {} for a {}", target, resource),
  };

  if output.is_json() {
    print_json(&serde_json::json!({ "created": display_path(&path) }))?;
  } else {
    print_path("Created", &path);
  }
  Ok(())
}
