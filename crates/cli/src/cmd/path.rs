use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

use runstore_lib::naming::CloningStrategy;
use runstore_lib::stores::Stores;

use super::{ResourceArg, TargetArg, load_stores};
use crate::output::{OutputFormat, display_path, print_json};

pub struct PathRequest<'a> {
  pub target: TargetArg,
  pub resource: ResourceArg,
  pub name: &'a str,
  pub persistence: Option<&'a str>,
  pub temp: bool,
  pub original: Option<&'a str>,
  pub cloning_strategy: Option<CloningStrategy>,
}

fn resolve(stores: &Stores, req: &PathRequest<'_>) -> Result<PathBuf> {
  let temp_allowed = matches!(
    (req.target, req.resource),
    (
      TargetArg::Logs,
      ResourceArg::Experiment | ResourceArg::ExperimentJob | ResourceArg::Job
    )
  );
  if req.temp && !temp_allowed {
    bail!("--temp only applies to experiment, experiment-job and job logs");
  }
  if req.cloning_strategy.is_some() && !(req.target == TargetArg::Outputs && req.resource == ResourceArg::Experiment) {
    bail!("--cloning-strategy only applies to experiment outputs");
  }

  let (name, persistence, temp) = (req.name, req.persistence, req.temp);
  let path = match (req.target, req.resource) {
    (TargetArg::Outputs, ResourceArg::Experiment) => {
      stores.get_experiment_outputs_path(persistence, name, req.original, req.cloning_strategy)?
    }
    (TargetArg::Outputs, ResourceArg::ExperimentGroup) => stores.get_experiment_group_outputs_path(persistence, name)?,
    (TargetArg::Outputs, ResourceArg::Job) => stores.get_job_outputs_path(persistence, name)?,
    (TargetArg::Outputs, ResourceArg::Notebook) => stores.get_notebook_job_outputs_path(persistence, name)?,
    (TargetArg::Outputs, ResourceArg::Project) => stores.get_project_outputs_path(persistence, name)?,
    (TargetArg::Logs, ResourceArg::Experiment) => stores.get_experiment_logs_path(name, temp, persistence)?,
    (TargetArg::Logs, ResourceArg::ExperimentGroup) => stores.get_experiment_group_logs_path(name, persistence)?,
    (TargetArg::Logs, ResourceArg::ExperimentJob) => stores.get_experiment_job_logs_path(name, temp, persistence)?,
    (TargetArg::Logs, ResourceArg::Job) => stores.get_job_logs_path(name, temp, persistence)?,
    (TargetArg::Logs, ResourceArg::Project) => stores.get_project_logs_path(name, persistence)?,
    (target, resource) => bail!("{} has no {} path", resource, target),
  };
  Ok(path)
}

pub fn cmd_path(config: Option<&Path>, req: &PathRequest<'_>, output: OutputFormat) -> Result<()> {
  let stores = load_stores(config)?;
  let path = display_path(&resolve(&stores, req)?);

  if output.is_json() {
    print_json(&serde_json::json!({
      "target": req.target.to_string(),
      "resource": req.resource.to_string(),
      "name": req.name,
      "path": path,
    }))?;
  } else {
    println!("{}", path);
  }
  Ok(())
}
