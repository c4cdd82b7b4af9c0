use std::path::Path;

use anyhow::{Context, Result};

use super::load_stores;
use crate::output::{Outcome, OutputFormat, display_path, print_json, print_outcome, transfer_line};

pub fn cmd_copy(
  config: Option<&Path>,
  from: &str,
  to: &str,
  from_persistence: Option<&str>,
  to_persistence: Option<&str>,
  output: OutputFormat,
) -> Result<()> {
  let stores = load_stores(config)?;

  let source = stores.get_experiment_outputs_path(from_persistence, from, None, None)?;
  let destination = stores.get_experiment_outputs_path(to_persistence, to, None, None)?;
  stores
    .copy_experiment_outputs(from_persistence, to_persistence, from, to)
    .with_context(|| format!("Failed to copy outputs of {} to {}", from, to))?;

  if output.is_json() {
    print_json(&serde_json::json!({ "from": display_path(&source), "to": display_path(&destination) }))?;
  } else {
    print_outcome(Outcome::Done, &transfer_line("Copied", &source, &destination));
  }
  Ok(())
}
